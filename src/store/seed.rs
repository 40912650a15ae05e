//! Built-in dataset used when no store document can be loaded.

use super::StoreDocument;
use crate::types::{Category, ProcessStep, Project, Task};
use std::collections::BTreeMap;

fn step(title: &str, content: &str) -> ProcessStep {
    ProcessStep {
        title: title.to_string(),
        content: content.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: i64,
    project_id: i64,
    title: &str,
    category: Category,
    workshop: i64,
    progress: i64,
    description: &str,
    process: Vec<ProcessStep>,
) -> Task {
    Task {
        id,
        project_id,
        title: title.to_string(),
        category,
        workshop,
        description: description.to_string(),
        pain_points: String::new(),
        process,
        results: String::new(),
        progress,
        step_images: Vec::new(),
        images: BTreeMap::new(),
    }
}

/// The seed document: two projects with a handful of tasks.
pub fn seed_document() -> StoreDocument {
    let mut pipeline = task(
        101,
        1,
        "数据采集流程梳理",
        Category::RnD,
        1,
        100,
        "梳理现有数据采集链路并确定改造范围。",
        vec![
            step("现状调研", "访谈业务方，整理现有采集脚本。"),
            step("方案设计", "输出采集链路改造方案。"),
        ],
    );
    pipeline.pain_points = "采集脚本分散，缺少统一调度。".to_string();
    pipeline.results = "形成统一的采集流程文档。".to_string();

    let acceptance = task(
        102,
        1,
        "报表验收",
        Category::Uat,
        2,
        60,
        "与业务方共同验收第一批报表。",
        vec![
            step("准备验收用例", ""),
            step("组织验收会议", ""),
            step("问题跟踪", ""),
        ],
    );

    let support = task(
        103,
        2,
        "上线支持",
        Category::Support,
        2,
        30,
        "上线期间的值守与问题响应。",
        vec![step("值守排班", "")],
    );

    let training = task(
        104,
        2,
        "用户培训",
        Category::Support,
        3,
        0,
        "面向一线用户的系统操作培训。",
        Vec::new(),
    );

    StoreDocument {
        projects: vec![
            Project {
                id: 1,
                name: "数据平台建设".to_string(),
                description: "企业数据平台的调研、建设与验收。".to_string(),
                tasks: vec![pipeline, acceptance],
            },
            Project {
                id: 2,
                name: "系统上线运维".to_string(),
                description: "新系统上线后的支持与培训工作。".to_string(),
                tasks: vec![support, training],
            },
        ],
        next_task_id: 105,
    }
}
