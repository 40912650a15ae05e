//! Derived statistics and task filtering.
//!
//! Everything here is computed on demand from a task slice; nothing is cached.

use crate::error::{AppError, AppResult};
use crate::types::{Category, Project, Task, WORKSHOP_RANGE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Tasks whose progress is exactly 100.
pub fn count_completed<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> usize {
    tasks.into_iter().filter(|t| t.is_completed()).count()
}

/// `completed / total` as a whole percentage, 0 for an empty set.
///
/// Halves round to the even neighbour (1/8 → 12, 3/8 → 38).
pub fn completion_rate(completed: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round_ties_even() as i64
}

/// Task count for every category, zero included.
pub fn count_by_category<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (c.clone(), 0)).collect();
    for task in tasks {
        *counts.entry(task.category.clone()).or_default() += 1;
    }
    counts
}

/// Task count per workshop number that occurs in `tasks`.
pub fn count_by_workshop<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.workshop).or_default() += 1;
    }
    counts
}

/// One row of the workshop table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkshopStat {
    pub workshop: i64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: i64,
}

/// Workshop table for workshops 1 through 5.
pub fn workshop_stats(tasks: &[&Task]) -> Vec<WorkshopStat> {
    WORKSHOP_RANGE
        .map(|workshop| {
            let in_workshop: Vec<&Task> = tasks
                .iter()
                .copied()
                .filter(|t| t.workshop == workshop)
                .collect();
            let total = in_workshop.len();
            let completed = count_completed(in_workshop);
            WorkshopStat {
                workshop,
                total_tasks: total,
                completed_tasks: completed,
                completion_rate: completion_rate(completed, total),
            }
        })
        .collect()
}

/// Overall summary of a task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: i64,
    pub by_category: BTreeMap<String, usize>,
    pub by_workshop: BTreeMap<i64, usize>,
    pub workshops: Vec<WorkshopStat>,
}

impl StatsSummary {
    pub fn from_tasks(tasks: &[&Task]) -> Self {
        let total = tasks.len();
        let completed = count_completed(tasks.iter().copied());
        Self {
            total_tasks: total,
            completed_tasks: completed,
            completion_rate: completion_rate(completed, total),
            by_category: count_by_category(tasks.iter().copied())
                .into_iter()
                .map(|(c, n)| (c.as_str().to_string(), n))
                .collect(),
            by_workshop: count_by_workshop(tasks.iter().copied()),
            workshops: workshop_stats(tasks),
        }
    }
}

/// Category and workshop filter from the task list query string.
///
/// The category is kept as submitted, so an unknown category simply matches
/// no task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub category: Option<String>,
    pub workshop: Option<i64>,
}

fn active_value(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

impl TaskFilter {
    /// Parse raw query values; empty or `all` means no filter.
    pub fn parse(category: Option<&str>, workshop: Option<&str>) -> AppResult<Self> {
        let workshop = match active_value(workshop) {
            Some(w) => Some(w.parse::<i64>().map_err(|_| {
                AppError::invalid_value("workshop", "workshop must be an integer")
            })?),
            None => None,
        };
        Ok(Self {
            category: active_value(category).map(str::to_string),
            workshop,
        })
    }

    /// Whether any filter is active.
    pub fn is_active(&self) -> bool {
        self.category.is_some() || self.workshop.is_some()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| task.category.as_str() == c)
            && self.workshop.is_none_or(|w| task.workshop == w)
    }

    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Filtered tasks of one project.
#[derive(Debug, Clone)]
pub struct ProjectTasks<'a> {
    pub project: &'a Project,
    pub tasks: Vec<&'a Task>,
}

/// Group tasks by the project that owns them, in order of first appearance.
/// Tasks no project owns are dropped.
pub fn group_by_project<'a>(projects: &'a [Project], tasks: &[&'a Task]) -> Vec<ProjectTasks<'a>> {
    let mut groups: Vec<ProjectTasks<'a>> = Vec::new();
    for &task in tasks {
        let Some(project) = projects
            .iter()
            .find(|p| p.tasks.iter().any(|t| t.id == task.id))
        else {
            continue;
        };
        match groups.iter_mut().find(|g| g.project.id == project.id) {
            Some(group) => group.tasks.push(task),
            None => groups.push(ProjectTasks {
                project,
                tasks: vec![task],
            }),
        }
    }
    groups
}
