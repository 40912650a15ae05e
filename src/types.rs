//! Core types for the portfolio store.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum number of images attached to a single process step.
pub const MAX_IMAGES_PER_STEP: usize = 3;

/// Workshop numbers shown in the workshop breakdowns.
pub const WORKSHOP_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Task category.
///
/// The three known keys drive badges, filters and form options. Any other
/// key found in a stored document is kept as `Other` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    RnD,
    Uat,
    Support,
    Other(String),
}

impl Category {
    pub const ALL: [Category; 3] = [Category::RnD, Category::Uat, Category::Support];

    /// Map a stored key to a category, keeping unknown keys.
    pub fn from_key(key: &str) -> Self {
        key.parse()
            .unwrap_or_else(|_| Category::Other(key.to_string()))
    }

    /// Key used in forms, query strings and the JSON document.
    pub fn as_str(&self) -> &str {
        match self {
            Category::RnD => "R&D",
            Category::Uat => "UAT",
            Category::Support => "Support",
            Category::Other(key) => key,
        }
    }

    /// Long-form label. Unknown categories show their key.
    pub fn label(&self) -> &str {
        match self {
            Category::RnD => "研究开发",
            Category::Uat => "用户验收",
            Category::Support => "技术支持",
            Category::Other(key) => key,
        }
    }

    /// Foreground and background colors used by the task badges.
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Category::RnD => ("#FF7043", "#FFF3E0"),
            Category::Uat => ("#EC407A", "#FCE4EC"),
            Category::Support => ("#4CAF50", "#E8F5E9"),
            Category::Other(_) => ("#757575", "#F5F5F5"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used for form input: only the known keys are accepted.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(Category::from_key(&key))
    }
}

/// Integer field that hand-edited documents sometimes store as a string
/// (`"2"`) or a float (`2.0`).
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f.fract() == 0.0 => Ok(f as i64),
        Raw::Float(f) => Err(de::Error::custom(format!("expected an integer, got {}", f))),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {:?}", text))),
    }
}

/// Chinese numeral for a workshop number, `N/A` outside 1..=5.
pub fn workshop_numeral(workshop: i64) -> &'static str {
    match workshop {
        1 => "一",
        2 => "二",
        3 => "三",
        4 => "四",
        5 => "五",
        _ => "N/A",
    }
}

/// Display text for a workshop, e.g. `第二次workshop`.
pub fn workshop_text(workshop: i64) -> String {
    format!("第{}次workshop", workshop_numeral(workshop))
}

/// One step of a task's implementation process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Image attached to a process step, embedded in the task document.
///
/// Older documents carry the stored name under `filename` only; new uploads
/// write both keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepImage {
    #[serde(deserialize_with = "lenient_int")]
    pub step: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Id of the mirrored row in the image index, when the insert succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl StepImage {
    /// Create an image record for a freshly stored file.
    pub fn new(step: i64, file_name: &str, url: String, description: String) -> Self {
        Self {
            step,
            url,
            file_name: Some(file_name.to_string()),
            filename: Some(file_name.to_string()),
            description,
            id: None,
        }
    }

    /// Stored file name, preferring the primary key over the legacy one.
    pub fn stored_name(&self) -> &str {
        self.file_name
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("")
    }

    /// Identity used by deletion keys: `<step>_<file name>`.
    pub fn identity(&self) -> String {
        format!("{}_{}", self.step, self.stored_name())
    }
}

/// A task within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub title: String,
    pub category: Category,
    #[serde(deserialize_with = "lenient_int")]
    pub workshop: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pain_points: String,
    #[serde(default)]
    pub process: Vec<ProcessStep>,
    #[serde(default)]
    pub results: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub progress: i64,
    #[serde(default)]
    pub step_images: Vec<StepImage>,
    /// Task-level images from the edit form: stored name → media-relative path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
}

impl Task {
    /// Number of step images currently attached to `step`.
    pub fn images_for_step(&self, step: i64) -> usize {
        self.step_images.iter().filter(|img| img.step == step).count()
    }

    pub fn is_completed(&self) -> bool {
        self.progress == 100
    }
}

/// A project and its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Validated input for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub category: Category,
    pub workshop: i64,
    pub description: String,
    pub pain_points: String,
    /// Raw multi-line text, one step title per non-blank line.
    pub process: String,
    pub results: String,
    pub progress: i64,
}

/// Validated input for editing a task in place.
#[derive(Debug, Clone)]
pub struct TaskEdit {
    pub title: String,
    pub category: Category,
    pub workshop: i64,
    pub progress: i64,
    pub description: String,
    pub pain_points: String,
    /// Raw multi-line step titles; blank clears the process.
    pub process: String,
}

/// Row of the relational image index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub task_id: i64,
    /// Path relative to the media root, e.g. `task_step_images/<name>`.
    pub image: String,
    pub description: Option<String>,
    /// Upload time in milliseconds since the epoch.
    pub uploaded_at: i64,
}
