//! Parsing of the free-text process fields submitted by the forms.

use crate::types::ProcessStep;

/// Parse step titles for a new task: one step per non-blank line.
pub fn parse_new_steps(raw: &str) -> Vec<ProcessStep> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|title| ProcessStep {
            title: title.to_string(),
            content: String::new(),
        })
        .collect()
}

/// Replace step titles by position, keeping each position's content.
///
/// The outer text is trimmed before splitting, so interior blank lines
/// still produce (empty-titled) steps. Blank input yields no steps.
pub fn retitle_steps(existing: &[ProcessStep], raw: &str) -> Vec<ProcessStep> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('\n')
        .enumerate()
        .map(|(i, line)| ProcessStep {
            title: line.trim().to_string(),
            content: existing
                .get(i)
                .map(|s| s.content.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Default title for a step created from content alone (1-based).
pub fn default_step_title(position: usize) -> String {
    format!("步骤 {}", position)
}

/// Replace step contents by position.
///
/// Titles survive by position or take a default; existing steps past the
/// last line are kept untouched. Blank input clears every step's content.
pub fn rewrite_step_contents(existing: &[ProcessStep], raw: &str) -> Vec<ProcessStep> {
    if raw.trim().is_empty() {
        return existing
            .iter()
            .map(|s| ProcessStep {
                title: s.title.clone(),
                content: String::new(),
            })
            .collect();
    }

    let lines: Vec<&str> = raw.split('\n').collect();
    let mut steps: Vec<ProcessStep> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| ProcessStep {
            title: existing
                .get(i)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| default_step_title(i + 1)),
            content: line.trim().to_string(),
        })
        .collect();

    if existing.len() > lines.len() {
        steps.extend_from_slice(&existing[lines.len()..]);
    }
    steps
}
