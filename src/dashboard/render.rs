//! HTML helpers shared by the page handlers.

use super::templates;
use crate::media::MediaLayout;
use crate::types::Category;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn image_marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(r"\[image:(.*?)\]").ok())
        .as_ref()
}

/// Escape `text`, turning `[image:<name>]` markers into task image tags.
pub fn render_with_images(text: &str, media: &MediaLayout) -> String {
    let Some(marker) = image_marker() else {
        return html_escape(text);
    };
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in marker.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&html_escape(&text[last..whole.start()]));
        out.push_str(&format!(
            r#"<img class="inline-image" src="{}" alt="任务图片">"#,
            html_escape(&media.task_image_url(name.as_str()))
        ));
        last = whole.end();
    }
    out.push_str(&html_escape(&text[last..]));
    out
}

/// Substitute `{{key}}` placeholders in one pass. Values are inserted
/// verbatim and never rescanned; unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Wrap page content in the base layout.
pub fn page(title: &str, content: &str) -> String {
    fill(
        templates::BASE_TEMPLATE,
        &[
            ("title", html_escape(title)),
            ("content", content.to_string()),
        ],
    )
}

/// Category badge with its colors.
pub fn category_badge(category: &Category) -> String {
    let (fg, bg) = category.colors();
    format!(
        r#"<span class="badge" style="color:{};background:{}" title="{}">{}</span>"#,
        fg,
        bg,
        html_escape(category.label()),
        html_escape(category.as_str())
    )
}

/// Progress bar, clamped for display only.
pub fn progress_bar(progress: i64) -> String {
    let width = progress.clamp(0, 100);
    format!(
        r#"<div class="progress"><div class="progress-fill" style="width:{}%"></div><span>{}%</span></div>"#,
        width, progress
    )
}

/// `<option>` list, marking `selected` by value.
pub fn options<'a>(items: impl IntoIterator<Item = (String, String)>, selected: Option<&'a str>) -> String {
    items
        .into_iter()
        .map(|(value, label)| {
            let mark = if selected == Some(value.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                html_escape(&value),
                mark,
                html_escape(&label)
            )
        })
        .collect()
}

/// Inline error banner, empty when there is no error.
pub fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<div class="message message-error">{}</div>"#, html_escape(e)))
        .unwrap_or_default()
}
