//! On-disk layout of uploaded media.
//!
//! Files live in two flat directories under the media root; their names are
//! the only collision-avoidance mechanism.

use std::path::{Path, PathBuf};

/// Directory (and URL segment) holding step images.
pub const STEP_IMAGES_DIR: &str = "task_step_images";

/// Directory (and URL segment) holding task-level images.
pub const TASK_IMAGES_DIR: &str = "task_images";

/// Media root on disk plus the URL prefix it is served under.
#[derive(Debug, Clone)]
pub struct MediaLayout {
    root: PathBuf,
    url_prefix: String,
}

impl MediaLayout {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn step_images_dir(&self) -> PathBuf {
        self.root.join(STEP_IMAGES_DIR)
    }

    pub fn task_images_dir(&self) -> PathBuf {
        self.root.join(TASK_IMAGES_DIR)
    }

    pub fn step_image_url(&self, file_name: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, STEP_IMAGES_DIR, file_name)
    }

    pub fn task_image_url(&self, file_name: &str) -> String {
        format!("{}/{}/{}", self.url_prefix, TASK_IMAGES_DIR, file_name)
    }

    /// URL for a path relative to the media root (as stored in the image index).
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    /// Create both media directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.step_images_dir())?;
        std::fs::create_dir_all(self.task_images_dir())
    }
}

/// Strip any client-supplied directory components from an upload name.
pub fn client_basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Split a file name into `(stem, extension)`, the extension keeping its dot.
///
/// Leading dots do not start an extension, so `.bashrc` has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_extension_cases() {
        assert_eq!(split_extension("photo.png"), ("photo", ".png"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension("name."), ("name", "."));
    }

    #[test]
    fn client_basename_drops_directories() {
        assert_eq!(client_basename("C:\\Users\\me\\shot 1.PNG"), "shot 1.PNG");
        assert_eq!(client_basename("../../etc/passwd"), "passwd");
        assert_eq!(client_basename("plain.jpg"), "plain.jpg");
    }

    #[test]
    fn urls_follow_prefix() {
        let media = MediaLayout::new("/srv/media", "/media/");
        assert_eq!(
            media.step_image_url("a.png"),
            "/media/task_step_images/a.png"
        );
        assert_eq!(media.url_for("task_images/b.png"), "/media/task_images/b.png");
        assert_eq!(
            media.step_images_dir(),
            PathBuf::from("/srv/media/task_step_images")
        );
    }
}
