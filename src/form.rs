//! Submitted form data: text fields plus uploaded files, in submission order.

/// A file part of a multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field the file was posted under, e.g. `step_image_2_0`.
    pub field: String,
    /// Client-side file name, possibly with directory components.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fields and files of one request.
///
/// Repeated keys keep every value; single-value lookups return the last one
/// submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Builder-style [`push_field`](Self::push_field).
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.push_field(name, value);
        self
    }

    /// Builder-style [`push_file`](Self::push_file).
    pub fn with_file(mut self, field: &str, file_name: &str, bytes: &[u8]) -> Self {
        self.push_file(UploadedFile {
            field: field.to_string(),
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        self
    }

    /// Last value posted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Owned copy of [`get`](Self::get), for the form structs.
    pub fn get_owned(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Every value posted under `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Last non-empty file posted under `name`.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files
            .iter()
            .rev()
            .find(|f| f.field == name && !f.file_name.is_empty())
    }

    /// Uploaded files, one per field name (last wins), in first-seen order.
    pub fn files(&self) -> Vec<&UploadedFile> {
        let mut seen: Vec<&UploadedFile> = Vec::new();
        for file in &self.files {
            if file.file_name.is_empty() {
                continue;
            }
            match seen.iter_mut().find(|f| f.field == file.field) {
                Some(slot) => *slot = file,
                None => seen.push(file),
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_fields_keep_all_values() {
        let form = FormData::new()
            .with_field("delete_step_image[]", "1_a.png")
            .with_field("delete_step_image[]", "2_b.png")
            .with_field("process", "x");
        assert_eq!(
            form.get_all("delete_step_image[]"),
            ["1_a.png", "2_b.png"]
        );
        assert_eq!(form.get("delete_step_image[]"), Some("2_b.png"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn files_dedupe_by_field_and_skip_empty_parts() {
        let form = FormData::new()
            .with_file("step_image_1_0", "a.png", b"a")
            .with_file("step_image_2_0", "", b"")
            .with_file("step_image_1_0", "b.png", b"b");
        let files = form.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "b.png");
        assert!(form.file("step_image_2_0").is_none());
    }
}
