//! Transient local copy of a fetched document
//!
//! The copy lives only while text is extracted. It is removed explicitly by
//! [`StagedDocument::release`] and, on any early exit, when dropped.

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub struct StagedDocument {
    file: NamedTempFile,
}

impl StagedDocument {
    /// Write `bytes` to a new file in `staging_dir`. The file name keeps a
    /// shortened form of the original name as a suffix, extension included.
    pub fn create(staging_dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let suffix = staging_suffix(file_name);
        let mut file = tempfile::Builder::new()
            .prefix("staged-")
            .suffix(&suffix)
            .tempfile_in(staging_dir)?;

        file.write_all(bytes)?;
        file.flush()?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the staging copy now. Removal failures are logged, not raised.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed staging copy"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging copy"),
        }
    }
}

const MAX_STEM_CHARS: usize = 32;
const MAX_EXTENSION_CHARS: usize = 16;

/// `-<stem>.<ext>` with both parts sanitized and capped in length
fn staging_suffix(file_name: &str) -> String {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let stem: String = sanitize(&stem).chars().take(MAX_STEM_CHARS).collect();

    match name.extension() {
        Some(ext) => {
            let ext: String = sanitize(&ext.to_string_lossy())
                .chars()
                .take(MAX_EXTENSION_CHARS)
                .collect();
            format!("-{stem}.{ext}")
        }
        None => format!("-{stem}"),
    }
}

/// Keep only characters that are safe in a file name
fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedDocument::create(dir.path(), "spec.pdf", b"%PDF").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with("-spec.pdf"));

        staged.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = StagedDocument::create(dir.path(), "notes.txt", b"hi").unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_long_object_name_is_shortened() {
        let dir = tempfile::tempdir().unwrap();
        let name = format!("{}.txt", "a".repeat(250));
        let staged = StagedDocument::create(dir.path(), &name, b"hi").unwrap();

        let file_name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.ends_with(".txt"));
        assert!(file_name.len() < 100);
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"hi");
    }

    #[test]
    fn test_suffix_keeps_extension() {
        assert_eq!(staging_suffix("spec.pdf"), "-spec.pdf");
        assert_eq!(staging_suffix("README"), "-README");
        assert_eq!(staging_suffix("my report.docx"), "-my_report.docx");
        assert_eq!(staging_suffix(&"b".repeat(300)), format!("-{}", "b".repeat(MAX_STEM_CHARS)));
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize("a b/c?.txt"), "a_b_c_.txt");
    }
}
