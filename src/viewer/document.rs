//! Private copy of the opened PDF

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use super::extract::DocumentError;

/// A temp-file copy of the user's PDF that lives as long as the viewer shows it.
///
/// Dropping the handle deletes the copy, so holding at most one handle keeps
/// at most one copy on disk.
#[derive(Debug)]
pub struct DocumentHandle {
    file: NamedTempFile,
    file_name: String,
}

impl DocumentHandle {
    /// Read the source file. Nothing is created on disk yet.
    pub fn read_source(path: &Path) -> Result<(String, Vec<u8>), DocumentError> {
        let file_name = display_name(path);
        if !is_pdf_path(path) {
            return Err(DocumentError::NotPdf { name: file_name });
        }
        let bytes = fs::read(path)?;
        Ok((file_name, bytes))
    }

    pub fn create(file_name: String, bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut file = tempfile::Builder::new()
            .prefix("policylens-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!("Created document copy {:?}", file.path());

        Ok(Self { file, file_name })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Drop for DocumentHandle {
    fn drop(&mut self) {
        debug!("Releasing document copy {:?}", self.file.path());
    }
}

pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_check() {
        assert!(is_pdf_path(Path::new("policy.pdf")));
        assert!(is_pdf_path(Path::new("/tmp/SBC.PDF")));
        assert!(!is_pdf_path(Path::new("notes.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn test_non_pdf_rejected_before_reading() {
        let result = DocumentHandle::read_source(Path::new("/definitely/missing/notes.txt"));
        assert!(matches!(result, Err(DocumentError::NotPdf { ref name }) if name == "notes.txt"));
    }

    #[test]
    fn test_copy_removed_on_drop() {
        let handle = DocumentHandle::create("policy.pdf".into(), b"%PDF-1.4").unwrap();
        let path = handle.path_buf();
        assert!(path.exists());
        assert_eq!(handle.file_name(), "policy.pdf");
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");

        drop(handle);
        assert!(!path.exists());
    }
}
