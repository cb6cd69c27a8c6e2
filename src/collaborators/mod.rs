//! Collaborator abstractions the workbench delegates real work to, and
//! their production implementations.

pub mod file_picker;
pub mod pdf_export;
pub mod pdf_text;
pub mod text_writer;

use std::path::{Path, PathBuf};

use crate::languages::TargetLanguage;

/// Destination kind requested from the file picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTargetKind {
    PlainText,
    Pdf,
}

impl SaveTargetKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::PlainText => "txt",
            Self::Pdf => "pdf",
        }
    }

    pub fn filter_name(self) -> &'static str {
        match self {
            Self::PlainText => "Text Files",
            Self::Pdf => "PDF Files",
        }
    }
}

/// Interactive path selection. `None` means the user cancelled.
pub trait FilePicker: Send + Sync {
    fn pick_pdf(&self) -> Option<PathBuf>;
    fn pick_save_target(&self, kind: SaveTargetKind, suggested_name: &str) -> Option<PathBuf>;
}

/// Extracts plain text from a PDF document on disk.
pub trait PdfTextExtractor: Send {
    fn extract_text(&self, path: &Path) -> Result<String, String>;
}

/// Persists translated text. Returns the path actually written.
pub trait TextWriter: Send {
    fn write_text(&self, path: &Path, text: &str) -> Result<PathBuf, String>;
}

/// Renders translated text into a PDF document. Returns the path actually written.
pub trait PdfExporter: Send {
    fn export_pdf(
        &self,
        path: &Path,
        title: &str,
        text: &str,
        target: TargetLanguage,
    ) -> Result<PathBuf, String>;
}

/// Appends `extension` when `path` has none.
pub fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{with_default_extension, SaveTargetKind};

    #[test]
    fn test_default_extension_only_applies_without_one() {
        assert_eq!(
            with_default_extension(Path::new("/tmp/out"), "txt"),
            PathBuf::from("/tmp/out.txt")
        );
        assert_eq!(
            with_default_extension(Path::new("/tmp/out.md"), "txt"),
            PathBuf::from("/tmp/out.md")
        );
        assert_eq!(SaveTargetKind::Pdf.extension(), "pdf");
    }
}
