//! Plain-text output.

use std::path::{Path, PathBuf};

use log::info;

use super::{with_default_extension, TextWriter};

#[derive(Debug, Default, Clone, Copy)]
pub struct FsTextWriter;

impl TextWriter for FsTextWriter {
    fn write_text(&self, path: &Path, text: &str) -> Result<PathBuf, String> {
        let path = with_default_extension(path, "txt");
        std::fs::write(&path, text.as_bytes())
            .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
        info!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::FsTextWriter;
    use crate::collaborators::TextWriter;

    fn unique_dir(name: &str) -> std::path::PathBuf {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!("papertrans_{name}_{nonce}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_write_appends_txt_extension_and_keeps_utf8() {
        let dir = unique_dir("writer");
        let written = FsTextWriter
            .write_text(&dir.join("result"), "你好世界\n")
            .expect("write should succeed");
        assert_eq!(written, dir.join("result.txt"));
        assert_eq!(
            std::fs::read_to_string(&written).expect("read back"),
            "你好世界\n"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = unique_dir("writer_missing");
        let result = FsTextWriter.write_text(&dir.join("nope").join("out.txt"), "text");
        assert!(result.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
