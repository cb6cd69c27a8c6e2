//! Native file dialogs.

use std::path::PathBuf;

use log::debug;

use super::{FilePicker, SaveTargetKind};

/// `rfd`-backed picker. Dialogs are modal and must run on the UI thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFilePicker;

impl FilePicker for NativeFilePicker {
    fn pick_pdf(&self) -> Option<PathBuf> {
        let picked = rfd::FileDialog::new()
            .set_title("Open PDF")
            .add_filter("PDF Files", &["pdf"])
            .pick_file();
        if picked.is_none() {
            debug!("PDF selection cancelled");
        }
        picked
    }

    fn pick_save_target(&self, kind: SaveTargetKind, suggested_name: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .add_filter(kind.filter_name(), &[kind.extension()])
            .set_file_name(suggested_name);
        if let Some(documents) = dirs::document_dir() {
            dialog = dialog.set_directory(documents);
        }
        let picked = dialog.save_file();
        if picked.is_none() {
            debug!("{} destination selection cancelled", kind.extension());
        }
        picked
    }
}
