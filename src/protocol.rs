//! Event-bus protocol shared by the shell, the UI bridge and the workbench worker.
//!
//! Requests flow from the shell to collaborators; events flow back from
//! collaborators and are applied to shell state on the way to the window.

use std::path::PathBuf;

use crate::languages::{SourceLanguage, TargetLanguage};

/// User-triggerable workbench action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    OpenPdf,
    Translate,
    SaveText,
    ExportPdf,
}

impl Action {
    /// Stable identifier consumed by the layout (`busy_action`).
    pub fn id(self) -> &'static str {
        match self {
            Self::OpenPdf => "open_pdf",
            Self::Translate => "translate",
            Self::SaveText => "save_text",
            Self::ExportPdf => "export_pdf",
        }
    }

    /// Human-readable action name used as status-bar prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenPdf => "Open PDF",
            Self::Translate => "Translation",
            Self::SaveText => "Save",
            Self::ExportPdf => "PDF export",
        }
    }
}

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Workbench(WorkbenchMessage),
    /// Window closed; background loops should exit.
    Shutdown,
}

/// Workbench requests (shell -> collaborators) and events (collaborators -> shell).
#[derive(Debug, Clone)]
pub enum WorkbenchMessage {
    OpenRequested {
        path: PathBuf,
    },
    TranslateRequested {
        text: String,
        source: SourceLanguage,
        target: TargetLanguage,
        service: String,
    },
    SaveRequested {
        path: PathBuf,
        text: String,
    },
    ExportRequested {
        path: PathBuf,
        text: String,
        title: String,
        target: TargetLanguage,
    },
    SourceTextLoaded {
        text: String,
        document_name: String,
    },
    /// Raw collaborator-reported progress; the shell clamps it to [0, 100].
    TranslationProgress(i32),
    TranslationCompleted(String),
    OperationCompleted {
        action: Action,
        message: String,
    },
    OperationFailed {
        action: Action,
        message: String,
    },
}

impl WorkbenchMessage {
    /// Action a request starts, or `None` for collaborator events.
    pub fn requested_action(&self) -> Option<Action> {
        match self {
            Self::OpenRequested { .. } => Some(Action::OpenPdf),
            Self::TranslateRequested { .. } => Some(Action::Translate),
            Self::SaveRequested { .. } => Some(Action::SaveText),
            Self::ExportRequested { .. } => Some(Action::ExportPdf),
            _ => None,
        }
    }

    /// True for messages a collaborator reports back to the shell.
    pub fn is_collaborator_event(&self) -> bool {
        matches!(
            self,
            Self::SourceTextLoaded { .. }
                | Self::TranslationProgress(_)
                | Self::TranslationCompleted(_)
                | Self::OperationCompleted { .. }
                | Self::OperationFailed { .. }
        )
    }
}
