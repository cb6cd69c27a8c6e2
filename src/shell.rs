//! Workbench shell state: buffers, progress, activity and action gating.
//!
//! The shell owns no collaborator. Starting an action yields the request
//! message to publish; collaborator events are folded back in through
//! [`WorkbenchShell::apply_event`]. The window mirrors [`ShellView`]
//! snapshots and never reads shell fields directly.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::languages::{SourceLanguage, TargetLanguage};
use crate::protocol::{Action, WorkbenchMessage};

pub const READY_STATUS: &str = "Ready";
const NO_SERVICE_MESSAGE: &str = "No translation service is configured";

/// Whether an action is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    #[default]
    Idle,
    Busy(Action),
}

/// Immutable snapshot pushed to the window.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellView {
    pub source_text: String,
    pub target_text: String,
    pub progress: i32,
    pub busy_action: Option<Action>,
    pub status: String,
    pub source_language_index: usize,
    pub target_language_index: usize,
    pub service_index: usize,
    pub open_enabled: bool,
    pub translate_enabled: bool,
    pub save_enabled: bool,
    pub export_enabled: bool,
}

/// Clamps a collaborator-reported percentage into the progress bar range.
pub fn clamp_progress(percent: i32) -> i32 {
    percent.clamp(0, 100)
}

fn has_content(text: &str) -> bool {
    !text.trim().is_empty()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// State holder for the translation workbench window.
#[derive(Debug, Clone)]
pub struct WorkbenchShell {
    source_language: SourceLanguage,
    target_language: TargetLanguage,
    services: Vec<String>,
    service_index: usize,
    source_text: String,
    target_text: String,
    progress: i32,
    activity: Activity,
    status: String,
    document_name: Option<String>,
}

impl WorkbenchShell {
    pub fn new(
        source_language: SourceLanguage,
        target_language: TargetLanguage,
        services: Vec<String>,
    ) -> Self {
        Self {
            source_language,
            target_language,
            services,
            service_index: 0,
            source_text: String::new(),
            target_text: String::new(),
            progress: 0,
            activity: Activity::Idle,
            status: READY_STATUS.to_string(),
            document_name: None,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn source_language(&self) -> SourceLanguage {
        self.source_language
    }

    pub fn target_language(&self) -> TargetLanguage {
        self.target_language
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn selected_service(&self) -> Option<&str> {
        self.services.get(self.service_index).map(String::as_str)
    }

    /// User typing into the source pane.
    pub fn edit_source_text(&mut self, text: String) {
        self.source_text = text;
    }

    pub fn select_source_language(&mut self, language: SourceLanguage) {
        self.source_language = language;
    }

    pub fn select_target_language(&mut self, language: TargetLanguage) {
        self.target_language = language;
    }

    /// Out-of-range indexes are ignored.
    pub fn select_service(&mut self, index: usize) {
        if index < self.services.len() {
            self.service_index = index;
        }
    }

    /// Whether the button for `action` should accept clicks right now.
    pub fn is_action_enabled(&self, action: Action) -> bool {
        if self.activity != Activity::Idle {
            return false;
        }
        match action {
            Action::OpenPdf => true,
            Action::Translate => has_content(&self.source_text),
            Action::SaveText | Action::ExportPdf => has_content(&self.target_text),
        }
    }

    fn begin(&mut self, action: Action, status: String) {
        debug!("Workbench busy with {}", action.id());
        self.activity = Activity::Busy(action);
        self.status = status;
    }

    /// Starts PDF extraction for a path chosen by the file picker.
    pub fn start_open(&mut self, path: PathBuf) -> Option<WorkbenchMessage> {
        if !self.is_action_enabled(Action::OpenPdf) {
            return None;
        }
        self.begin(
            Action::OpenPdf,
            format!("Extracting text from {}...", file_name_of(&path)),
        );
        Some(WorkbenchMessage::OpenRequested { path })
    }

    /// Starts translating the source buffer with the selected service.
    pub fn start_translate(&mut self) -> Option<WorkbenchMessage> {
        if !self.is_action_enabled(Action::Translate) {
            return None;
        }
        let Some(service) = self.selected_service().map(ToOwned::to_owned) else {
            warn!("Translate requested without any configured translation service");
            self.status = format!("{} failed: {}", Action::Translate.label(), NO_SERVICE_MESSAGE);
            return None;
        };
        self.progress = 0;
        self.begin(Action::Translate, format!("Translating with {service}..."));
        Some(WorkbenchMessage::TranslateRequested {
            text: self.source_text.clone(),
            source: self.source_language,
            target: self.target_language,
            service,
        })
    }

    /// Starts writing the target buffer to `path`.
    pub fn start_save(&mut self, path: PathBuf) -> Option<WorkbenchMessage> {
        if !self.is_action_enabled(Action::SaveText) {
            return None;
        }
        self.begin(
            Action::SaveText,
            format!("Saving translation to {}...", file_name_of(&path)),
        );
        Some(WorkbenchMessage::SaveRequested {
            path,
            text: self.target_text.clone(),
        })
    }

    /// Starts rendering the target buffer as a PDF at `path`.
    pub fn start_export(&mut self, path: PathBuf, title: String) -> Option<WorkbenchMessage> {
        if !self.is_action_enabled(Action::ExportPdf) {
            return None;
        }
        self.begin(
            Action::ExportPdf,
            format!("Exporting PDF to {}...", file_name_of(&path)),
        );
        Some(WorkbenchMessage::ExportRequested {
            path,
            text: self.target_text.clone(),
            title,
            target: self.target_language,
        })
    }

    fn finish(&mut self, action: Action) -> bool {
        if self.activity != Activity::Busy(action) {
            debug!("Ignoring stale {} event while {:?}", action.id(), self.activity);
            return false;
        }
        self.activity = Activity::Idle;
        true
    }

    /// Folds a collaborator event into shell state. Events for an action
    /// that is not in flight are dropped.
    pub fn apply_event(&mut self, event: &WorkbenchMessage) {
        match event {
            WorkbenchMessage::SourceTextLoaded {
                text,
                document_name,
            } => {
                if self.finish(Action::OpenPdf) {
                    self.source_text = text.clone();
                    self.document_name = Some(document_name.clone());
                    self.status = format!("Loaded {document_name}");
                }
            }
            WorkbenchMessage::TranslationProgress(percent) => {
                if self.activity == Activity::Busy(Action::Translate) {
                    self.progress = clamp_progress(*percent);
                }
            }
            WorkbenchMessage::TranslationCompleted(text) => {
                if self.finish(Action::Translate) {
                    self.set_translation(text.clone());
                    self.progress = 0;
                    self.status = "Translation complete".to_string();
                }
            }
            WorkbenchMessage::OperationCompleted { action, message } => {
                if self.finish(*action) {
                    self.status = message.clone();
                }
            }
            WorkbenchMessage::OperationFailed { action, message } => {
                if self.finish(*action) {
                    self.progress = 0;
                    self.status = format!("{} failed: {}", action.label(), message);
                }
            }
            WorkbenchMessage::OpenRequested { .. }
            | WorkbenchMessage::TranslateRequested { .. }
            | WorkbenchMessage::SaveRequested { .. }
            | WorkbenchMessage::ExportRequested { .. } => {}
        }
    }

    // Only mutation path for the target buffer.
    fn set_translation(&mut self, text: String) {
        self.target_text = text;
    }

    /// Suggested file name for save/export destinations.
    pub fn suggested_output_name(&self, extension: &str) -> String {
        let stem = self
            .document_name
            .as_deref()
            .and_then(|name| Path::new(name).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty());
        match stem {
            Some(stem) => format!("{stem}_translated.{extension}"),
            None => format!("translation.{extension}"),
        }
    }

    pub fn view(&self) -> ShellView {
        let busy_action = match self.activity {
            Activity::Idle => None,
            Activity::Busy(action) => Some(action),
        };
        ShellView {
            source_text: self.source_text.clone(),
            target_text: self.target_text.clone(),
            progress: self.progress,
            busy_action,
            status: self.status.clone(),
            source_language_index: self.source_language.index(),
            target_language_index: self.target_language.index(),
            service_index: self.service_index,
            open_enabled: self.is_action_enabled(Action::OpenPdf),
            translate_enabled: self.is_action_enabled(Action::Translate),
            save_enabled: self.is_action_enabled(Action::SaveText),
            export_enabled: self.is_action_enabled(Action::ExportPdf),
        }
    }
}
