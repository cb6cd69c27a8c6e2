//! Background worker that runs workbench collaborators off the UI thread.
//!
//! Consumes request messages from the bus and publishes progress,
//! completion and failure events for the UI bridge to fold into shell state.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use log::{debug, error, info, warn};
use tokio::sync::broadcast::{Receiver, Sender};

use crate::collaborators::{PdfExporter, PdfTextExtractor, TextWriter};
use crate::languages::{SourceLanguage, TargetLanguage};
use crate::panic_payload_to_string;
use crate::protocol::{Action, Message, WorkbenchMessage};
use crate::translators::{translate_document, TranslationEngine};

/// Collaborators the worker delegates to.
pub struct WorkbenchCollaborators {
    pub extractor: Box<dyn PdfTextExtractor>,
    pub engine: TranslationEngine,
    pub text_writer: Box<dyn TextWriter>,
    pub pdf_exporter: Box<dyn PdfExporter>,
}

pub struct WorkbenchWorker {
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
    collaborators: WorkbenchCollaborators,
}

fn document_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl WorkbenchWorker {
    pub fn new(
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
        collaborators: WorkbenchCollaborators,
    ) -> Self {
        Self {
            bus_consumer,
            bus_producer,
            collaborators,
        }
    }

    fn emit(&self, event: WorkbenchMessage) {
        let _ = self.bus_producer.send(Message::Workbench(event));
    }

    fn fail(&self, action: Action, message: String) {
        warn!("{} failed: {}", action.label(), message);
        self.emit(WorkbenchMessage::OperationFailed { action, message });
    }

    fn open_pdf(&self, path: &Path) {
        debug!("Extracting text from {}", path.display());
        match self.collaborators.extractor.extract_text(path) {
            Ok(text) => {
                info!(
                    "Loaded {} chars from {}",
                    text.chars().count(),
                    path.display()
                );
                self.emit(WorkbenchMessage::SourceTextLoaded {
                    text,
                    document_name: document_name_of(path),
                });
            }
            Err(err) => self.fail(Action::OpenPdf, err),
        }
    }

    fn translate(
        &self,
        text: &str,
        source: SourceLanguage,
        target: TargetLanguage,
        service: &str,
    ) {
        let Some(translator) = self.collaborators.engine.get(service) else {
            self.fail(
                Action::Translate,
                format!("translation service '{service}' is not available"),
            );
            return;
        };
        debug!(
            "Translating {} chars with {} ({} -> {})",
            text.chars().count(),
            service,
            source.code(),
            target.code()
        );

        let bus_producer = self.bus_producer.clone();
        let mut report_progress = move |percent: i32| {
            let _ = bus_producer.send(Message::Workbench(WorkbenchMessage::TranslationProgress(
                percent,
            )));
        };
        match translate_document(translator, text, source, target, &mut report_progress) {
            Ok(translated) => {
                info!("Translation finished ({} chars)", translated.chars().count());
                self.emit(WorkbenchMessage::TranslationCompleted(translated));
            }
            Err(err) => self.fail(Action::Translate, err),
        }
    }

    fn save_text(&self, path: &Path, text: &str) {
        match self.collaborators.text_writer.write_text(path, text) {
            Ok(written) => self.emit(WorkbenchMessage::OperationCompleted {
                action: Action::SaveText,
                message: format!("Saved translation to {}", written.display()),
            }),
            Err(err) => self.fail(Action::SaveText, err),
        }
    }

    fn export_pdf(&self, path: &Path, title: &str, text: &str, target: TargetLanguage) {
        match self
            .collaborators
            .pdf_exporter
            .export_pdf(path, title, text, target)
        {
            Ok(written) => self.emit(WorkbenchMessage::OperationCompleted {
                action: Action::ExportPdf,
                message: format!("Exported PDF to {}", written.display()),
            }),
            Err(err) => self.fail(Action::ExportPdf, err),
        }
    }

    fn dispatch(&self, message: &WorkbenchMessage) {
        match message {
            WorkbenchMessage::OpenRequested { path } => self.open_pdf(path),
            WorkbenchMessage::TranslateRequested {
                text,
                source,
                target,
                service,
            } => self.translate(text, *source, *target, service),
            WorkbenchMessage::SaveRequested { path, text } => self.save_text(path, text),
            WorkbenchMessage::ExportRequested {
                path,
                text,
                title,
                target,
            } => self.export_pdf(path, title, text, *target),
            _ => {}
        }
    }

    /// Runs the collaborator for one request. Events are ignored. A panic
    /// inside a collaborator is reported as a failure of that request so
    /// the shell leaves Busy.
    pub fn handle_message(&self, message: &WorkbenchMessage) {
        let Some(action) = message.requested_action() else {
            return;
        };
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| self.dispatch(message))) {
            error!("{} collaborator panicked", action.label());
            self.fail(
                action,
                format!("internal error: {}", panic_payload_to_string(payload.as_ref())),
            );
        }
    }

    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(Message::Workbench(message)) => {
                    if !message.is_collaborator_event() {
                        self.handle_message(&message);
                    }
                }
                Ok(Message::Shutdown) => {
                    debug!("WorkbenchWorker: shutdown requested");
                    break;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "WorkbenchWorker lagged on bus, skipped {} message(s)",
                        skipped
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    error!("WorkbenchWorker: bus closed");
                    break;
                }
            }
        }
    }
}
