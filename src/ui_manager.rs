//! Bridge between collaborator events on the bus and the Slint window.
//!
//! Runs on its own thread. Each collaborator event is folded into the shared
//! shell state and the resulting snapshot is marshalled onto the UI event
//! loop, so widgets are only ever touched from the UI thread.

use std::sync::{Arc, Mutex};

use log::{debug, error, warn};
use tokio::sync::broadcast::Receiver;

use crate::protocol::Message;
use crate::shell::{ShellView, WorkbenchShell};
use crate::AppWindow;

/// Applies a bus message to the shell and returns the view to render, or
/// `None` when the message is not a collaborator event.
pub fn apply_bus_event(shell: &Mutex<WorkbenchShell>, message: &Message) -> Option<ShellView> {
    let Message::Workbench(event) = message else {
        return None;
    };
    if !event.is_collaborator_event() {
        return None;
    }
    let mut shell = shell.lock().expect("workbench shell lock poisoned");
    shell.apply_event(event);
    Some(shell.view())
}

/// Mirrors a shell snapshot into window properties. UI thread only.
pub fn apply_view_to_ui(ui: &AppWindow, view: &ShellView) {
    // Writing the source text back while the user types would reset the caret.
    if ui.get_source_text().as_str() != view.source_text {
        ui.set_source_text(view.source_text.as_str().into());
    }
    ui.set_target_text(view.target_text.as_str().into());
    ui.set_progress(view.progress);
    ui.set_busy(view.busy_action.is_some());
    ui.set_busy_action(
        view.busy_action
            .map(|action| action.id())
            .unwrap_or_default()
            .into(),
    );
    ui.set_status_text(view.status.as_str().into());
    ui.set_source_language_index(view.source_language_index as i32);
    ui.set_target_language_index(view.target_language_index as i32);
    ui.set_service_index(view.service_index as i32);
    ui.set_open_enabled(view.open_enabled);
    ui.set_translate_enabled(view.translate_enabled);
    ui.set_save_enabled(view.save_enabled);
    ui.set_export_enabled(view.export_enabled);
}

/// Schedules a render onto the UI event loop. The view is taken when the
/// closure runs so edits made in between are not overwritten.
pub fn push_view(ui: &slint::Weak<AppWindow>, shell: &Arc<Mutex<WorkbenchShell>>) {
    let shell = Arc::clone(shell);
    let _ = ui.upgrade_in_event_loop(move |ui| {
        let view = shell.lock().expect("workbench shell lock poisoned").view();
        apply_view_to_ui(&ui, &view);
    });
}

pub struct UiManager {
    ui: slint::Weak<AppWindow>,
    bus_receiver: Receiver<Message>,
    shell: Arc<Mutex<WorkbenchShell>>,
}

impl UiManager {
    pub fn new(
        ui: slint::Weak<AppWindow>,
        bus_receiver: Receiver<Message>,
        shell: Arc<Mutex<WorkbenchShell>>,
    ) -> Self {
        Self {
            ui,
            bus_receiver,
            shell,
        }
    }

    pub fn run(&mut self) {
        loop {
            match self.bus_receiver.blocking_recv() {
                Ok(Message::Shutdown) => {
                    debug!("UiManager: shutdown requested");
                    break;
                }
                Ok(message) => {
                    if apply_bus_event(&self.shell, &message).is_some() {
                        push_view(&self.ui, &self.shell);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("UiManager lagged on bus, skipped {} message(s)", skipped);
                    push_view(&self.ui, &self.shell);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    error!("UiManager: bus closed");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::apply_bus_event;
    use crate::languages::{SourceLanguage, TargetLanguage};
    use crate::protocol::{Action, Message, WorkbenchMessage};
    use crate::shell::WorkbenchShell;

    fn busy_translating_shell() -> Mutex<WorkbenchShell> {
        let mut shell = WorkbenchShell::new(
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            vec!["Stub".to_string()],
        );
        shell.edit_source_text("Hello world".to_string());
        shell.start_translate().expect("translate should start");
        Mutex::new(shell)
    }

    #[test]
    fn test_requests_and_shutdown_produce_no_view() {
        let shell = busy_translating_shell();
        assert!(apply_bus_event(&shell, &Message::Shutdown).is_none());
        assert!(apply_bus_event(
            &shell,
            &Message::Workbench(WorkbenchMessage::OpenRequested {
                path: PathBuf::from("/tmp/a.pdf"),
            })
        )
        .is_none());
    }

    #[test]
    fn test_progress_event_yields_clamped_view() {
        let shell = busy_translating_shell();
        let view = apply_bus_event(
            &shell,
            &Message::Workbench(WorkbenchMessage::TranslationProgress(130)),
        )
        .expect("progress should produce a view");
        assert_eq!(view.progress, 100);
        assert_eq!(view.busy_action, Some(Action::Translate));
        assert!(!view.open_enabled);
    }

    #[test]
    fn test_failure_event_surfaces_status_and_unlocks_actions() {
        let shell = busy_translating_shell();
        let view = apply_bus_event(
            &shell,
            &Message::Workbench(WorkbenchMessage::OperationFailed {
                action: Action::Translate,
                message: "timeout".to_string(),
            }),
        )
        .expect("failure should produce a view");
        assert_eq!(view.status, "Translation failed: timeout");
        assert_eq!(view.busy_action, None);
        assert!(view.open_enabled);
        assert!(view.translate_enabled);
        assert_eq!(view.target_text, "");
    }
}
