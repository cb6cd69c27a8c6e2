//! UI callback registration for the four workbench actions and the
//! selector/editor callbacks that feed shell state.

use std::path::Path;
use std::sync::Mutex;

use log::{debug, info};
use tokio::sync::broadcast;

use crate::{
    app_context::AppSharedState,
    collaborators::{FilePicker, SaveTargetKind},
    config_persistence::persist_language_selection,
    languages::{SourceLanguage, TargetLanguage},
    protocol::{Action, Message, WorkbenchMessage},
    shell::{ShellView, WorkbenchShell},
    ui_manager::apply_view_to_ui,
    AppWindow,
};

fn publish(bus_sender: &broadcast::Sender<Message>, request: Option<WorkbenchMessage>) {
    if let Some(request) = request {
        let _ = bus_sender.send(Message::Workbench(request));
    }
}

fn is_enabled(shell: &Mutex<WorkbenchShell>, action: Action) -> bool {
    let enabled = shell
        .lock()
        .expect("workbench shell lock poisoned")
        .is_action_enabled(action);
    if !enabled {
        debug!("Ignoring {} while unavailable", action.id());
    }
    enabled
}

fn current_view(shell: &Mutex<WorkbenchShell>) -> ShellView {
    shell.lock().expect("workbench shell lock poisoned").view()
}

/// Title for exported PDFs: the loaded document's stem, else `fallback`.
pub fn export_title(document_name: Option<&str>, fallback: &str) -> String {
    document_name
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Open PDF: picker, then extraction request. Cancellation changes nothing.
pub fn dispatch_open(
    shell: &Mutex<WorkbenchShell>,
    picker: &dyn FilePicker,
    bus_sender: &broadcast::Sender<Message>,
) -> ShellView {
    if is_enabled(shell, Action::OpenPdf) {
        // The lock is not held while the modal dialog is open.
        if let Some(path) = picker.pick_pdf() {
            let request = shell
                .lock()
                .expect("workbench shell lock poisoned")
                .start_open(path);
            publish(bus_sender, request);
        }
    }
    current_view(shell)
}

pub fn dispatch_translate(
    shell: &Mutex<WorkbenchShell>,
    bus_sender: &broadcast::Sender<Message>,
) -> ShellView {
    let mut shell = shell.lock().expect("workbench shell lock poisoned");
    let request = shell.start_translate();
    publish(bus_sender, request);
    shell.view()
}

pub fn dispatch_save(
    shell: &Mutex<WorkbenchShell>,
    picker: &dyn FilePicker,
    bus_sender: &broadcast::Sender<Message>,
) -> ShellView {
    if is_enabled(shell, Action::SaveText) {
        let suggested_name = shell
            .lock()
            .expect("workbench shell lock poisoned")
            .suggested_output_name(SaveTargetKind::PlainText.extension());
        if let Some(path) = picker.pick_save_target(SaveTargetKind::PlainText, &suggested_name) {
            let request = shell
                .lock()
                .expect("workbench shell lock poisoned")
                .start_save(path);
            publish(bus_sender, request);
        }
    }
    current_view(shell)
}

pub fn dispatch_export(
    shell: &Mutex<WorkbenchShell>,
    picker: &dyn FilePicker,
    bus_sender: &broadcast::Sender<Message>,
    default_title: &str,
) -> ShellView {
    if is_enabled(shell, Action::ExportPdf) {
        let (suggested_name, title) = {
            let shell = shell.lock().expect("workbench shell lock poisoned");
            (
                shell.suggested_output_name(SaveTargetKind::Pdf.extension()),
                export_title(shell.document_name(), default_title),
            )
        };
        if let Some(path) = picker.pick_save_target(SaveTargetKind::Pdf, &suggested_name) {
            let request = shell
                .lock()
                .expect("workbench shell lock poisoned")
                .start_export(path, title);
            publish(bus_sender, request);
        }
    }
    current_view(shell)
}

fn render(ui_handle: &slint::Weak<AppWindow>, view: &ShellView) {
    if let Some(ui) = ui_handle.upgrade() {
        apply_view_to_ui(&ui, view);
    }
}

fn remember_languages(shared_state: &AppSharedState, source: SourceLanguage, target: TargetLanguage) {
    {
        let mut config = shared_state
            .config_state
            .lock()
            .expect("config state lock poisoned");
        config.translation.source_language = source;
        config.translation.target_language = target;
    }
    persist_language_selection(&shared_state.config_file, source, target);
}

/// Registers the workbench action, editor and selector callbacks.
pub(crate) fn register_workbench_callbacks(ui: &AppWindow, shared_state: &AppSharedState) {
    let state = shared_state.clone();
    ui.on_open_pdf(move || {
        debug!("Open PDF requested");
        let view = dispatch_open(&state.shell, state.file_picker.as_ref(), &state.bus_sender);
        render(&state.ui_handle, &view);
    });

    let state = shared_state.clone();
    ui.on_start_translation(move || {
        debug!("Translation requested");
        let view = dispatch_translate(&state.shell, &state.bus_sender);
        render(&state.ui_handle, &view);
    });

    let state = shared_state.clone();
    ui.on_save_text(move || {
        debug!("Save as text requested");
        let view = dispatch_save(&state.shell, state.file_picker.as_ref(), &state.bus_sender);
        render(&state.ui_handle, &view);
    });

    let state = shared_state.clone();
    ui.on_export_pdf(move || {
        debug!("PDF export requested");
        let default_title = state
            .config_state
            .lock()
            .expect("config state lock poisoned")
            .export
            .title
            .clone();
        let view = dispatch_export(
            &state.shell,
            state.file_picker.as_ref(),
            &state.bus_sender,
            &default_title,
        );
        render(&state.ui_handle, &view);
    });

    let state = shared_state.clone();
    ui.on_source_text_edited(move |text| {
        let view = {
            let mut shell = state.shell.lock().expect("workbench shell lock poisoned");
            shell.edit_source_text(text.to_string());
            shell.view()
        };
        render(&state.ui_handle, &view);
    });

    let state = shared_state.clone();
    ui.on_source_language_changed(move |index| {
        let Some(language) = SourceLanguage::from_index(index) else {
            return;
        };
        let target = {
            let mut shell = state.shell.lock().expect("workbench shell lock poisoned");
            shell.select_source_language(language);
            shell.target_language()
        };
        info!("Source language set to {}", language.label());
        remember_languages(&state, language, target);
    });

    let state = shared_state.clone();
    ui.on_target_language_changed(move |index| {
        let Some(language) = TargetLanguage::from_index(index) else {
            return;
        };
        let source = {
            let mut shell = state.shell.lock().expect("workbench shell lock poisoned");
            shell.select_target_language(language);
            shell.source_language()
        };
        info!("Target language set to {}", language.label());
        remember_languages(&state, source, language);
    });

    let state = shared_state.clone();
    ui.on_service_changed(move |index| {
        if index < 0 {
            return;
        }
        let mut shell = state.shell.lock().expect("workbench shell lock poisoned");
        shell.select_service(index as usize);
        debug!("Translation service set to {:?}", shell.selected_service());
    });
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tokio::sync::broadcast::{self, error::TryRecvError, Receiver};

    use super::{dispatch_export, dispatch_open, dispatch_save, dispatch_translate, export_title};
    use crate::collaborators::{FilePicker, SaveTargetKind};
    use crate::languages::{SourceLanguage, TargetLanguage};
    use crate::protocol::{Message, WorkbenchMessage};
    use crate::shell::{WorkbenchShell, READY_STATUS};

    #[derive(Default)]
    struct ScriptedPicker {
        open_path: Option<PathBuf>,
        save_path: Option<PathBuf>,
        calls: Mutex<Vec<String>>,
    }

    impl FilePicker for ScriptedPicker {
        fn pick_pdf(&self) -> Option<PathBuf> {
            self.calls
                .lock()
                .expect("calls lock poisoned")
                .push("pdf".to_string());
            self.open_path.clone()
        }

        fn pick_save_target(&self, kind: SaveTargetKind, suggested_name: &str) -> Option<PathBuf> {
            self.calls
                .lock()
                .expect("calls lock poisoned")
                .push(format!("{}:{suggested_name}", kind.extension()));
            self.save_path.clone()
        }
    }

    impl ScriptedPicker {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock poisoned").clone()
        }
    }

    fn shell_with(source: &str) -> Mutex<WorkbenchShell> {
        let mut shell = WorkbenchShell::new(
            SourceLanguage::English,
            TargetLanguage::ChineseSimplified,
            vec!["Stub".to_string()],
        );
        shell.edit_source_text(source.to_string());
        Mutex::new(shell)
    }

    fn translated_shell() -> Mutex<WorkbenchShell> {
        let shell = shell_with("Hello world");
        {
            let mut guard = shell.lock().expect("shell lock poisoned");
            guard.start_translate().expect("translate should start");
            guard.apply_event(&WorkbenchMessage::TranslationCompleted(
                "你好世界".to_string(),
            ));
        }
        shell
    }

    fn published(receiver: &mut Receiver<Message>) -> Vec<WorkbenchMessage> {
        let mut messages = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(Message::Workbench(message)) => messages.push(message),
                Ok(Message::Shutdown) => {}
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        messages
    }

    #[test]
    fn test_cancelled_open_leaves_source_unchanged_without_error() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = shell_with("typed text");
        let picker = ScriptedPicker::default();

        let view = dispatch_open(&shell, &picker, &bus_sender);

        assert_eq!(picker.calls(), vec!["pdf"]);
        assert_eq!(view.source_text, "typed text");
        assert_eq!(view.status, READY_STATUS);
        assert_eq!(view.busy_action, None);
        assert!(published(&mut receiver).is_empty());
    }

    #[test]
    fn test_open_with_path_publishes_request() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = shell_with("");
        let picker = ScriptedPicker {
            open_path: Some(PathBuf::from("/papers/gpt.pdf")),
            ..ScriptedPicker::default()
        };

        let view = dispatch_open(&shell, &picker, &bus_sender);

        assert!(!view.open_enabled);
        assert!(matches!(
            published(&mut receiver).as_slice(),
            [WorkbenchMessage::OpenRequested { path }] if path == &PathBuf::from("/papers/gpt.pdf")
        ));
    }

    #[test]
    fn test_empty_buffers_never_reach_collaborators() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = shell_with("   ");
        let picker = ScriptedPicker {
            save_path: Some(PathBuf::from("/tmp/out")),
            ..ScriptedPicker::default()
        };

        dispatch_translate(&shell, &bus_sender);
        dispatch_save(&shell, &picker, &bus_sender);
        let view = dispatch_export(&shell, &picker, &bus_sender, "Untitled");

        assert!(picker.calls().is_empty());
        assert!(published(&mut receiver).is_empty());
        assert_eq!(view.status, READY_STATUS);
    }

    #[test]
    fn test_translate_publishes_source_and_languages() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = shell_with("Hello world");

        let view = dispatch_translate(&shell, &bus_sender);

        assert_eq!(view.busy_action, Some(crate::protocol::Action::Translate));
        assert!(matches!(
            published(&mut receiver).as_slice(),
            [WorkbenchMessage::TranslateRequested {
                text,
                source: SourceLanguage::English,
                target: TargetLanguage::ChineseSimplified,
                ..
            }] if text == "Hello world"
        ));
    }

    #[test]
    fn test_save_suggests_name_and_publishes_target_text() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = translated_shell();
        let picker = ScriptedPicker {
            save_path: Some(PathBuf::from("/tmp/result.txt")),
            ..ScriptedPicker::default()
        };

        dispatch_save(&shell, &picker, &bus_sender);

        assert_eq!(picker.calls(), vec!["txt:translation.txt"]);
        assert!(matches!(
            published(&mut receiver).as_slice(),
            [WorkbenchMessage::SaveRequested { text, .. }] if text == "你好世界"
        ));
    }

    #[test]
    fn test_cancelled_export_publishes_nothing() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = translated_shell();
        let picker = ScriptedPicker::default();

        let view = dispatch_export(&shell, &picker, &bus_sender, "Untitled");

        assert_eq!(picker.calls(), vec!["pdf:translation.pdf"]);
        assert!(published(&mut receiver).is_empty());
        assert!(view.export_enabled);
    }

    #[test]
    fn test_export_uses_fallback_title_without_document() {
        let (bus_sender, mut receiver) = broadcast::channel(8);
        let shell = translated_shell();
        let picker = ScriptedPicker {
            save_path: Some(PathBuf::from("/tmp/result.pdf")),
            ..ScriptedPicker::default()
        };

        dispatch_export(&shell, &picker, &bus_sender, "Academic Paper Translation");

        assert!(matches!(
            published(&mut receiver).as_slice(),
            [WorkbenchMessage::ExportRequested { title, target: TargetLanguage::ChineseSimplified, .. }]
                if title == "Academic Paper Translation"
        ));
    }

    #[test]
    fn test_export_title_prefers_document_stem() {
        assert_eq!(export_title(Some("attention.pdf"), "Fallback"), "attention");
        assert_eq!(export_title(Some(""), "Fallback"), "Fallback");
        assert_eq!(export_title(None, "Fallback"), "Fallback");
    }
}
