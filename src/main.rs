mod app_callbacks;
mod app_context;
mod collaborators;
mod config;
mod config_persistence;
mod credential_store;
mod languages;
mod protocol;
mod shell;
mod theme;
mod translators;
mod ui;
mod ui_manager;
mod workbench_worker;

use std::{
    sync::{Arc, Mutex},
    thread,
};

use app_context::AppSharedState;
use collaborators::{
    file_picker::NativeFilePicker, pdf_export::PrintPdfExporter, pdf_text::LopdfTextExtractor,
    text_writer::FsTextWriter,
};
use log::{info, warn};
use protocol::Message;
use shell::WorkbenchShell;
use slint::{ComponentHandle, ModelRc, SharedString, VecModel};
use tokio::sync::broadcast;
use translators::TranslationEngine;
use ui_manager::UiManager;
use workbench_worker::{WorkbenchCollaborators, WorkbenchWorker};

slint::include_modules!();

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

fn string_model<I, S>(items: I) -> ModelRc<SharedString>
where
    I: IntoIterator<Item = S>,
    S: Into<SharedString>,
{
    ModelRc::new(VecModel::from(
        items.into_iter().map(Into::into).collect::<Vec<_>>(),
    ))
}

fn apply_selector_options(ui: &AppWindow, service_names: &[String]) {
    ui.set_service_options(string_model(service_names.iter().map(String::as_str)));
    ui.set_source_language_options(string_model(languages::source_language_labels()));
    ui.set_target_language_options(string_model(languages::target_language_labels()));
}

fn spawn_named<F>(name: &str, body: F) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let thread_name = name.to_string();
    thread::Builder::new().name(thread_name.clone()).spawn(move || {
        let run_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(body));
        if let Err(payload) = run_result {
            log::error!(
                "{} thread terminated due to panic: {}",
                thread_name,
                panic_payload_to_string(payload.as_ref())
            );
        }
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Debug);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    if std::env::var_os("SLINT_BACKEND").is_none() {
        std::env::set_var("SLINT_BACKEND", "winit-software");
        info!("SLINT_BACKEND not set. Defaulting to winit-software");
    }

    let config_file = config::default_config_path();
    let config = config::load_or_create_config(&config_file).unwrap_or_else(|err| {
        warn!("Using default config: {}", err);
        config::sanitize_config(config::Config::default())
    });
    log::set_max_level(config.logging.level_filter());
    info!("Using config file {}", config_file.display());

    let ui = AppWindow::new()?;
    theme::apply_theme_to_ui(&ui, theme::theme_table());

    let engine = TranslationEngine::from_config(&config);
    let service_names = engine.service_names();
    if service_names.is_empty() {
        warn!("No translation service configured; translation is unavailable");
    }
    apply_selector_options(&ui, &service_names);

    let shell = Arc::new(Mutex::new(WorkbenchShell::new(
        config.translation.source_language,
        config.translation.target_language,
        service_names,
    )));

    // Bus for communication between components
    let (bus_sender, _) = broadcast::channel(1024);

    let collaborators = WorkbenchCollaborators {
        extractor: Box::new(LopdfTextExtractor),
        engine,
        text_writer: Box::new(FsTextWriter),
        pdf_exporter: Box::new(PrintPdfExporter::new(&config.export)),
    };
    let worker_bus_receiver = bus_sender.subscribe();
    let worker_bus_sender = bus_sender.clone();
    spawn_named("workbench-worker", move || {
        let mut worker =
            WorkbenchWorker::new(worker_bus_receiver, worker_bus_sender, collaborators);
        worker.run();
    })?;

    let ui_manager_bus_receiver = bus_sender.subscribe();
    let ui_manager_shell = Arc::clone(&shell);
    let ui_handle_clone = ui.as_weak();
    spawn_named("ui-manager", move || {
        let mut ui_manager = UiManager::new(ui_handle_clone, ui_manager_bus_receiver, ui_manager_shell);
        ui_manager.run();
    })?;

    let shared_state = AppSharedState {
        bus_sender: bus_sender.clone(),
        shell: Arc::clone(&shell),
        config_state: Arc::new(Mutex::new(config)),
        config_file,
        ui_handle: ui.as_weak(),
        file_picker: Arc::new(NativeFilePicker),
    };
    app_callbacks::workbench_actions::register_workbench_callbacks(&ui, &shared_state);

    let initial_view = shell.lock().expect("workbench shell lock poisoned").view();
    ui_manager::apply_view_to_ui(&ui, &initial_view);

    ui.run()?;

    let _ = bus_sender.send(Message::Shutdown);
    info!("Application exiting");
    Ok(())
}
