use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use tokio::sync::broadcast;

use crate::{
    collaborators::FilePicker, config::Config, protocol::Message, shell::WorkbenchShell,
    AppWindow,
};

#[derive(Clone)]
pub(crate) struct AppSharedState {
    pub(crate) bus_sender: broadcast::Sender<Message>,
    pub(crate) shell: Arc<Mutex<WorkbenchShell>>,
    pub(crate) config_state: Arc<Mutex<Config>>,
    pub(crate) config_file: PathBuf,
    pub(crate) ui_handle: slint::Weak<AppWindow>,
    pub(crate) file_picker: Arc<dyn FilePicker>,
}
