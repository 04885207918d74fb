mod api;
mod commands;
mod formatter;
mod models;
mod notify;
mod store;

use std::sync::{Arc, Mutex};

use tauri::{Emitter, Manager};

use api::ApiClient;
use models::{ChatMessage, UploadRecord};
use notify::Notifier;
use store::persisted::{CHAT_MESSAGES_KEY, UPLOADED_FILES_KEY};
use store::{PersistedList, SqliteStore};

/// Application state shared by all commands. The two persisted collections
/// each own one durable key; the notifier is the shared broadcast point.
pub struct AppState {
    pub api: ApiClient,
    pub messages: Mutex<PersistedList<ChatMessage>>,
    pub uploads: Mutex<PersistedList<UploadRecord>>,
    pub notifier: Notifier,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_log::Builder::new().build())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let app_dir = app.path().app_data_dir()?;
            let kv = Arc::new(SqliteStore::new(&app_dir)?);

            let messages: PersistedList<ChatMessage> =
                PersistedList::load(kv.clone(), CHAT_MESSAGES_KEY);
            let mut uploads: PersistedList<UploadRecord> =
                PersistedList::load(kv, UPLOADED_FILES_KEY);
            commands::upload::normalize_restored(&mut uploads);

            let handle = app.handle().clone();
            let notifier = Notifier::new(move |toasts| {
                let _ = handle.emit("toasts-changed", toasts);
            });

            app.manage(AppState {
                api: ApiClient::from_build_config(),
                messages: Mutex::new(messages),
                uploads: Mutex::new(uploads),
                notifier,
            });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::chat::send_message,
            commands::chat::get_messages,
            commands::chat::clear_chat,
            commands::chat::render_message,
            commands::upload::upload_files,
            commands::upload::list_uploads,
            commands::upload::remove_upload,
            commands::upload::clear_uploads,
            commands::download::download_reference,
            commands::toast::list_toasts,
            commands::toast::dismiss_toast,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
