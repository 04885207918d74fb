use tauri::State;

use crate::notify::ToastNotification;
use crate::AppState;

#[tauri::command]
pub fn list_toasts(state: State<'_, AppState>) -> Vec<ToastNotification> {
    state.notifier.active()
}

/// Explicit dismissal from the toast close button.
#[tauri::command]
pub fn dismiss_toast(state: State<'_, AppState>, id: String) {
    state.notifier.dismiss(&id);
}
