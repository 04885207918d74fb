use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use crate::AppState;

/// Display name for a stored source path: last path segment with the
/// server's timestamp prefix stripped.
pub fn clean_file_name(source: &str) -> String {
    let raw = source.rsplit('/').next().unwrap_or_default();
    let raw = if raw.is_empty() { "file.pdf" } else { raw };
    raw.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-')
        .to_string()
}

/// Fetches a cited source document and saves it where the user chooses.
/// Failures are logged only; there is no user-visible feedback on this
/// path.
#[tauri::command]
pub async fn download_reference(
    app: AppHandle,
    state: State<'_, AppState>,
    source: String,
) -> Result<(), String> {
    let bytes = match state.api.download(&source).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("download error for {source}: {e}");
            return Ok(());
        }
    };

    app.dialog()
        .file()
        .set_file_name(clean_file_name(&source))
        .save_file(move |file_path| {
            let Some(file_path) = file_path else {
                return;
            };
            match file_path.as_path() {
                Some(path) => {
                    if let Err(e) = std::fs::write(path, &bytes) {
                        log::error!("failed to save download: {e}");
                    }
                }
                None => log::error!("unsupported save location: {file_path:?}"),
            }
        });

    Ok(())
}
