use std::path::Path;
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

use tauri::{AppHandle, Emitter, Manager, State};

use crate::api::ApiClient;
use crate::models::UploadRecord;
use crate::notify::Notifier;
use crate::store::PersistedList;
use crate::AppState;

/// Uploads one file's bytes and reconciles the optimistic record.
///
/// The record is inserted with `uploading=true` before the request goes
/// out. On success every record with this file name is marked uploaded
/// with the server-reported path and a success toast is emitted; on any
/// failure every record with this file name is removed and an error toast
/// is emitted. Matching is by name alone, so two in-flight files sharing a
/// name reconcile ambiguously.
pub async fn run_upload(
    api: &ApiClient,
    uploads: &Mutex<PersistedList<UploadRecord>>,
    notifier: &Notifier,
    file_name: &str,
    last_modified: i64,
    bytes: Vec<u8>,
    on_uploads: impl Fn(&[UploadRecord]),
) {
    {
        let mut uploads = uploads.lock().unwrap();
        uploads.push(UploadRecord::pending(
            file_name,
            bytes.len() as u64,
            last_modified,
        ));
        on_uploads(uploads.items());
    }

    match api.upload_pdf(file_name, bytes).await {
        Ok(stored_path) => {
            let mut uploads = uploads.lock().unwrap();
            uploads.mutate(|records| {
                for record in records.iter_mut().filter(|r| r.file_name == file_name) {
                    record.uploading = false;
                    record.stored_path = Some(stored_path.clone());
                }
            });
            on_uploads(uploads.items());
            notifier.success(
                "Upload successful",
                format!("{file_name} has been uploaded successfully"),
            );
        }
        Err(e) => {
            log::error!("upload failed for {file_name}: {e}");
            let mut uploads = uploads.lock().unwrap();
            uploads.mutate(|records| records.retain(|r| r.file_name != file_name));
            on_uploads(uploads.items());
            notifier.error(
                "Upload failed",
                format!("Failed to upload {file_name}. Please try again."),
            );
        }
    }
}

/// Records restored from the durable store are metadata-only placeholders:
/// their byte content is gone, and an upload cannot survive a restart.
pub fn normalize_restored(uploads: &mut PersistedList<UploadRecord>) {
    if uploads.is_empty() {
        return;
    }
    uploads.mutate(|records| {
        for record in records.iter_mut() {
            record.uploading = false;
            record.file_size_bytes = 0;
        }
    });
}

/// Fire-and-forget: each file gets its own task, no aggregate result, no
/// ordering across completions.
#[tauri::command]
pub fn upload_files(app: AppHandle, paths: Vec<String>) {
    for path in paths {
        let app = app.clone();
        tauri::async_runtime::spawn(async move {
            let state = app.state::<AppState>();
            let file_name = Path::new(&path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let last_modified = std::fs::metadata(&path)
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);

            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!("failed to read {path}: {e}");
                    state.notifier.error(
                        "Upload failed",
                        format!("Failed to upload {file_name}. Please try again."),
                    );
                    return;
                }
            };

            run_upload(
                &state.api,
                &state.uploads,
                &state.notifier,
                &file_name,
                last_modified,
                bytes,
                |records| {
                    let _ = app.emit("uploads-changed", records);
                },
            )
            .await;
        });
    }
}

#[tauri::command]
pub fn list_uploads(state: State<'_, AppState>) -> Vec<UploadRecord> {
    state.uploads.lock().unwrap().items().to_vec()
}

#[tauri::command]
pub fn remove_upload(app: AppHandle, state: State<'_, AppState>, index: usize) {
    let mut uploads = state.uploads.lock().unwrap();
    uploads.remove(index);
    let _ = app.emit("uploads-changed", uploads.items());
}

#[tauri::command]
pub fn clear_uploads(app: AppHandle, state: State<'_, AppState>) {
    let mut uploads = state.uploads.lock().unwrap();
    uploads.clear();
    let _ = app.emit("uploads-changed", uploads.items());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastKind;
    use crate::store::persisted::UPLOADED_FILES_KEY;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn empty_uploads(store: Arc<MemoryStore>) -> Mutex<PersistedList<UploadRecord>> {
        Mutex::new(PersistedList::load(store, UPLOADED_FILES_KEY))
    }

    #[tokio::test]
    async fn test_successful_upload_marks_record_with_stored_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "filePath": "uploads/1-a.pdf" })),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let uploads = empty_uploads(Arc::new(MemoryStore::new()));
        let notifier = Notifier::new(|_| {});
        run_upload(&api, &uploads, &notifier, "a.pdf", 7, b"%PDF".to_vec(), |_| {}).await;

        let uploads = uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        let record = &uploads.items()[0];
        assert!(!record.uploading);
        assert_eq!(record.stored_path.as_deref(), Some("uploads/1-a.pdf"));
        assert_eq!(record.file_size_bytes, 4);

        let toasts = notifier.active();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Success);
    }

    #[tokio::test]
    async fn test_server_error_removes_record_and_emits_one_error_toast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/pdf"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "ingestion failed"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let store = Arc::new(MemoryStore::new());
        let uploads = empty_uploads(store.clone());
        let notifier = Notifier::new(|_| {});
        run_upload(&api, &uploads, &notifier, "a.pdf", 0, b"%PDF".to_vec(), |_| {}).await;

        assert!(uploads.lock().unwrap().is_empty());
        // Empty collection deletes the key rather than writing [].
        assert!(store.raw(UPLOADED_FILES_KEY).is_none());
        // The message collection is untouched.
        assert!(store.raw(crate::store::persisted::CHAT_MESSAGES_KEY).is_none());

        let toasts = notifier.active();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn test_failure_removes_every_record_sharing_the_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/pdf"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri());
        let uploads = empty_uploads(Arc::new(MemoryStore::new()));
        uploads
            .lock()
            .unwrap()
            .push(UploadRecord::pending("a.pdf", 1, 1));
        uploads
            .lock()
            .unwrap()
            .push(UploadRecord::pending("b.pdf", 2, 2));

        let notifier = Notifier::new(|_| {});
        run_upload(&api, &uploads, &notifier, "a.pdf", 0, vec![], |_| {}).await;

        let uploads = uploads.lock().unwrap();
        // Name-only matching took out the pre-existing "a.pdf" as well.
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads.items()[0].file_name, "b.pdf");
    }

    #[test]
    fn test_normalize_restored_zeroes_placeholder_content() {
        let store = Arc::new(MemoryStore::new());
        store.insert_raw(
            UPLOADED_FILES_KEY,
            r#"[{"fileName":"a.pdf","fileSizeBytes":100,"lastModified":5,"uploading":true,"storedPath":"uploads/a.pdf"}]"#,
        );
        let mut uploads: PersistedList<UploadRecord> =
            PersistedList::load(store, UPLOADED_FILES_KEY);
        normalize_restored(&mut uploads);

        let record = &uploads.items()[0];
        assert_eq!(record.file_name, "a.pdf");
        assert!(!record.uploading);
        assert_eq!(record.file_size_bytes, 0);
        assert_eq!(record.stored_path.as_deref(), Some("uploads/a.pdf"));
        assert_eq!(record.last_modified, 5);
    }
}
