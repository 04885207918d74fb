//! Ephemeral status notifications. Any component may add; the presentation
//! layer dismisses. Toasts stack in arrival order, are never persisted and
//! self-expire on their own timer.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_DURATION_MS: u64 = 5000;
/// Extra delay before removal so the frontend can play its fade-out.
pub const FADE_OUT_MS: u64 = 300;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToastNotification {
    pub id: String,
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    pub duration_ms: u64,
}

type ChangeCallback = Box<dyn Fn(&[ToastNotification]) + Send + Sync>;

struct Inner {
    toasts: Mutex<Vec<ToastNotification>>,
    on_change: ChangeCallback,
}

impl Inner {
    fn broadcast(&self) {
        let snapshot = self.toasts.lock().unwrap().clone();
        (self.on_change)(&snapshot);
    }

    fn remove(&self, id: &str) {
        let removed = {
            let mut toasts = self.toasts.lock().unwrap();
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        };
        if removed {
            self.broadcast();
        }
    }
}

pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    /// `on_change` receives the full active list after every add/remove;
    /// the application wires it to a frontend event.
    pub fn new(on_change: impl Fn(&[ToastNotification]) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                toasts: Mutex::new(Vec::new()),
                on_change: Box::new(on_change),
            }),
        }
    }

    /// Adds a toast and schedules its expiry. Returns the toast id. The
    /// expiry timer belongs to this toast alone; an early dismissal turns
    /// the later timer firing into a no-op.
    pub fn notify(
        &self,
        kind: ToastKind,
        title: impl Into<String>,
        description: Option<String>,
        duration_ms: Option<u64>,
    ) -> String {
        let duration_ms = duration_ms.unwrap_or(DEFAULT_DURATION_MS);
        let toast = ToastNotification {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.into(),
            description,
            duration_ms,
        };
        let id = toast.id.clone();
        self.inner.toasts.lock().unwrap().push(toast);
        self.inner.broadcast();

        let inner = Arc::clone(&self.inner);
        let expire_id = id.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms + FADE_OUT_MS)).await;
            inner.remove(&expire_id);
        });

        id
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) -> String {
        self.notify(ToastKind::Success, title, Some(description.into()), None)
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) -> String {
        self.notify(ToastKind::Error, title, Some(description.into()), None)
    }

    pub fn info(&self, title: impl Into<String>, description: impl Into<String>) -> String {
        self.notify(ToastKind::Info, title, Some(description.into()), None)
    }

    /// Explicit dismissal from the presentation layer.
    pub fn dismiss(&self, id: &str) {
        self.inner.remove(id);
    }

    pub fn active(&self) -> Vec<ToastNotification> {
        self.inner.toasts.lock().unwrap().clone()
    }
}
