use std::sync::Mutex;

use tauri::{AppHandle, Emitter, State};

use crate::api::ApiClient;
use crate::formatter::{self, Block};
use crate::models::ChatMessage;
use crate::store::PersistedList;
use crate::AppState;

/// One chat exchange: append the user message, show the typing indicator,
/// ask the server, append the assistant reply. A failed request is logged
/// and appends nothing; the user's message stays unanswered. The typing
/// indicator is cleared on every path.
///
/// Nothing serializes overlapping exchanges: user messages append in send
/// order (before the request is issued), assistant replies in resolution
/// order.
pub async fn run_chat_exchange(
    api: &ApiClient,
    messages: &Mutex<PersistedList<ChatMessage>>,
    text: &str,
    on_typing: impl Fn(bool),
    on_messages: impl Fn(&[ChatMessage]),
) {
    if text.trim().is_empty() {
        return;
    }

    {
        let mut messages = messages.lock().unwrap();
        messages.push(ChatMessage::user(text));
        on_messages(messages.items());
    }
    on_typing(true);

    match api.chat(text).await {
        Ok(reply) => {
            let mut messages = messages.lock().unwrap();
            messages.push(ChatMessage::assistant(reply.message, reply.docs));
            on_messages(messages.items());
        }
        Err(e) => {
            log::error!("chat request failed: {e}");
        }
    }

    on_typing(false);
}

#[tauri::command]
pub async fn send_message(
    app: AppHandle,
    state: State<'_, AppState>,
    message: String,
) -> Result<(), String> {
    let typing_app = app.clone();
    run_chat_exchange(
        &state.api,
        &state.messages,
        &message,
        move |typing| {
            let _ = typing_app.emit("chat-typing", typing);
        },
        move |messages| {
            let _ = app.emit("messages-changed", messages);
        },
    )
    .await;
    Ok(())
}

#[tauri::command]
pub fn get_messages(state: State<'_, AppState>) -> Vec<ChatMessage> {
    state.messages.lock().unwrap().items().to_vec()
}

#[tauri::command]
pub fn clear_chat(app: AppHandle, state: State<'_, AppState>) {
    let mut messages = state.messages.lock().unwrap();
    messages.clear();
    let _ = app.emit("messages-changed", messages.items());
}

/// Formats message text into renderable blocks.
#[tauri::command]
pub fn render_message(content: String) -> Vec<Block> {
    formatter::format(&content)
}
