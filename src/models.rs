use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One source-document citation attached to an assistant message.
/// Flattened from the server's nested `metadata.loc` wire shape.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    pub page_content: Option<String>,
    pub source: Option<String>,
    pub page_number: Option<i64>,
}

/// A chat exchange entry. Immutable once appended; the message list is
/// append-only and ordered oldest first.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub documents: Vec<DocumentReference>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            documents: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, documents: Vec<DocumentReference>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            documents,
        }
    }
}

/// Metadata for one selected file. Raw bytes are never persisted, so a
/// record restored from the store is a placeholder that cannot be
/// re-uploaded.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub file_name: String,
    pub file_size_bytes: u64,
    pub last_modified: i64,
    pub uploading: bool,
    pub stored_path: Option<String>,
}

impl UploadRecord {
    /// Optimistic in-flight record, inserted before the request is issued.
    pub fn pending(file_name: impl Into<String>, file_size_bytes: u64, last_modified: i64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size_bytes,
            last_modified,
            uploading: true,
            stored_path: None,
        }
    }
}
