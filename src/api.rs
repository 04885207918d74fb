//! Typed client for the remote QA server: chat completion, PDF upload and
//! source-document download.

use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;

use crate::models::DocumentReference;

/// Build-time server address; there is no runtime override surface.
pub fn server_url() -> String {
    option_env!("PDF_CHAT_SERVER_URL")
        .unwrap_or("http://localhost:8000")
        .to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

/// Assistant reply with its (possibly empty) source references.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub docs: Vec<DocumentReference>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<String>,
    #[serde(default)]
    docs: Vec<WireDoc>,
}

// The server nests reference locations; they are flattened on receipt.
#[derive(Deserialize)]
struct WireDoc {
    #[serde(rename = "pageContent")]
    page_content: Option<String>,
    #[serde(default)]
    metadata: WireMetadata,
}

#[derive(Deserialize, Default)]
struct WireMetadata {
    source: Option<String>,
    loc: Option<WireLoc>,
}

#[derive(Deserialize)]
struct WireLoc {
    #[serde(rename = "pageNumber")]
    page_number: Option<i64>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "filePath")]
    file_path: Option<String>,
    message: Option<String>,
}

impl WireDoc {
    fn flatten(self) -> DocumentReference {
        DocumentReference {
            page_content: self.page_content,
            source: self.metadata.source,
            page_number: self.metadata.loc.and_then(|loc| loc.page_number),
        }
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn from_build_config() -> Self {
        Self::new(server_url())
    }

    /// `GET /chat?message=…` — one question, one answer.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        let resp = self
            .client
            .get(format!("{}/chat", self.base_url))
            .query(&[("message", message)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status,
                message: text,
            });
        }

        let data: ChatResponse = resp.json().await?;
        Ok(ChatReply {
            message: data.message.unwrap_or_default(),
            docs: data.docs.into_iter().map(WireDoc::flatten).collect(),
        })
    }

    /// `POST /upload/pdf` with multipart field `pdf`. Returns the stored
    /// path reported by the server (empty when it reports none).
    pub async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("pdf", part);

        let resp = self
            .client
            .post(format!("{}/upload/pdf", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let data: UploadResponse = resp.json().await.unwrap_or(UploadResponse {
            file_path: None,
            message: None,
        });

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: data.message.unwrap_or_else(|| "Upload failed".to_string()),
            });
        }

        Ok(data.file_path.unwrap_or_default())
    }

    /// `GET /download?file=…` — raw PDF bytes of a cited source.
    pub async fn download(&self, source: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .client
            .get(format!("{}/download", self.base_url))
            .query(&[("file", source)])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status,
                message: text,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
