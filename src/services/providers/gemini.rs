//! Gemini AI provider implementation.
//!
//! Talks to Google's generative language API: `generateContent` for the
//! prompt+image call, and the Files API for images too large to inline.

use super::{AnnotationProvider, ImagePayload, ProviderError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini file-upload endpoint base.
const GEMINI_UPLOAD_BASE: &str = "https://generativelanguage.googleapis.com/upload/v1beta";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
}

/// Gemini annotation provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_API_BASE, self.config.model, self.config.api_key
        )
    }

    /// Upload a local file through the Files API and return its handle.
    async fn upload_file(&self, path: &std::path::Path, mime_type: &str) -> Result<FileHandle, ProviderError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to read upload file: {}", e)))?;

        let url = format!("{}/files?key={}", GEMINI_UPLOAD_BASE, self.config.api_key);

        tracing::debug!(
            path = %path.display(),
            size = bytes.len(),
            "Uploading image to Gemini Files API"
        );

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Gemini file upload error {}: {}",
                status, error_text
            )));
        }

        let uploaded: UploadFileResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse upload response: {}", e)))?;

        Ok(uploaded.file)
    }

    /// Delete an uploaded file. Failures are logged, not surfaced; the
    /// generate result has already been decided by the time this runs.
    async fn delete_file(&self, handle: &FileHandle) {
        let url = format!("{}/{}?key={}", GEMINI_API_BASE, handle.name, self.config.api_key);
        if let Err(e) = self.client.delete(&url).send().await {
            tracing::warn!(file = %handle.name, "Failed to delete uploaded file: {}", e);
        }
    }

    async fn generate_content(&self, parts: Vec<ContentPart>) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| match p {
                ContentPart::Text { text } => Some(text),
                _ => None,
            })
            .ok_or_else(|| ProviderError::ApiError("Empty response from Gemini".to_string()))
    }
}

#[async_trait]
impl AnnotationProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        match image {
            ImagePayload::Inline { mime_type, data } => {
                let parts = vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.clone(),
                            data: BASE64.encode(data),
                        },
                    },
                ];
                self.generate_content(parts).await
            }
            ImagePayload::File { path, mime_type } => {
                let handle = self.upload_file(path, mime_type).await?;
                let parts = vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::FileData {
                        file_data: FileData {
                            mime_type: mime_type.clone(),
                            file_uri: handle.uri.clone(),
                        },
                    },
                ];
                let result = self.generate_content(parts).await;
                self.delete_file(&handle).await;
                result
            }
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
    FileData { file_data: FileData },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadFileResponse {
    file: FileHandle,
}

#[derive(Debug, Deserialize)]
struct FileHandle {
    /// Resource name, e.g. `files/abc-123`.
    name: String,
    /// Download URI referenced from `file_data` parts.
    uri: String,
}
