//! AI provider abstractions and implementations.
//!
//! Trait-based so the Gemini backend can be swapped for a mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// How the image rides along with the generate request.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    /// Base64-encoded bytes embedded in the request body.
    Inline { mime_type: String, data: Vec<u8> },
    /// A transient local file, uploaded through the provider's file-storage
    /// API before the generate call.
    File { path: PathBuf, mime_type: String },
}

/// Trait for multimodal annotation providers (e.g., Gemini).
#[async_trait]
pub trait AnnotationProvider: Send + Sync {
    /// Send the prompt plus image and return the model's raw text reply.
    async fn generate(&self, prompt: &str, image: &ImagePayload)
        -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
