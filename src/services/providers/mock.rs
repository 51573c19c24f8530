//! Mock provider for testing.

use super::{AnnotationProvider, ImagePayload, ProviderError};
use async_trait::async_trait;

/// Default canned reply: fenced JSON, the shape Gemini usually returns.
const DEFAULT_REPLY: &str = r#"```json
{
  "headline": "Mock headline",
  "annotations": [
    "First mock annotation",
    "Second mock annotation",
    "Third mock annotation"
  ]
}
```"#;

/// Mock annotation provider with a configurable reply.
pub struct MockAnnotationProvider {
    reply: Option<String>,
}

impl MockAnnotationProvider {
    /// Provider that answers with the default fenced-JSON reply.
    pub fn new() -> Self {
        Self {
            reply: Some(DEFAULT_REPLY.to_string()),
        }
    }

    /// Provider that answers with a fixed reply.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }

    /// Provider whose generate call always fails.
    pub fn failing() -> Self {
        Self { reply: None }
    }
}

impl Default for MockAnnotationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnnotationProvider for MockAnnotationProvider {
    async fn generate(
        &self,
        _prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, ProviderError> {
        // The file path handed over must exist at call time, like a real
        // upload to the provider's file-storage API would require.
        if let ImagePayload::File { path, .. } = image {
            if !path.exists() {
                return Err(ProviderError::ApiError(format!(
                    "Upload file missing: {}",
                    path.display()
                )));
            }
        }

        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::ApiError(
                "Mock provider configured to fail".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
