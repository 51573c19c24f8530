use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

/// Images at or below this size are sent inline with the generate request;
/// larger ones go through the provider's file-storage API via a temp file.
const DEFAULT_INLINE_THRESHOLD_BYTES: i64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationConfig {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub upload: UploadConfig,
    /// Provider selection: "gemini" or "mock".
    pub provider: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Multimodal model used for annotation generation (e.g., gemini-2.0-flash)
    pub annotation_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory for transient image uploads.
    pub tmp_dir: String,
    /// Inline-vs-file cutover size in bytes.
    pub inline_threshold_bytes: i64,
}

impl CommonConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl AnnotationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = CommonConfig::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AnnotationConfig {
            common,
            google: GoogleConfig {
                api_key: get_env("GOOGLE_API_KEY", None, is_prod)?,
            },
            models: ModelConfig {
                annotation_model: get_env("ANNOTATION_MODEL", Some("gemini-2.0-flash"), is_prod)?,
            },
            upload: UploadConfig {
                tmp_dir: get_env(
                    "UPLOAD_TMP_DIR",
                    Some(&env::temp_dir().to_string_lossy()),
                    is_prod,
                )?,
                inline_threshold_bytes: get_env(
                    "UPLOAD_INLINE_THRESHOLD_BYTES",
                    Some(&DEFAULT_INLINE_THRESHOLD_BYTES.to_string()),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_INLINE_THRESHOLD_BYTES),
            },
            provider: get_env("ANNOTATION_PROVIDER", Some("gemini"), is_prod)?,
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
