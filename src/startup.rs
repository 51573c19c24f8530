use crate::config::AnnotationConfig;
use crate::error::AppError;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::mock::MockAnnotationProvider;
use crate::services::providers::AnnotationProvider;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Uploads above the multipart default; video frames can be large.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: AnnotationConfig,
    pub provider: Arc<dyn AnnotationProvider>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build with the provider named in the configuration.
    pub async fn build(config: AnnotationConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn AnnotationProvider> = match config.provider.as_str() {
            "mock" => Arc::new(MockAnnotationProvider::new()),
            "gemini" => Arc::new(GeminiProvider::new(GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.models.annotation_model.clone(),
            })),
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Unknown provider: {}",
                    other
                )))
            }
        };

        Self::build_with_provider(config, provider).await
    }

    /// Build with an explicit provider; tests inject mocks here.
    pub async fn build_with_provider(
        config: AnnotationConfig,
        provider: Arc<dyn AnnotationProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            config: config.clone(),
            provider,
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/generate_annotations", post(handlers::generate_annotations))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
