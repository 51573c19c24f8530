use annotation_service::config::AnnotationConfig;
use annotation_service::services::providers::AnnotationProvider;
use annotation_service::startup::Application;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub upload_dir: String,
}

impl TestApp {
    /// Spawn the app with the given provider and the default inline
    /// threshold (images stay inline).
    pub async fn spawn(provider: Arc<dyn AnnotationProvider>) -> Self {
        Self::spawn_with_threshold(provider, 4 * 1024 * 1024).await
    }

    /// Spawn the app with an explicit inline threshold; a threshold of 0
    /// forces every image through the temp-file upload path.
    pub async fn spawn_with_threshold(
        provider: Arc<dyn AnnotationProvider>,
        inline_threshold_bytes: i64,
    ) -> Self {
        std::env::set_var("ENVIRONMENT", "test");
        std::env::set_var("GOOGLE_API_KEY", "test-api-key");

        let upload_dir = format!("target/test-uploads-{}", Uuid::new_v4());

        let mut config = AnnotationConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.upload.tmp_dir = upload_dir.clone();
        config.upload.inline_threshold_bytes = inline_threshold_bytes;

        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Self {
            address,
            upload_dir,
        }
    }

    /// Number of files left behind in the temp upload dir.
    pub fn upload_dir_file_count(&self) -> usize {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}

/// A tiny valid PNG for upload tests.
pub fn test_png() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(4, 4)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("Failed to encode test PNG");
    bytes
}
