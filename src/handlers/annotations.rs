use crate::dtos::AnnotationRequest;
use crate::error::AppError;
use crate::services::prompt::{build_prompt, parse_model_reply};
use crate::services::providers::ImagePayload;
use crate::services::upload::TempUpload;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};

/// `POST /generate_annotations`
///
/// Validates the multipart form, forwards prompt + image to the configured
/// provider, and relays the model's JSON reply.
pub async fn generate_annotations(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let request = AnnotationRequest::from_multipart(multipart).await?;

    tracing::info!(
        topic = %request.topic,
        filename = %request.image.filename,
        size = request.image.data.len(),
        "Annotation request received"
    );

    let prompt = build_prompt(&request);

    let raw_reply =
        if request.image.data.len() as i64 > state.config.upload.inline_threshold_bytes {
            // Large image: stage on disk for the provider's file-storage API.
            // The file is removed whether or not the call succeeds.
            let upload = TempUpload::write(
                &state.config.upload.tmp_dir,
                &request.image.filename,
                &request.image.data,
            )
            .await?;

            let payload = ImagePayload::File {
                path: upload.path().to_path_buf(),
                mime_type: request.image.mime_type.clone(),
            };
            let result = state.provider.generate(&prompt, &payload).await;
            upload.remove().await;
            result?
        } else {
            let payload = ImagePayload::Inline {
                mime_type: request.image.mime_type.clone(),
                data: request.image.data.clone(),
            };
            state.provider.generate(&prompt, &payload).await?
        };

    tracing::debug!(reply_len = raw_reply.len(), "Raw model reply received");

    let body = parse_model_reply(&raw_reply)?;

    tracing::info!(topic = %request.topic, "Annotation request completed");

    Ok(Json(body))
}
