use crate::error::AppError;
use axum::extract::Multipart;

/// Image pulled out of the multipart body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Fields of a `POST /generate_annotations` request.
///
/// `topic` and `image` are required; the remaining text fields are folded
/// into the prompt when present.
#[derive(Debug, Clone)]
pub struct AnnotationRequest {
    pub topic: String,
    pub description: Option<String>,
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub image: ImageUpload,
}

impl AnnotationRequest {
    /// Collect and validate the multipart form fields.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut topic = None;
        let mut description = None;
        let mut class_name = None;
        let mut subject = None;
        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "topic" => topic = Some(read_text(field, "topic").await?),
                "description" => description = Some(read_text(field, "description").await?),
                "class" => class_name = Some(read_text(field, "class").await?),
                "subject" => subject = Some(read_text(field, "subject").await?),
                "image" => {
                    let filename = field.file_name().unwrap_or("frame").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| {
                            AppError::BadRequest(anyhow::anyhow!(
                                "Failed to read image bytes: {}",
                                e
                            ))
                        })?
                        .to_vec();
                    image = Some(decode_image(filename, data)?);
                }
                // Unknown fields are ignored, matching lenient form handling
                _ => {}
            }
        }

        let topic = topic.ok_or(AppError::MissingField("topic"))?;
        if topic.trim().is_empty() {
            return Err(AppError::MissingField("topic"));
        }
        let image = image.ok_or(AppError::MissingField("image"))?;

        Ok(Self {
            topic,
            description,
            class_name,
            subject,
            image,
        })
    }
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &'static str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read field {}: {}", name, e)))
}

/// Verify the bytes are a real image and derive the MIME type from the
/// detected format rather than trusting the client's content type.
fn decode_image(filename: String, data: Vec<u8>) -> Result<ImageUpload, AppError> {
    if data.is_empty() {
        return Err(AppError::MissingField("image"));
    }

    let format = image::guess_format(&data)
        .map_err(|e| AppError::InvalidImage(anyhow::Error::new(e)))?;

    Ok(ImageUpload {
        filename,
        mime_type: format.to_mime_type().to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    #[test]
    fn decode_image_rejects_garbage() {
        let result = decode_image("frame.png".to_string(), b"not an image".to_vec());
        assert!(matches!(result, Err(AppError::InvalidImage(_))));
    }

    #[test]
    fn decode_image_normalizes_mime_type() {
        let mut png = Vec::new();
        image::RgbaImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let upload = decode_image("frame.bin".to_string(), png).unwrap();
        assert_eq!(upload.mime_type, "image/png");
    }
}
