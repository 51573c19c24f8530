//! Prompt template and model-reply post-processing.

use crate::dtos::AnnotationRequest;
use crate::error::AppError;

/// Build the fixed annotation prompt with the user's fields interpolated.
pub fn build_prompt(request: &AnnotationRequest) -> String {
    let mut context = format!("Topic: \"{}\"\n", request.topic);
    if let Some(description) = &request.description {
        context.push_str(&format!("Description: \"{}\"\n", description));
    }
    if let Some(class_name) = &request.class_name {
        context.push_str(&format!("Class: \"{}\"\n", class_name));
    }
    if let Some(subject) = &request.subject {
        context.push_str(&format!("Subject: \"{}\"\n", subject));
    }

    format!(
        r#"You are an AI assistant that helps professors create annotations for educational videos.

You are given:
1. An image (video frame) that may contain a white box drawn on it.
2. A topic that the professor wants to explain.

{context}
Instructions:
- Focus on the region marked by the white box in the image.
- Understand the topic provided.
- Generate a short headline for the boxed region in the context of the topic.
- Generate exactly three concise annotation suggestions that describe or explain what is happening in the boxed region in the context of the topic.
- Do not describe parts of the image outside the boxed region.
- Return the response in JSON format as follows:

{{
  "headline": "Headline here",
  "annotations": [
    "First annotation here",
    "Second annotation here",
    "Third annotation here"
  ]
}}
"#
    )
}

/// Strip Markdown code-fence wrapping, then parse the reply as JSON.
pub fn parse_model_reply(raw: &str) -> Result<serde_json::Value, AppError> {
    let text = strip_code_fences(raw);
    serde_json::from_str(&text).map_err(|e| AppError::MalformedModelOutput(anyhow::Error::new(e)))
}

/// Models often wrap JSON in ```json ... ``` fences; remove the markers.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::ImageUpload;

    fn request(topic: &str, description: Option<&str>) -> AnnotationRequest {
        AnnotationRequest {
            topic: topic.to_string(),
            description: description.map(String::from),
            class_name: None,
            subject: None,
            image: ImageUpload {
                filename: "frame.png".to_string(),
                mime_type: "image/png".to_string(),
                data: vec![],
            },
        }
    }

    #[test]
    fn prompt_interpolates_topic_and_optional_fields() {
        let prompt = build_prompt(&request("photosynthesis", Some("chloroplast close-up")));
        assert!(prompt.contains("Topic: \"photosynthesis\""));
        assert!(prompt.contains("Description: \"chloroplast close-up\""));
        assert!(prompt.contains("exactly three concise annotation suggestions"));
    }

    #[test]
    fn prompt_omits_absent_fields() {
        let prompt = build_prompt(&request("mitosis", None));
        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("Class:"));
    }

    #[test]
    fn parse_strips_json_fences() {
        let raw = "```json\n{\"annotations\": [\"a\", \"b\", \"c\"]}\n```";
        let value = parse_model_reply(raw).unwrap();
        assert_eq!(value["annotations"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn parse_accepts_bare_fences() {
        let raw = "```\n{\"annotations\": []}\n```";
        let value = parse_model_reply(raw).unwrap();
        assert!(value["annotations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn parse_passes_unfenced_json_through() {
        let value = parse_model_reply("{\"headline\": \"h\"}").unwrap();
        assert_eq!(value["headline"], "h");
    }

    #[test]
    fn parse_rejects_non_json() {
        let result = parse_model_reply("I'm sorry, I can't help with that.");
        assert!(matches!(result, Err(AppError::MalformedModelOutput(_))));
    }
}
