// src/provider/google.rs — Google Generative AI (Gemini) image editing provider

use async_trait::async_trait;
use std::time::Duration;

use super::ImageGenerator;
use crate::core::snapshot::Snapshot;
use crate::infra::config::GenerationConfig;
use crate::infra::errors::PixshopError;
use crate::util::{ellipsize, truncate_str};

const PROVIDER: &str = "google";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiImageProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiImageProvider {
    pub fn with_config(
        api_key: String,
        model: impl Into<String>,
        config: &GenerationConfig,
    ) -> Result<Self, PixshopError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PixshopError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            model: model.into(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.into())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Wrap the user's instruction so the model answers with an image.
pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "You are an expert photo editor. Edit the provided image according to the \
         following instruction and return only the edited image.\n\n\
         Instruction: {}\n\n\
         Keep everything the instruction does not mention unchanged, and keep the \
         result photorealistic unless a stylistic change is requested.",
        instruction.trim()
    )
}

/// Build the Gemini request body: the image as inline data, then the prompt.
pub fn build_request_body(image: &Snapshot, instruction: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": image.media_type(),
                        "data": image.image().to_base64(),
                    }
                },
                { "text": edit_prompt(instruction) },
            ],
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"],
        },
    })
}

/// Pull the first image out of a `generateContent` response as a data URI,
/// or explain why there is none.
pub fn extract_image(resp: &serde_json::Value) -> Result<String, PixshopError> {
    if let Some(reason) = resp["promptFeedback"]["blockReason"].as_str() {
        let detail = resp["promptFeedback"]["blockReasonMessage"]
            .as_str()
            .map(|m| format!(" {m}"))
            .unwrap_or_default();
        return Err(PixshopError::generation(
            PROVIDER,
            format!("Request was blocked. Reason: {reason}.{detail}"),
        ));
    }

    let candidate = &resp["candidates"][0];
    let parts = candidate["content"]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    // The REST API answers in camelCase; accept snake_case too.
    let inline = parts
        .iter()
        .find_map(|p| p.get("inlineData").or_else(|| p.get("inline_data")));

    if let Some(inline) = inline {
        let mime = inline
            .get("mimeType")
            .or_else(|| inline.get("mime_type"))
            .and_then(|m| m.as_str())
            .unwrap_or("image/png");
        if let Some(data) = inline["data"].as_str() {
            return Ok(format!("data:{mime};base64,{data}"));
        }
    }

    if let Some(reason) = candidate["finishReason"].as_str() {
        if reason != "STOP" {
            return Err(PixshopError::generation(
                PROVIDER,
                format!(
                    "Image generation stopped unexpectedly. Reason: {reason}. \
                     This often relates to safety settings."
                ),
            ));
        }
    }

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string();

    let message = if text.is_empty() {
        "The AI model did not return an image. This can happen due to safety filters \
         or if the request is too complex. Please try rephrasing your instruction."
            .to_string()
    } else {
        format!(
            "The AI model responded with text instead of an image: \"{}\"",
            ellipsize(&text, 300)
        )
    };
    Err(PixshopError::generation(PROVIDER, message))
}

#[async_trait]
impl ImageGenerator for GeminiImageProvider {
    fn id(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, image: &Snapshot, instruction: &str) -> Result<String, PixshopError> {
        let body = build_request_body(image, instruction);

        tracing::debug!(
            model = %self.model,
            seq = image.seq(),
            bytes = image.bytes().len(),
            "Sending edit request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "The request timed out.".to_string()
                } else {
                    e.without_url().to_string()
                };
                PixshopError::generation(PROVIDER, message)
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PixshopError::generation(
                PROVIDER,
                "Rate limited by the API. Wait a moment and try again.",
            ));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&error_body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(error_body);
            return Err(PixshopError::generation(
                PROVIDER,
                format!("HTTP {}: {}", status, truncate_str(&detail, 500)),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            PixshopError::generation(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        let uri = extract_image(&resp)?;
        tracing::debug!(size = uri.len(), "Edit response received");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::History;
    use crate::core::snapshot::ImageData;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        let mut h = History::new();
        h.load(ImageData::new("image/jpeg", b"pixels".to_vec()))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_request_body_has_image_then_prompt() {
        let body = build_request_body(&snapshot(), "  make the sky pink ");
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "cGl4ZWxz");
        let prompt = parts[1]["text"].as_str().unwrap();
        assert!(prompt.contains("Instruction: make the sky pink\n"));
        assert_eq!(
            body["generationConfig"]["responseModalities"],
            json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn test_extract_inline_image() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]},
                "finishReason": "STOP"
            }]
        });
        assert_eq!(extract_image(&resp).unwrap(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_extract_snake_case_inline_image() {
        let resp = json!({
            "candidates": [{ "content": { "parts": [
                { "inline_data": { "mime_type": "image/webp", "data": "AAAA" } }
            ]}}]
        });
        assert_eq!(extract_image(&resp).unwrap(), "data:image/webp;base64,AAAA");
    }

    #[test]
    fn test_extract_blocked_prompt() {
        let resp = json!({
            "promptFeedback": { "blockReason": "SAFETY", "blockReasonMessage": "Nope." }
        });
        let err = extract_image(&resp).unwrap_err();
        assert_eq!(err.detail(), "Request was blocked. Reason: SAFETY. Nope.");
    }

    #[test]
    fn test_extract_unexpected_finish_reason() {
        let resp = json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "IMAGE_SAFETY" }]
        });
        let err = extract_image(&resp).unwrap_err();
        assert!(err.detail().contains("Reason: IMAGE_SAFETY"));
    }

    #[test]
    fn test_extract_text_only_reply() {
        let resp = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I can't edit faces." }] },
                "finishReason": "STOP"
            }]
        });
        let err = extract_image(&resp).unwrap_err();
        assert_eq!(
            err.detail(),
            "The AI model responded with text instead of an image: \"I can't edit faces.\""
        );
    }

    #[test]
    fn test_extract_empty_response() {
        let err = extract_image(&json!({})).unwrap_err();
        assert!(err.detail().starts_with("The AI model did not return an image."));
        assert!(matches!(err, PixshopError::Generation { ref provider, .. } if provider == "google"));
    }

    #[test]
    fn test_with_config_trims_base_url() {
        let config = GenerationConfig {
            timeout_seconds: 5,
            base_url: Some("http://localhost:1234/v1beta/".into()),
        };
        let p = GeminiImageProvider::with_config("k".into(), "m", &config).unwrap();
        assert_eq!(p.endpoint(), "http://localhost:1234/v1beta/models/m:generateContent");
        assert_eq!(p.id(), "google");
        assert_eq!(p.model(), "m");
    }
}
