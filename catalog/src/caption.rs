//! # Captioning
//!
//! Client for the remote caption-generation endpoint: given a template id
//! and two caption strings, the endpoint renders the captioned image and
//! returns its URL.
//!
//! The endpoint expects form-style query parameters on a POST and an
//! account to bill the render against. Failures come back in-band as
//! `success: false` plus an `error_message`.

use serde::Deserialize;

use crate::{CatalogError, MemeId};

pub const CAPTION_URL: &str = "https://api.imgflip.com/caption_image";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
struct CaptionResponse {
    success: bool,
    #[serde(default)]
    data: Option<CaptionData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct CaptionData {
    url: String,
}

pub async fn generate_caption(
    client: &reqwest::Client,
    credentials: &Credentials,
    template_id: &MemeId,
    top_text: &str,
    bottom_text: &str,
) -> Result<String, CatalogError> {
    let response: CaptionResponse = client
        .post(CAPTION_URL)
        .query(&[
            ("template_id", template_id.as_str()),
            ("text0", top_text),
            ("text1", bottom_text),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()
        .await?
        .json()
        .await?;

    if response.success {
        if let Some(data) = response.data {
            return Ok(data.url);
        }
    }

    Err(CatalogError::Rejected(response.error_message.unwrap_or_else(
        || "caption endpoint reported failure".to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_payload() {
        let payload = r#"{
            "success": true,
            "data": { "url": "https://i.imgflip.com/abc123.jpg", "page_url": "https://imgflip.com/i/abc123" }
        }"#;

        let response: CaptionResponse = serde_json::from_str(payload).unwrap();

        assert!(response.success);
        assert_eq!(response.data.unwrap().url, "https://i.imgflip.com/abc123.jpg");
    }

    #[test]
    fn test_failure_payload() {
        let payload = r#"{ "success": false, "error_message": "No template with that ID" }"#;

        let response: CaptionResponse = serde_json::from_str(payload).unwrap();

        assert!(!response.success);
        assert_eq!(
            response.error_message.as_deref(),
            Some("No template with that ID")
        );
    }
}
