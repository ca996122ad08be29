//! # Catalog
//!
//! Meme template catalog client.
//!
//! Core purpose is to fetch the template catalog from the remote meme API,
//! keep a local JSON cache of it, and generate captioned images at upload
//! time.
//!
//! ## Schema
//! - Template: id (**string**), name (**string**), url (**string**)
//!
//! Remote template identifiers arrive as strings in some payloads and as
//! numbers in others. Every identifier is normalized into [`MemeId`] at the
//! deserialization boundary so cross-source matching is always a plain
//! string comparison.
//!
//! ## Cache
//!
//! The catalog is persisted to a JSON file next to the workspace. The
//! `refresh` bin fetches the remote catalog and rewrites the cache.
//!
//! Refresh manually.
//! ```sh
//! cargo run --bin refresh
//! ```

use std::{fmt, fs};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod caption;

pub const TEMPLATES_URL: &str = "https://api.imgflip.com/get_memes";
pub const CACHE_PATH: &str = "../templates.json";

/// Canonical meme/template identifier.
///
/// Remote payloads carry ids as strings or numbers; both collapse to the
/// trimmed string form here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MemeId(String);

impl MemeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for MemeId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for MemeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(raw) => Ok(MemeId::new(raw)),
            Raw::Number(raw) => Ok(MemeId::from(raw)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: MemeId,
    pub name: String,
    pub url: String,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("catalog cache unreadable: {0}")]
    Cache(#[from] std::io::Error),

    #[error("malformed catalog payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("remote rejected the request: {0}")]
    Rejected(String),
}

#[derive(Deserialize)]
struct TemplatesResponse {
    success: bool,
    #[serde(default)]
    data: Option<TemplatesData>,
}

#[derive(Deserialize)]
struct TemplatesData {
    memes: Vec<Template>,
}

pub async fn fetch_templates(client: &reqwest::Client) -> Result<Vec<Template>, CatalogError> {
    let response: TemplatesResponse = client.get(TEMPLATES_URL).send().await?.json().await?;

    match response.data {
        Some(data) if response.success => Ok(data.memes),
        _ => Err(CatalogError::Rejected(
            "template endpoint reported failure".to_string(),
        )),
    }
}

/// Fetch with the degrade-to-empty contract: any failure yields an empty
/// catalog and a warning, never an error to the caller.
pub async fn fetch_templates_or_empty(client: &reqwest::Client) -> Vec<Template> {
    match fetch_templates(client).await {
        Ok(templates) => templates,
        Err(e) => {
            warn!("Template fetch failed, serving empty catalog: {e}");
            Vec::new()
        }
    }
}

pub fn read_cache() -> Result<Vec<Template>, CatalogError> {
    let data = fs::read_to_string(CACHE_PATH)?;

    Ok(serde_json::from_str(&data)?)
}

pub fn write_cache(templates: &[Template]) -> Result<(), CatalogError> {
    let data = serde_json::to_string(templates)?;

    Ok(fs::write(CACHE_PATH, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_normalization() {
        assert_eq!(MemeId::new(" 61579 "), MemeId::new("61579"));
        assert_eq!(MemeId::from(61579), MemeId::new("61579"));
    }

    #[test]
    fn test_id_accepts_string_or_number() {
        let from_text: MemeId = serde_json::from_str("\"181913649\"").unwrap();
        let from_number: MemeId = serde_json::from_str("181913649").unwrap();

        assert_eq!(from_text, from_number);
    }

    #[test]
    fn test_templates_payload() {
        let payload = r#"{
            "success": true,
            "data": {
                "memes": [
                    { "id": "181913649", "name": "Drake Hotline Bling", "url": "https://i.imgflip.com/30b1gx.jpg", "width": 1200, "height": 1200, "box_count": 2 },
                    { "id": 87743020, "name": "Two Buttons", "url": "https://i.imgflip.com/1g8my4.jpg" }
                ]
            }
        }"#;

        let response: TemplatesResponse = serde_json::from_str(payload).unwrap();
        let memes = response.data.unwrap().memes;

        assert!(response.success);
        assert_eq!(memes.len(), 2);
        assert_eq!(memes[0].id, MemeId::new("181913649"));
        assert_eq!(memes[1].id, MemeId::new("87743020"));
    }

    #[test]
    fn test_failure_payload() {
        let payload = r#"{ "success": false }"#;

        let response: TemplatesResponse = serde_json::from_str(payload).unwrap();

        assert!(!response.success);
        assert!(response.data.is_none());
    }
}
