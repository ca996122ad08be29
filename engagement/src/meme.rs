use catalog::{MemeId, Template};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::overlay::ANONYMOUS;

/// Remote-fetched meme record, before merging with the overlay.
///
/// `likes` and `comments` hold whatever the remote source reported at fetch
/// time; catalog templates carry neither and default to zero/empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
    pub id: MemeId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Template> for Meme {
    fn from(template: Template) -> Self {
        Self {
            id: template.id,
            name: template.name,
            url: template.url,
            likes: 0,
            comments: Vec::new(),
            uploaded_by: None,
            created_at: None,
        }
    }
}

/// Merged view model with effective like count and comment list.
///
/// Rebuilt on every screen load, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemeView {
    pub id: MemeId,
    pub name: String,
    pub url: String,
    pub likes: u32,
    pub comments: Vec<String>,
    pub uploaded_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Ranking metric selector for meme lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Likes,
    Comments,
}

impl Metric {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "likes" => Some(Self::Likes),
            "comments" => Some(Self::Comments),
            _ => None,
        }
    }
}

/// Document from the remote upload store. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub url: String,
    pub top_text: String,
    pub bottom_text: String,
    pub template_id: MemeId,
    pub created_at: DateTime<Utc>,
}

impl Upload {
    /// Uploader identity, collapsing missing/blank uploaders into the
    /// anonymous bucket.
    pub fn uploader(&self) -> &str {
        self.uploaded_by
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
    }
}

/// One leaderboard row: score = 2 x uploads + accrued likes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRank {
    pub identity: String,
    pub uploads: u32,
    pub likes: u32,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parse() {
        assert_eq!(Metric::parse("likes"), Some(Metric::Likes));
        assert_eq!(Metric::parse("comments"), Some(Metric::Comments));
        assert_eq!(Metric::parse("views"), None);
    }

    #[test]
    fn test_uploader_fallback() {
        let mut upload = Upload {
            uploaded_by: None,
            url: "https://i.imgflip.com/abc.jpg".to_string(),
            top_text: "top".to_string(),
            bottom_text: "bottom".to_string(),
            template_id: MemeId::new("1"),
            created_at: Utc::now(),
        };

        assert_eq!(upload.uploader(), ANONYMOUS);

        upload.uploaded_by = Some("   ".to_string());
        assert_eq!(upload.uploader(), ANONYMOUS);

        upload.uploaded_by = Some("alice".to_string());
        assert_eq!(upload.uploader(), "alice");
    }
}
