use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live notification as delivered over the push channel.
///
/// The id is opaque: it is echoed verbatim into the read/delete endpoints
/// and must stay stable between the channel push and the REST mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Notification {
    /// Identity of the inbox-list entry rendered for this notification
    pub fn entry_key(&self) -> String {
        format!("notification-{}", self.id)
    }

    /// Link presence changes interaction semantics: mark-read-then-navigate
    /// vs. plain display.
    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }
}

/// Response to `POST /notification/{id}/delete/` - the authoritative unread
/// count the badge is reconciled to.
#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    pub unread_notifications_count: u32,
}

/// Status discriminator of the platform's JSON envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Fail,
    Error,
}

/// Generic `{status, data, message}` envelope used by the like, upload and
/// article endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: ResponseStatus,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a successful like toggle. Article responses carry
/// `likes_count`, comment responses `comment_likes_count`.
#[derive(Debug, Deserialize)]
pub struct LikeData {
    #[serde(alias = "comment_likes_count")]
    pub likes_count: u32,
}

/// Payload of a successful media upload
#[derive(Debug, Deserialize)]
pub struct UploadData {
    pub location: String,
}

/// Payload of a successful article create
#[derive(Debug, Deserialize)]
pub struct ArticleCreated {
    #[serde(rename = "articleId")]
    pub article_id: String,
    #[serde(rename = "articleSlug")]
    pub article_slug: String,
}

/// Payload of a successful article update
#[derive(Debug, Deserialize)]
pub struct ArticleUpdated {
    #[serde(rename = "articleUrl")]
    pub article_url: String,
}

/// Server-side validation errors, field name to messages
pub type ValidationErrors = HashMap<String, Vec<String>>;
