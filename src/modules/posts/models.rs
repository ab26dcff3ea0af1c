use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

pub const TITLE_MAX_CHARS: u64 = 50;
pub const CONTENT_MAX_CHARS: u64 = 500;

/// A stored post as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier assigned by the store (24 hex characters)
    pub id: String,
    pub title: String,
    pub content: String,
    /// Creation time, assigned by the store, never updated
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// Request body for creating a post or replacing one wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostCreate {
    #[validate(length(min = 1, max = TITLE_MAX_CHARS))]
    pub title: String,
    #[validate(length(min = 1, max = CONTENT_MAX_CHARS))]
    pub content: String,
}

/// Request body for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = TITLE_MAX_CHARS))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = CONTENT_MAX_CHARS))]
    pub content: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Apply the supplied fields to `post` in place.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
    }
}

impl From<PostCreate> for PostPatch {
    fn from(create: PostCreate) -> Self {
        Self {
            title: Some(create.title),
            content: Some(create.content),
        }
    }
}

/// Query string accepted by the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    /// Case-insensitive fragment the title must contain
    pub title: Option<String>,
}

/// Body returned after a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub id: String,
    pub message: String,
}

/// Current UTC time truncated to the millisecond precision the store keeps.
pub fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_millisecond(now.millisecond()).unwrap_or(now)
}
