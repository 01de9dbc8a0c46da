use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_core::{CommentId, DomainResult, PostId, UserId};

use crate::post::check_len;

pub const MAX_COMMENT_LEN: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentDraft {
    pub content: String,
}

impl CommentDraft {
    pub fn validate(&self) -> DomainResult<()> {
        check_len("content", &self.content, MAX_COMMENT_LEN)
    }
}
