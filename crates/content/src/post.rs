use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_core::{DomainError, DomainResult, Page, PostId, UserId};

pub const MAX_TITLE_LEN: usize = 50;
pub const MAX_POST_CONTENT_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Create/replace payload for a post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default = "published_by_default")]
    pub published: bool,
}

fn published_by_default() -> bool {
    true
}

impl PostDraft {
    pub fn validate(&self) -> DomainResult<()> {
        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("content", &self.content, MAX_POST_CONTENT_LEN)
    }
}

/// Owner-scoped listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub page: Page,
    /// Case-sensitive substring of the title; empty matches everything.
    pub search: Option<String>,
}

impl PostQuery {
    pub fn matches(&self, post: &Post) -> bool {
        match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => post.title.contains(needle),
            _ => true,
        }
    }
}

pub(crate) fn check_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len == 0 || len > max {
        return Err(DomainError::validation(format!(
            "{field} must be 1 to {max} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_defaults_to_true() {
        let draft: PostDraft =
            serde_json::from_str(r#"{"title":"Hello","content":"World"}"#).unwrap();
        assert!(draft.published);
    }

    #[test]
    fn title_and_content_lengths_are_bounded() {
        let ok = PostDraft {
            title: "t".repeat(MAX_TITLE_LEN),
            content: "c".repeat(MAX_POST_CONTENT_LEN),
            published: true,
        };
        assert!(ok.validate().is_ok());

        let long_title = PostDraft { title: "t".repeat(MAX_TITLE_LEN + 1), ..ok.clone() };
        assert!(long_title.validate().is_err());

        let empty_content = PostDraft { content: String::new(), ..ok };
        assert!(empty_content.validate().is_err());
    }

    #[test]
    fn empty_search_matches_everything() {
        let post = Post {
            id: PostId::new(1),
            title: "Rust tips".into(),
            content: "...".into(),
            published: true,
            owner_id: UserId::new(1),
            created_at: Utc::now(),
        };

        assert!(PostQuery::default().matches(&post));
        assert!(PostQuery { search: Some(String::new()), ..Default::default() }.matches(&post));
        assert!(PostQuery { search: Some("tips".into()), ..Default::default() }.matches(&post));
        assert!(!PostQuery { search: Some("Go".into()), ..Default::default() }.matches(&post));
    }
}
