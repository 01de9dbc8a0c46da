use thiserror::Error;

use scribe_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("{0}")]
    Validation(String),

    #[error("Post not found")]
    PostNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("content store failure: {0}")]
    Backend(String),
}

impl From<DomainError> for ContentError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_failures_surface_as_validation() {
        assert_eq!(
            ContentError::from(DomainError::validation("title must not be empty")),
            ContentError::Validation("title must not be empty".into())
        );
        assert_eq!(
            ContentError::from(DomainError::invalid_id("PostId: bad")),
            ContentError::Validation("PostId: bad".into())
        );
    }
}
