use async_trait::async_trait;

use scribe_core::{CommentId, Page, PostId, UserId};

use crate::comment::{Comment, CommentDraft};
use crate::error::ContentError;
use crate::post::{Post, PostDraft, PostQuery};

/// Persistence for posts and comments.
///
/// Lookups are unscoped; ownership is decided by [`crate::ContentService`].
/// Lists are ordered by id.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_posts(&self, owner: UserId, query: &PostQuery) -> Result<Vec<Post>, ContentError>;

    async fn find_post(&self, id: PostId) -> Result<Option<Post>, ContentError>;

    async fn insert_post(&self, owner: UserId, draft: PostDraft) -> Result<Post, ContentError>;

    async fn update_post(&self, id: PostId, draft: PostDraft) -> Result<(), ContentError>;

    /// Removes the post together with its comments.
    async fn delete_post(&self, id: PostId) -> Result<(), ContentError>;

    async fn list_comments(&self, post: PostId, page: Page) -> Result<Vec<Comment>, ContentError>;

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, ContentError>;

    async fn insert_comment(
        &self,
        post: PostId,
        author: UserId,
        draft: CommentDraft,
    ) -> Result<Comment, ContentError>;

    async fn update_comment(&self, id: CommentId, draft: CommentDraft) -> Result<(), ContentError>;

    async fn delete_comment(&self, id: CommentId) -> Result<(), ContentError>;
}
