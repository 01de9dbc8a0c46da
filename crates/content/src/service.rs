//! Owner-scoped content operations.
//!
//! Every call takes the authenticated [`Principal`]; a record the caller does
//! not own is reported as not found rather than forbidden.

use std::sync::Arc;

use scribe_auth::Principal;
use scribe_core::{CommentId, Page, PostId};

use crate::comment::{Comment, CommentDraft};
use crate::error::ContentError;
use crate::post::{Post, PostDraft, PostQuery};
use crate::store::ContentStore;

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Posts
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_posts(
        &self,
        principal: &Principal,
        query: &PostQuery,
    ) -> Result<Vec<Post>, ContentError> {
        self.store.list_posts(principal.id, query).await
    }

    pub async fn get_post(&self, principal: &Principal, id: PostId) -> Result<Post, ContentError> {
        match self.store.find_post(id).await? {
            Some(post) if post.owner_id == principal.id => Ok(post),
            _ => Err(ContentError::PostNotFound),
        }
    }

    pub async fn create_post(
        &self,
        principal: &Principal,
        draft: PostDraft,
    ) -> Result<Post, ContentError> {
        draft.validate()?;
        let post = self.store.insert_post(principal.id, draft).await?;
        tracing::info!(post_id = %post.id, owner_id = %principal.id, "post created");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        principal: &Principal,
        id: PostId,
        draft: PostDraft,
    ) -> Result<(), ContentError> {
        draft.validate()?;
        self.get_post(principal, id).await?;
        self.store.update_post(id, draft).await
    }

    pub async fn delete_post(&self, principal: &Principal, id: PostId) -> Result<(), ContentError> {
        self.get_post(principal, id).await?;
        self.store.delete_post(id).await?;
        tracing::info!(post_id = %id, owner_id = %principal.id, "post deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Comments
    // ─────────────────────────────────────────────────────────────────────────

    /// Comments of any existing post, regardless of its owner.
    pub async fn list_comments(&self, post: PostId, page: Page) -> Result<Vec<Comment>, ContentError> {
        if self.store.find_post(post).await?.is_none() {
            return Err(ContentError::PostNotFound);
        }
        self.store.list_comments(post, page).await
    }

    pub async fn get_comment(&self, id: CommentId) -> Result<Comment, ContentError> {
        self.store
            .find_comment(id)
            .await?
            .ok_or(ContentError::CommentNotFound)
    }

    /// Comment on one of the caller's own posts.
    pub async fn create_comment(
        &self,
        principal: &Principal,
        post: PostId,
        draft: CommentDraft,
    ) -> Result<Comment, ContentError> {
        draft.validate()?;
        let post = self.get_post(principal, post).await?;
        self.store.insert_comment(post.id, principal.id, draft).await
    }

    pub async fn update_comment(
        &self,
        principal: &Principal,
        id: CommentId,
        draft: CommentDraft,
    ) -> Result<(), ContentError> {
        draft.validate()?;
        self.authored_comment(principal, id).await?;
        self.store.update_comment(id, draft).await
    }

    pub async fn delete_comment(&self, principal: &Principal, id: CommentId) -> Result<(), ContentError> {
        self.authored_comment(principal, id).await?;
        self.store.delete_comment(id).await
    }

    async fn authored_comment(
        &self,
        principal: &Principal,
        id: CommentId,
    ) -> Result<Comment, ContentError> {
        match self.store.find_comment(id).await? {
            Some(comment) if comment.author_id == principal.id => Ok(comment),
            _ => Err(ContentError::CommentNotFound),
        }
    }
}
