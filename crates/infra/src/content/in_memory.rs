use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use scribe_content::{Comment, CommentDraft, ContentError, ContentStore, Post, PostDraft, PostQuery};
use scribe_core::{CommentId, Page, PostId, UserId};

#[derive(Debug, Default)]
struct Inner {
    posts: BTreeMap<PostId, Post>,
    comments: BTreeMap<CommentId, Comment>,
    last_post_id: i64,
    last_comment_id: i64,
}

/// In-memory content store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    inner: RwLock<Inner>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ContentError {
    ContentError::Backend("content store lock poisoned".into())
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_posts(&self, owner: UserId, query: &PostQuery) -> Result<Vec<Post>, ContentError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .posts
            .values()
            .filter(|p| p.owner_id == owner && query.matches(p))
            .skip(query.page.offset())
            .take(query.page.effective_limit())
            .cloned()
            .collect())
    }

    async fn find_post(&self, id: PostId) -> Result<Option<Post>, ContentError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.posts.get(&id).cloned())
    }

    async fn insert_post(&self, owner: UserId, draft: PostDraft) -> Result<Post, ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.last_post_id += 1;
        let post = Post {
            id: PostId::new(inner.last_post_id),
            title: draft.title,
            content: draft.content,
            published: draft.published,
            owner_id: owner,
            created_at: Utc::now(),
        };
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: PostId, draft: PostDraft) -> Result<(), ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let post = inner.posts.get_mut(&id).ok_or(ContentError::PostNotFound)?;
        post.title = draft.title;
        post.content = draft.content;
        post.published = draft.published;
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner.posts.remove(&id).ok_or(ContentError::PostNotFound)?;
        inner.comments.retain(|_, c| c.post_id != id);
        Ok(())
    }

    async fn list_comments(&self, post: PostId, page: Page) -> Result<Vec<Comment>, ContentError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner
            .comments
            .values()
            .filter(|c| c.post_id == post)
            .skip(page.offset())
            .take(page.effective_limit())
            .cloned()
            .collect())
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, ContentError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.comments.get(&id).cloned())
    }

    async fn insert_comment(
        &self,
        post: PostId,
        author: UserId,
        draft: CommentDraft,
    ) -> Result<Comment, ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if !inner.posts.contains_key(&post) {
            return Err(ContentError::PostNotFound);
        }
        inner.last_comment_id += 1;
        let comment = Comment {
            id: CommentId::new(inner.last_comment_id),
            content: draft.content,
            post_id: post,
            author_id: author,
            created_at: Utc::now(),
        };
        inner.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_comment(&self, id: CommentId, draft: CommentDraft) -> Result<(), ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let comment = inner.comments.get_mut(&id).ok_or(ContentError::CommentNotFound)?;
        comment.content = draft.content;
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), ContentError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        inner
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(ContentError::CommentNotFound)
    }
}
