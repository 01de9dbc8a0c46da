//! Postgres-backed content store.
//!
//! Comments reference their post with `ON DELETE CASCADE`, so deleting a post
//! is a single statement. Title search uses `strpos` (case-sensitive, no
//! wildcard escaping needed).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use scribe_content::{Comment, CommentDraft, ContentError, ContentStore, Post, PostDraft, PostQuery};
use scribe_core::{CommentId, Page, PostId, UserId};

const POST_COLUMNS: &str = "id, title, content, published, owner_id, created_at";
const COMMENT_COLUMNS: &str = "id, content, post_id, author_id, created_at";

#[derive(Clone)]
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn acquire(
        &self,
        operation: &'static str,
    ) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, ContentError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl ContentStore for PostgresContentStore {
    async fn list_posts(&self, owner: UserId, query: &PostQuery) -> Result<Vec<Post>, ContentError> {
        let mut conn = self.acquire("list_posts").await?;
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE owner_id = $1 AND strpos(title, $2) > 0 \
             ORDER BY id LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(owner.get())
            .bind(query.search.as_deref().unwrap_or(""))
            .bind(query.page.effective_limit() as i64)
            .bind(query.page.offset() as i64)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("list_posts", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: PostId) -> Result<Option<Post>, ContentError> {
        let mut conn = self.acquire("find_post").await?;
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("find_post", e))?;

        Ok(row.map(Post::from))
    }

    async fn insert_post(&self, owner: UserId, draft: PostDraft) -> Result<Post, ContentError> {
        let mut conn = self.acquire("insert_post").await?;
        let sql = format!(
            "INSERT INTO posts (title, content, published, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(draft.published)
            .bind(owner.get())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("insert_post", e))?;

        Ok(row.into())
    }

    async fn update_post(&self, id: PostId, draft: PostDraft) -> Result<(), ContentError> {
        let mut conn = self.acquire("update_post").await?;
        let result = sqlx::query(
            "UPDATE posts SET title = $1, content = $2, published = $3 WHERE id = $4",
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(draft.published)
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;

        if result.rows_affected() == 0 {
            return Err(ContentError::PostNotFound);
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), ContentError> {
        let mut conn = self.acquire("delete_post").await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        if result.rows_affected() == 0 {
            return Err(ContentError::PostNotFound);
        }
        Ok(())
    }

    async fn list_comments(&self, post: PostId, page: Page) -> Result<Vec<Comment>, ContentError> {
        let mut conn = self.acquire("list_comments").await?;
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 \
             ORDER BY id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post.get())
            .bind(page.effective_limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("list_comments", e))?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, ContentError> {
        let mut conn = self.acquire("find_comment").await?;
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("find_comment", e))?;

        Ok(row.map(Comment::from))
    }

    async fn insert_comment(
        &self,
        post: PostId,
        author: UserId,
        draft: CommentDraft,
    ) -> Result<Comment, ContentError> {
        let mut conn = self.acquire("insert_comment").await?;
        let sql = format!(
            "INSERT INTO comments (content, post_id, author_id) \
             VALUES ($1, $2, $3) RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(&draft.content)
            .bind(post.get())
            .bind(author.get())
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("insert_comment", e))?;

        Ok(row.into())
    }

    async fn update_comment(&self, id: CommentId, draft: CommentDraft) -> Result<(), ContentError> {
        let mut conn = self.acquire("update_comment").await?;
        let result = sqlx::query("UPDATE comments SET content = $1 WHERE id = $2")
            .bind(&draft.content)
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("update_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(ContentError::CommentNotFound);
        }
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), ContentError> {
        let mut conn = self.acquire("delete_comment").await?;
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("delete_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(ContentError::CommentNotFound);
        }
        Ok(())
    }
}

/// Map SQLx errors to ContentError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ContentError {
    if let sqlx::Error::Database(db_err) = &err {
        // Foreign key violation: the referenced post vanished.
        if db_err.code().as_deref() == Some("23503") {
            return ContentError::PostNotFound;
        }
    }

    tracing::error!(operation, error = %err, "content store query failed");
    ContentError::Backend(format!("sqlx error in {operation}: {err}"))
}

// SQLx row types

#[derive(Debug)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    published: bool,
    owner_id: i64,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for PostRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(PostRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            published: row.try_get("published")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId::new(row.id),
            title: row.title,
            content: row.content,
            published: row.published,
            owner_id: UserId::new(row.owner_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug)]
struct CommentRow {
    id: i64,
    content: String,
    post_id: i64,
    author_id: i64,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CommentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CommentRow {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            post_id: row.try_get("post_id")?,
            author_id: row.try_get("author_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId::new(row.id),
            content: row.content,
            post_id: PostId::new(row.post_id),
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
        }
    }
}
