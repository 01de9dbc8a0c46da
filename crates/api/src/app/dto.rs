use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scribe_auth::{IdentityRecord, NewAccount};
use scribe_content::PostQuery;
use scribe_core::{Page, PostId, UserId, page::DEFAULT_LIMIT};

// -------------------------
// Request DTOs
// -------------------------

/// `application/x-www-form-urlencoded` login body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(body: RegisterRequest) -> Self {
        NewAccount {
            username: body.username,
            email: body.email,
            password: body.password,
            is_superuser: false,
        }
    }
}

/// Admin creation body; `is_superuser` defaults to `true`.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_superuser: bool,
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(body: CreateAccountRequest) -> Self {
        NewAccount {
            username: body.username,
            email: body.email,
            password: body.password,
            is_superuser: body.is_superuser,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
}

impl From<PageParams> for Page {
    fn from(p: PageParams) -> Self {
        Page::new(p.limit, p.skip)
    }
}

#[derive(Debug, Deserialize)]
pub struct PostListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
    #[serde(default)]
    pub search: Option<String>,
}

impl From<PostListParams> for PostQuery {
    fn from(p: PostListParams) -> Self {
        PostQuery {
            page: Page::new(p.limit, p.skip),
            search: p.search,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    pub post_id: PostId,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
}

#[derive(Debug, Deserialize)]
pub struct PostRef {
    pub post_id: PostId,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_true() -> bool {
    true
}

// -------------------------
// Response DTOs
// -------------------------

/// Account as exposed over HTTP (never the password hash).
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&IdentityRecord> for UserResponse {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            is_active: record.is_active,
            is_superuser: record.is_superuser,
            created_at: record.created_at,
        }
    }
}
