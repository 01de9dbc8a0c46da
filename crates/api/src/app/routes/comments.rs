use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use scribe_auth::Principal;
use scribe_content::CommentDraft;
use scribe_core::{CommentId, Page};

use crate::app::services::AppServices;
use crate::app::{dto, errors, extract};

pub fn router() -> Router {
    Router::new()
        .route("/comments", get(list_comments))
        .route("/comments/", get(list_comments))
        .route("/comments/create_comment", post(create_comment))
        .route(
            "/comments/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}

/// Comments of any existing post.
pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    extract::Query(params): extract::Query<dto::CommentListParams>,
) -> axum::response::Response {
    let page = Page::new(params.limit, params.skip);
    match services.content.list_comments(params.post_id, page).await {
        Ok(comments) => (StatusCode::OK, Json(comments)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn get_comment(
    Extension(services): Extension<Arc<AppServices>>,
    extract::Path(id): extract::Path<CommentId>,
) -> axum::response::Response {
    match services.content.get_comment(id).await {
        Ok(comment) => (StatusCode::OK, Json(comment)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Query(target): extract::Query<dto::PostRef>,
    extract::Json(draft): extract::Json<CommentDraft>,
) -> axum::response::Response {
    match services
        .content
        .create_comment(&principal, target.post_id, draft)
        .await
    {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(id): extract::Path<CommentId>,
    extract::Json(draft): extract::Json<CommentDraft>,
) -> axum::response::Response {
    match services.content.update_comment(&principal, id, draft).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn delete_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(id): extract::Path<CommentId>,
) -> axum::response::Response {
    match services.content.delete_comment(&principal, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}
