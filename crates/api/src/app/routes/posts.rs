use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use scribe_auth::Principal;
use scribe_content::{PostDraft, PostQuery};
use scribe_core::PostId;

use crate::app::services::AppServices;
use crate::app::{dto, errors, extract};

pub fn router() -> Router {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/", get(list_posts))
        .route("/posts/create_post", post(create_post))
        .route("/posts/:id", get(get_post).put(update_post).delete(delete_post))
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Query(params): extract::Query<dto::PostListParams>,
) -> axum::response::Response {
    let query = PostQuery::from(params);
    match services.content.list_posts(&principal, &query).await {
        Ok(posts) => (StatusCode::OK, Json(posts)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(id): extract::Path<PostId>,
) -> axum::response::Response {
    match services.content.get_post(&principal, id).await {
        Ok(post) => (StatusCode::OK, Json(post)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Json(draft): extract::Json<PostDraft>,
) -> axum::response::Response {
    match services.content.create_post(&principal, draft).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(id): extract::Path<PostId>,
    extract::Json(draft): extract::Json<PostDraft>,
) -> axum::response::Response {
    match services.content.update_post(&principal, id, draft).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(id): extract::Path<PostId>,
) -> axum::response::Response {
    match services.content.delete_post(&principal, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::content_error_to_response(e),
    }
}
