use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use scribe_auth::Principal;

use crate::app::services::AppServices;
use crate::app::{dto, errors, extract};

pub fn router() -> Router {
    Router::new()
        .route("/user", get(profile))
        .route("/user/", get(profile))
        .route("/user/password", put(change_password))
        .route("/user/email/:email", put(change_email))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> axum::response::Response {
    match services.accounts.profile(&principal).await {
        Ok(record) => (StatusCode::OK, Json(dto::UserResponse::from(&record))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Json(body): extract::Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    match services
        .accounts
        .change_password(&principal, body.password, body.new_password)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn change_email(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Path(email): extract::Path<String>,
) -> axum::response::Response {
    match services.accounts.change_email(&principal, &email).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
