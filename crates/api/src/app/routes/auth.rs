use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;

use scribe_auth::AuthError;

use crate::app::services::AppServices;
use crate::app::{dto, errors, extract};

pub fn router() -> Router {
    Router::new()
        .route("/auth", post(register))
        .route("/auth/", post(register))
        .route("/auth/token", post(login))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    extract::Json(body): extract::Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.accounts.register(body.into()).await {
        Ok(record) => (StatusCode::CREATED, Json(dto::UserResponse::from(&record))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    extract::Form(form): extract::Form<dto::LoginForm>,
) -> axum::response::Response {
    let identity = match services
        .authenticator
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(identity) => identity,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.issuer.issue(&identity, Utc::now()) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}
