use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use scribe_auth::Principal;

use crate::app::services::AppServices;
use crate::app::{dto, errors, extract};
use crate::middleware;

pub fn router() -> Router {
    let superuser_only = Router::new()
        .route("/admin/users", get(list_users))
        .route_layer(axum::middleware::from_fn(middleware::superuser_middleware));

    Router::new()
        .route("/admin", post(create_user))
        .route("/admin/", post(create_user))
        .merge(superuser_only)
}

/// Create an account; only a superuser may create another superuser.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Json(body): extract::Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    match services.accounts.create_by_admin(&principal, body.into()).await {
        Ok(record) => (StatusCode::CREATED, Json(dto::UserResponse::from(&record))).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    extract::Query(params): extract::Query<dto::PageParams>,
) -> axum::response::Response {
    match services.accounts.list_accounts(&principal, params.into()).await {
        Ok(records) => {
            let items = records.iter().map(dto::UserResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}
