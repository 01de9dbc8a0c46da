use axum::Router;

pub mod admin;
pub mod auth;
pub mod comments;
pub mod posts;
pub mod system;
pub mod users;

/// Sign-up and login; no bearer token required.
pub fn public_router() -> Router {
    auth::router()
}

/// Router for all bearer-authenticated endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .merge(admin::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(comments::router())
}
