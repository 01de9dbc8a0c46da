//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: error → response mapping

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use scribe_auth::{IdentityResolver, TokenCodec};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let codec = Arc::new(TokenCodec::from_config(&config.auth).context("invalid auth configuration")?);
    let auth_state = middleware::AuthState {
        resolver: IdentityResolver::new(codec.clone()),
    };

    let stores = services::build_stores(config).await?;
    let services = Arc::new(services::build_services(config, codec, stores).await?);

    // Bearer-protected routes; the principal is attached by the auth middleware.
    let protected = routes::protected_router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services.clone())),
    );

    let public = routes::public_router().layer(Extension(services));

    Ok(Router::new()
        .route("/healthy", get(routes::system::health))
        .merge(public)
        .merge(protected))
}
