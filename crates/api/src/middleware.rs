use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use scribe_auth::{AuthError, IdentityResolver, Principal, require_superuser};

use crate::app::errors;

#[derive(Clone)]
pub struct AuthState {
    pub resolver: IdentityResolver,
}

/// Resolve the bearer token and attach the [`Principal`] to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = authorization_header(req.headers());

    match state.resolver.resolve(header, Utc::now()) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(rejection) => {
            tracing::debug!(
                reason = rejection.reason().as_str(),
                path = %req.uri().path(),
                "bearer token rejected"
            );
            errors::auth_error_to_response(AuthError::from(rejection))
        }
    }
}

/// Admit only superusers. Must run inside [`auth_middleware`].
pub async fn superuser_middleware(mut req: Request, next: Next) -> Response {
    let Some(principal) = req.extensions_mut().remove::<Principal>() else {
        return errors::auth_error_to_response(AuthError::TokenInvalid);
    };

    match require_superuser(principal) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), "superuser route refused");
            errors::auth_error_to_response(e.into())
        }
    }
}

/// A non-UTF-8 header is passed on as empty so it is rejected like a malformed one.
fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or(""))
}
