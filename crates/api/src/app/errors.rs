use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;

use scribe_auth::AuthError;
use scribe_content::ContentError;

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let code = err.kind();
    match &err {
        AuthError::InvalidCredentials | AuthError::PasswordMismatch => {
            json_error(StatusCode::UNAUTHORIZED, code, err.to_string())
        }
        AuthError::TokenInvalid | AuthError::TokenExpired => {
            let mut res = json_error(StatusCode::UNAUTHORIZED, code, err.to_string());
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            res
        }
        AuthError::InsufficientPrivilege(_) => json_error(StatusCode::FORBIDDEN, code, err.to_string()),
        AuthError::DuplicateIdentity(_) => json_error(StatusCode::BAD_REQUEST, code, err.to_string()),
        AuthError::Validation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, code, err.to_string())
        }
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, code, err.to_string()),
        AuthError::Storage(_) | AuthError::Hashing(_) | AuthError::Signing(_) => {
            tracing::error!(error = %err, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "internal server error")
        }
    }
}

pub fn content_error_to_response(err: ContentError) -> axum::response::Response {
    match &err {
        ContentError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
        }
        ContentError::PostNotFound | ContentError::CommentNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        ContentError::Backend(_) => {
            tracing::error!(error = %err, "request failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "internal server error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "detail": message.into(),
        })),
    )
        .into_response()
}
