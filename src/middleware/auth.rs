//! API key middleware
//!
//! When `API_AUTH_KEY` is configured, every mutating (POST) request must
//! carry the key in the `x-api-key` header. Read requests always pass.
//! Keys are compared as SHA-256 digests.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{AppError, AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let Some(expected) = state.config.api_auth_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if digest(key) == digest(expected) => Ok(next.run(req).await),
        _ => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "mutating request rejected: invalid or missing API key"
            );
            Err(AppError::Unauthorized)
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_equality_tracks_key_equality() {
        assert_eq!(digest("secret"), digest("secret"));
        assert_ne!(digest("secret"), digest("Secret"));
    }
}
