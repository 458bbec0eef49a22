//! Caller identity extracted from request headers.
//!
//! Authentication terminates upstream; the verified identity reaches this
//! service as an `x-user-id` header (UUID) plus an `x-admin: true` marker
//! on staff traffic. Requests without a usable user header are rejected
//! before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use checkout::Caller;
use domain::UserId;

use crate::error::ApiError;

/// Extractor producing the verified [`Caller`] of a request.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Caller);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?;

        let user_id = uuid::Uuid::parse_str(header)
            .map(UserId::from_uuid)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid x-user-id header: {e}")))?;

        let admin = parts
            .headers
            .get("x-admin")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let caller = if admin {
            Caller::admin(user_id)
        } else {
            Caller::user(user_id)
        };
        Ok(Identity(caller))
    }
}
