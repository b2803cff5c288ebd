use crate::error::VoteError;
use crate::http::error::ApiError;
use crate::service::AppState;
use crate::types::UserId;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

/// Caller identity taken from an `Authorization: Bearer` header.
///
/// A request without the header is anonymous. A header that is malformed or
/// carries an unknown token is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentUser(pub Option<UserId>);

impl CurrentUser {
    /// The user id, or `Unauthorized` for anonymous callers
    pub fn require(self) -> Result<UserId, ApiError> {
        self.0.ok_or_else(|| {
            ApiError(VoteError::Unauthorized {
                reason: "sign in required".to_string(),
            })
        })
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        app: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError(VoteError::Unauthorized {
                    reason: "expected a bearer token".to_string(),
                })
            })?;

        let user = app.voting().authenticate(Some(token)).await?;
        Ok(CurrentUser(user))
    }
}
