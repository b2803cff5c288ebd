use crate::error::VoteError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// HTTP wrapper around [`VoteError`]
#[derive(Debug)]
pub struct ApiError(pub VoteError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            VoteError::NotFound { .. } => StatusCode::NOT_FOUND,
            VoteError::InvalidPair { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            VoteError::Validation { .. } => StatusCode::BAD_REQUEST,
            VoteError::Conflict { .. } => StatusCode::CONFLICT,
            VoteError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            VoteError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            VoteError::Forbidden { .. } => StatusCode::FORBIDDEN,
            VoteError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match &self.0 {
            VoteError::Configuration { .. } => {
                tracing::error!("Internal error: {}", self.0);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": message,
            "kind": self.0.kind(),
            "retryable": self.0.is_retryable(),
        });

        (status_code, Json(body)).into_response()
    }
}

impl From<VoteError> for ApiError {
    fn from(error: VoteError) -> Self {
        Self(error)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (VoteError::not_found("entity", 1), StatusCode::NOT_FOUND),
            (VoteError::invalid_pair("same"), StatusCode::UNPROCESSABLE_ENTITY),
            (VoteError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                VoteError::Conflict {
                    message: "busy".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                VoteError::Unavailable {
                    message: "timeout".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                VoteError::Unauthorized {
                    reason: "no".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                VoteError::Forbidden {
                    reason: "private".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).status_code(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError(VoteError::Conflict {
            message: "version moved".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "conflict");
        assert_eq!(body["retryable"], true);
        assert_eq!(body["error"], "Concurrent update conflict: version moved");
    }
}
