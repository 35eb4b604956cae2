use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures a caller can act on. Everything else travelling through
/// `anyhow` is treated as an internal error.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),
}

pub type ApiError = (StatusCode, Json<Value>);

/// Map a service error to the JSON error tuple returned by handlers.
pub fn api_error(e: anyhow::Error) -> ApiError {
    let status = match e.downcast_ref::<ServiceError>() {
        Some(ServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
        None => {
            tracing::error!("Request failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let (status, _) = api_error(ServiceError::Validation("bad servings".into()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = api_error(ServiceError::NotFound("Dish 'x'".into()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["error"], "Dish 'x' not found");

        let (status, _) = api_error(anyhow::anyhow!("connection reset"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
