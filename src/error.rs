use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned by every route when required secrets are missing
pub const CONFIGURATION_ERROR_MESSAGE: &str = "Server configuration error";

/// Body for store, cache and internal failures; details stay in the logs
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body when the weather API cannot be reached
pub const TRANSPORT_ERROR_MESSAGE: &str = "Weather service unavailable";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Weather provider returned status {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code this error is presented with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Transport(_)
            | AppError::Configuration(_)
            | AppError::Database(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let message = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg,
            AppError::Upstream { message, .. } => message,
            AppError::Configuration(_) => CONFIGURATION_ERROR_MESSAGE.to_string(),
            AppError::Transport(_) => TRANSPORT_ERROR_MESSAGE.to_string(),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_forwarded() {
        let err = AppError::Upstream {
            status: StatusCode::NOT_FOUND,
            message: "city not found".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Configuration("RAPIDAPI_KEY".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_configuration_error_hides_details() {
        let (status, body) =
            error_body(AppError::Configuration("RAPIDAPI_KEY missing".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": CONFIGURATION_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_server_errors_hide_driver_messages() {
        for err in [
            AppError::Database(sqlx::Error::PoolTimedOut),
            AppError::Internal("Cache deserialization error: EOF".to_string()),
        ] {
            let (status, body) = error_body(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({ "error": INTERNAL_ERROR_MESSAGE }));
        }
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let validation = AppError::Validation("City parameter is required".to_string());
        let (status, body) = error_body(validation).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "City parameter is required" }));

        let (status, body) = error_body(AppError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            message: "Malformed weather payload: missing main.temp".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Malformed weather payload: missing main.temp");
    }
}
