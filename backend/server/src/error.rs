use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clicker::store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Click processing failed")]
    ClickFailed(#[source] StoreError),

    #[error("Unable to fetch user stats")]
    StatsFailed(#[source] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::ClickFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StatsFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::MalformedPayload.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ClickFailed(StoreError::Corrupted("bad".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_generic_message_hides_cause() {
        let error = AppError::StatsFailed(StoreError::Corrupted("totalScore".into()));

        assert_eq!(error.to_string(), "Unable to fetch user stats");
    }
}
