use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use crate::errors::AppError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredential | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Every failure leaves the API as `{"error": "<message>"}`
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{StoreError, TaskError};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn auth_errors_are_distinguishable() {
        let missing = AppError::Unauthenticated.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(missing).await, json!({ "error": "Unauthorized" }));

        let invalid = AppError::InvalidCredential.into_response();
        assert_eq!(invalid.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(invalid).await, json!({ "error": "Invalid token" }));
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let parse_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = TaskError::Store(StoreError::Serialization(parse_err));
        let response = AppError::from_task(err, "Failed to fetch todos").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "Failed to fetch todos" }));
    }

    #[test]
    fn task_errors_map_to_status_codes() {
        let cases = [
            (TaskError::Invalid("title is required".into()), StatusCode::BAD_REQUEST),
            (TaskError::NotFound("a".into()), StatusCode::NOT_FOUND),
            (TaskError::Forbidden("a".into()), StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from_task(err, "ctx").status_code(), status);
        }
    }
}
