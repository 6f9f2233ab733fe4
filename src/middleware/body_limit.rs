use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use crate::errors::AppError;

/// `RequestBodyLimitLayer` turns away a request whose Content-Length is over
/// the limit with a plain-text 413 before `log_request` runs. This puts that
/// reply into the API's `{error}` shape and logs the rejected request.
pub async fn reject_oversized_body(method: Method, uri: Uri, response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }

    tracing::warn!("{} {}: request body over the size limit", method, uri);
    let response = AppError::PayloadTooLarge.into_response();
    tracing::info!("Response Status: {}", response.status().as_u16());
    response
}
