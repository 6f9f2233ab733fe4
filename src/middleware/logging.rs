use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crate::errors::AppError;

/// Logs every request (method, path, headers, body) before it reaches the
/// handlers, then the status code of the response they produced.
pub async fn log_request(req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();

    // The body limit layer sits outside this one, so buffering is bounded.
    // Bodies without a Content-Length only hit the limit here.
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("{} {}: failed to read body: {}", parts.method, parts.uri, e);
            let response = AppError::PayloadTooLarge.into_response();
            tracing::info!("Response Status: {}", response.status().as_u16());
            return response;
        }
    };

    tracing::info!("{} {}", parts.method, parts.uri);
    tracing::info!("Request Headers: {:?}", redacted_headers(&parts.headers));
    tracing::info!("Request Body: {}", String::from_utf8_lossy(&bytes));

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;
    tracing::info!("Response Status: {}", response.status().as_u16());
    response
}

fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == header::AUTHORIZATION {
                "[redacted]".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn authorization_is_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let logged = redacted_headers(&headers);
        assert!(logged.contains(&("authorization".to_string(), "[redacted]".to_string())));
        assert!(logged.contains(&("content-type".to_string(), "application/json".to_string())));
    }
}
