//! Request ID middleware for request tracing and correlation.
//!
//! Every response carries an `x-request-id`. An id supplied by an upstream
//! proxy is reused when it looks like one; anything else (empty, overlong,
//! or containing characters outside `[A-Za-z0-9._-]`) is replaced with a
//! fresh UUID v4 so client input never reaches logs or Sentry tags verbatim.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is kept.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The upstream id if it is safe to log, otherwise `None`.
fn accepted_request_id(raw: &str) -> Option<&str> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    valid.then_some(raw)
}

/// Middleware that ensures every request has a request ID.
///
/// The id is recorded on the `http_request` span, tagged in the Sentry
/// scope, and echoed in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(accepted_request_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
