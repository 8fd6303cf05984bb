//! Request correlation ids.
//!
//! One id per request, attached to the tracing span, the Sentry scope, and
//! the response headers. A single header value from a user's bug report is
//! enough to find the matching log lines and Sentry event.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the correlation id, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound id reused as-is; anything bigger gets replaced.
const MAX_INBOUND_ID_LEN: usize = 64;

/// Attach a correlation id to the request's span, the Sentry scope, and the
/// response.
///
/// An id minted by an upstream proxy is reused so the correlation chain
/// stays intact across hops. Requests arriving without one, or with a value
/// that is oversized or not printable ASCII, get a fresh UUID v4 instead.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = inbound_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

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

/// The proxy-supplied id, if it is usable as-is.
fn inbound_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    if raw.is_empty() || raw.len() > MAX_INBOUND_ID_LEN {
        return None;
    }
    if !raw.bytes().all(|b| b.is_ascii_graphic()) {
        return None;
    }
    Some(raw.to_owned())
}
