//! API Middleware
//!
//! Session cookie handling and request logging.

use axum::{
    body::Body,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, Request,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;
use crate::session::SessionId;

/// Cookie that carries the session id
pub const SESSION_COOKIE: &str = "atm_session";

const REQUEST_ID_HEADER: &str = "x-request-id";

// =========================================================================
// Session Middleware
// =========================================================================

/// Attach the caller's `SessionId` and an `OperationContext` to the request.
///
/// Requests without a usable session cookie get a fresh id, sent back in
/// `Set-Cookie`.
pub async fn session_middleware(mut request: Request<Body>, next: Next) -> Response {
    let (session, issued) = match session_from_headers(request.headers()) {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    };

    let correlation_id = request_id(request.headers()).unwrap_or_else(Uuid::new_v4);
    let context = OperationContext::new().with_correlation_id(correlation_id);

    request.extensions_mut().insert(session);
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if issued {
        tracing::debug!(session_id = %session, "Issued new session");
        if let Ok(value) = HeaderValue::from_str(&session_cookie(session)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// Read the session id from the `Cookie` headers
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value binding the client to a session
pub fn session_cookie(session: SessionId) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session)
}

/// `Set-Cookie` value telling the client to forget its session
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn request_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();

    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = request_id(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        version = ?version,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
