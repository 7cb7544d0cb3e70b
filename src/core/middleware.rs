use crate::core::extractor::Operator;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Decode `Authorization: Basic ...` and return the username when it matches
/// the expected "username:password" pair.
pub fn verify_basic_auth(headers: &HeaderMap, expected: &str) -> Option<String> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?
        .strip_prefix("Basic ")?;

    let decoded = BASE64_STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    if credentials != expected {
        return None;
    }

    credentials
        .split_once(':')
        .map(|(username, _)| username.to_string())
}

fn unauthorized(realm: &str) -> Response {
    let mut response = Response::new(Body::from("Unauthorized"));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, value);
    }
    response
}

/// Basic auth gate for the Swagger UI
pub async fn swagger_auth_middleware(
    State(credentials): State<Arc<String>>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    match verify_basic_auth(req.headers(), &credentials) {
        Some(_) => Ok(next.run(req).await),
        None => Err(unauthorized("Swagger UI")),
    }
}

/// Basic auth gate for the admin API; the matched username becomes the
/// [`Operator`] recorded in activity logs.
pub async fn admin_auth_middleware(
    State(credentials): State<Arc<String>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(username) = verify_basic_auth(req.headers(), &credentials) else {
        tracing::warn!("Rejected admin request: {}", req.uri());
        return Err(unauthorized("Bantuan Keluarga Admin"));
    };

    req.extensions_mut().insert(Operator { username });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = format!("Basic {}", BASE64_STANDARD.encode(value));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&encoded).unwrap());
        headers
    }

    #[test]
    fn test_verify_basic_auth_returns_username() {
        let headers = basic("petugas:rahasia");
        assert_eq!(
            verify_basic_auth(&headers, "petugas:rahasia"),
            Some("petugas".to_string())
        );
    }

    #[test]
    fn test_verify_basic_auth_rejects_wrong_password() {
        let headers = basic("petugas:salah");
        assert_eq!(verify_basic_auth(&headers, "petugas:rahasia"), None);
        assert_eq!(verify_basic_auth(&HeaderMap::new(), "petugas:rahasia"), None);
    }
}
