//! Security Middleware Module
//!
//! Axum middleware for authentication and security headers.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::api::app_state::AppState;
use crate::error::{AppError, ErrorResponse};
use crate::security::auth::Credentials;
use crate::security::rbac::Principal;

/// Extension trait for reading the caller identity from a request
pub trait RequestPrincipalExt {
    fn principal(&self) -> Option<&Principal>;
    fn set_principal(&mut self, principal: Principal);
}

impl RequestPrincipalExt for Request<Body> {
    fn principal(&self) -> Option<&Principal> {
        self.extensions().get::<Principal>()
    }

    fn set_principal(&mut self, principal: Principal) {
        self.extensions_mut().insert(principal);
    }
}

/// Authentication middleware
///
/// Resolves the credentials once and stores the resulting [`Principal`] as a
/// request extension. Unauthenticated requests never reach a handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credentials = extract_credentials(&req);
    if credentials.is_empty() {
        return Err(AppError::Authentication(
            "Missing Authorization or X-API-Key header".to_string(),
        ));
    }

    let principal = state.authenticator.authenticate(&credentials).await?;
    debug!("Authenticated {} as {}", principal.user_id, principal.role);

    req.set_principal(principal);
    Ok(next.run(req).await)
}

/// Extract credentials from request headers
pub fn extract_credentials(req: &Request<Body>) -> Credentials {
    if let Some(auth_str) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        let credentials = Credentials::from_authorization_header(Some(auth_str));
        if !credentials.is_empty() {
            return credentials;
        }
    }

    if let Some(key) = req
        .headers()
        .get("X-API-Key")
        .and_then(|value| value.to_str().ok())
    {
        return Credentials::new(Some(key.trim().to_string()), None);
    }

    Credentials::default()
}

/// Header carrying the per-request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Stamp the request ID into JSON error bodies
///
/// Runs inside `SetRequestIdLayer`, so the header is already present on the
/// request. Successful responses pass through untouched.
pub async fn request_id_middleware(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(req).await;

    let (Some(request_id), Some(error)) = (
        request_id,
        response.extensions_mut().remove::<ErrorResponse>(),
    ) else {
        return response;
    };

    match serde_json::to_vec(&error.with_request_id(&request_id)) {
        Ok(bytes) => {
            response.headers_mut().remove(header::CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => debug!("Failed to stamp request id {}: {}", request_id, e),
    }
    response
}

/// Security headers middleware
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
    // Health data must not land in shared caches
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(name: &str, value: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_header_wins() {
        let creds = extract_credentials(&request_with("Authorization", "Bearer tok"));
        assert_eq!(creds.jwt_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_x_api_key_header() {
        let creds = extract_credentials(&request_with("X-API-Key", "dev-patient-key"));
        assert_eq!(creds.api_key.as_deref(), Some("dev-patient-key"));
    }

    #[test]
    fn test_no_credentials() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert!(extract_credentials(&req).is_empty());
    }

    fn stamped_router() -> axum::Router {
        axum::Router::new()
            .route(
                "/missing",
                axum::routing::get(|| async {
                    Err::<(), AppError>(AppError::NotFound("patient".to_string()))
                }),
            )
            .route("/ok", axum::routing::get(|| async { "fine" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_request_id_is_stamped_into_error_body() {
        use tower::ServiceExt;

        let req = Request::builder()
            .uri("/missing")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();
        let response = stamped_router().oneshot(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.request_id.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn test_success_passes_through_untouched() {
        use tower::ServiceExt;

        let req = Request::builder()
            .uri("/ok")
            .header(REQUEST_ID_HEADER, "req-43")
            .body(Body::empty())
            .unwrap();
        let response = stamped_router().oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
