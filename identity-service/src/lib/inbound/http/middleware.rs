use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::identity::models::AuthorizedPrincipal;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was refused before reaching a protected handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header at all
    MissingCredential,
    /// Header unreadable, not a bearer token, or the token failed verification
    InvalidCredential,
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::MissingCredential => StatusCode::UNAUTHORIZED,
            AuthRejection::InvalidCredential => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthRejection::MissingCredential => "Access token required",
            AuthRejection::InvalidCredential => "Invalid or expired token",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Resolve the principal carried by the request's bearer token.
///
/// Makes no store calls.
///
/// # Errors
/// * `MissingCredential` - No `Authorization` header
/// * `InvalidCredential` - Header is not `Bearer <token>` or the token is rejected
pub fn authorize_headers(
    headers: &HeaderMap,
    identity_service: &dyn IdentityServicePort,
) -> Result<AuthorizedPrincipal, AuthRejection> {
    let token = extract_token_from_header(headers)?;

    identity_service
        .verify_token(token)
        .map_err(|_| AuthRejection::InvalidCredential)
}

/// Middleware that validates access tokens and adds the principal to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let principal = authorize_headers(req.headers(), state.identity_service.as_ref())?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingCredential)?;

    let auth_str = auth_header.to_str().map_err(|_| {
        tracing::warn!("Authorization header is not valid ASCII");
        AuthRejection::InvalidCredential
    })?;

    match auth_str.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            tracing::warn!("Authorization header is not a bearer token");
            Err(AuthRejection::InvalidCredential)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use auth::Authenticator;
    use auth::Claims;
    use auth::PasswordHasher;
    use axum::body::Body;
    use axum::http::HeaderValue;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::identity::models::UserId;
    use crate::domain::identity::service::IdentityService;
    use crate::outbound::repositories::InMemoryUserRepository;

    const SECRET: &[u8] = b"middleware-test-secret";

    fn authenticator(secret: &[u8]) -> Arc<Authenticator> {
        Arc::new(Authenticator::with_hasher(
            secret,
            chrono::Duration::hours(1),
            PasswordHasher::with_cost(1024, 1, 1).unwrap(),
        ))
    }

    fn state() -> AppState {
        AppState {
            identity_service: Arc::new(IdentityService::new(
                Arc::new(InMemoryUserRepository::new()),
                authenticator(SECRET),
                Duration::from_secs(5),
            )),
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_missing_header_is_missing_credential() {
        let state = state();
        let result = authorize_headers(&HeaderMap::new(), state.identity_service.as_ref());
        assert_eq!(result.unwrap_err(), AuthRejection::MissingCredential);
    }

    #[test]
    fn test_non_bearer_header_is_invalid_credential() {
        let state = state();
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "token"] {
            let result = authorize_headers(&headers(value), state.identity_service.as_ref());
            assert_eq!(result.unwrap_err(), AuthRejection::InvalidCredential);
        }
    }

    #[test]
    fn test_foreign_token_is_invalid_credential() {
        let state = state();
        let token = authenticator(b"some-other-secret")
            .issue_token(Claims::for_user(UserId::new()))
            .unwrap();

        let result = authorize_headers(
            &headers(&format!("Bearer {}", token)),
            state.identity_service.as_ref(),
        );
        assert_eq!(result.unwrap_err(), AuthRejection::InvalidCredential);
    }

    #[test]
    fn test_valid_token_yields_principal() {
        let state = state();
        let user_id = UserId::new();
        let token = authenticator(SECRET)
            .issue_token(Claims::for_user(user_id).with_names("Ann", "Lee"))
            .unwrap();

        let principal = authorize_headers(
            &headers(&format!("Bearer {}", token)),
            state.identity_service.as_ref(),
        )
        .unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.last_name.as_deref(), Some("Lee"));
    }

    fn guarded_router(reached: Arc<AtomicBool>) -> Router {
        let state = state();
        Router::new()
            .route(
                "/protected",
                get(move |axum::Extension(principal): axum::Extension<AuthorizedPrincipal>| {
                    let reached = Arc::clone(&reached);
                    async move {
                        reached.store(true, Ordering::SeqCst);
                        principal.user_id.to_string()
                    }
                }),
            )
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                authenticate,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_rejections_never_reach_handler() {
        let reached = Arc::new(AtomicBool::new(false));

        let response = guarded_router(Arc::clone(&reached))
            .oneshot(
                http::Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = guarded_router(Arc::clone(&reached))
            .oneshot(
                http::Request::builder()
                    .uri("/protected")
                    .header(http::header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_principal() {
        let reached = Arc::new(AtomicBool::new(false));
        let user_id = UserId::new();
        let token = authenticator(SECRET)
            .issue_token(Claims::for_user(user_id))
            .unwrap();

        let response = guarded_router(Arc::clone(&reached))
            .oneshot(
                http::Request::builder()
                    .uri("/protected")
                    .header(http::header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }
}
