use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::authorize_headers;
use crate::inbound::http::router::AppState;

/// Report whether the bearer token on the request is currently valid.
///
/// Unlike the protected routes, failures also carry `valid: false`.
pub async fn verify_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authorize_headers(&headers, state.identity_service.as_ref()) {
        Ok(_) => ApiSuccess::new(
            StatusCode::OK,
            VerifyTokenResponse {
                valid: true,
                error: None,
            },
        )
        .into_response(),
        Err(rejection) => (
            rejection.status(),
            Json(VerifyTokenResponse {
                valid: false,
                error: Some(rejection.message().to_string()),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
