use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::AccessGrant;
use crate::domain::identity::models::LoginCommand;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = payload?;

    let command = LoginCommand {
        email: body.email,
        password: body.password,
    };

    state
        .identity_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|grant| ApiSuccess::new(StatusCode::OK, grant.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseData {
    pub access_token: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<AccessGrant> for LoginResponseData {
    fn from(grant: AccessGrant) -> Self {
        Self {
            access_token: grant.access_token,
            first_name: grant.first_name,
            last_name: grant.last_name,
        }
    }
}
