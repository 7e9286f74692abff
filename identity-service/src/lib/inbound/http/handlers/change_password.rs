use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::models::AuthorizedPrincipal;
use crate::domain::identity::models::ChangePasswordCommand;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthorizedPrincipal>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<ApiSuccess<ChangePasswordResponse>, ApiError> {
    let Json(body) = payload?;
    let command = body.try_into_command().map_err(IdentityError::from)?;

    state
        .identity_service
        .change_password(&principal.user_id, command)
        .await
        .map_err(|e| match e {
            // 400 on this route, not 401
            IdentityError::InvalidCredentials => {
                ApiError::BadRequest("Current password is incorrect".to_string())
            }
            _ => ApiError::from(e),
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ChangePasswordResponse {
            message: "Password changed successfully".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
}

impl ChangePasswordRequest {
    fn try_into_command(self) -> Result<ChangePasswordCommand, PasswordPolicyError> {
        ChangePasswordCommand::new(self.current_password, self.new_password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePasswordResponse {
    pub message: String,
}
