use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::AuthorizedPrincipal;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::PersonName;
use crate::domain::identity::models::Profile;
use crate::domain::identity::models::UpdateProfileCommand;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating the caller's profile (raw JSON)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, IdentityError> {
        // Validation errors convert via #[from]
        Ok(UpdateProfileCommand {
            first_name: PersonName::first_name(self.first_name)?,
            last_name: PersonName::last_name(self.last_name)?,
            email: EmailAddress::new(self.email)?,
            bio: self.bio,
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: UpdatedUserData,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUserData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
}

impl From<Profile> for UpdateProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            message: "Profile updated successfully".to_string(),
            user: UpdatedUserData {
                first_name: profile.first_name,
                last_name: profile.last_name,
                email: profile.email,
                bio: profile.bio,
            },
        }
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthorizedPrincipal>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiSuccess<UpdateProfileResponse>, ApiError> {
    let Json(req) = payload?;
    let command = req.try_into_command()?;

    state
        .identity_service
        .update_profile(&principal.user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}
