use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::AuthorizedPrincipal;
use crate::domain::identity::models::Profile;
use crate::inbound::http::router::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthorizedPrincipal>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    state
        .identity_service
        .get_profile(&principal.user_id)
        .await
        .map_err(ApiError::from)
        .map(|profile| ApiSuccess::new(StatusCode::OK, profile.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseData {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub bio: Option<String>,
}

impl From<Profile> for ProfileResponseData {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            bio: profile.bio,
        }
    }
}
