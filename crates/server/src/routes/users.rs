//! Profile route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tallybook_core::UserId;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::{ProfileUpdate, UserService};
use crate::state::AppState;

/// Body of `PUT /user/me`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub locale: Option<String>,
}

/// Public view of an account.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub locale: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
            name: user.name,
            locale: user.locale,
        }
    }
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(body: UpdateProfileRequest) -> Self {
        Self {
            name: body.name,
            email: body.email,
            password: body.password,
            locale: body.locale,
        }
    }
}

/// GET /user/me
pub async fn me(RequireUser(user): RequireUser) -> Json<ProfileResponse> {
    Json(user.into())
}

/// PUT /user/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let updated = UserService::new(state.pool())
        .update(&user, &body.into())
        .await?;
    Ok(Json(updated.into()))
}
