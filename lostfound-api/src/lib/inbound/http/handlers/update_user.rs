use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for updating a user (raw JSON)
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        let username = self.username.map(Username::new).transpose()?;
        let email = self.email.map(EmailAddress::new).transpose()?;
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;

        let password = match self.password {
            Some(p) if p.trim().is_empty() => return Err(UserError::MissingField("password")),
            other => other.map(Password::new),
        };

        Ok(UpdateUserCommand {
            username,
            email,
            password,
            role,
            location: self.location,
            country: self.country,
            gender: self.gender,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    auth_user.ensure_can_access(&user_id)?;

    let Json(body) = payload?;
    let command = body.try_into_command()?;

    if command.role.is_some() && auth_user.role != Role::Admin {
        tracing::warn!(user_id = %auth_user.user_id, "Role change attempted by non-admin");
        return Err(ApiError::Forbidden(
            "Only administrators can change roles".to_string(),
        ));
    }

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
