use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::required;
use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Profile;
use crate::domain::user::models::SignupCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Public registration. Always creates a `user` account and never returns a
/// token; the client logs in separately.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let Json(body) = payload?;

    state.user_service.signup(body.try_into_command()?).await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        MessageData::new("User created successfully"),
    ))
}

/// HTTP request body for signup (raw JSON). Fields are optional here so a
/// missing one is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupRequest {
    username: Option<String>,
    email: Option<String>,
    location: Option<String>,
    country: Option<String>,
    gender: Option<String>,
    password: Option<String>,
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, UserError> {
        let username = Username::new(required(self.username, "username")?)?;
        let email = EmailAddress::new(required(self.email, "email")?)?;
        let profile = Profile {
            location: required(self.location, "location")?,
            country: required(self.country, "country")?,
            gender: required(self.gender, "gender")?,
        };
        let password = Password::new(required(self.password, "password")?);

        Ok(SignupCommand {
            username,
            email,
            password,
            profile,
        })
    }
}
