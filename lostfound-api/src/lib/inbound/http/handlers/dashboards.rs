use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::Role;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn admin_dashboard() -> ApiSuccess<MessageData> {
    ApiSuccess::new(StatusCode::OK, MessageData::new("Welcome to Admin Dashboard"))
}

pub async fn user_dashboard(
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> ApiSuccess<MessageData> {
    ApiSuccess::new(
        StatusCode::OK,
        MessageData::new(format!(
            "Hello {}: Welcome to User Dashboard",
            auth_user.role
        )),
    )
}

pub async fn profile(
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> ApiSuccess<ProfileResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        ProfileResponseData {
            message: "Welcome to your profile".to_string(),
            user: ProfileUserData {
                id: auth_user.user_id.to_string(),
                email: auth_user.email,
                role: auth_user.role,
            },
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub message: String,
    pub user: ProfileUserData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUserData {
    pub id: String,
    pub email: String,
    pub role: Role,
}
