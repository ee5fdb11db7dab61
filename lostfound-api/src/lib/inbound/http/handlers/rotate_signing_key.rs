use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Operator-triggered rotation of the token signing secret.
///
/// Only the new key id is returned; the secret itself never leaves the process.
pub async fn rotate_signing_key(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> ApiSuccess<RotateSigningKeyResponseData> {
    let key_id = state.authenticator.rotate_signing_key();

    tracing::warn!(
        key_id = %key_id,
        rotated_by = %auth_user.user_id,
        "Token signing key rotated"
    );

    ApiSuccess::new(
        StatusCode::OK,
        RotateSigningKeyResponseData {
            key_id,
            message: "Signing key rotated".to_string(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotateSigningKeyResponseData {
    pub key_id: String,
    pub message: String,
}
