use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use http::header;
use http::HeaderMap;

use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, attached to request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Administrators can reach any account, everyone else only their own.
    pub fn can_access(&self, user_id: &UserId) -> bool {
        self.role == Role::Admin || self.user_id == *user_id
    }

    pub fn ensure_can_access(&self, user_id: &UserId) -> Result<(), ApiError> {
        if self.can_access(user_id) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                target_user_id = %user_id,
                "Access to another account denied"
            );
            Err(ApiError::Forbidden("Forbidden".to_string()))
        }
    }
}

/// Middleware that validates bearer tokens and adds the caller to request extensions.
///
/// A missing or malformed header is `401`; a token that fails verification is `400`.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        ApiError::BadRequest("Invalid token".to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a user id");
        ApiError::BadRequest("Invalid token".to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    match value.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}

/// Set of roles admitted to a group of routes.
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    allowed: &'static [Role],
}

impl RoleGuard {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub const fn admin() -> Self {
        Self::new(&[Role::Admin])
    }

    pub const fn user() -> Self {
        Self::new(&[Role::User])
    }

    pub const fn any() -> Self {
        Self::new(&[Role::Admin, Role::User])
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

/// Role check; must run inside [`authenticate`].
pub async fn require_role(
    State(guard): State<RoleGuard>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

    if !guard.allows(auth_user.role) {
        tracing::warn!(
            user_id = %auth_user.user_id,
            role = %auth_user.role,
            "Role not permitted for route"
        );
        return Err(ApiError::Forbidden("Forbidden".to_string()));
    }

    Ok(next.run(req).await)
}
