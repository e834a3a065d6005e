use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header},
};
use uuid::Uuid;

use crate::{
    entity::members::MemberRole,
    error::{AppError, AuthFailure},
    services::auth_service,
    state::AppState,
};

/// The authenticated caller, passed explicitly into every service call.
#[derive(Debug, Clone)]
pub struct AuthMember {
    pub member_id: Uuid,
    pub email: String,
    pub role: MemberRole,
}

impl AuthMember {
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }
}

pub fn ensure_role(member: &AuthMember, role: MemberRole) -> Result<(), AppError> {
    if member.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(member: &AuthMember) -> Result<(), AppError> {
    ensure_role(member, MemberRole::Admin)
}

/// Raw bearer token of the request, for handlers that act on the token itself.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized(AuthFailure::MissingToken))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized(AuthFailure::InvalidToken))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized(AuthFailure::InvalidToken))
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers).map(|token| BearerToken(token.to_string()))
    }
}

impl FromRequestParts<AppState> for AuthMember {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        auth_service::authenticate(state, token).await
    }
}
