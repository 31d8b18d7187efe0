use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use crates::domain::value_objects::enums::user_roles::UserRole;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{config::config_loader, usecases::errors::UseCaseError};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: String,
    /// Supabase session role (`authenticated`, `service_role`), not the marketplace role.
    pub role: String,
    pub aud: String,
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl AuthUser {
    pub fn has_role(&self, allowed: &[UserRole]) -> bool {
        self.role.is_some_and(|role| allowed.contains(&role))
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> Result<UserRole, UseCaseError> {
        if let Some(role) = self.role.filter(|_| self.has_role(allowed)) {
            return Ok(role);
        }
        warn!(
            user_id = %self.user_id,
            role = ?self.role,
            allowed = ?allowed,
            "auth: role not permitted for this action"
        );
        Err(UseCaseError::Forbidden(
            "You are not allowed to perform this action".to_string(),
        ))
    }
}

pub fn decode_supabase_jwt(token: &str, secret: &str) -> anyhow::Result<SupabaseClaims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.set_audience(&["authenticated", "service_role"]);

    let token_data = decode::<SupabaseClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

pub fn validate_supabase_jwt(token: &str) -> anyhow::Result<SupabaseClaims> {
    let secret = config_loader::get_supabase_jwt_secret()?;
    decode_supabase_jwt(token, &secret)
}

impl TryFrom<SupabaseClaims> for AuthUser {
    type Error = UseCaseError;

    fn try_from(claims: SupabaseClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| UseCaseError::Unauthenticated("Invalid user ID in token".to_string()))?;

        let role = claims
            .user_metadata
            .role
            .as_deref()
            .and_then(UserRole::from_str);

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = UseCaseError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or_else(|| {
                UseCaseError::Unauthenticated("Missing Authorization header".to_string())
            })?;

        let auth_str = auth_header.to_str().map_err(|_| {
            UseCaseError::Unauthenticated("Invalid Authorization header".to_string())
        })?;

        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            UseCaseError::Unauthenticated("Invalid Authorization header format".to_string())
        })?;

        let claims = validate_supabase_jwt(token).map_err(|err| {
            warn!(error = %err, "auth: rejected bearer token");
            UseCaseError::Unauthenticated("Invalid or expired token".to_string())
        })?;

        AuthUser::try_from(claims)
    }
}

#[cfg(test)]
mod tests;
