//! Bearer-token authentication and role checks.
//!
//! Tokens are HS256 JWTs carrying the caller's user id and roles. The
//! [`AuthUser`] extractor resolves a request to a caller identity with a
//! single effective [`Role`]; services call [`AuthUser::require_manager`] and
//! [`AuthUser::require_admin`] before privileged operations.

use crate::config::AppConfig;
use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Caller role, ordered from least to most privileged
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Engineer,
    Manager,
    Admin,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            name: None,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_manager_or_above(&self) -> bool {
        self.role >= Role::Manager
    }

    pub fn require_manager(&self) -> Result<(), ServiceError> {
        if self.is_manager_or_above() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "manager role required, caller is {}",
                self.role
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "admin role required, caller is {}",
                self.role
            )))
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token carries no known role")]
    NoRole,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) => ServiceError::InternalError(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_expiration: Duration,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            issuer: cfg.jwt_issuer.clone(),
            audience: cfg.jwt_audience.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration_secs),
        }
    }
}

/// Issues and validates bearer tokens
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints a token for `user_id` with the given roles
    pub fn issue_token(
        &self,
        user_id: Uuid,
        name: Option<String>,
        roles: &[Role],
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            name,
            roles: roles.iter().map(Role::to_string).collect(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies signature, expiry, issuer and audience, then resolves the caller
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        // Unknown role names are ignored; the highest known role wins.
        let role = claims
            .roles
            .iter()
            .filter_map(|r| Role::from_str(r).ok())
            .max()
            .ok_or(AuthError::NoRole)?;

        Ok(AuthUser {
            user_id,
            name: claims.name,
            role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = Arc::<AuthService>::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

        match auth.validate_token(token) {
            Ok(user) => {
                debug!(user_id = %user.user_id, role = %user.role, "Authenticated request");
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Rejected bearer token");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "unit-test-secret-that-is-at-least-32-bytes".into(),
            issuer: "fieldservice-auth".into(),
            audience: "fieldservice-api".into(),
            token_expiration: Duration::from_secs(600),
        })
    }

    #[test]
    fn role_ordering_and_parsing() {
        assert!(Role::Admin > Role::Manager);
        assert!(Role::Manager > Role::Engineer);
        assert_eq!(Role::from_str("MANAGER").unwrap(), Role::Manager);
        assert_eq!(Role::Engineer.to_string(), "engineer");
    }

    #[test]
    fn issued_token_validates_to_highest_role() {
        let auth = service();
        let user_id = Uuid::new_v4();
        let token = auth
            .issue_token(user_id, Some("Ivanova".into()), &[Role::Engineer, Role::Manager])
            .unwrap();

        let user = auth.validate_token(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Manager);
        assert!(user.require_manager().is_ok());
        assert_matches!(user.require_admin(), Err(ServiceError::Forbidden(_)));
    }

    #[test]
    fn token_without_roles_is_rejected() {
        let auth = service();
        let token = auth.issue_token(Uuid::new_v4(), None, &[]).unwrap();
        assert_matches!(auth.validate_token(&token), Err(AuthError::NoRole));
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let other = AuthService::new(AuthConfig {
            issuer: "someone-else".into(),
            ..service().config.clone()
        });
        let token = other.issue_token(Uuid::new_v4(), None, &[Role::Admin]).unwrap();
        assert_matches!(service().validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn engineer_cannot_act_as_manager() {
        let user = AuthUser::new(Uuid::new_v4(), Role::Engineer);
        let err = user.require_manager().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Forbidden);
    }
}
