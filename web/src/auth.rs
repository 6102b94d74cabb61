//! Authentication extractors.
//!
//! Session issuance lives in an external identity provider; this module
//! only consumes it through the [`SessionProvider`] boundary, which turns
//! a bearer token into an authenticated `{user_id, role}` identity.
//! Extractors follow the bearer-token / session-user / admin chain:
//!
//! ```rust,ignore
//! async fn my_tickets(user: AuthUser, ...) -> Result<Json<...>, AppError> {
//!     // user.user_id is guaranteed valid
//! }
//!
//! async fn dashboard(admin: RequireAdmin, ...) -> Result<Json<...>, AppError> {
//!     // admin.0.role is guaranteed Admin
//! }
//! ```

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use eventease_core::types::UserId;
use eventease_core::user::UserRole;
use std::collections::HashMap;
use std::sync::RwLock;

/// Authenticated identity resolved from a session token.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// The authenticated user.
    pub user_id: UserId,
    /// Role attached to the session.
    pub role: UserRole,
}

/// External session-provider boundary.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolves a bearer token to an identity, or `None` for an unknown or
    /// expired token.
    async fn resolve(&self, token: &str) -> Option<Identity>;
}

/// Static token table for development and tests.
///
/// Tokens are registered up front (or parsed from the
/// `AUTH_STATIC_TOKENS` spec: `token=uuid:role` comma-separated).
#[derive(Default)]
pub struct StaticTokenSessions {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl StaticTokenSessions {
    /// Creates an empty token table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token for an identity.
    pub fn register(&self, token: impl Into<String>, identity: Identity) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), identity);
        }
    }

    /// Parses a `token=uuid:role` comma-separated spec, skipping malformed
    /// entries.
    #[must_use]
    pub fn from_spec(spec: &str) -> Self {
        let sessions = Self::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((token, rest)) = part.split_once('=') else {
                continue;
            };
            let Some((uuid, role)) = rest.split_once(':') else {
                continue;
            };
            let Ok(uuid) = uuid.parse() else {
                continue;
            };
            let role = match role {
                "admin" => UserRole::Admin,
                _ => UserRole::User,
            };
            sessions.register(
                token,
                Identity {
                    user_id: UserId::from_uuid(uuid),
                    role,
                },
            );
        }
        sessions
    }
}

#[async_trait]
impl SessionProvider for StaticTokenSessions {
    async fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens.read().ok()?.get(token).copied()
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .to_string();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token))
    }
}

/// Authenticated user. Use as a handler parameter to require a valid
/// session.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let identity = state
            .sessions
            .resolve(&bearer.0)
            .await
            .ok_or_else(|| AppError::unauthorized("Invalid or expired session token"))?;
        Ok(Self(identity))
    }
}

/// Authenticated admin. Use as a handler parameter to require the admin
/// role.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.role != UserRole::Admin {
            return Err(AppError::forbidden("Admin role required"));
        }
        Ok(Self(identity))
    }
}
