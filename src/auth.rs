//! Admin authentication.
//!
//! Admin routes take an [`AdminUser`] argument; extraction fails with 401
//! unless the request carries one of the configured admin API keys.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::warn;

use crate::error::AppError;

#[derive(Clone)]
pub struct AuthState {
    /// Valid admin keys. Empty means nobody is an admin.
    pub api_keys: Arc<Vec<String>>,
}

impl AuthState {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
        }
    }

    pub fn validate_key(&self, key: &str) -> bool {
        !key.is_empty() && self.api_keys.iter().any(|k| k == key)
    }
}

/// Proof that the caller authenticated as an admin.
#[derive(Debug)]
pub struct AdminUser;

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthState::from_ref(state);

        // Supports "Bearer <key>" or just "<key>"
        let api_key = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim());

        match api_key {
            Some(key) if auth.validate_key(key) => Ok(AdminUser),
            _ => {
                warn!(path = %parts.uri.path(), "rejected admin request");
                Err(AppError::access_prohibited())
            }
        }
    }
}
