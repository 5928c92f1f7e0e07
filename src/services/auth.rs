//! Signup, signin and current-user lookup.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::auth::password;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::entities::users;
use crate::id::SnowflakeGenerator;
use crate::services::{ServiceError, now_rfc3339};

/// A freshly authenticated user together with their bearer token.
pub struct AuthenticatedUser {
    pub user: users::Model,
    pub access_token: String,
}

pub struct AuthService {
    store: Store,
    ids: Arc<SnowflakeGenerator>,
    tokens: Arc<TokenService>,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        ids: Arc<SnowflakeGenerator>,
        tokens: Arc<TokenService>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            ids,
            tokens,
            security,
        }
    }

    pub async fn signup(
        &self,
        name: Option<String>,
        email: &str,
        password_plain: &str,
    ) -> Result<AuthenticatedUser, ServiceError> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(ServiceError::Validation(
                "A valid email is required".to_string(),
            ));
        }
        if password_plain.is_empty() {
            return Err(ServiceError::Validation("Password is required".to_string()));
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash =
            password::hash_async(password_plain.to_string(), self.security.clone()).await?;

        let id = self.ids.generate();
        let now = now_rfc3339();
        let user = self
            .store
            .create_user(id, name, email, &password_hash, &now)
            .await?;

        let access_token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to issue token: {e}")))?;

        tracing::info!(user_id = user.id, "User signed up");

        Ok(AuthenticatedUser { user, access_token })
    }

    pub async fn signin(
        &self,
        email: &str,
        password_plain: &str,
    ) -> Result<AuthenticatedUser, ServiceError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let is_valid = password::verify_async(
            password_plain.to_string(),
            user.password_hash.clone(),
        )
        .await?;

        if !is_valid {
            return Err(ServiceError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to issue token: {e}")))?;

        Ok(AuthenticatedUser { user, access_token })
    }

    /// Resolves a verified token's user ID to the stored user.
    pub async fn current_user(&self, user_id: i64) -> Result<users::Model, ServiceError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::UnknownUser)
    }
}
