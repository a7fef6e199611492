use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{debug, error, warn};

use crate::{
    auth::{
        dto::Registration,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserRepository,
        repo_types::NewUser,
    },
    error::AppError,
    state::AppState,
};

/// Sign-up and sign-in on top of the user store, hasher and token service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    keys: Arc<JwtKeys>,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.keys.clone())
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, keys: Arc<JwtKeys>) -> Self {
        Self { users, keys }
    }

    /// Creates the account and returns an access token for it.
    pub async fn register(&self, reg: Registration) -> Result<String, AppError> {
        if let Some(existing) = self.users.find_by_email(&reg.email).await? {
            debug!(user_id = existing.id, "email already registered");
            return Err(AppError::DuplicateUser);
        }

        let password_hash = hash_password(&reg.password).map_err(|e| {
            error!(error = %e, "hash_password failed");
            AppError::Internal(e)
        })?;

        let user = self
            .users
            .create(NewUser {
                role: reg.role,
                email: reg.email,
                password_hash,
                name: reg.name,
                profile_image: reg.profile_image,
            })
            .await
            .map_err(|e| {
                match &e {
                    AppError::DuplicateUser => debug!("duplicate entry on insert"),
                    AppError::InvalidRole => debug!("invalid role on insert"),
                    other => error!(error = %other, "create user failed"),
                }
                e
            })?;

        let token = self.keys.issue(user.role, user.id).map_err(|e| {
            error!(error = %e, user_id = user.id, "jwt sign failed");
            AppError::Internal(e.into())
        })?;
        debug!(user_id = user.id, role = %user.role, "user registered");
        Ok(token)
    }

    /// Every failure before the token is issued collapses to
    /// `InvalidCredential`, so callers cannot probe which emails exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = match self.users.find_by_email(email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                debug!("login unknown email");
                return Err(AppError::InvalidCredential);
            }
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AppError::InvalidCredential);
            }
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = user.id, "login invalid password");
                return Err(AppError::InvalidCredential);
            }
            Err(e) => {
                error!(error = %e, user_id = user.id, "stored hash unreadable");
                return Err(AppError::InvalidCredential);
            }
        }

        let token = self.keys.issue(user.role, user.id).map_err(|e| {
            error!(error = %e, user_id = user.id, "jwt sign failed");
            AppError::Internal(e.into())
        })?;
        debug!(user_id = user.id, "user logged in");
        Ok(token)
    }
}
