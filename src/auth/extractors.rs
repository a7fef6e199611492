use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::UserRepository,
        repo_types::{Role, User},
    },
    error::AppError,
    state::AppState,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the request's bearer token to a persisted user.
///
/// Every failure collapses to `AppError::Forbidden`; the cause is only logged.
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    keys: &JwtKeys,
    users: &dyn UserRepository,
) -> Result<User, AppError> {
    let Some(auth) = headers.get(AUTHORIZATION) else {
        warn!("auth rejected: missing Authorization header");
        return Err(AppError::Forbidden);
    };
    let Ok(auth) = auth.to_str() else {
        warn!("auth rejected: non-ascii Authorization header");
        return Err(AppError::Forbidden);
    };
    let Some(token) = auth.strip_prefix(BEARER_PREFIX) else {
        warn!("auth rejected: not a bearer token");
        return Err(AppError::Forbidden);
    };

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "auth rejected: token verification failed");
        AppError::Forbidden
    })?;

    let Some(user_id) = claims.user_id() else {
        warn!(jti = %claims.jti, "auth rejected: non-numeric token id");
        return Err(AppError::Forbidden);
    };

    let user = match users.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(user_id, "auth rejected: user does not exist");
            return Err(AppError::Forbidden);
        }
        Err(e) => {
            warn!(error = %e, user_id, "auth rejected: user lookup failed");
            return Err(AppError::Forbidden);
        }
    };

    // A token stays cryptographically valid after an out-of-band role change.
    if user.role.as_str() != claims.sub {
        warn!(user_id, token_role = %claims.sub, role = %user.role, "auth rejected: role mismatch");
        return Err(AppError::Forbidden);
    }

    Ok(user)
}

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        let user = authenticate(&parts.headers, &state.keys, state.users.as_ref()).await?;
        let current = CurrentUser(user);
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Authenticated user holding the ADMIN role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            warn!(user_id = user.id, role = %user.role, "admin route rejected");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
