use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepository, UserRepository},
    },
    config::AppConfig,
    db,
    recipes::repo::{PgRecipeRepository, RecipeRepository},
};

/// Shared, read-only application state. Handlers reach the services through
/// `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: Arc<JwtKeys>,
    pub users: Arc<dyn UserRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
}

impl AppState {
    /// Connects the pool and wires the Postgres repositories. The pool is
    /// returned as well so the caller can run migrations on it.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let pool = db::connect(&config.database_url, &config.pool).await?;
        let keys = Arc::new(JwtKeys::from_config(&config.jwt));

        let users = Arc::new(PgUserRepository::new(pool.clone())) as Arc<dyn UserRepository>;
        let recipes = Arc::new(PgRecipeRepository::new(pool.clone())) as Arc<dyn RecipeRepository>;

        Ok((Self::from_parts(Arc::new(config), keys, users, recipes), pool))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        keys: Arc<JwtKeys>,
        users: Arc<dyn UserRepository>,
        recipes: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            config,
            keys,
            users,
            recipes,
        }
    }
}
