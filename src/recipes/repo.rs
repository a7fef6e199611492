use async_trait::async_trait;
use sqlx::{error::ErrorKind, PgPool};
use tracing::debug;

use crate::{
    db::violation_kind,
    error::AppError,
    recipes::{
        filter::{
            bind_query, bind_query_as, build_list_query, build_update_query, RecipeQueryFilter,
            RecipeUpdate,
        },
        repo_types::{NewRecipe, RatingSummary, Recipe, RecipeCategory},
    },
};

const RECIPE_COLUMNS: &str = "recipe_id, category_id, title, header, image_preview, description, \
     estimated_time_minutes, recipe_ingredients, created_at, updated_at";

/// Persistence for categories, recipes and ratings.
///
/// Lookups return `Ok(None)` for a missing row; `update_recipe` and
/// `delete_recipe` return the number of affected rows.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn create_category(&self, tag: &str) -> Result<RecipeCategory, AppError>;
    async fn get_category(&self, category_id: i64) -> Result<Option<RecipeCategory>, AppError>;
    async fn list_categories(&self) -> Result<Vec<RecipeCategory>, AppError>;

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, AppError>;
    async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, AppError>;
    async fn list_recipes(&self, filter: &RecipeQueryFilter) -> Result<Vec<Recipe>, AppError>;
    async fn update_recipe(&self, recipe_id: i64, update: &RecipeUpdate) -> Result<u64, AppError>;
    async fn delete_recipe(&self, recipe_id: i64) -> Result<u64, AppError>;

    /// A second rating by the same user yields `Conflict`.
    async fn create_rating(&self, recipe_id: i64, user_id: i64, rating: i32)
        -> Result<(), AppError>;
    async fn rating_summary(&self, recipe_id: i64) -> Result<RatingSummary, AppError>;
}

#[derive(Clone)]
pub struct PgRecipeRepository {
    db: PgPool,
}

impl PgRecipeRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn unknown_category(e: sqlx::Error) -> AppError {
    match violation_kind(&e) {
        Some(ErrorKind::ForeignKeyViolation) => AppError::BadRequest("unknown category".into()),
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn create_category(&self, tag: &str) -> Result<RecipeCategory, AppError> {
        let mut tx = self.db.begin().await?;
        let inserted = sqlx::query_as::<_, RecipeCategory>(
            r#"
            INSERT INTO recipe_categories (category_tag)
            VALUES ($1)
            RETURNING category_id, category_tag
            "#,
        )
        .bind(tag)
        .fetch_one(&mut *tx)
        .await;

        let category = match inserted {
            Ok(c) => c,
            Err(e) => {
                tx.rollback().await?;
                return Err(match violation_kind(&e) {
                    Some(ErrorKind::UniqueViolation) => {
                        AppError::Conflict("category already exists".into())
                    }
                    _ => AppError::Database(e),
                });
            }
        };
        tx.commit().await?;

        debug!(category_id = category.category_id, "category created");
        Ok(category)
    }

    async fn get_category(&self, category_id: i64) -> Result<Option<RecipeCategory>, AppError> {
        let category = sqlx::query_as::<_, RecipeCategory>(
            "SELECT category_id, category_tag FROM recipe_categories WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<RecipeCategory>, AppError> {
        let categories = sqlx::query_as::<_, RecipeCategory>(
            "SELECT category_id, category_tag FROM recipe_categories ORDER BY category_id",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(categories)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, AppError> {
        let mut tx = self.db.begin().await?;
        let sql = format!(
            "INSERT INTO recipes (category_id, title, header, image_preview, description, \
             estimated_time_minutes, recipe_ingredients, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now()) \
             RETURNING {RECIPE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Recipe>(&sql)
            .bind(recipe.category_id)
            .bind(&recipe.title)
            .bind(&recipe.header)
            .bind(&recipe.image_preview)
            .bind(&recipe.description)
            .bind(recipe.estimated_time_minutes)
            .bind(sqlx::types::Json(&recipe.recipe_ingredients))
            .fetch_one(&mut *tx)
            .await;

        let created = match inserted {
            Ok(r) => r,
            Err(e) => {
                tx.rollback().await?;
                return Err(unknown_category(e));
            }
        };
        tx.commit().await?;

        debug!(recipe_id = created.recipe_id, "recipe created");
        Ok(created)
    }

    async fn get_recipe(&self, recipe_id: i64) -> Result<Option<Recipe>, AppError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE recipe_id = $1");
        let recipe = sqlx::query_as::<_, Recipe>(&sql)
            .bind(recipe_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(recipe)
    }

    async fn list_recipes(&self, filter: &RecipeQueryFilter) -> Result<Vec<Recipe>, AppError> {
        let built = build_list_query(filter);
        debug!(sql = %built.sql, args = built.args.len(), "listing recipes");
        let recipes = bind_query_as(sqlx::query_as::<_, Recipe>(&built.sql), built.args)
            .fetch_all(&self.db)
            .await?;
        Ok(recipes)
    }

    async fn update_recipe(&self, recipe_id: i64, update: &RecipeUpdate) -> Result<u64, AppError> {
        let built = build_update_query(recipe_id, update);
        debug!(sql = %built.sql, recipe_id, "updating recipe");
        let result = bind_query(sqlx::query(&built.sql), built.args)
            .execute(&self.db)
            .await
            .map_err(unknown_category)?;
        Ok(result.rows_affected())
    }

    async fn delete_recipe(&self, recipe_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn create_rating(
        &self,
        recipe_id: i64,
        user_id: i64,
        rating: i32,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO recipe_ratings (recipe_id, user_id, recipe_rating, created_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .bind(rating)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            tx.rollback().await?;
            return Err(match violation_kind(&e) {
                Some(ErrorKind::UniqueViolation) => {
                    AppError::Conflict("recipe already rated by this user".into())
                }
                // recipe removed between the existence check and the insert
                Some(ErrorKind::ForeignKeyViolation) => AppError::NotFound,
                _ => AppError::Database(e),
            });
        }
        tx.commit().await?;

        debug!(recipe_id, user_id, rating, "rating stored");
        Ok(())
    }

    async fn rating_summary(&self, recipe_id: i64) -> Result<RatingSummary, AppError> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT COALESCE(AVG(recipe_rating)::float8, 0) AS average_rating,
                   COUNT(*) AS rating_count
            FROM recipe_ratings
            WHERE recipe_id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_one(&self.db)
        .await?;
        Ok(summary)
    }
}
