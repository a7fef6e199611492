use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{debug, error};

use crate::{
    error::AppError,
    recipes::{
        filter::{RecipeQueryFilter, RecipeUpdate},
        repo::RecipeRepository,
        repo_types::{NewRecipe, RatingSummary, Recipe, RecipeCategory},
    },
    state::AppState,
};

/// Catalogue operations over the recipe store.
///
/// Absent rows and empty listings surface as `NotFound`; other store errors
/// are logged and passed through.
#[derive(Clone)]
pub struct RecipeService {
    recipes: Arc<dyn RecipeRepository>,
}

impl FromRef<AppState> for RecipeService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.recipes.clone())
    }
}

fn logged(op: &'static str) -> impl Fn(AppError) -> AppError {
    move |e| {
        match &e {
            AppError::Database(_) | AppError::Internal(_) => error!(error = %e, op, "store failed"),
            other => debug!(error = %other, op, "store rejected"),
        }
        e
    }
}

impl RecipeService {
    pub fn new(recipes: Arc<dyn RecipeRepository>) -> Self {
        Self { recipes }
    }

    pub async fn create_category(&self, tag: &str) -> Result<RecipeCategory, AppError> {
        self.recipes
            .create_category(tag)
            .await
            .map_err(logged("create_category"))
    }

    pub async fn get_category(&self, category_id: i64) -> Result<RecipeCategory, AppError> {
        self.recipes
            .get_category(category_id)
            .await
            .map_err(logged("get_category"))?
            .ok_or_else(|| {
                debug!(category_id, "category not found");
                AppError::NotFound
            })
    }

    pub async fn list_categories(&self) -> Result<Vec<RecipeCategory>, AppError> {
        let categories = self
            .recipes
            .list_categories()
            .await
            .map_err(logged("list_categories"))?;
        if categories.is_empty() {
            return Err(AppError::NotFound);
        }
        Ok(categories)
    }

    pub async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, AppError> {
        self.recipes
            .create_recipe(recipe)
            .await
            .map_err(logged("create_recipe"))
    }

    pub async fn get_recipe(&self, recipe_id: i64) -> Result<Recipe, AppError> {
        self.recipes
            .get_recipe(recipe_id)
            .await
            .map_err(logged("get_recipe"))?
            .ok_or_else(|| {
                debug!(recipe_id, "recipe not found");
                AppError::NotFound
            })
    }

    pub async fn list_recipes(&self, filter: &RecipeQueryFilter) -> Result<Vec<Recipe>, AppError> {
        let recipes = self
            .recipes
            .list_recipes(filter)
            .await
            .map_err(logged("list_recipes"))?;
        if recipes.is_empty() {
            return Err(AppError::NotFound);
        }
        Ok(recipes)
    }

    pub async fn update_recipe(&self, recipe_id: i64, update: &RecipeUpdate) -> Result<(), AppError> {
        let affected = self
            .recipes
            .update_recipe(recipe_id, update)
            .await
            .map_err(logged("update_recipe"))?;
        if affected == 0 {
            debug!(recipe_id, "update matched no recipe");
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_recipe(&self, recipe_id: i64) -> Result<(), AppError> {
        let affected = self
            .recipes
            .delete_recipe(recipe_id)
            .await
            .map_err(logged("delete_recipe"))?;
        if affected == 0 {
            debug!(recipe_id, "delete matched no recipe");
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn rate_recipe(&self, recipe_id: i64, user_id: i64, rating: i32) -> Result<(), AppError> {
        self.get_recipe(recipe_id).await?;
        self.recipes
            .create_rating(recipe_id, user_id, rating)
            .await
            .map_err(logged("create_rating"))
    }

    pub async fn rating_summary(&self, recipe_id: i64) -> Result<RatingSummary, AppError> {
        self.get_recipe(recipe_id).await?;
        self.recipes
            .rating_summary(recipe_id)
            .await
            .map_err(logged("rating_summary"))
    }
}
