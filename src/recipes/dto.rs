use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppError,
    recipes::{
        filter::{RecipeQueryFilter, RecipeUpdate, DEFAULT_LIMIT, DEFAULT_OFFSET},
        repo_types::{NewRecipe, Recipe, RecipeCategory},
    },
};

fn char_len_within(value: &str, min: usize, max: usize) -> bool {
    let n = value.chars().count();
    n >= min && n <= max
}

/// Path ids must be positive integers.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidId),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub category_tag: String,
}

impl CreateCategoryRequest {
    pub fn validate(self) -> Result<String, AppError> {
        let tag = self.category_tag.trim().to_string();
        if !char_len_within(&tag, 3, 60) {
            return Err(AppError::BadRequest(
                "category_tag must be between 3 and 60 characters".into(),
            ));
        }
        Ok(tag)
    }
}

/// Request body for a new recipe. Missing fields fall to their zero value and
/// are rejected by `validate`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub header: String,
    pub image_preview: String,
    pub description: Option<String>,
    pub recipe_ingredients: Option<Value>,
    pub category_id: i64,
    pub estimated_time_minutes: i32,
}

impl CreateRecipeRequest {
    pub fn validate(self) -> Result<NewRecipe, AppError> {
        if !char_len_within(&self.title, 6, 60) {
            return Err(AppError::BadRequest(
                "title must be between 6 and 60 characters".into(),
            ));
        }
        if self.header.is_empty() {
            return Err(AppError::BadRequest("header is required".into()));
        }
        if self.image_preview.is_empty() {
            return Err(AppError::BadRequest("image_preview is required".into()));
        }
        let Some(recipe_ingredients) = self.recipe_ingredients.filter(|v| !v.is_null()) else {
            return Err(AppError::BadRequest("recipe_ingredients is required".into()));
        };
        if self.category_id < 1 {
            return Err(AppError::BadRequest("category_id must be at least 1".into()));
        }
        if self.estimated_time_minutes < 3 {
            return Err(AppError::BadRequest(
                "estimated_time_minutes must be at least 3".into(),
            ));
        }

        Ok(NewRecipe {
            category_id: self.category_id,
            title: self.title,
            header: self.header,
            image_preview: self.image_preview,
            description: self.description.filter(|d| !d.is_empty()),
            estimated_time_minutes: self.estimated_time_minutes,
            recipe_ingredients,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub header: Option<String>,
    pub image_preview: Option<String>,
    pub description: Option<String>,
    pub recipe_ingredients: Option<Value>,
    pub category_id: Option<i64>,
    pub estimated_time_minutes: Option<i32>,
}

impl UpdateRecipeRequest {
    /// Zero and empty values mean "leave unchanged"; anything else is checked.
    pub fn validate(self) -> Result<RecipeUpdate, AppError> {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            if !char_len_within(title, 6, 60) {
                return Err(AppError::BadRequest(
                    "title must be between 6 and 60 characters".into(),
                ));
            }
        }
        if matches!(self.category_id, Some(id) if id != 0 && id < 1) {
            return Err(AppError::BadRequest("category_id must be at least 1".into()));
        }
        if matches!(self.estimated_time_minutes, Some(t) if t != 0 && t < 3) {
            return Err(AppError::BadRequest(
                "estimated_time_minutes must be at least 3".into(),
            ));
        }

        Ok(RecipeUpdate {
            title: self.title,
            header: self.header,
            image_preview: self.image_preview,
            description: self.description,
            recipe_ingredients: self.recipe_ingredients,
            category_id: self.category_id,
            estimated_time_minutes: self.estimated_time_minutes,
        })
    }
}

/// Query string for the recipe listing. Values stay raw strings so a bad
/// number falls back to its default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListRecipesQuery {
    pub fn into_filter(self) -> RecipeQueryFilter {
        let parse = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());

        RecipeQueryFilter {
            name: self.name.filter(|n| !n.is_empty()),
            category_id: parse(self.category_id).filter(|id| *id > 0),
            limit: parse(self.limit).filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
            offset: parse(self.offset).filter(|o| *o >= 0).unwrap_or(DEFAULT_OFFSET),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    #[serde(default)]
    pub rating: i32,
}

impl CreateRatingRequest {
    pub fn validate(self) -> Result<i32, AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
        }
        Ok(self.rating)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub recipe_category: RecipeCategory,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub recipe_categories: Vec<RecipeCategory>,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe: Recipe,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct RecipesResponse {
    pub recipes: Vec<Recipe>,
    pub message: String,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct RatingSummaryResponse {
    pub average_rating: f64,
    pub rating_count: i64,
    pub message: String,
    pub code: u16,
}
