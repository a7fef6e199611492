use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct RecipeCategory {
    pub category_id: i64,
    pub category_tag: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Recipe {
    pub recipe_id: i64,
    pub category_id: i64,
    pub title: String,
    pub header: String,
    pub image_preview: String,
    pub description: Option<String>,
    pub estimated_time_minutes: i32,
    pub recipe_ingredients: serde_json::Value, // JSONB, opaque
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert payload for a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub category_id: i64,
    pub title: String,
    pub header: String,
    pub image_preview: String,
    pub description: Option<String>,
    pub estimated_time_minutes: i32,
    pub recipe_ingredients: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Serialize, FromRow, PartialEq)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub rating_count: i64,
}
