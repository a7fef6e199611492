use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::{AdminUser, CurrentUser},
        handlers::bad_json,
    },
    error::AppError,
    recipes::{
        dto::{
            parse_id, CategoriesResponse, CategoryResponse, CreateCategoryRequest,
            CreateRatingRequest, CreateRecipeRequest, ListRecipesQuery, MessageResponse,
            RatingSummaryResponse, RecipeResponse, RecipesResponse, UpdateRecipeRequest,
        },
        services::RecipeService,
    },
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe_categories", get(list_categories))
        .route("/recipe_category", post(create_category))
        .route("/recipe_category/:id", get(get_category))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipe", post(create_recipe))
        .route(
            "/recipe/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipe/:id/rating", post(rate_recipe).get(get_rating))
}

fn ok(message: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: message.into(),
        code: StatusCode::OK.as_u16(),
    })
}

#[instrument(skip_all)]
pub async fn create_category(
    AdminUser(admin): AdminUser,
    State(svc): State<RecipeService>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload.map_err(bad_json)?;
    let tag = payload.validate()?;
    let category = svc.create_category(&tag).await?;
    info!(admin_id = admin.id, category_id = category.category_id, "category created");
    Ok(ok("successfully created a new category"))
}

#[instrument(skip_all)]
pub async fn get_category(
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category_id = parse_id(&id)?;
    let recipe_category = svc.get_category(category_id).await?;
    Ok(Json(CategoryResponse {
        recipe_category,
        message: "successfully retrieved recipe category by id".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn list_categories(
    State(svc): State<RecipeService>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let recipe_categories = svc.list_categories().await?;
    Ok(Json(CategoriesResponse {
        recipe_categories,
        message: "successfully get all recipe categories".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn create_recipe(
    AdminUser(admin): AdminUser,
    State(svc): State<RecipeService>,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload.map_err(bad_json)?;
    let recipe = payload.validate().map_err(|e| {
        warn!(error = %e, "invalid recipe");
        e
    })?;
    let created = svc.create_recipe(recipe).await?;
    info!(admin_id = admin.id, recipe_id = created.recipe_id, "recipe created");
    Ok(ok("successfully created a new recipe"))
}

#[instrument(skip_all)]
pub async fn get_recipe(
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe_id = parse_id(&id)?;
    let recipe = svc.get_recipe(recipe_id).await?;
    Ok(Json(RecipeResponse {
        recipe,
        message: "successfully retrieved recipe by id".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn list_recipes(
    State(svc): State<RecipeService>,
    query: Result<Query<ListRecipesQuery>, QueryRejection>,
) -> Result<Json<RecipesResponse>, AppError> {
    let query = query.map(|Query(q)| q).unwrap_or_else(|e| {
        warn!(error = %e.body_text(), "unreadable query string, using defaults");
        ListRecipesQuery::default()
    });
    let recipes = svc.list_recipes(&query.into_filter()).await?;
    Ok(Json(RecipesResponse {
        recipes,
        message: "successfully retrieved recipes".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn update_recipe(
    AdminUser(admin): AdminUser,
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let recipe_id = parse_id(&id)?;
    let Json(payload) = payload.map_err(bad_json)?;
    let update = payload.validate()?;
    svc.update_recipe(recipe_id, &update).await?;
    info!(admin_id = admin.id, recipe_id, "recipe updated");
    Ok(ok("successfully updated recipe"))
}

#[instrument(skip_all)]
pub async fn delete_recipe(
    AdminUser(admin): AdminUser,
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let recipe_id = parse_id(&id)?;
    svc.delete_recipe(recipe_id).await?;
    info!(admin_id = admin.id, recipe_id, "recipe deleted");
    Ok(ok("successfully deleted recipe"))
}

#[instrument(skip_all)]
pub async fn rate_recipe(
    CurrentUser(user): CurrentUser,
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
    payload: Result<Json<CreateRatingRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let recipe_id = parse_id(&id)?;
    let Json(payload) = payload.map_err(bad_json)?;
    let rating = payload.validate()?;
    svc.rate_recipe(recipe_id, user.id, rating).await?;
    info!(user_id = user.id, recipe_id, rating, "recipe rated");
    Ok(ok("successfully rated recipe"))
}

#[instrument(skip_all)]
pub async fn get_rating(
    State(svc): State<RecipeService>,
    Path(id): Path<String>,
) -> Result<Json<RatingSummaryResponse>, AppError> {
    let recipe_id = parse_id(&id)?;
    let summary = svc.rating_summary(recipe_id).await?;
    Ok(Json(RatingSummaryResponse {
        average_rating: summary.average_rating,
        rating_count: summary.rating_count,
        message: "successfully retrieved recipe rating".into(),
        code: StatusCode::OK.as_u16(),
    }))
}
