//! Dynamic SQL for recipe listing and partial updates.
//!
//! Placeholders are handed out by [`Args::push`], which numbers each one by
//! its position in the argument list, so `$n` always binds the n-th value.

use serde_json::Value;
use sqlx::{
    postgres::PgArguments,
    query::{Query, QueryAs},
    types::Json,
    Postgres,
};

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

const SELECT_RECIPES: &str = "SELECT recipe_id, category_id, title, header, image_preview, \
     description, estimated_time_minutes, recipe_ingredients, created_at, updated_at \
     FROM recipes";

const UPDATE_RECIPE: &str = "UPDATE recipes SET updated_at = now()";

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    BigInt(i64),
    Int(i32),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

#[derive(Debug, Default)]
struct Args(Vec<SqlArg>);

impl Args {
    fn push(&mut self, arg: SqlArg) -> String {
        self.0.push(arg);
        format!("${}", self.0.len())
    }
}

/// Filters for the recipe listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeQueryFilter {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for RecipeQueryFilter {
    fn default() -> Self {
        Self {
            name: None,
            category_id: None,
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

pub fn build_list_query(filter: &RecipeQueryFilter) -> BuiltQuery {
    let mut args = Args::default();
    let mut conditions = Vec::new();

    if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
        let p = args.push(SqlArg::Text(name.to_lowercase()));
        conditions.push(format!("LOWER(title) = {p}"));
    }
    if let Some(category_id) = filter.category_id.filter(|id| *id != 0) {
        let p = args.push(SqlArg::BigInt(category_id));
        conditions.push(format!("category_id = {p}"));
    }

    let mut sql = String::from(SELECT_RECIPES);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    let limit = args.push(SqlArg::BigInt(filter.limit));
    let offset = args.push(SqlArg::BigInt(filter.offset));
    sql.push_str(&format!(" ORDER BY recipe_id LIMIT {limit} OFFSET {offset}"));

    BuiltQuery { sql, args: args.0 }
}

/// Sparse recipe update; only non-empty fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub header: Option<String>,
    pub image_preview: Option<String>,
    pub description: Option<String>,
    pub recipe_ingredients: Option<Value>,
    pub category_id: Option<i64>,
    pub estimated_time_minutes: Option<i32>,
}

pub fn build_update_query(recipe_id: i64, update: &RecipeUpdate) -> BuiltQuery {
    let mut args = Args::default();
    let mut sql = String::from(UPDATE_RECIPE);

    let texts = [
        ("title", &update.title),
        ("header", &update.header),
        ("image_preview", &update.image_preview),
        ("description", &update.description),
    ];
    for (column, value) in texts {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            let p = args.push(SqlArg::Text(v.to_string()));
            sql.push_str(&format!(", {column} = {p}"));
        }
    }
    if let Some(v) = update.recipe_ingredients.as_ref().filter(|v| !v.is_null()) {
        let p = args.push(SqlArg::Json(v.clone()));
        sql.push_str(&format!(", recipe_ingredients = {p}"));
    }
    if let Some(v) = update.category_id.filter(|v| *v != 0) {
        let p = args.push(SqlArg::BigInt(v));
        sql.push_str(&format!(", category_id = {p}"));
    }
    if let Some(v) = update.estimated_time_minutes.filter(|v| *v != 0) {
        let p = args.push(SqlArg::Int(v));
        sql.push_str(&format!(", estimated_time_minutes = {p}"));
    }

    let p = args.push(SqlArg::BigInt(recipe_id));
    sql.push_str(&format!(" WHERE recipe_id = {p}"));

    BuiltQuery { sql, args: args.0 }
}

pub(crate) fn bind_query_as<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    args: Vec<SqlArg>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for arg in args {
        q = match arg {
            SqlArg::Text(v) => q.bind(v),
            SqlArg::BigInt(v) => q.bind(v),
            SqlArg::Int(v) => q.bind(v),
            SqlArg::Json(v) => q.bind(Json(v)),
        };
    }
    q
}

pub(crate) fn bind_query<'q>(
    mut q: Query<'q, Postgres, PgArguments>,
    args: Vec<SqlArg>,
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        q = match arg {
            SqlArg::Text(v) => q.bind(v),
            SqlArg::BigInt(v) => q.bind(v),
            SqlArg::Int(v) => q.bind(v),
            SqlArg::Json(v) => q.bind(Json(v)),
        };
    }
    q
}
