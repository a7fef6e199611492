use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
        extractors::CurrentUser,
        services::AuthService,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

pub(crate) fn bad_json(rejection: JsonRejection) -> AppError {
    warn!(error = %rejection.body_text(), "rejected request body");
    AppError::BadRequest(rejection.body_text())
}

#[instrument(skip_all)]
pub async fn register(
    State(auth): State<AuthService>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload.map_err(bad_json)?;
    let reg = payload.validate().map_err(|e| {
        warn!(error = %e, "invalid registration");
        e
    })?;
    let email = reg.email.clone();

    let access_token = auth.register(reg).await?;

    info!(%email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        message: "successfully registered a new user".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn login(
    State(auth): State<AuthService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload.map_err(bad_json)?;
    let payload = payload.validate()?;

    let access_token = auth.login(&payload.email, &payload.password).await?;

    info!(email = %payload.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        message: "successfully logged in.".into(),
        code: StatusCode::OK.as_u16(),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: PublicUser {
            id: user.id,
            role: user.role,
            email: user.email,
            name: user.name,
            profile_image: user.profile_image,
        },
        message: "successfully retrieved current user".into(),
        code: StatusCode::OK.as_u16(),
    })
}
