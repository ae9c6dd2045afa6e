use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::error::ApiError;
use crate::models::{LoginForm, RegisterForm};
use crate::services::account_service;
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn login_handler(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = account_service::login(&state.pool, &state.config.token_key, &form).await?;
    Ok(Json(user))
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = account_service::register(&state.pool, &state.config.token_key, &form).await?;
    Ok(Json(user))
}

pub async fn current_user_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let user =
        account_service::current_user(&state.pool, &state.config.token_key, &auth_user.id).await?;
    Ok(Json(user))
}
