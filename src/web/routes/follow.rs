use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::ApiError;
use crate::services::follow_service::{self, FollowPredicate};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::profiles::PredicateQuery;

pub async fn follow_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    follow_service::follow(&state.pool, &auth_user.id, &username).await?;
    Ok(StatusCode::OK)
}

pub async fn unfollow_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    follow_service::unfollow(&state.pool, &auth_user.id, &username).await?;
    Ok(StatusCode::OK)
}

pub async fn list_followings_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    Query(query): Query<PredicateQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let predicate = FollowPredicate::parse(query.predicate.as_deref());
    let profiles = follow_service::list(&state.pool, &auth_user.id, &username, predicate).await?;
    Ok(Json(profiles))
}
