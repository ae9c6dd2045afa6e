use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::ProfileEditForm;
use crate::services::profile_service::{self, ActivityPredicate};
use crate::state::AppState;
use crate::web::extract::ValidatedJson;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Default)]
pub struct PredicateQuery {
    pub predicate: Option<String>,
}

pub async fn profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = profile_service::details(&state.pool, &auth_user.id, &username).await?;
    Ok(Json(profile))
}

pub async fn edit_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ProfileEditForm>,
) -> Result<impl IntoResponse, ApiError> {
    profile_service::edit(&state.pool, &auth_user.id, &form).await?;
    Ok(StatusCode::OK)
}

pub async fn profile_activities_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    Query(query): Query<PredicateQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let predicate = ActivityPredicate::parse(query.predicate.as_deref());
    let activities = profile_service::list_activities(&state.pool, &username, predicate).await?;
    Ok(Json(activities))
}
