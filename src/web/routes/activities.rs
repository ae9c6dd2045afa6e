use axum::{
    extract::{Query, State},
    http::{HeaderName, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use tracing::warn;

use crate::error::ApiError;
use crate::models::ActivityForm;
use crate::services::activities_service::{self, ActivityParams};
use crate::state::AppState;
use crate::web::extract::{ActivityId, ValidatedJson};
use crate::web::middleware::auth::AuthenticatedUser;

pub const PAGINATION: HeaderName = HeaderName::from_static("pagination");

pub async fn list_activities_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = activities_service::list(&state.pool, &auth_user.id, &params).await?;
    let header = serde_json::to_string(&page.header()).map_err(|e| ApiError::Internal(e.into()))?;
    Ok((AppendHeaders([(PAGINATION, header)]), Json(page.items)))
}

pub async fn activity_details_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    ActivityId(activity_id): ActivityId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = activities_service::details(&state.pool, &auth_user.id, &activity_id).await?;
    Ok(Json(activity))
}

pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ActivityForm>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = activities_service::create(&state.pool, &auth_user.id, &form)
        .await
        .map_err(|e| {
            warn!(user = %auth_user.username, error = %e, "create activity failed");
            e
        })?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn edit_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    ActivityId(activity_id): ActivityId,
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ActivityForm>,
) -> Result<impl IntoResponse, ApiError> {
    let activity = activities_service::edit(&state.pool, &auth_user.id, &activity_id, &form)
        .await
        .map_err(|e| {
            warn!(activity_id = %activity_id, error = %e, "edit activity failed");
            e
        })?;
    Ok(Json(activity))
}

pub async fn delete_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    ActivityId(activity_id): ActivityId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    activities_service::delete(&state.pool, &auth_user.id, &activity_id).await?;
    Ok(StatusCode::OK)
}

pub async fn attend_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    ActivityId(activity_id): ActivityId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let activity =
        activities_service::update_attendance(&state.pool, &auth_user.id, &activity_id).await?;
    Ok(Json(activity))
}
