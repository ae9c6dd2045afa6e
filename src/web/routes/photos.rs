use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::warn;

use crate::error::ApiError;
use crate::services::photo_service::{self, PhotoUpload};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn add_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload: Option<PhotoUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if !field
            .name()
            .map(|n| n.eq_ignore_ascii_case("file"))
            .unwrap_or(false)
        {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        upload = Some(PhotoUpload {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        });
    }

    let Some(upload) = upload else {
        warn!(user = %auth_user.username, "photo upload without a File field");
        return Err(ApiError::field("file", "Photo file is required"));
    };

    let photo = photo_service::add(&state.pool, &state.config, &auth_user.id, upload).await?;
    Ok(Json(photo))
}

pub async fn set_main_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    photo_service::set_main(&state.pool, &auth_user.id, &photo_id).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_photo_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(photo_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    photo_service::delete(&state.pool, &state.config, &auth_user.id, &photo_id).await?;
    Ok(StatusCode::OK)
}
