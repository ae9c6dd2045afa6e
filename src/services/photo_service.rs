use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::database::photo_repo;
use crate::error::ApiError;
use crate::models::PhotoDto;
use crate::services::photo_storage::{extension_for, PhotoStorage};

pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Stores the upload; the first photo of a profile becomes its main photo.
pub async fn add(
    pool: &SqlitePool,
    config: &Config,
    caller_id: &str,
    upload: PhotoUpload,
) -> Result<PhotoDto, ApiError> {
    if upload.bytes.is_empty() {
        return Err(ApiError::field("file", "Photo file is required"));
    }
    let extension = extension_for(upload.file_name.as_deref(), upload.content_type.as_deref())?;

    let id = Uuid::new_v4().to_string();
    let storage = PhotoStorage::new(&config.upload_dir, &config.public_url);
    let url = storage.save(&id, extension, &upload.bytes).await?;

    let row = match photo_repo::insert_photo(pool, &id, caller_id, &url).await {
        Ok(row) => row,
        Err(e) => {
            storage.remove(&url).await;
            return Err(e.into());
        }
    };

    info!(photo_id = %row.id, user_id = %caller_id, is_main = row.is_main == 1, "photo added");
    Ok(row.into())
}

pub async fn set_main(pool: &SqlitePool, caller_id: &str, photo_id: &str) -> Result<(), ApiError> {
    let Some(photo) = photo_repo::load_photo(pool, photo_id, caller_id).await? else {
        return Err(ApiError::NotFound);
    };
    if photo.is_main == 1 {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    photo_repo::clear_main(&mut *tx, caller_id).await?;
    photo_repo::mark_main(&mut *tx, &photo.id).await?;
    tx.commit().await?;

    info!(photo_id = %photo.id, user_id = %caller_id, "main photo changed");
    Ok(())
}

pub async fn delete(
    pool: &SqlitePool,
    config: &Config,
    caller_id: &str,
    photo_id: &str,
) -> Result<(), ApiError> {
    let Some(photo) = photo_repo::load_photo(pool, photo_id, caller_id).await? else {
        return Err(ApiError::NotFound);
    };
    if photo.is_main == 1 {
        return Err(ApiError::BadRequest(
            "You cannot delete your main photo".to_string(),
        ));
    }

    photo_repo::delete_photo(pool, &photo.id).await?;
    PhotoStorage::new(&config.upload_dir, &config.public_url)
        .remove(&photo.url)
        .await;

    info!(photo_id = %photo.id, user_id = %caller_id, "photo deleted");
    Ok(())
}
