use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use validator::Validate;

use crate::database::{photo_repo, user_repo};
use crate::error::ApiError;
use crate::models::{PhotoDto, ProfileDto, ProfileEditForm, UserActivityDto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityPredicate {
    Past,
    Hosting,
    Future,
}

impl ActivityPredicate {
    pub fn parse(input: Option<&str>) -> Self {
        match input.unwrap_or("future") {
            "past" => ActivityPredicate::Past,
            "hosting" => ActivityPredicate::Hosting,
            _ => ActivityPredicate::Future,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityPredicate::Past => "past",
            ActivityPredicate::Hosting => "hosting",
            ActivityPredicate::Future => "future",
        }
    }
}

pub async fn details(
    pool: &SqlitePool,
    caller_id: &str,
    username: &str,
) -> Result<ProfileDto, ApiError> {
    let Some(row) = user_repo::load_profile(pool, caller_id, username).await? else {
        return Err(ApiError::NotFound);
    };
    let photos = photo_repo::list_photos(pool, &row.id)
        .await?
        .into_iter()
        .map(PhotoDto::from)
        .collect();
    Ok(ProfileDto::from_row(row, photos))
}

pub async fn edit(pool: &SqlitePool, caller_id: &str, form: &ProfileEditForm) -> Result<(), ApiError> {
    form.validate()?;
    let bio = form.bio.as_deref().map(str::trim).filter(|b| !b.is_empty());
    let updated = user_repo::update_profile(pool, caller_id, form.display_name.trim(), bio).await?;
    if updated == 0 {
        return Err(ApiError::NotFound);
    }
    info!(user_id = %caller_id, "profile updated");
    Ok(())
}

pub async fn list_activities(
    pool: &SqlitePool,
    username: &str,
    predicate: ActivityPredicate,
) -> Result<Vec<UserActivityDto>, ApiError> {
    let Some(user) = user_repo::load_user_by_username(pool, username).await? else {
        return Err(ApiError::NotFound);
    };
    let rows = user_repo::list_user_activities(pool, &user.id, predicate.as_str(), Utc::now()).await?;
    Ok(rows.into_iter().map(UserActivityDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_defaults_to_future() {
        assert_eq!(ActivityPredicate::parse(None), ActivityPredicate::Future);
        assert_eq!(ActivityPredicate::parse(Some("past")), ActivityPredicate::Past);
        assert_eq!(ActivityPredicate::parse(Some("hosting")), ActivityPredicate::Hosting);
        assert_eq!(ActivityPredicate::parse(Some("bogus")), ActivityPredicate::Future);
    }
}
