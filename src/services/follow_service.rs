use sqlx::SqlitePool;
use tracing::info;

use crate::database::{follow_repo, user_repo};
use crate::error::ApiError;
use crate::models::ProfileDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPredicate {
    Followers,
    Following,
}

impl FollowPredicate {
    pub fn parse(input: Option<&str>) -> Self {
        match input.unwrap_or("followers") {
            "following" => FollowPredicate::Following,
            _ => FollowPredicate::Followers,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FollowPredicate::Followers => "followers",
            FollowPredicate::Following => "following",
        }
    }
}

/// Makes the caller follow `username`. Following twice keeps one relation.
pub async fn follow(pool: &SqlitePool, caller_id: &str, username: &str) -> Result<(), ApiError> {
    let target_id = target_id(pool, username).await?;
    if target_id == caller_id {
        return Err(ApiError::BadRequest("You cannot follow yourself".to_string()));
    }
    let inserted = follow_repo::insert_following(pool, caller_id, &target_id).await?;
    info!(observer = %caller_id, target = %username, inserted, "follow");
    Ok(())
}

pub async fn unfollow(pool: &SqlitePool, caller_id: &str, username: &str) -> Result<(), ApiError> {
    let target_id = target_id(pool, username).await?;
    let removed = follow_repo::delete_following(pool, caller_id, &target_id).await?;
    info!(observer = %caller_id, target = %username, removed, "unfollow");
    Ok(())
}

pub async fn list(
    pool: &SqlitePool,
    caller_id: &str,
    username: &str,
    predicate: FollowPredicate,
) -> Result<Vec<ProfileDto>, ApiError> {
    let user_id = target_id(pool, username).await?;
    let rows = match predicate {
        FollowPredicate::Followers => follow_repo::list_followers(pool, caller_id, &user_id).await?,
        FollowPredicate::Following => follow_repo::list_followings(pool, caller_id, &user_id).await?,
    };
    Ok(rows
        .into_iter()
        .map(|row| ProfileDto::from_row(row, vec![]))
        .collect())
}

async fn target_id(pool: &SqlitePool, username: &str) -> Result<String, ApiError> {
    user_repo::load_user_by_username(pool, username)
        .await?
        .map(|u| u.id)
        .ok_or(ApiError::NotFound)
}
