use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::non_blank;
use super::{Category, PhotoDto};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub following: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
}

impl ProfileDto {
    pub fn from_row(row: ProfileRow, photos: Vec<PhotoDto>) -> Self {
        Self {
            username: row.username,
            display_name: row.display_name,
            bio: row.bio,
            image: row.image,
            following: row.following == 1,
            followers_count: row.followers_count,
            following_count: row.following_count,
            photos,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileEditForm {
    #[validate(custom(function = "non_blank", message = "Display name is required"))]
    pub display_name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserActivityRow {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub date: DateTime<Utc>,
}

/// Slim activity listing shown on a profile's events tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityDto {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub date: DateTime<Utc>,
}

impl From<UserActivityRow> for UserActivityDto {
    fn from(row: UserActivityRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            category: row.category,
            date: row.date,
        }
    }
}
