use sqlx::SqlitePool;

use crate::models::{ProfileRow, UserActivityRow, UserRow};

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub display_name: &'a str,
    pub password_hash: &'a str,
}

const SQL_SELECT_USER: &str = r#"
SELECT
  id,
  username,
  email,
  display_name,
  bio,
  password_hash
FROM users
"#;

pub async fn load_user_by_id(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UserRow>> {
    let sql = format!("{}WHERE id = ?1\nLIMIT 1", SQL_SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<UserRow>> {
    let sql = format!("{}WHERE lower(email) = lower(?1)\nLIMIT 1", SQL_SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn load_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<UserRow>> {
    let sql = format!("{}WHERE username = ?1\nLIMIT 1", SQL_SELECT_USER);
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  id,
  username,
  email,
  display_name,
  password_hash
) VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_USER)
        .bind(user.id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.display_name)
        .bind(user.password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    display_name: &str,
    bio: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query("UPDATE users SET display_name = ?2, bio = ?3 WHERE id = ?1")
        .bind(user_id)
        .bind(display_name)
        .bind(bio)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// ?1 = caller id. Callers append their own WHERE clause.
pub const SQL_SELECT_PROFILE: &str = r#"
SELECT
  u.id,
  u.username,
  u.display_name,
  u.bio,
  (
    SELECT p.url FROM photos p
    WHERE p.user_id = u.id AND p.is_main = 1
    LIMIT 1
  ) AS image,
  (SELECT COUNT(*) FROM user_followings f WHERE f.target_id = u.id) AS followers_count,
  (SELECT COUNT(*) FROM user_followings f WHERE f.observer_id = u.id) AS following_count,
  EXISTS (
    SELECT 1 FROM user_followings f
    WHERE f.observer_id = ?1 AND f.target_id = u.id
  ) AS following
FROM users u
"#;

pub async fn load_profile(
    pool: &SqlitePool,
    caller_id: &str,
    username: &str,
) -> sqlx::Result<Option<ProfileRow>> {
    let sql = format!("{}WHERE u.username = ?2\nLIMIT 1", SQL_SELECT_PROFILE);
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(caller_id)
        .bind(username)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_USER_ACTIVITIES: &str = r#"
SELECT
  a.id,
  a.title,
  a.category,
  a.date
FROM activity_attendees aa
JOIN activities a ON a.id = aa.activity_id
WHERE aa.user_id = ?1
  AND (
    (?2 = 'past' AND a.date <= ?3)
    OR (?2 = 'hosting' AND aa.is_host = 1)
    OR (?2 = 'future' AND a.date >= ?3)
  )
ORDER BY a.date ASC
"#;

/// `predicate` is one of `past`, `hosting`, `future`.
pub async fn list_user_activities(
    pool: &SqlitePool,
    user_id: &str,
    predicate: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> sqlx::Result<Vec<UserActivityRow>> {
    sqlx::query_as::<_, UserActivityRow>(SQL_LIST_USER_ACTIVITIES)
        .bind(user_id)
        .bind(predicate)
        .bind(now)
        .fetch_all(pool)
        .await
}
