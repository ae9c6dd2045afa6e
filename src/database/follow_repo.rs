use sqlx::SqlitePool;

use crate::database::user_repo::SQL_SELECT_PROFILE;
use crate::models::ProfileRow;

// The (observer, target) primary key makes a repeated follow a no-op.
const SQL_INSERT_FOLLOWING: &str = r#"
INSERT OR IGNORE INTO user_followings (
  observer_id,
  target_id
) VALUES (?1, ?2)
"#;

pub async fn insert_following(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_FOLLOWING)
        .bind(observer_id)
        .bind(target_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_following(
    pool: &SqlitePool,
    observer_id: &str,
    target_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM user_followings WHERE observer_id = ?1 AND target_id = ?2")
        .bind(observer_id)
        .bind(target_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Profiles following `user_id`.
pub async fn list_followers(
    pool: &SqlitePool,
    caller_id: &str,
    user_id: &str,
) -> sqlx::Result<Vec<ProfileRow>> {
    let sql = format!(
        "{}JOIN user_followings uf ON uf.observer_id = u.id\nWHERE uf.target_id = ?2\nORDER BY u.username ASC",
        SQL_SELECT_PROFILE
    );
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(caller_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// Profiles that `user_id` follows.
pub async fn list_followings(
    pool: &SqlitePool,
    caller_id: &str,
    user_id: &str,
) -> sqlx::Result<Vec<ProfileRow>> {
    let sql = format!(
        "{}JOIN user_followings uf ON uf.target_id = u.id\nWHERE uf.observer_id = ?2\nORDER BY u.username ASC",
        SQL_SELECT_PROFILE
    );
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(caller_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
