use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::AttendeeRow;

// ?1 = caller id (for the `following` flag), ?2 = JSON array of activity ids.
const SQL_LIST_ATTENDEES: &str = r#"
SELECT
  aa.activity_id,
  aa.is_host,
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
FROM activity_attendees aa
JOIN users u ON u.id = aa.user_id
WHERE aa.activity_id IN (SELECT value FROM json_each(?2))
ORDER BY aa.joined_at ASC, aa.rowid ASC
"#;

pub async fn list_for_activities(
    pool: &SqlitePool,
    caller_id: &str,
    activity_ids: &[&str],
) -> sqlx::Result<Vec<AttendeeRow>> {
    if activity_ids.is_empty() {
        return Ok(vec![]);
    }
    let ids_json = serde_json::to_string(activity_ids).unwrap_or_else(|_| "[]".to_string());
    sqlx::query_as::<_, AttendeeRow>(SQL_LIST_ATTENDEES)
        .bind(caller_id)
        .bind(ids_json)
        .fetch_all(pool)
        .await
}

/// `Some(is_host)` when the user attends the activity.
pub async fn load_attendance(
    pool: &SqlitePool,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<bool>> {
    let is_host: Option<i64> = sqlx::query_scalar(
        "SELECT is_host FROM activity_attendees WHERE activity_id = ?1 AND user_id = ?2",
    )
    .bind(activity_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(is_host.map(|v| v == 1))
}

pub async fn insert_attendee<'e, E>(
    executor: E,
    activity_id: &str,
    user_id: &str,
    is_host: bool,
) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO activity_attendees (activity_id, user_id, is_host) VALUES (?1, ?2, ?3)",
    )
    .bind(activity_id)
    .bind(user_id)
    .bind(is_host)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn delete_attendee(pool: &SqlitePool, activity_id: &str, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM activity_attendees WHERE activity_id = ?1 AND user_id = ?2")
        .bind(activity_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
