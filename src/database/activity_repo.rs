use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::ActivityRow;

pub struct NewActivity<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub date: DateTime<Utc>,
    pub description: &'a str,
    pub category: &'a str,
    pub city: &'a str,
    pub venue: &'a str,
}

pub struct ActivityFilter<'a> {
    pub caller_id: &'a str,
    pub start_date: DateTime<Utc>,
    pub is_going: bool,
    pub is_host: bool,
}

const SQL_SELECT_ACTIVITY: &str = r#"
SELECT
  a.id,
  a.title,
  a.date,
  a.description,
  a.category,
  a.city,
  a.venue,
  a.is_cancelled,
  (
    SELECT u.username
    FROM activity_attendees aa
    JOIN users u ON u.id = aa.user_id
    WHERE aa.activity_id = a.id
      AND aa.is_host = 1
    LIMIT 1
  ) AS host_username
FROM activities a
"#;

const SQL_FILTER: &str = r#"
WHERE a.date >= ?1
  AND (
    ?2 = 0
    OR EXISTS (
      SELECT 1 FROM activity_attendees aa
      WHERE aa.activity_id = a.id AND aa.user_id = ?4
    )
  )
  AND (
    ?3 = 0
    OR EXISTS (
      SELECT 1 FROM activity_attendees aa
      WHERE aa.activity_id = a.id AND aa.user_id = ?4 AND aa.is_host = 1
    )
  )
"#;

pub async fn load_activity_by_id(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Option<ActivityRow>> {
    let sql = format!("{}WHERE a.id = ?1\nLIMIT 1", SQL_SELECT_ACTIVITY);
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

pub async fn activity_exists(pool: &SqlitePool, activity_id: &str) -> sqlx::Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM activities WHERE id = ?1")
        .bind(activity_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn list_activities(
    pool: &SqlitePool,
    filter: &ActivityFilter<'_>,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<ActivityRow>> {
    let sql = format!(
        "{}{}ORDER BY a.date ASC\nLIMIT ?5 OFFSET ?6",
        SQL_SELECT_ACTIVITY, SQL_FILTER
    );
    sqlx::query_as::<_, ActivityRow>(&sql)
        .bind(filter.start_date)
        .bind(filter.is_going)
        .bind(filter.is_host)
        .bind(filter.caller_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_activities(pool: &SqlitePool, filter: &ActivityFilter<'_>) -> sqlx::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM activities a\n{}", SQL_FILTER);
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.start_date)
        .bind(filter.is_going)
        .bind(filter.is_host)
        .bind(filter.caller_id)
        .fetch_one(pool)
        .await
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  id,
  title,
  date,
  description,
  category,
  city,
  venue
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub async fn insert_activity<'e, E>(executor: E, activity: &NewActivity<'_>) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.id)
        .bind(activity.title)
        .bind(activity.date)
        .bind(activity.description)
        .bind(activity.category)
        .bind(activity.city)
        .bind(activity.venue)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_UPDATE_ACTIVITY: &str = r#"
UPDATE activities
SET title = ?2,
    date = ?3,
    description = ?4,
    category = ?5,
    city = ?6,
    venue = ?7
WHERE id = ?1
"#;

pub async fn update_activity(pool: &SqlitePool, activity: &NewActivity<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_ACTIVITY)
        .bind(activity.id)
        .bind(activity.title)
        .bind(activity.date)
        .bind(activity.description)
        .bind(activity.category)
        .bind(activity.city)
        .bind(activity.venue)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn set_cancelled(
    pool: &SqlitePool,
    activity_id: &str,
    is_cancelled: bool,
) -> sqlx::Result<u64> {
    let res = sqlx::query("UPDATE activities SET is_cancelled = ?2 WHERE id = ?1")
        .bind(activity_id)
        .bind(is_cancelled)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_activity(pool: &SqlitePool, activity_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM activities WHERE id = ?1")
        .bind(activity_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
