use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::PhotoRow;

const SQL_LIST_PHOTOS: &str = r#"
SELECT id, user_id, url, is_main
FROM photos
WHERE user_id = ?1
ORDER BY created_at ASC, rowid ASC
"#;

pub async fn list_photos(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<PhotoRow>> {
    sqlx::query_as::<_, PhotoRow>(SQL_LIST_PHOTOS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn load_photo(
    pool: &SqlitePool,
    photo_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<PhotoRow>> {
    sqlx::query_as::<_, PhotoRow>(
        "SELECT id, user_id, url, is_main FROM photos WHERE id = ?1 AND user_id = ?2",
    )
    .bind(photo_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

// The main flag is decided inside the insert so two first uploads cannot both claim it.
const SQL_INSERT_PHOTO: &str = r#"
INSERT INTO photos (id, user_id, url, is_main)
VALUES (
  ?1,
  ?2,
  ?3,
  NOT EXISTS (SELECT 1 FROM photos WHERE user_id = ?2 AND is_main = 1)
)
RETURNING id, user_id, url, is_main
"#;

pub async fn insert_photo(
    pool: &SqlitePool,
    photo_id: &str,
    user_id: &str,
    url: &str,
) -> sqlx::Result<PhotoRow> {
    sqlx::query_as::<_, PhotoRow>(SQL_INSERT_PHOTO)
        .bind(photo_id)
        .bind(user_id)
        .bind(url)
        .fetch_one(pool)
        .await
}

pub async fn clear_main<'e, E>(executor: E, user_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("UPDATE photos SET is_main = 0 WHERE user_id = ?1 AND is_main = 1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn mark_main<'e, E>(executor: E, photo_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("UPDATE photos SET is_main = 1 WHERE id = ?1")
        .bind(photo_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_photo(pool: &SqlitePool, photo_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM photos WHERE id = ?1")
        .bind(photo_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn main_photo_url(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<String>> {
    sqlx::query_scalar("SELECT url FROM photos WHERE user_id = ?1 AND is_main = 1 LIMIT 1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
