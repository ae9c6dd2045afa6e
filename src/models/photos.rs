use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhotoRow {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub is_main: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub id: String,
    pub url: String,
    pub is_main: bool,
}

impl From<PhotoRow> for PhotoDto {
    fn from(row: PhotoRow) -> Self {
        Self {
            id: row.id,
            url: row.url,
            is_main: row.is_main == 1,
        }
    }
}
