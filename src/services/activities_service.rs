use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::database::activity_repo::{self, ActivityFilter, NewActivity};
use crate::database::attendee_repo;
use crate::error::ApiError;
use crate::models::{ActivityDto, ActivityForm, ActivityRow, AttendeeProfile, PagedList, PagingParams};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityParams {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub is_going: bool,
    #[serde(default)]
    pub is_host: bool,
    pub start_date: Option<DateTime<Utc>>,
}

pub async fn list(
    pool: &SqlitePool,
    caller_id: &str,
    params: &ActivityParams,
) -> Result<PagedList<ActivityDto>, ApiError> {
    let paging = PagingParams::new(params.page_number, params.page_size);
    let filter = ActivityFilter {
        caller_id,
        start_date: params.start_date.unwrap_or_else(Utc::now),
        is_going: params.is_going,
        is_host: params.is_host,
    };

    let total = activity_repo::count_activities(pool, &filter).await?;
    let rows =
        activity_repo::list_activities(pool, &filter, paging.page_size, paging.offset()).await?;
    let items = with_attendees(pool, caller_id, rows).await?;
    Ok(PagedList::new(items, total, paging))
}

pub async fn details(
    pool: &SqlitePool,
    caller_id: &str,
    activity_id: &str,
) -> Result<ActivityDto, ApiError> {
    let Some(row) = activity_repo::load_activity_by_id(pool, activity_id).await? else {
        return Err(ApiError::NotFound);
    };
    let mut activities = with_attendees(pool, caller_id, vec![row]).await?;
    activities.pop().ok_or(ApiError::NotFound)
}

pub async fn create(
    pool: &SqlitePool,
    caller_id: &str,
    form: &ActivityForm,
) -> Result<ActivityDto, ApiError> {
    form.validate()?;

    // Clients may bring their own id so an optimistic insert keeps its key.
    let id = match form.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_activity_id(raw)?,
        None => Uuid::new_v4().to_string(),
    };
    if activity_repo::activity_exists(pool, &id).await? {
        return Err(ApiError::field("id", "An activity with this id already exists"));
    }

    let (category, date) = required_fields(form)?;
    let new_activity = NewActivity {
        id: &id,
        title: form.title.trim(),
        date,
        description: form.description.trim(),
        category,
        city: form.city.trim(),
        venue: form.venue.trim(),
    };

    let mut tx = pool.begin().await?;
    activity_repo::insert_activity(&mut *tx, &new_activity).await?;
    attendee_repo::insert_attendee(&mut *tx, &id, caller_id, true).await?;
    tx.commit().await?;

    info!(activity_id = %id, host = %caller_id, "activity created");
    details(pool, caller_id, &id).await
}

pub async fn edit(
    pool: &SqlitePool,
    caller_id: &str,
    activity_id: &str,
    form: &ActivityForm,
) -> Result<ActivityDto, ApiError> {
    if activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound);
    }
    require_host(pool, activity_id, caller_id).await?;
    form.validate()?;

    let (category, date) = required_fields(form)?;
    activity_repo::update_activity(
        pool,
        &NewActivity {
            id: activity_id,
            title: form.title.trim(),
            date,
            description: form.description.trim(),
            category,
            city: form.city.trim(),
            venue: form.venue.trim(),
        },
    )
    .await?;

    info!(activity_id = %activity_id, "activity updated");
    details(pool, caller_id, activity_id).await
}

pub async fn delete(pool: &SqlitePool, caller_id: &str, activity_id: &str) -> Result<(), ApiError> {
    if activity_repo::load_activity_by_id(pool, activity_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound);
    }
    require_host(pool, activity_id, caller_id).await?;

    activity_repo::delete_activity(pool, activity_id).await?;
    info!(activity_id = %activity_id, "activity deleted");
    Ok(())
}

/// Host toggles cancellation, an attendee leaves, anyone else joins.
pub async fn update_attendance(
    pool: &SqlitePool,
    caller_id: &str,
    activity_id: &str,
) -> Result<ActivityDto, ApiError> {
    let Some(row) = activity_repo::load_activity_by_id(pool, activity_id).await? else {
        return Err(ApiError::NotFound);
    };

    match attendee_repo::load_attendance(pool, activity_id, caller_id).await? {
        Some(true) => {
            activity_repo::set_cancelled(pool, activity_id, row.is_cancelled != 1).await?;
            info!(activity_id = %activity_id, cancelled = row.is_cancelled != 1, "host toggled cancellation");
        }
        Some(false) => {
            attendee_repo::delete_attendee(pool, activity_id, caller_id).await?;
            info!(activity_id = %activity_id, user_id = %caller_id, "attendee left");
        }
        None => {
            attendee_repo::insert_attendee(pool, activity_id, caller_id, false).await?;
            info!(activity_id = %activity_id, user_id = %caller_id, "attendee joined");
        }
    }

    details(pool, caller_id, activity_id).await
}

pub fn parse_activity_id(raw: &str) -> Result<String, ApiError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ApiError::field("id", format!("The value '{}' is not valid.", raw)))
}

async fn require_host(pool: &SqlitePool, activity_id: &str, caller_id: &str) -> Result<(), ApiError> {
    match attendee_repo::load_attendance(pool, activity_id, caller_id).await? {
        Some(true) => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}

fn required_fields(form: &ActivityForm) -> Result<(&'static str, DateTime<Utc>), ApiError> {
    let category = form
        .category
        .ok_or_else(|| ApiError::field("category", "Activity category is required"))?;
    let date = form
        .date
        .ok_or_else(|| ApiError::field("date", "Date is required"))?;
    Ok((category.as_str(), date))
}

async fn with_attendees(
    pool: &SqlitePool,
    caller_id: &str,
    rows: Vec<ActivityRow>,
) -> sqlx::Result<Vec<ActivityDto>> {
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let attendees = attendee_repo::list_for_activities(pool, caller_id, &ids).await?;

    let mut by_activity: HashMap<String, Vec<AttendeeProfile>> = HashMap::new();
    for attendee in attendees {
        by_activity
            .entry(attendee.activity_id.clone())
            .or_default()
            .push(attendee.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let attendees = by_activity.remove(&row.id).unwrap_or_default();
            ActivityDto::from_row(row, attendees)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_id_is_normalised() {
        let id = parse_activity_id("  6F9619FF-8B86-D011-B42D-00CF4FC964FF ").unwrap();
        assert_eq!(id, "6f9619ff-8b86-d011-b42d-00cf4fc964ff");
    }

    #[test]
    fn malformed_activity_id_is_a_field_error() {
        match parse_activity_id("nope") {
            Err(ApiError::Validation(errors)) => {
                assert_eq!(errors["id"], vec!["The value 'nope' is not valid.".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
