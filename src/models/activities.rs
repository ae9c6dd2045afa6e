use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::non_blank;

/// Stored as its lowercase name; any other stored value fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Category {
    Drinks,
    Culture,
    Film,
    Food,
    Music,
    Travel,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Drinks,
        Category::Culture,
        Category::Film,
        Category::Food,
        Category::Music,
        Category::Travel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Drinks => "drinks",
            Category::Culture => "culture",
            Category::Film => "film",
            Category::Food => "food",
            Category::Music => "music",
            Category::Travel => "travel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: Category,
    pub city: String,
    pub venue: String,
    pub is_cancelled: i64,
    pub host_username: Option<String>,
}

// One attendee joined with its profile counters, as seen by the caller.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendeeRow {
    pub activity_id: String,
    pub is_host: i64,
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
pub struct AttendeeProfile {
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
}

impl From<AttendeeRow> for AttendeeProfile {
    fn from(row: AttendeeRow) -> Self {
        Self {
            username: row.username,
            display_name: row.display_name,
            bio: row.bio,
            image: row.image,
            following: row.following == 1,
            followers_count: row.followers_count,
            following_count: row.following_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: Category,
    pub city: String,
    pub venue: String,
    #[serde(default)]
    pub is_cancelled: bool,
    pub host_username: Option<String>,
    #[serde(default)]
    pub attendees: Vec<AttendeeProfile>,
}

impl ActivityDto {
    pub fn from_row(row: ActivityRow, attendees: Vec<AttendeeProfile>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
            description: row.description,
            category: row.category,
            city: row.city,
            venue: row.venue,
            is_cancelled: row.is_cancelled == 1,
            host_username: row.host_username,
            attendees,
        }
    }

    pub fn is_host(&self, username: &str) -> bool {
        self.host_username.as_deref() == Some(username)
    }

    pub fn is_going(&self, username: &str) -> bool {
        self.attendees.iter().any(|a| a.username == username)
    }

    /// Copies the editable fields of a form over this activity. Attendees,
    /// host and cancellation state are left alone.
    pub fn apply_form(&mut self, form: &ActivityForm) {
        self.title = form.title.clone();
        self.description = form.description.clone();
        if let Some(category) = form.category {
            self.category = category;
        }
        if let Some(date) = form.date {
            self.date = date;
        }
        self.city = form.city.clone();
        self.venue = form.venue.clone();
    }
}

/// Create/edit payload. Every field defaults so a missing field reaches
/// validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[validate(custom(function = "non_blank", message = "Activity title is required"))]
    pub title: String,
    #[validate(custom(function = "non_blank", message = "Activity description is required"))]
    pub description: String,
    #[validate(required(message = "Activity category is required"))]
    pub category: Option<Category>,
    #[validate(required(message = "Date is required"))]
    pub date: Option<DateTime<Utc>>,
    #[validate(custom(function = "non_blank", message = "Activity city is required"))]
    pub city: String,
    #[validate(custom(function = "non_blank", message = "Activity venue is required"))]
    pub venue: String,
}

impl From<&ActivityDto> for ActivityForm {
    fn from(activity: &ActivityDto) -> Self {
        Self {
            id: Some(activity.id.clone()),
            title: activity.title.clone(),
            description: activity.description.clone(),
            category: Some(activity.category),
            date: Some(activity.date),
            city: activity.city.clone(),
            venue: activity.venue.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_form() -> ActivityForm {
        ActivityForm {
            id: None,
            title: "Run club".into(),
            description: "Easy 5k".into(),
            category: Some(Category::Travel),
            date: Some(Utc.with_ymd_and_hms(2030, 5, 1, 18, 0, 0).unwrap()),
            city: "Utrecht".into(),
            venue: "Park".into(),
        }
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Music".parse::<Category>().unwrap(), Category::Music);
        assert!("opera".parse::<Category>().is_err());
    }

    #[test]
    fn missing_description_is_reported_with_its_message() {
        let form = ActivityForm {
            description: String::new(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        let description = fields.get("description").expect("description error");
        assert_eq!(
            description[0].message.as_deref(),
            Some("Activity description is required")
        );
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn whitespace_title_and_description_are_missing() {
        let form = ActivityForm {
            title: "   ".into(),
            description: "\n\t".into(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(
            fields["title"][0].message.as_deref(),
            Some("Activity title is required")
        );
        assert!(fields.contains_key("description"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn form_deserializes_with_missing_fields() {
        let form: ActivityForm = serde_json::from_str(r#"{"title":"Run club"}"#).unwrap();
        assert_eq!(form.title, "Run club");
        assert!(form.category.is_none());
        assert!(form.validate().is_err());
    }

    #[test]
    fn apply_form_keeps_attendees() {
        let mut activity = ActivityDto {
            id: "a".into(),
            title: "Old".into(),
            date: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            description: "d".into(),
            category: Category::Film,
            city: "c".into(),
            venue: "v".into(),
            is_cancelled: false,
            host_username: Some("bob".into()),
            attendees: vec![AttendeeProfile {
                username: "bob".into(),
                display_name: "Bob".into(),
                bio: None,
                image: None,
                following: false,
                followers_count: 0,
                following_count: 0,
            }],
        };
        activity.apply_form(&valid_form());
        assert_eq!(activity.title, "Run club");
        assert_eq!(activity.category, Category::Travel);
        assert_eq!(activity.attendees.len(), 1);
        assert!(activity.is_host("bob"));
    }
}
