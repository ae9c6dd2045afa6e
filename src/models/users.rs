use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::non_blank;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub password_hash: String,
}

/// The signed-in account as returned by the `/account` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub display_name: String,
    pub token: String,
    pub username: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,
    // complexity is checked by account_service, validator has no rule for it
    pub password: String,
    #[validate(custom(function = "non_blank", message = "Display name is required"))]
    pub display_name: String,
    #[validate(custom(function = "non_blank", message = "Username is required"))]
    pub username: String,
}

/// Between 4 and 8 characters with a digit, a lowercase and an uppercase letter.
pub fn password_is_complex(password: &str) -> bool {
    let len = password.chars().count();
    (4..=8).contains(&len)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_complexity() {
        assert!(password_is_complex("Pa$$w0rd"));
        assert!(!password_is_complex("password"));
        assert!(!password_is_complex("Pa1"));
        assert!(!password_is_complex("Password123"));
    }
}
