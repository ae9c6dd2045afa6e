use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::{photo_repo, user_repo};
use crate::error::{flatten_validation_errors, ApiError};
use crate::models::users::password_is_complex;
use crate::models::{LoginForm, RegisterForm, UserDto, UserRow};
use crate::services::token_service;

pub const PASSWORD_COMPLEXITY_MESSAGE: &str = "Password must be complex";

pub async fn login(pool: &SqlitePool, token_key: &str, form: &LoginForm) -> Result<UserDto, ApiError> {
    let Some(user) = user_repo::load_user_by_email(pool, form.email.trim()).await? else {
        warn!("login for unknown email");
        return Err(ApiError::Unauthorized);
    };
    if !verify_password(&form.password, &user.password_hash) {
        warn!(username = %user.username, "login with wrong password");
        return Err(ApiError::Unauthorized);
    }
    info!(username = %user.username, "user logged in");
    user_dto(pool, &user, token_key).await
}

pub async fn register(
    pool: &SqlitePool,
    token_key: &str,
    form: &RegisterForm,
) -> Result<UserDto, ApiError> {
    let mut errors = match form.validate() {
        Ok(()) => Default::default(),
        Err(e) => flatten_validation_errors(&e),
    };
    if !password_is_complex(&form.password) {
        errors
            .entry("password".to_string())
            .or_default()
            .push(PASSWORD_COMPLEXITY_MESSAGE.to_string());
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let email = form.email.trim();
    let username = form.username.trim();
    if user_repo::load_user_by_email(pool, email).await?.is_some() {
        return Err(ApiError::field("email", "Email taken"));
    }
    if user_repo::load_user_by_username(pool, username)
        .await?
        .is_some()
    {
        return Err(ApiError::field("username", "Username taken"));
    }

    let id = Uuid::new_v4().to_string();
    let password_hash = hash_password(&form.password)?;
    user_repo::insert_user(
        pool,
        user_repo::NewUser {
            id: &id,
            username,
            email,
            display_name: form.display_name.trim(),
            password_hash: &password_hash,
        },
    )
    .await?;

    let user = user_repo::load_user_by_id(pool, &id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(username = %user.username, "user registered");
    user_dto(pool, &user, token_key).await
}

pub async fn current_user(
    pool: &SqlitePool,
    token_key: &str,
    user_id: &str,
) -> Result<UserDto, ApiError> {
    let Some(user) = user_repo::load_user_by_id(pool, user_id).await? else {
        // token outlived its account
        return Err(ApiError::Unauthorized);
    };
    user_dto(pool, &user, token_key).await
}

async fn user_dto(pool: &SqlitePool, user: &UserRow, token_key: &str) -> Result<UserDto, ApiError> {
    Ok(UserDto {
        display_name: user.display_name.clone(),
        token: token_service::create_token(user, token_key)?,
        username: user.username.clone(),
        image: photo_repo::main_photo_url(pool, &user.id).await?,
    })
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
