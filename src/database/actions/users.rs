use serde::Deserialize;
use sqlx::{Pool, Postgres};

use crate::{
    authentication::cryptography::hash_password,
    error::ApiError,
    schema::{AuthorRow, User},
};

#[derive(Deserialize, Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub async fn get_user_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: i32) -> Result<Option<User>, ApiError> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Creates a user; the stored password is the argon2 hash of `user.password`.
pub async fn create_user(user: &NewUser, pool: &Pool<Postgres>) -> Result<User, ApiError> {
    if user.email.trim().is_empty() || user.username.trim().is_empty() {
        return Err(ApiError::validation("Email and username are required"));
    }

    let password =
        hash_password(&user.password).map_err(|e| ApiError::Internal(format!("{e}")))?;

    let row: User = sqlx::query_as(
        "
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    ",
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(password)
    .fetch_one(pool)
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::AlreadyExists(_) => ApiError::AlreadyExists(String::from(
            "A user with this email or username already exists",
        )),
        other => other,
    })?;

    log::info!("Created user {} ({})", row.username, row.id);
    Ok(row)
}

/// Public profile of `user_id`, with `is_subscribed` relative to `viewer`.
pub async fn get_author(
    viewer: Option<i32>,
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<AuthorRow, ApiError> {
    let row: Option<AuthorRow> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            EXISTS (
                SELECT 1 FROM subscriptions s WHERE s.user_id = $2 AND s.author_id = u.id
            ) AS is_subscribed
        FROM users u
        WHERE u.id = $1
    ",
    )
    .bind(user_id)
    .bind(viewer)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| ApiError::not_found("No user exists with specified id"))
}

pub async fn list_authors(
    viewer: Option<i32>,
    ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<Vec<AuthorRow>, ApiError> {
    let rows: Vec<AuthorRow> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            EXISTS (
                SELECT 1 FROM subscriptions s WHERE s.user_id = $2 AND s.author_id = u.id
            ) AS is_subscribed
        FROM users u
        WHERE u.id = ANY($1)
    ",
    )
    .bind(ids)
    .bind(viewer)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
