use std::collections::HashMap;

use sqlx::{Pool, Postgres};

use crate::{
    error::ApiError,
    pagination::{PageContext, PageRequest},
    schema::{AuthorRecipe, AuthorRow, SubscriptionRow},
    views::SubscriptionView,
};

use super::users::{get_author, get_user_by_id};

fn check_not_self(user_id: i32, author_id: i32) -> Result<(), ApiError> {
    if user_id == author_id {
        return Err(ApiError::InvalidOperation(String::from(
            "You can't subscribe to yourself",
        )));
    }
    Ok(())
}

pub async fn is_subscribed(
    user_id: i32,
    author_id: i32,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

/// Creates the `user_id -> author_id` edge and returns the followed author.
pub async fn follow(
    user_id: i32,
    author_id: i32,
    pool: &Pool<Postgres>,
) -> Result<AuthorRow, ApiError> {
    check_not_self(user_id, author_id)?;

    if get_user_by_id(pool, author_id).await?.is_none() {
        return Err(ApiError::not_found("No user exists with specified id"));
    }

    let created: Option<(i32,)> = sqlx::query_as(
        "INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    if created.is_none() {
        return Err(ApiError::AlreadyExists(String::from(
            "You are already subscribed to this author",
        )));
    }

    log::info!("User {user_id} subscribed to {author_id}");
    get_author(Some(user_id), author_id, pool).await
}

pub async fn unfollow(user_id: i32, author_id: i32, pool: &Pool<Postgres>) -> Result<(), ApiError> {
    check_not_self(user_id, author_id)?;

    if get_user_by_id(pool, author_id).await?.is_none() {
        return Err(ApiError::not_found("No user exists with specified id"));
    }

    let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::RelationNotFound(String::from(
            "You are not subscribed to this author",
        )));
    }

    log::info!("User {user_id} unsubscribed from {author_id}");
    Ok(())
}

/// Latest `limit` recipes of each author in `author_ids`.
async fn list_author_recipes(
    author_ids: &[i32],
    limit: i64,
    pool: &Pool<Postgres>,
) -> Result<Vec<AuthorRecipe>, ApiError> {
    let rows: Vec<AuthorRecipe> = sqlx::query_as(
        "
        SELECT author_id, id, name, image, cooking_time FROM (
            SELECT r.author_id, r.id, r.name, r.image, r.cooking_time,
                ROW_NUMBER() OVER (PARTITION BY r.author_id ORDER BY r.id DESC) AS author_rank
            FROM recipes r
            WHERE r.author_id = ANY($1)
        ) ranked
        WHERE author_rank <= $2
        ORDER BY author_id, id DESC
    ",
    )
    .bind(author_ids)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn count_subscriptions(user_id: i32, pool: &Pool<Postgres>) -> Result<i64, ApiError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

pub async fn fetch_subscriptions(
    user_id: i32,
    page: PageRequest,
    recipes_limit: i64,
    pool: &Pool<Postgres>,
) -> Result<PageContext<SubscriptionView>, ApiError> {
    if recipes_limit < 0 {
        return Err(ApiError::validation("recipes_limit: Must not be negative"));
    }

    let rows: Vec<SubscriptionRow> = sqlx::query_as(
        "
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
            (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count,
            COUNT(*) OVER() AS count
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.author_id
        WHERE s.user_id = $1
        ORDER BY u.username, u.id
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total_count = match rows.first() {
        Some(row) => row.count,
        None if page.offset() > 0 => count_subscriptions(user_id, pool).await?,
        None => 0,
    };
    let author_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let mut recipes: HashMap<i32, Vec<AuthorRecipe>> = HashMap::new();
    if !author_ids.is_empty() && recipes_limit > 0 {
        for recipe in list_author_recipes(&author_ids, recipes_limit, pool).await? {
            recipes.entry(recipe.author_id).or_default().push(recipe);
        }
    }

    let views = rows
        .into_iter()
        .map(|row| {
            let author_recipes = recipes.remove(&row.id).unwrap_or_default();
            SubscriptionView::new(row, author_recipes)
        })
        .collect();

    Ok(PageContext::from_rows(
        views,
        total_count,
        page.limit,
        page.offset(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_follow_is_rejected_before_the_store() {
        assert!(matches!(
            check_not_self(4, 4),
            Err(ApiError::InvalidOperation(_))
        ));
        assert!(check_not_self(4, 5).is_ok());
    }
}
