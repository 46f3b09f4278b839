//! Favorites and the shopping cart: one row per (user, recipe), decided by the unique constraint.

use sqlx::{Pool, Postgres};

use crate::{error::ApiError, schema::RecipeShort};

use super::recipes::get_recipe_short;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipKind {
    Favorite,
    ShoppingCart,
}

impl MembershipKind {
    pub fn table(self) -> &'static str {
        match self {
            MembershipKind::Favorite => "favorite_recipes",
            MembershipKind::ShoppingCart => "shopping_cart",
        }
    }

    fn already_member(self) -> &'static str {
        match self {
            MembershipKind::Favorite => "Recipe is already in favorites",
            MembershipKind::ShoppingCart => "Recipe is already in the shopping cart",
        }
    }

    fn not_member(self) -> &'static str {
        match self {
            MembershipKind::Favorite => "Recipe is not in favorites",
            MembershipKind::ShoppingCart => "Recipe is not in the shopping cart",
        }
    }
}

/// Names the row that vanished when an insert trips a foreign key; Postgres names them `<table>_<column>_fkey`.
fn reference_error(constraint: &str) -> Option<ApiError> {
    if constraint.ends_with("_recipe_id_fkey") {
        Some(ApiError::not_found("No recipe exists with specified id"))
    } else if constraint.ends_with("_user_id_fkey") {
        Some(ApiError::Unauthorized(String::from(
            "The authenticated user no longer exists",
        )))
    } else {
        None
    }
}

fn missing_reference(e: sqlx::Error) -> ApiError {
    let constraint = e
        .as_database_error()
        .filter(|db| db.is_foreign_key_violation())
        .and_then(|db| db.constraint().map(str::to_string));

    constraint
        .as_deref()
        .and_then(reference_error)
        .unwrap_or_else(|| ApiError::from(e))
}

pub async fn is_member(
    kind: MembershipKind,
    recipe_id: i32,
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<bool, ApiError> {
    let result: Option<(i32,)> = sqlx::query_as(&format!(
        "SELECT recipe_id FROM {} WHERE recipe_id = $1 AND user_id = $2",
        kind.table()
    ))
    .bind(recipe_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(result.is_some())
}

pub async fn add_membership(
    kind: MembershipKind,
    recipe_id: i32,
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<RecipeShort, ApiError> {
    let recipe = get_recipe_short(recipe_id, pool).await?;

    let created: Option<(i32,)> = sqlx::query_as(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING RETURNING id",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await
    .map_err(missing_reference)?;

    if created.is_none() {
        return Err(ApiError::AlreadyExists(kind.already_member().to_string()));
    }

    log::debug!("User {user_id} added recipe {recipe_id} to {}", kind.table());
    Ok(recipe)
}

pub async fn remove_membership(
    kind: MembershipKind,
    recipe_id: i32,
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    get_recipe_short(recipe_id, pool).await?;

    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::RelationNotFound(kind.not_member().to_string()));
    }

    log::debug!("User {user_id} removed recipe {recipe_id} from {}", kind.table());
    Ok(())
}


#[cfg(test)]
mod reference_tests {
    use super::*;

    #[test]
    fn foreign_keys_name_the_missing_row() {
        for table in ["favorite_recipes", "shopping_cart"] {
            assert!(matches!(
                reference_error(&format!("{table}_recipe_id_fkey")),
                Some(ApiError::NotFound(_))
            ));
            assert!(matches!(
                reference_error(&format!("{table}_user_id_fkey")),
                Some(ApiError::Unauthorized(_))
            ));
        }
        assert!(reference_error("unique_favorite_recipe").is_none());
    }

    #[test]
    fn other_failures_keep_their_mapping() {
        assert!(matches!(
            missing_reference(sqlx::Error::PoolClosed),
            ApiError::Query(_)
        ));
    }

    #[test]
    fn tables_match_the_schema() {
        assert_eq!(MembershipKind::Favorite.table(), "favorite_recipes");
        assert_eq!(MembershipKind::ShoppingCart.table(), "shopping_cart");
    }
}
