use sqlx::{Pool, Postgres};

use crate::{
    error::ApiError,
    schema::{LinkedRecipeTag, Tag},
};

pub async fn create_tag(
    name: &str,
    color: Option<&str>,
    slug: &str,
    pool: &Pool<Postgres>,
) -> Result<Tag, ApiError> {
    let tag: Tag =
        sqlx::query_as("INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING *")
            .bind(name)
            .bind(color)
            .bind(slug)
            .fetch_one(pool)
            .await?;

    Ok(tag)
}

pub async fn get_tag(id: i32, pool: &Pool<Postgres>) -> Result<Tag, ApiError> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    tag.ok_or_else(|| ApiError::not_found("No tag exists with specified id"))
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, ApiError> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    Ok(list)
}

/// Tags of every recipe in `recipe_ids`, in one query.
pub async fn list_recipe_tags(
    recipe_ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<Vec<LinkedRecipeTag>, ApiError> {
    let list: Vec<LinkedRecipeTag> = sqlx::query_as(
        "
        SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = ANY($1)
        ORDER BY t.name, t.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    Ok(list)
}
