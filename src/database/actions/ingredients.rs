use sqlx::{Pool, Postgres};

use crate::{error::ApiError, schema::Ingredient};

/// Escapes `LIKE` wildcards so the prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_ingredients(
    prefix: Option<&str>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Ingredient>, ApiError> {
    let rows: Vec<Ingredient> = match prefix.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => {
            sqlx::query_as("SELECT * FROM ingredients WHERE name LIKE $1 ORDER BY name, id")
                .bind(like_prefix(prefix))
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT * FROM ingredients ORDER BY name, id")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows)
}

pub async fn get_ingredient(id: i32, pool: &Pool<Postgres>) -> Result<Ingredient, ApiError> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.ok_or_else(|| ApiError::not_found("No ingredient exists with specified id"))
}

/// Returns the id of the (name, unit) ingredient, creating it when missing.
pub async fn create_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Postgres>,
) -> Result<i32, ApiError> {
    let created: Option<(i32,)> = sqlx::query_as(
        "
        INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2)
        ON CONFLICT (name, measurement_unit) DO NOTHING
        RETURNING id
    ",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_optional(pool)
    .await?;

    if let Some((id,)) = created {
        return Ok(id);
    }

    let existing: (i32,) =
        sqlx::query_as("SELECT id FROM ingredients WHERE name = $1 AND measurement_unit = $2")
            .bind(name)
            .bind(measurement_unit)
            .fetch_one(pool)
            .await?;

    Ok(existing.0)
}

/// Bulk loader for reference data; returns how many rows were new.
pub async fn import_ingredients(
    rows: &[(String, String)],
    pool: &Pool<Postgres>,
) -> Result<u64, ApiError> {
    let mut tx = pool.begin().await?;
    let mut created = 0;

    for (name, unit) in rows {
        if name.trim().is_empty() || unit.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "Ingredient rows need a name and a unit, got ({name:?}, {unit:?})"
            )));
        }

        let result = sqlx::query(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(name.trim())
        .bind(unit.trim())
        .execute(&mut *tx)
        .await?;

        created += result.rows_affected();
    }

    tx.commit().await?;
    log::info!("Imported {created} of {} ingredients", rows.len());

    Ok(created)
}
