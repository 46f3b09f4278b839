use std::{collections::HashMap, path::Path};

use sqlx::{Pool, Postgres, QueryBuilder, Transaction};

use crate::{
    authentication::permissions::ActionType,
    error::ApiError,
    form::{IngredientAmount, RecipeForm, RecipePatch},
    image::{decode_data_uri, remove_image, store_image},
    jwt::SessionData,
    pagination::{PageContext, PageRequest},
    schema::{Recipe, RecipeDetail, RecipePart, RecipeRow, RecipeShort, Tag},
};

use super::{tags::list_recipe_tags, users::list_authors};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// `1`/`true` and `0`/`false`; anything else is rejected.
pub fn parse_flag(key: &str, value: &str) -> Result<bool, ApiError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::Validation(format!(
            "{key}: Expected one of 1, 0, true, false"
        ))),
    }
}

impl RecipeFilter {
    /// Reads the filter keys and ignores everything else, e.g. paging.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();

        for (key, value) in pairs {
            match key {
                "author" => {
                    let author = value
                        .parse()
                        .map_err(|_| ApiError::validation("author: Expected a user id"))?;
                    filter.author = Some(author);
                }
                "tags" if !value.is_empty() => filter.tags.push(value.to_string()),
                "is_favorited" => filter.is_favorited = parse_flag(key, value)?,
                "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(key, value)?,
                _ => {}
            }
        }

        Ok(filter)
    }
}

/// Recipe rows as seen by `viewer`, open for extra `AND` clauses.
fn recipe_rows_query<'a>(viewer: Option<i32>) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time,
            EXISTS (SELECT 1 FROM favorite_recipes f WHERE f.recipe_id = r.id AND f.user_id = ",
    );
    query.push_bind(viewer);
    query.push(
        ") AS is_favorited,
            EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ",
    );
    query.push_bind(viewer);
    query.push(
        ") AS is_in_shopping_cart,
            COUNT(*) OVER() AS count
        FROM recipes r
        WHERE TRUE",
    );
    query
}

/// Appends the `AND` clauses of `filter` to a query over `recipes r`.
fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    viewer: Option<i32>,
    filter: &RecipeFilter,
) {
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id
                WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    // membership filters only mean something for a known caller
    if let Some(viewer) = viewer {
        if filter.is_favorited {
            query
                .push(" AND EXISTS (SELECT 1 FROM favorite_recipes f WHERE f.recipe_id = r.id AND f.user_id = ")
                .push_bind(viewer)
                .push(")");
        }
        if filter.is_in_shopping_cart {
            query
                .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                .push_bind(viewer)
                .push(")");
        }
    }
}

/// Number of recipes matching `filter`, for pages that hold no rows to carry the window count.
pub async fn count_recipes(
    viewer: Option<i32>,
    filter: &RecipeFilter,
    pool: &Pool<Postgres>,
) -> Result<i64, ApiError> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
    push_filters(&mut query, viewer, filter);

    let count: (i64,) = query.build_query_as().fetch_one(pool).await?;
    Ok(count.0)
}

pub async fn fetch_recipes(
    viewer: Option<i32>,
    filter: &RecipeFilter,
    page: PageRequest,
    pool: &Pool<Postgres>,
) -> Result<PageContext<RecipeDetail>, ApiError> {
    let mut query = recipe_rows_query(viewer);
    push_filters(&mut query, viewer, filter);

    query
        .push(" ORDER BY r.name, r.id LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    log::trace!("> Fetching recipes {filter:?} page {}", page.page);
    let rows: Vec<RecipeRow> = query.build_query_as().fetch_all(pool).await?;

    let total_count = match rows.first() {
        Some(row) => row.count,
        None if page.offset() > 0 => count_recipes(viewer, filter, pool).await?,
        None => 0,
    };
    let details = load_details(viewer, rows, pool).await?;

    Ok(PageContext::from_rows(
        details,
        total_count,
        page.limit,
        page.offset(),
    ))
}

pub async fn get_recipe(
    viewer: Option<i32>,
    id: i32,
    pool: &Pool<Postgres>,
) -> Result<RecipeDetail, ApiError> {
    let mut query = recipe_rows_query(viewer);
    query.push(" AND r.id = ").push_bind(id);

    let row: Option<RecipeRow> = query.build_query_as().fetch_optional(pool).await?;
    let row = row.ok_or_else(|| ApiError::not_found("No recipe exists with specified id"))?;

    load_details(viewer, vec![row], pool)
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal(format!("Recipe {id} vanished while loading")))
}

/// Attaches authors, tags and ingredients to `rows` with one query per relation.
async fn load_details(
    viewer: Option<i32>,
    rows: Vec<RecipeRow>,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeDetail>, ApiError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let recipe_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<i32> = rows.iter().map(|row| row.author_id).collect();

    let authors: HashMap<i32, _> = list_authors(viewer, &author_ids, pool)
        .await?
        .into_iter()
        .map(|author| (author.id, author))
        .collect();

    let mut tags: HashMap<i32, Vec<Tag>> = HashMap::new();
    for tag in list_recipe_tags(&recipe_ids, pool).await? {
        tags.entry(tag.recipe_id).or_default().push(tag.into());
    }

    let mut parts: HashMap<i32, Vec<RecipePart>> = HashMap::new();
    for part in list_recipe_parts(&recipe_ids, pool).await? {
        parts.entry(part.recipe_id).or_default().push(part);
    }

    rows.into_iter()
        .map(|recipe| {
            let author = match authors.get(&recipe.author_id) {
                Some(author) => author.clone(),
                None => {
                    return Err(ApiError::Internal(format!(
                        "Author {} of recipe {} is missing",
                        recipe.author_id, recipe.id
                    )))
                }
            };

            Ok(RecipeDetail {
                tags: tags.remove(&recipe.id).unwrap_or_default(),
                ingredients: parts.remove(&recipe.id).unwrap_or_default(),
                author,
                recipe,
            })
        })
        .collect()
}

/// Ingredient lines of every recipe in `recipe_ids`, in insertion order.
pub async fn list_recipe_parts(
    recipe_ids: &[i32],
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipePart>, ApiError> {
    let rows: Vec<RecipePart> = sqlx::query_as(
        "
        SELECT ri.recipe_id, i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ANY($1)
        ORDER BY ri.id
    ",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_recipe_short(id: i32, pool: &Pool<Postgres>) -> Result<RecipeShort, ApiError> {
    let row: Option<RecipeShort> =
        sqlx::query_as("SELECT id, name, image, cooking_time FROM recipes WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or_else(|| ApiError::not_found("No recipe exists with specified id"))
}

/// Loads a recipe the caller is allowed to change.
pub async fn get_recipe_mut(
    id: i32,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, ApiError> {
    let recipe: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match recipe {
        Some(recipe) => {
            session.authenticate(ActionType::ManageOwnRecipe {
                author_id: recipe.author_id,
            })?;
            Ok(recipe)
        }
        None => Err(ApiError::not_found("No recipe exists with specified id")),
    }
}

fn unknown_reference(collection: &'static str) -> impl Fn(sqlx::Error) -> ApiError {
    move |e| match ApiError::from(e) {
        ApiError::Validation(_) => {
            ApiError::Validation(format!("{collection}: Unknown {collection} id"))
        }
        other => other,
    }
}

async fn insert_parts(
    recipe_id: i32,
    ingredients: &[IngredientAmount],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), ApiError> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    query.push_values(ingredients, |mut row, ingredient| {
        row.push_bind(recipe_id)
            .push_bind(ingredient.id)
            .push_bind(ingredient.amount);
    });

    query
        .build()
        .execute(&mut **tx)
        .await
        .map_err(unknown_reference("ingredients"))?;

    Ok(())
}

async fn insert_tags(
    recipe_id: i32,
    tags: &[i32],
    tx: &mut Transaction<'_, Postgres>,
) -> Result<(), ApiError> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    query.push_values(tags, |mut row, tag| {
        row.push_bind(recipe_id).push_bind(*tag);
    });

    query
        .build()
        .execute(&mut **tx)
        .await
        .map_err(unknown_reference("tags"))?;

    Ok(())
}

/// Creates the recipe with its ingredients and tags atomically; returns its id.
pub async fn create_recipe(
    session: &SessionData,
    form: &RecipeForm,
    media_root: &Path,
    pool: &Pool<Postgres>,
) -> Result<i32, ApiError> {
    session.authenticate(ActionType::CreateRecipes)?;
    form.validate()?;

    let image = decode_data_uri(&form.image)?;
    let image = store_image(media_root, &image).await?;

    match insert_recipe(session.user_id, form, &image, pool).await {
        Ok(id) => {
            log::info!("User {} created recipe {id}", session.user_id);
            Ok(id)
        }
        Err(e) => {
            remove_image(media_root, &image).await;
            Err(e)
        }
    }
}

async fn insert_recipe(
    author_id: i32,
    form: &RecipeForm,
    image: &str,
    pool: &Pool<Postgres>,
) -> Result<i32, ApiError> {
    let mut tx = pool.begin().await?;

    let id: (i32,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, text, image, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(&form.name)
    .bind(&form.text)
    .bind(image)
    .bind(form.cooking_time)
    .fetch_one(&mut *tx)
    .await?;

    insert_parts(id.0, &form.ingredients, &mut tx).await?;
    insert_tags(id.0, &form.tags, &mut tx).await?;

    tx.commit().await?;
    Ok(id.0)
}

/// Applies `patch` as one transaction. Supplied ingredient and tag lists replace the old ones.
pub async fn update_recipe(
    session: &SessionData,
    id: i32,
    patch: &RecipePatch,
    media_root: &Path,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let recipe = get_recipe_mut(id, session, pool).await?;
    patch.validate()?;

    let image = match &patch.image {
        Some(uri) => Some(store_image(media_root, &decode_data_uri(uri)?).await?),
        None => None,
    };

    let result = apply_patch(&recipe, patch, image.as_deref(), pool).await;

    match (result, image) {
        (Ok(()), Some(_)) => remove_image(media_root, &recipe.image).await,
        (Ok(()), None) => {}
        (Err(e), image) => {
            if let Some(image) = image {
                remove_image(media_root, &image).await;
            }
            return Err(e);
        }
    }

    log::info!("User {} updated recipe {id}", session.user_id);
    Ok(())
}

async fn apply_patch(
    recipe: &Recipe,
    patch: &RecipePatch,
    image: Option<&str>,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "
        UPDATE recipes SET
            name = COALESCE($2, name),
            text = COALESCE($3, text),
            image = COALESCE($4, image),
            cooking_time = COALESCE($5, cooking_time)
        WHERE id = $1
    ",
    )
    .bind(recipe.id)
    .bind(patch.name.as_deref())
    .bind(patch.text.as_deref())
    .bind(image)
    .bind(patch.cooking_time)
    .execute(&mut *tx)
    .await?;

    if let Some(ingredients) = &patch.ingredients {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe.id)
            .execute(&mut *tx)
            .await?;
        insert_parts(recipe.id, ingredients, &mut tx).await?;
    }

    if let Some(tags) = &patch.tags {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe.id)
            .execute(&mut *tx)
            .await?;
        insert_tags(recipe.id, tags, &mut tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_recipe(
    session: &SessionData,
    id: i32,
    media_root: &Path,
    pool: &Pool<Postgres>,
) -> Result<(), ApiError> {
    let recipe = get_recipe_mut(id, session, pool).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe.id)
        .execute(pool)
        .await?;

    remove_image(media_root, &recipe.image).await;
    log::info!("User {} deleted recipe {id}", session.user_id);

    Ok(())
}
