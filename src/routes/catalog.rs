//! Read-only tag and ingredient lookups.

use warp::{
    filters::BoxedFilter,
    reject,
    reply::{Reply, Response},
    Filter, Rejection,
};

use crate::{
    database::actions::{get_ingredient, get_tag, list_ingredients, list_tags},
    state::{with_context, Context},
    views::ViewKind,
};

use super::{query_value, with_query, QueryPairs};

async fn all_tags(ctx: Context) -> Result<Response, Rejection> {
    let tags = list_tags(&ctx.pool).await.map_err(reject::custom)?;
    Ok(ViewKind::Read.reply(&tags).into_response())
}

async fn one_tag(id: i32, ctx: Context) -> Result<Response, Rejection> {
    let tag = get_tag(id, &ctx.pool).await.map_err(reject::custom)?;
    Ok(ViewKind::Read.reply(&tag).into_response())
}

async fn search_ingredients(query: QueryPairs, ctx: Context) -> Result<Response, Rejection> {
    let prefix = query_value(&query, "name").filter(|name| !name.is_empty());
    let ingredients = list_ingredients(prefix, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(ViewKind::Read.reply(&ingredients).into_response())
}

async fn one_ingredient(id: i32, ctx: Context) -> Result<Response, Rejection> {
    let ingredient = get_ingredient(id, &ctx.pool)
        .await
        .map_err(reject::custom)?;
    Ok(ViewKind::Read.reply(&ingredient).into_response())
}

pub fn routes(ctx: Context) -> BoxedFilter<(Response,)> {
    let tags = warp::path!("tags")
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .and_then(all_tags);

    let tag = warp::path!("tags" / i32)
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .and_then(one_tag);

    let ingredients = warp::path!("ingredients")
        .and(warp::get())
        .and(with_query())
        .and(with_context(ctx.clone()))
        .and_then(search_ingredients);

    let ingredient = warp::path!("ingredients" / i32)
        .and(warp::get())
        .and(with_context(ctx))
        .and_then(one_ingredient);

    tags.or(tag)
        .unify()
        .or(ingredients)
        .unify()
        .or(ingredient)
        .unify()
        .boxed()
}
