use warp::{
    filters::BoxedFilter,
    reject,
    reply::{self, Reply, Response},
    Filter, Rejection,
};

use crate::{
    authentication::{
        middleware::{with_possible_session, with_session},
        permissions::ActionType,
    },
    constants::{MAX_BODY_BYTES, SHOPPING_LIST_FILENAME},
    database::actions::{
        add_membership, create_recipe, delete_recipe, fetch_recipes, get_recipe,
        remove_membership, shopping_list, update_recipe, MembershipKind, RecipeFilter,
    },
    form::{RecipeForm, RecipePatch},
    jwt::SessionData,
    schema::RecipeDetail,
    state::{with_context, Context},
    views::{RecipeShortView, RecipeView, ViewKind},
};

use super::{no_content, page_request, with_query, QueryPairs};

fn render(kind: ViewKind, recipe: RecipeDetail) -> Response {
    kind.reply(&kind.render(recipe)).into_response()
}

fn membership_action(kind: MembershipKind) -> ActionType {
    match kind {
        MembershipKind::Favorite => ActionType::ManageOwnFavorites,
        MembershipKind::ShoppingCart => ActionType::ManageOwnShoppingCart,
    }
}

async fn list_recipes(
    session: Option<SessionData>,
    query: QueryPairs,
    ctx: Context,
) -> Result<Response, Rejection> {
    let filter = RecipeFilter::from_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(reject::custom)?;
    let page = page_request(&query, ctx.page_size).map_err(reject::custom)?;
    let viewer = session.map(|s| s.user_id);

    let recipes = fetch_recipes(viewer, &filter, page, &ctx.pool)
        .await
        .map_err(reject::custom)?
        .map(RecipeView::from);

    Ok(ViewKind::Read.reply(&recipes).into_response())
}

async fn read_recipe(
    id: i32,
    session: Option<SessionData>,
    ctx: Context,
) -> Result<Response, Rejection> {
    let viewer = session.map(|s| s.user_id);
    let recipe = get_recipe(viewer, id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(render(ViewKind::Read, recipe))
}

async fn post_recipe(
    session: SessionData,
    form: RecipeForm,
    ctx: Context,
) -> Result<Response, Rejection> {
    let id = create_recipe(&session, &form, &ctx.media_root, &ctx.pool)
        .await
        .map_err(reject::custom)?;
    let recipe = get_recipe(Some(session.user_id), id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(render(ViewKind::Create, recipe))
}

async fn patch_recipe(
    id: i32,
    session: SessionData,
    patch: RecipePatch,
    ctx: Context,
) -> Result<Response, Rejection> {
    update_recipe(&session, id, &patch, &ctx.media_root, &ctx.pool)
        .await
        .map_err(reject::custom)?;
    let recipe = get_recipe(Some(session.user_id), id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(render(ViewKind::Update, recipe))
}

async fn remove_recipe(id: i32, session: SessionData, ctx: Context) -> Result<Response, Rejection> {
    delete_recipe(&session, id, &ctx.media_root, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(no_content())
}

async fn add_to(
    id: i32,
    kind: MembershipKind,
    session: SessionData,
    ctx: Context,
) -> Result<Response, Rejection> {
    session
        .authenticate(membership_action(kind))
        .map_err(reject::custom)?;
    let recipe = add_membership(kind, id, session.user_id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    let view = match kind {
        MembershipKind::Favorite => ViewKind::FavoriteView,
        MembershipKind::ShoppingCart => ViewKind::CartView,
    };
    Ok(view.reply(&RecipeShortView::from(recipe)).into_response())
}

async fn remove_from(
    id: i32,
    kind: MembershipKind,
    session: SessionData,
    ctx: Context,
) -> Result<Response, Rejection> {
    session
        .authenticate(membership_action(kind))
        .map_err(reject::custom)?;
    remove_membership(kind, id, session.user_id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(no_content())
}

async fn download_shopping_cart(session: SessionData, ctx: Context) -> Result<Response, Rejection> {
    session
        .authenticate(ActionType::ManageOwnShoppingCart)
        .map_err(reject::custom)?;
    let body = shopping_list(session.user_id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    let reply = reply::with_header(
        body,
        "content-disposition",
        format!("attachment; filename={SHOPPING_LIST_FILENAME}"),
    );
    Ok(reply.into_response())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn membership_routes(path: &'static str, kind: MembershipKind, ctx: Context) -> BoxedFilter<(Response,)> {
    let member = warp::path("recipes")
        .and(warp::path::param::<i32>())
        .and(warp::path(path))
        .and(warp::path::end())
        .map(move |id: i32| (id, kind))
        .untuple_one();

    let add = member
        .clone()
        .and(warp::post())
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(add_to);

    let remove = member
        .and(warp::delete())
        .and(with_session(ctx.jwt_secret.clone()))
        .and(with_context(ctx))
        .and_then(remove_from);

    add.or(remove).unify().boxed()
}

pub fn routes(ctx: Context) -> BoxedFilter<(Response,)> {
    let secret = ctx.jwt_secret.clone();

    let list = warp::path!("recipes")
        .and(warp::get())
        .and(with_possible_session(secret.clone()))
        .and(with_query())
        .and(with_context(ctx.clone()))
        .and_then(list_recipes);

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(with_session(secret.clone()))
        .and(json_body::<RecipeForm>())
        .and(with_context(ctx.clone()))
        .and_then(post_recipe);

    let download = warp::path!("recipes" / "download_shopping_cart")
        .and(warp::get())
        .and(with_session(secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(download_shopping_cart);

    let read = warp::path!("recipes" / i32)
        .and(warp::get())
        .and(with_possible_session(secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(read_recipe);

    let update = warp::path!("recipes" / i32)
        .and(warp::patch())
        .and(with_session(secret.clone()))
        .and(json_body::<RecipePatch>())
        .and(with_context(ctx.clone()))
        .and_then(patch_recipe);

    let delete = warp::path!("recipes" / i32)
        .and(warp::delete())
        .and(with_session(secret))
        .and(with_context(ctx.clone()))
        .and_then(remove_recipe);

    list.or(create)
        .unify()
        .or(download)
        .unify()
        .or(read)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(membership_routes("favorite", MembershipKind::Favorite, ctx.clone()))
        .unify()
        .or(membership_routes(
            "shopping_cart",
            MembershipKind::ShoppingCart,
            ctx,
        ))
        .unify()
        .boxed()
}
