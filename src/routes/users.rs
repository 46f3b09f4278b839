use warp::{
    filters::BoxedFilter,
    reject,
    reply::{Reply, Response},
    Filter, Rejection,
};

use crate::{
    authentication::{
        middleware::{with_possible_session, with_session},
        permissions::ActionType,
    },
    constants::DEFAULT_RECIPES_LIMIT,
    database::actions::{fetch_subscriptions, follow, get_author, unfollow},
    jwt::SessionData,
    state::{with_context, Context},
    views::{AuthorView, ViewKind},
};

use super::{no_content, page_request, query_number, with_query, QueryPairs};

async fn read_user(
    id: i32,
    session: Option<SessionData>,
    ctx: Context,
) -> Result<Response, Rejection> {
    let viewer = session.map(|s| s.user_id);
    let author = get_author(viewer, id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(ViewKind::Read.reply(&AuthorView::from(author)).into_response())
}

async fn read_me(session: SessionData, ctx: Context) -> Result<Response, Rejection> {
    read_user(session.user_id, Some(session), ctx).await
}

async fn list_subscriptions(
    session: SessionData,
    query: QueryPairs,
    ctx: Context,
) -> Result<Response, Rejection> {
    let page = page_request(&query, ctx.page_size).map_err(reject::custom)?;
    let recipes_limit = query_number(&query, "recipes_limit")
        .map_err(reject::custom)?
        .unwrap_or(DEFAULT_RECIPES_LIMIT);

    let subscriptions = fetch_subscriptions(session.user_id, page, recipes_limit, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(ViewKind::Read.reply(&subscriptions).into_response())
}

async fn subscribe(id: i32, session: SessionData, ctx: Context) -> Result<Response, Rejection> {
    session
        .authenticate(ActionType::ManageOwnSubscriptions)
        .map_err(reject::custom)?;
    let author = follow(session.user_id, id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(ViewKind::Create.reply(&AuthorView::from(author)).into_response())
}

async fn unsubscribe(id: i32, session: SessionData, ctx: Context) -> Result<Response, Rejection> {
    session
        .authenticate(ActionType::ManageOwnSubscriptions)
        .map_err(reject::custom)?;
    unfollow(session.user_id, id, &ctx.pool)
        .await
        .map_err(reject::custom)?;

    Ok(no_content())
}

pub fn routes(ctx: Context) -> BoxedFilter<(Response,)> {
    let secret = ctx.jwt_secret.clone();

    let me = warp::path!("users" / "me")
        .and(warp::get())
        .and(with_session(secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(read_me);

    let subscriptions = warp::path!("users" / "subscriptions")
        .and(warp::get())
        .and(with_session(secret.clone()))
        .and(with_query())
        .and(with_context(ctx.clone()))
        .and_then(list_subscriptions);

    let read = warp::path!("users" / i32)
        .and(warp::get())
        .and(with_possible_session(secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(read_user);

    let add_subscription = warp::path!("users" / i32 / "subscribe")
        .and(warp::post())
        .and(with_session(secret.clone()))
        .and(with_context(ctx.clone()))
        .and_then(subscribe);

    let remove_subscription = warp::path!("users" / i32 / "subscribe")
        .and(warp::delete())
        .and(with_session(secret))
        .and(with_context(ctx))
        .and_then(unsubscribe);

    me.or(subscriptions)
        .unify()
        .or(read)
        .unify()
        .or(add_subscription)
        .unify()
        .or(remove_subscription)
        .unify()
        .boxed()
}

#[cfg(test)]
mod tests {
    use warp::http::StatusCode;

    use crate::routes::{
        api,
        tests::{bearer, error_of, offline_context},
    };

    #[tokio::test]
    async fn self_subscription_is_rejected() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("POST")
            .path("/users/7/subscribe")
            .header("authorization", bearer(7))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(response.body()), "You can't subscribe to yourself");
    }

    #[tokio::test]
    async fn self_unsubscription_is_rejected() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("DELETE")
            .path("/users/7/subscribe")
            .header("authorization", bearer(7))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn subscriptions_require_a_caller() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("GET")
            .path("/users/subscriptions")
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn recipes_limit_must_be_numeric() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("GET")
            .path("/users/subscriptions?recipes_limit=all")
            .header("authorization", bearer(2))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_of(response.body()).starts_with("recipes_limit"));
    }

    #[tokio::test]
    async fn huge_subscription_pages_are_rejected() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("GET")
            .path("/users/subscriptions?page=9223372036854775807&limit=2")
            .header("authorization", bearer(2))
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_of(response.body()).starts_with("page"));
    }

    #[tokio::test]
    async fn me_requires_a_caller() {
        let api = api(offline_context());
        let response = warp::test::request()
            .method("GET")
            .path("/users/me")
            .header("authorization", "Token garbage")
            .reply(&api)
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
