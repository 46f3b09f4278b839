use std::convert::Infallible;

use warp::{
    http::StatusCode,
    reject::{
        InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge, UnsupportedMediaType,
    },
    reply::{self, Reply, Response},
    Filter, Rejection,
};

use crate::{
    error::{ApiError, ErrorBody},
    pagination::PageRequest,
    state::Context,
};

pub mod catalog;
pub mod recipes;
pub mod users;

pub type QueryPairs = Vec<(String, String)>;

pub fn with_query() -> impl Filter<Extract = (QueryPairs,), Error = Rejection> + Clone {
    warp::query::<QueryPairs>()
}

pub(crate) fn query_value<'a>(query: &'a QueryPairs, key: &str) -> Option<&'a str> {
    query
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub(crate) fn query_number(query: &QueryPairs, key: &str) -> Result<Option<i64>, ApiError> {
    query_value(query, key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ApiError::Validation(format!("{key}: Expected a number")))
        })
        .transpose()
}

pub(crate) fn page_request(query: &QueryPairs, default_limit: i64) -> Result<PageRequest, ApiError> {
    PageRequest::new(
        query_number(query, "page")?,
        query_number(query, "limit")?,
        default_limit,
    )
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Every route of the service, with errors rendered as JSON.
pub fn api(ctx: Context) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    recipes::routes(ctx.clone())
        .or(users::routes(ctx.clone()))
        .unify()
        .or(catalog::routes(ctx))
        .unify()
        .recover(handle_rejection)
        .with(warp::log("foodgram::api"))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, error) = if let Some(e) = err.find::<ApiError>() {
        (e.status(), e.body().error)
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, String::from("Not found"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.find::<InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, String::from("Invalid query string"))
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            String::from("Method not allowed"),
        )
    } else if err.find::<PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            String::from("Payload too large"),
        )
    } else if err.find::<LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, String::from("Length required"))
    } else if err.find::<UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            String::from("Expected a JSON body"),
        )
    } else {
        log::error!("Unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("Internal server error"),
        )
    };

    Ok(reply::with_status(reply::json(&ErrorBody { error }), status))
}
