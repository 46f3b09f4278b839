use std::sync::Arc;

use warp::{reject::Rejection, Filter};

use crate::{constants::SESSION_COOKIE, database::error::ApiError};

use super::jwt::{verify_jwt_session, SessionData};

fn bearer_token(header: &str) -> Option<String> {
    let (scheme, token) = header.trim().split_once(' ')?;
    match scheme {
        "Bearer" | "Token" if !token.trim().is_empty() => Some(token.trim().to_string()),
        _ => None,
    }
}

/// Token from the `Authorization` header, falling back to the session cookie.
fn with_token() -> impl Filter<Extract = (Option<String>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional::<String>(SESSION_COOKIE))
        .map(|header: Option<String>, cookie: Option<String>| {
            header.as_deref().and_then(bearer_token).or(cookie)
        })
}

pub fn with_session(
    secret: Arc<str>,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    with_token().and_then(move |token: Option<String>| {
        let secret = secret.clone();
        async move {
            let token = token.ok_or_else(|| {
                warp::reject::custom(ApiError::Unauthorized(String::from(
                    "Authentication credentials were not provided",
                )))
            })?;

            verify_jwt_session(&token, secret.as_bytes())
                .map(SessionData::from)
                .map_err(warp::reject::custom)
        }
    })
}

pub fn with_possible_session(
    secret: Arc<str>,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
    with_token().map(move |token: Option<String>| {
        token.and_then(|token| {
            verify_jwt_session(&token, secret.as_bytes())
                .map(SessionData::from)
                .ok()
        })
    })
}
