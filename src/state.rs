use std::{convert::Infallible, path::PathBuf, sync::Arc};

use sqlx::{Pool, Postgres};
use warp::Filter;

use crate::config::Config;

/// Per-process handles every request handler receives explicitly.
#[derive(Clone)]
pub struct Context {
    pub pool: Pool<Postgres>,
    pub jwt_secret: Arc<str>,
    pub media_root: Arc<PathBuf>,
    pub page_size: i64,
}

impl Context {
    pub fn new(pool: Pool<Postgres>, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: Arc::from(config.jwt_secret.as_str()),
            media_root: Arc::new(config.media_root.clone()),
            page_size: config.page_size,
        }
    }
}

pub fn with_context(ctx: Context) -> impl Filter<Extract = (Context,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}
