mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod image;
    pub mod pagination;
    pub mod pool;
    pub mod schema;
    pub mod views;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod permissions;
}
pub mod config;
mod constants;
pub mod routes;
pub mod state;

pub use authentication::*;
pub use constants::*;
pub use database::*;
pub use pool::*;
