pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Recipes embedded per author in the subscription list.
pub const DEFAULT_RECIPES_LIMIT: i64 = 3;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

pub const IMAGE_DIR: &str = "recipes/images";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Largest accepted JSON body; recipe images travel inline as base64.
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;
