use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr};

use thiserror::Error;

use crate::constants::DEFAULT_PAGE_SIZE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    Missing(&'static str),

    #[error("Invalid {key} value: {info}")]
    Invalid { key: &'static str, info: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_address: SocketAddr,
    pub media_root: PathBuf,
    pub page_size: i64,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            database_url: require(&lookup, "DATABASE_URL")?,
            jwt_secret: require(&lookup, "FOODGRAM_JWT_SECRET")?,
            bind_address: try_load(&lookup, "FOODGRAM_BIND", "0.0.0.0:8000")?,
            media_root: try_load(&lookup, "FOODGRAM_MEDIA_ROOT", "media")?,
            page_size: try_load(&lookup, "FOODGRAM_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())?,
            max_connections: try_load(&lookup, "FOODGRAM_MAX_CONNECTIONS", "5")?,
        };

        if config.page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "FOODGRAM_PAGE_SIZE",
                info: String::from("must be positive"),
            });
        }

        Ok(config)
    }
}

fn require<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            info: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn fills_in_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/foodgram"),
            ("FOODGRAM_JWT_SECRET", "hunter2"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn requires_database_and_secret() {
        let error = Config::from_lookup(lookup(&[("FOODGRAM_JWT_SECRET", "x")])).unwrap_err();
        assert!(matches!(error, ConfigError::Missing("DATABASE_URL")));

        let error = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap_err();
        assert!(matches!(error, ConfigError::Missing("FOODGRAM_JWT_SECRET")));
    }

    #[test]
    fn rejects_bad_values() {
        let error = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("FOODGRAM_JWT_SECRET", "x"),
            ("FOODGRAM_BIND", "not an address"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { key: "FOODGRAM_BIND", .. }));

        let error = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("FOODGRAM_JWT_SECRET", "x"),
            ("FOODGRAM_PAGE_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { key: "FOODGRAM_PAGE_SIZE", .. }));
    }
}
