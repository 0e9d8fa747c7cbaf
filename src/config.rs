//! Runtime configuration
//!
//! Everything is read from environment variables; there is no config file.

use std::path::PathBuf;

/// Environment variable overriding the database location
pub const DATABASE_PATH_VAR: &str = "LIFEDASH_DATABASE_PATH";

/// Environment variable overriding the connection pool size
pub const POOL_SIZE_VAR: &str = "LIFEDASH_POOL_SIZE";

const DEFAULT_POOL_SIZE: u32 = 10;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub pool_size: u32,
}

impl Config {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let pool_size = std::env::var(POOL_SIZE_VAR)
            .ok()
            .and_then(|v| parse_pool_size(&v))
            .unwrap_or(DEFAULT_POOL_SIZE);

        Self {
            database_path,
            pool_size,
        }
    }
}

fn parse_pool_size(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// `<project>/data/lifedash.db`, where the project root is found by walking
/// up from `target/debug` or `target/release`
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("lifedash.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool_size() {
        assert_eq!(parse_pool_size("4"), Some(4));
        assert_eq!(parse_pool_size(" 16 "), Some(16));
        assert_eq!(parse_pool_size("0"), None);
        assert_eq!(parse_pool_size("many"), None);
    }

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert!(path.ends_with("data/lifedash.db"));
    }
}
