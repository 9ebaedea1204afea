//! Server configuration from environment variables.

use std::net::SocketAddr;

use tutor_core::{defaults, Error, Result};
use tutor_db::PoolConfig;

/// Server configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `DATABASE_URL` | `postgres://localhost/tutor` | PostgreSQL connection string |
/// | `HOST` | `0.0.0.0` | Bind address |
/// | `PORT` | `3000` | Bind port |
/// | `ALLOWED_ORIGINS` | `http://localhost:3000` | Comma-separated CORS origins |
/// | `DB_MAX_CONNECTIONS` | `10` | Pool size |
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub pool: PoolConfig,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DATABASE_URL.to_string());
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults::SERVER_PORT);
        let allowed_origins = parse_origins(
            &std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| defaults::API_URL.to_string()),
        );

        Self {
            database_url,
            host,
            port,
            allowed_origins,
            pool: PoolConfig::from_env(),
        }
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST/PORT: {}", e)))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test, ,http://b.test "),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_addr() {
        let config = ApiConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 8080,
            allowed_origins: vec![],
            pool: PoolConfig::default(),
        };
        assert_eq!(config.addr().unwrap().port(), 8080);

        let bad = ApiConfig {
            host: "not a host".into(),
            ..config
        };
        assert!(matches!(bad.addr(), Err(Error::Config(_))));
    }
}
