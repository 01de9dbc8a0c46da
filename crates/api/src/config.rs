//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use scribe_auth::{AuthConfig, NewAccount};
use scribe_auth::config::{DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL_MINUTES};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("JWT_SECRET is not set")]
    MissingJwtSecret,

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("SCRIBE_ADMIN_USERNAME, SCRIBE_ADMIN_EMAIL and SCRIBE_ADMIN_PASSWORD must be set together")]
    PartialAdmin,

    #[error(transparent)]
    Auth(#[from] scribe_auth::ConfigError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,

    pub db_max_connections: u32,

    pub auth: AuthConfig,

    /// Superuser created at startup if the username is free.
    pub bootstrap_admin: Option<NewAccount>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// The auth section is validated here so a bad secret, TTL or cost stops
    /// the process before it binds.
    pub fn from_env() -> Result<Self, AppConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or("SCRIBE_BIND_ADDR", &lookup, || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|_| AppConfigError::Invalid {
                name: "SCRIBE_BIND_ADDR",
                value: DEFAULT_BIND_ADDR.into(),
            })
        })?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let db_max_connections =
            parse_or("DATABASE_MAX_CONNECTIONS", &lookup, || Ok(DEFAULT_DB_MAX_CONNECTIONS))?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(AppConfigError::MissingJwtSecret)?;
        let ttl_minutes: i64 =
            parse_or("TOKEN_TTL_MINUTES", &lookup, || Ok(DEFAULT_TOKEN_TTL_MINUTES))?;
        let bcrypt_cost: u32 = parse_or("BCRYPT_COST", &lookup, || Ok(DEFAULT_BCRYPT_COST))?;
        let token_ttl = Duration::try_minutes(ttl_minutes).ok_or_else(|| AppConfigError::Invalid {
            name: "TOKEN_TTL_MINUTES",
            value: ttl_minutes.to_string(),
        })?;

        let auth = AuthConfig::new(jwt_secret)
            .with_token_ttl(token_ttl)
            .with_bcrypt_cost(bcrypt_cost);
        auth.validate()?;

        let bootstrap_admin = match (
            lookup("SCRIBE_ADMIN_USERNAME"),
            lookup("SCRIBE_ADMIN_EMAIL"),
            lookup("SCRIBE_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => Some(NewAccount {
                username,
                email,
                password,
                is_superuser: true,
            }),
            (None, None, None) => None,
            _ => return Err(AppConfigError::PartialAdmin),
        };

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            auth,
            bootstrap_admin,
        })
    }

    /// In-memory configuration for tests and local runs.
    pub fn in_memory(auth: AuthConfig) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth,
            bootstrap_admin: None,
        }
    }

    pub fn with_bootstrap_admin(mut self, admin: NewAccount) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }
}

fn parse_or<T, F, D>(name: &'static str, lookup: &F, default: D) -> Result<T, AppConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, AppConfigError>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppConfigError::Invalid { name, value }),
        None => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.auth.token_ttl, Duration::minutes(20));
        assert_eq!(cfg.auth.bcrypt_cost, 12);
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert!(matches!(load(&[]), Err(AppConfigError::MissingJwtSecret)));
    }

    #[test]
    fn weak_secret_is_fatal() {
        assert!(matches!(
            load(&[("JWT_SECRET", "dev-secret")]),
            Err(AppConfigError::Auth(scribe_auth::ConfigError::InsecureJwtSecret))
        ));
    }

    #[test]
    fn non_positive_ttl_is_fatal() {
        assert!(matches!(
            load(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_MINUTES", "0")]),
            Err(AppConfigError::Auth(scribe_auth::ConfigError::NonPositiveTtl))
        ));
    }

    #[test]
    fn huge_ttl_is_fatal() {
        assert!(matches!(
            load(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_MINUTES", "200000000000")]),
            Err(AppConfigError::Auth(scribe_auth::ConfigError::TtlTooLong { .. }))
        ));
    }

    #[test]
    fn unparsable_numbers_name_the_variable() {
        let err = load(&[("JWT_SECRET", SECRET), ("BCRYPT_COST", "high")]).unwrap_err();
        assert!(matches!(err, AppConfigError::Invalid { name: "BCRYPT_COST", .. }));
    }

    #[test]
    fn bootstrap_admin_needs_all_three_variables() {
        let err = load(&[("JWT_SECRET", SECRET), ("SCRIBE_ADMIN_USERNAME", "root")]).unwrap_err();
        assert!(matches!(err, AppConfigError::PartialAdmin));

        let cfg = load(&[
            ("JWT_SECRET", SECRET),
            ("SCRIBE_ADMIN_USERNAME", "root"),
            ("SCRIBE_ADMIN_EMAIL", "root@example.com"),
            ("SCRIBE_ADMIN_PASSWORD", "toor-toor"),
        ])
        .unwrap();
        let admin = cfg.bootstrap_admin.unwrap();
        assert_eq!(admin.username, "root");
        assert!(admin.is_superuser);
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let cfg = load(&[("JWT_SECRET", SECRET), ("DATABASE_URL", " ")]).unwrap();
        assert!(cfg.database_url.is_none());
    }
}
