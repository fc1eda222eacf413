//! Installation settings read from the process environment.
//!
//! A `.env` file in the working directory is loaded first when present.
//! `DATABASE_URL` and `REDIS_URL` are required; everything else falls back
//! to a default.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub accounts: AccountConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Deployment stage, selects the log preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("development") {
            Ok(Self::Development)
        } else if s.eq_ignore_ascii_case("staging") {
            Ok(Self::Staging)
        } else if s.eq_ignore_ascii_case("production") {
            Ok(Self::Production)
        } else {
            Err(ConfigError::InvalidValue("APP_ENV", s.to_string()))
        }
    }
}

/// Account store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max")]
    pub max_connections: u32,
    #[serde(default = "default_db_min")]
    pub min_connections: u32,
}

/// Session store connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max")]
    pub max_connections: u32,
}

/// Account, session and cookie settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountConfig {
    /// Prefix for the session key and the login cookie name
    #[serde(default = "default_installation_id")]
    pub installation_id: String,
    /// Usernames with administrator rights
    #[serde(default)]
    pub admin_users: Vec<String>,
    /// Usernames that may not be registered
    #[serde(default)]
    pub reserved_users: Vec<String>,
    /// Remember-me cookie lifetime in seconds
    #[serde(default = "default_cookie_lifetime")]
    pub cookie_lifetime: i64,
    /// Idle lifetime of a stored session in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl: u64,
    /// Prepended to the `users` and `watched` table names
    #[serde(default)]
    pub table_prefix: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            installation_id: default_installation_id(),
            admin_users: Vec::new(),
            reserved_users: Vec::new(),
            cookie_lifetime: default_cookie_lifetime(),
            session_ttl: default_session_ttl(),
            table_prefix: String::new(),
        }
    }
}

impl AccountConfig {
    /// Session key holding the current user id
    #[must_use]
    pub fn session_key(&self) -> String {
        format!("{}-currentuserid", self.installation_id)
    }

    /// Name of the remember-me cookie
    #[must_use]
    pub fn cookie_key(&self) -> String {
        format!("{}-login", self.installation_id)
    }

    /// Exact, case-sensitive membership in the admin list
    #[must_use]
    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_users.iter().any(|u| u == username)
    }

    /// Exact, case-sensitive membership in the reserved list
    #[must_use]
    pub fn is_reserved(&self, username: &str) -> bool {
        self.reserved_users.iter().any(|u| u == username)
    }

    fn read<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        Ok(Self {
            installation_id: vars
                .text("SCUTTLE_INSTALLATION_ID")
                .unwrap_or_else(default_installation_id),
            admin_users: vars.list("SCUTTLE_ADMIN_USERS"),
            reserved_users: vars.list("SCUTTLE_RESERVED_USERS"),
            cookie_lifetime: vars.parsed("SCUTTLE_COOKIE_LIFETIME", default_cookie_lifetime())?,
            session_ttl: vars.parsed("SCUTTLE_SESSION_TTL", default_session_ttl())?,
            table_prefix: vars.text("SCUTTLE_TABLE_PREFIX").unwrap_or_default(),
        })
    }
}

impl AppConfig {
    /// Read the whole configuration from the environment.
    ///
    /// # Errors
    /// A required variable is unset, or a set variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::read(&Vars(|name: &str| env::var(name).ok()))
    }

    fn read<F: Fn(&str) -> Option<String>>(vars: &Vars<F>) -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: vars.required("DATABASE_URL")?,
            max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", default_db_max())?,
            min_connections: vars.parsed("DATABASE_MIN_CONNECTIONS", default_db_min())?,
        };
        if database.min_connections > database.max_connections {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MIN_CONNECTIONS",
                format!("larger than the maximum of {}", database.max_connections),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.text("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parsed("APP_ENV", Environment::default())?,
            },
            database,
            redis: RedisConfig {
                url: vars.required("REDIS_URL")?,
                max_connections: vars.parsed("REDIS_MAX_CONNECTIONS", default_redis_max())?,
            },
            accounts: AccountConfig::read(vars)?,
        })
    }
}

/// Variable lookup; blank values count as unset
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn text(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.text(name).ok_or(ConfigError::MissingVar(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.text(name) {
            None => Ok(default),
            Some(raw) => match raw.trim().parse() {
                Ok(value) => Ok(value),
                Err(_) => Err(ConfigError::InvalidValue(name, raw)),
            },
        }
    }

    /// Comma separated names, blanks dropped
    fn list(&self, name: &str) -> Vec<String> {
        self.text(name)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn default_app_name() -> String {
    "scuttle".to_string()
}

fn default_db_max() -> u32 {
    20
}

fn default_db_min() -> u32 {
    5
}

fn default_redis_max() -> u32 {
    10
}

fn default_installation_id() -> String {
    "scuttle".to_string()
}

fn default_cookie_lifetime() -> i64 {
    1_209_600 // 14 days
}

fn default_session_ttl() -> u64 {
    86_400
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} has an unusable value: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::read(&Vars(move |name: &str| map.get(name).cloned()))
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/scuttle"),
        ("REDIS_URL", "redis://localhost"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.app.name, "scuttle");
        assert!(config.app.env.is_development());
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.redis.max_connections, 10);
        assert_eq!(config.accounts, AccountConfig::default());
        assert_eq!(config.accounts.cookie_lifetime, 1_209_600);
    }

    #[test]
    fn test_missing_required_var() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/scuttle")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("REDIS_URL")));

        let err = load(&[("DATABASE_URL", "  "), ("REDIS_URL", "redis://localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_account_settings() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SCUTTLE_INSTALLATION_ID", "bookmarks"),
            ("SCUTTLE_ADMIN_USERS", "alice, bob,,"),
            ("SCUTTLE_RESERVED_USERS", "root"),
            ("SCUTTLE_SESSION_TTL", "600"),
            ("SCUTTLE_TABLE_PREFIX", "sc_"),
            ("APP_ENV", "Production"),
        ]);
        let config = load(&pairs).unwrap();
        assert!(config.app.env.is_production());
        assert_eq!(config.accounts.installation_id, "bookmarks");
        assert_eq!(config.accounts.admin_users, vec!["alice", "bob"]);
        assert_eq!(config.accounts.reserved_users, vec!["root"]);
        assert_eq!(config.accounts.session_ttl, 600);
        assert_eq!(config.accounts.table_prefix, "sc_");
    }

    #[test]
    fn test_unparsable_values_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SCUTTLE_COOKIE_LIFETIME", "two weeks"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidValue("SCUTTLE_COOKIE_LIFETIME", _))
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", "qa"));
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidValue("APP_ENV", _))
        ));
    }

    #[test]
    fn test_pool_bounds_are_checked() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([("DATABASE_MAX_CONNECTIONS", "2"), ("DATABASE_MIN_CONNECTIONS", "3")]);
        assert!(matches!(
            load(&pairs),
            Err(ConfigError::InvalidValue("DATABASE_MIN_CONNECTIONS", _))
        ));
    }

    #[test]
    fn test_account_keys() {
        let config = AccountConfig {
            installation_id: "abc123".to_string(),
            ..AccountConfig::default()
        };
        assert_eq!(config.session_key(), "abc123-currentuserid");
        assert_eq!(config.cookie_key(), "abc123-login");
    }

    #[test]
    fn test_admin_and_reserved_are_exact_matches() {
        let config = AccountConfig {
            admin_users: vec!["admin".to_string()],
            reserved_users: vec!["root".to_string()],
            ..AccountConfig::default()
        };
        assert!(config.is_admin("admin"));
        assert!(!config.is_admin("Admin"));
        assert!(!config.is_admin("root"));
        assert!(config.is_reserved("root"));
        assert!(!config.is_reserved("roots"));
    }
}
