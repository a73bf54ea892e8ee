//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tourney::db::DatabaseConfig;

/// Default HTTP bind address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

/// Shortest accepted password pepper
pub const MIN_PEPPER_LEN: usize = 16;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Prometheus exporter address; no exporter when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Create the default tournaments on an empty registry
    pub seed_tournaments: bool,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `seed_override` - Optional seeding override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        seed_override: Option<bool>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
            seed_override,
        )
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        seed_override: Option<bool>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_addr(&lookup, "SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let metrics_bind = parse_addr(&lookup, "METRICS_BIND")?;

        let defaults = DatabaseConfig::development();
        let database = DatabaseConfig {
            database_url: database_url_override
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            max_connections: parse_env_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections),
            connection_timeout_secs: parse_env_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            ),
            idle_timeout_secs: parse_env_or(&lookup, "DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            max_lifetime_secs: parse_env_or(&lookup, "DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
            connect_attempts: parse_env_or(&lookup, "DB_CONNECT_ATTEMPTS", defaults.connect_attempts),
            connect_backoff_secs: parse_env_or(
                &lookup,
                "DB_CONNECT_BACKOFF_SECS",
                defaults.connect_backoff_secs,
            ),
            query_timeout_secs: parse_env_or(&lookup, "DB_QUERY_TIMEOUT_SECS", defaults.query_timeout_secs),
        };

        // Security configuration (REQUIRED)
        let password_pepper = lookup("PASSWORD_PEPPER").ok_or_else(|| ConfigError::MissingRequired {
            var: "PASSWORD_PEPPER".to_string(),
            hint: "Generate with: openssl rand -hex 16".to_string(),
        })?;

        if password_pepper.len() < MIN_PEPPER_LEN {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: format!("Must be at least {MIN_PEPPER_LEN} characters"),
            });
        }

        let seed_tournaments =
            seed_override.unwrap_or_else(|| parse_env_or(&lookup, "SEED_TOURNAMENTS", true));

        Ok(ServerConfig {
            bind,
            database,
            security: SecurityConfig { password_pepper },
            metrics_bind,
            seed_tournaments,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        if self.database.connect_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_CONNECT_ATTEMPTS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.database.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_QUERY_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Socket addresses are rejected loudly rather than silently defaulted
fn parse_addr<F>(lookup: &F, key: &str) -> Result<Option<SocketAddr>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            v.parse().map_err(|_| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("'{v}' is not an IP:PORT address"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned(), None, None, None)
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "PASSWORD_PEPPER".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PASSWORD_PEPPER"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("PASSWORD_PEPPER", "0123456789abcdef")]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.database.connect_attempts, 5);
        assert_eq!(config.database.connect_backoff_secs, 2);
        assert!(config.metrics_bind.is_none());
        assert!(config.seed_tournaments);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pepper_required_and_long_enough() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));

        let err = load(&[("PASSWORD_PEPPER", "short")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_env_values_and_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PASSWORD_PEPPER", "0123456789abcdef"),
            ("SERVER_BIND", "0.0.0.0:8080"),
            ("DATABASE_URL", "postgres://env/db"),
            ("DB_CONNECT_ATTEMPTS", "9"),
            ("SEED_TOURNAMENTS", "false"),
            ("METRICS_BIND", "0.0.0.0:9090"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| vars.get(key).map(|v| v.to_string());

        let config = ServerConfig::from_lookup(lookup, None, None, None).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.database.database_url, "postgres://env/db");
        assert_eq!(config.database.connect_attempts, 9);
        assert!(!config.seed_tournaments);
        assert_eq!(config.metrics_bind.map(|a| a.port()), Some(9090));

        let config = ServerConfig::from_lookup(
            lookup,
            Some("127.0.0.1:4000".parse().unwrap()),
            Some("postgres://cli/db".to_string()),
            Some(true),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 4000);
        assert_eq!(config.database.database_url, "postgres://cli/db");
        assert!(config.seed_tournaments);
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        let err = load(&[
            ("PASSWORD_PEPPER", "0123456789abcdef"),
            ("SERVER_BIND", "not-an-address"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "SERVER_BIND"));
    }

    #[test]
    fn test_config_validation_pool_bounds() {
        let mut config = load(&[("PASSWORD_PEPPER", "0123456789abcdef")]).unwrap();
        config.database.min_connections = config.database.max_connections + 1;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_metrics_clash() {
        let mut config = load(&[("PASSWORD_PEPPER", "0123456789abcdef")]).unwrap();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }
}
