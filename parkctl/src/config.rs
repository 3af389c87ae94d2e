//! Application configuration.
//!
//! Configuration is loaded from a YAML file merged with environment
//! variables, in that order (environment wins). The file path comes from the
//! CLI (`-f`/`--config`), defaulting to `config.yaml`; a missing file is fine
//! and leaves the defaults in place.
//!
//! # Environment Variables
//!
//! All values can be overridden with `PARKCTL_`-prefixed variables, using
//! `__` to reach into nested sections:
//!
//! ```bash
//! PARKCTL_PORT=9090
//! PARKCTL_SECRET_KEY="change-me"
//! PARKCTL_DATABASE__URL="sqlite:///var/lib/parkctl/parkctl.db"
//! PARKCTL_AUTH__ALLOW_REGISTRATION=false
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PARKCTL_CONFIG_FILE", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment
/// variables. All fields have defaults defined in the `Default`
/// implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Username for the initial admin user (created on first startup)
    pub admin_username: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required for production)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: DatabaseConfig::default(),
            admin_username: "admin".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Database configuration.
///
/// The store is a single SQLite database; the file is created on first start.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g., "sqlite://parkctl.db")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://parkctl.db".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 30,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether new accounts can self-register
    pub allow_registration: bool,
    /// Password length requirements
    pub password: PasswordConfig,
    /// Session cookie and token lifetime settings
    pub session: SessionConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            password: PasswordConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Password requirements for registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

/// Session cookie and JWT settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Session token lifetime (humantime format, e.g. "24h")
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "parkctl_session".to_string(),
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. An empty list means a permissive CORS policy.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PARKCTL_").split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args_for(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args_for("does-not-exist.yaml")).expect("defaults should load");
            assert_eq!(config.port, 8080);
            assert_eq!(config.admin_username, "admin");
            assert!(config.auth.allow_registration);
            assert_eq!(config.auth.session.cookie_name, "parkctl_session");
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9090
                admin_username: boss
                database:
                  url: "sqlite://test.db"
                auth:
                  session:
                    jwt_expiry: 2h
                "#,
            )?;

            let config = Config::load(&args_for("config.yaml")).expect("config should load");
            assert_eq!(config.port, 9090);
            assert_eq!(config.admin_username, "boss");
            assert_eq!(config.database.url, "sqlite://test.db");
            assert_eq!(config.auth.session.jwt_expiry, Duration::from_secs(2 * 60 * 60));
            // Untouched sections keep their defaults
            assert_eq!(config.database.max_connections, 5);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 9090")?;
            jail.set_env("PARKCTL_PORT", "7070");
            jail.set_env("PARKCTL_DATABASE__URL", "sqlite://env.db");

            let config = Config::load(&args_for("config.yaml")).expect("config should load");
            assert_eq!(config.port, 7070);
            assert_eq!(config.database.url, "sqlite://env.db");
            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "not_a_real_setting: true")?;
            assert!(Config::load(&args_for("config.yaml")).is_err());
            Ok(())
        });
    }
}
