use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_port: default_api_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a login session in hours (default: 168, one week)
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Mark the session cookie as Secure (HTTPS only)
    #[serde(default)]
    pub cookie_secure: bool,
    /// Restrict product create/update/delete to admin users
    #[serde(default)]
    pub admin_only_catalog: bool,
    /// Bootstrap admin account, created on startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            cookie_secure: false,
            admin_only_catalog: false,
            admin_email: None,
            admin_password: None,
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}

/// One year
const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests per window for catalog and cart endpoints
    #[serde(default = "default_api_requests")]
    pub api_requests_per_window: u32,
    /// Requests per window for register/login/logout
    #[serde(default = "default_auth_requests")]
    pub auth_requests_per_window: u32,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
    /// Seconds between sweeps of stale limiter entries
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,
    /// Key clients by X-Forwarded-For / X-Real-IP. Only enable behind a
    /// reverse proxy that overwrites these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_requests_per_window: default_api_requests(),
            auth_requests_per_window: default_auth_requests(),
            window_seconds: default_window_seconds(),
            cleanup_interval: default_cleanup_interval(),
            trust_proxy_headers: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_requests() -> u32 {
    300
}

fn default_auth_requests() -> u32 {
    20
}

fn default_window_seconds() -> u64 {
    60
}

fn default_cleanup_interval() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Insert the sample catalog on startup when the products table is empty
    #[serde(default = "default_true")]
    pub seed_products: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_products: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            bail!(
                "auth.session_ttl_hours must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS,
                self.auth.session_ttl_hours
            );
        }
        if self.rate_limit.window_seconds == 0 {
            bail!("rate_limit.window_seconds must be at least 1");
        }
        if self.rate_limit.cleanup_interval == 0 {
            bail!("rate_limit.cleanup_interval must be at least 1");
        }
        Ok(())
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            rate_limit: RateLimitConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.api_port, 5000);
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert!(!config.auth.admin_only_catalog);
        assert!(config.rate_limit.enabled);
        assert!(!config.rate_limit.trust_proxy_headers);
        assert!(config.catalog.seed_products);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            api_port = 8081

            [auth]
            admin_only_catalog = true
            admin_email = "root@shop.local"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.auth.admin_only_catalog);
        assert_eq!(config.auth.admin_email.as_deref(), Some("root@shop.local"));
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.rate_limit.window_seconds, 60);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::parse("[server\napi_port = ").is_err());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let err = Config::parse("[auth]\nsession_ttl_hours = 9223372036854775807").unwrap_err();
        assert!(err.to_string().contains("session_ttl_hours"));

        assert!(Config::parse("[auth]\nsession_ttl_hours = 0").is_err());
        assert!(Config::parse("[auth]\nsession_ttl_hours = -1").is_err());
        assert!(Config::parse("[rate_limit]\nwindow_seconds = 0").is_err());
        assert!(Config::parse("[rate_limit]\ncleanup_interval = 0").is_err());

        let config = Config::parse("[auth]\nsession_ttl_hours = 1").unwrap();
        assert_eq!(config.auth.session_ttl_hours, 1);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/shop.toml")).unwrap();
        assert_eq!(config.server.data_dir, PathBuf::from("./data"));
    }
}
