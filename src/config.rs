use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_at_least_64_characters_long_for_testing";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key (minimum 64 characters)
    #[validate(length(min = 64), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT access token expiration in seconds
    pub jwt_expiration: u64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiration: u64,

    /// JWT issuer
    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    /// JWT audience
    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// CORS: allow credentials
    #[serde(default)]
    pub cors_allow_credentials: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Rate limiting: requests per window
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests_per_window: u32,
    /// Rate limiting: window size (seconds)
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_seconds: u64,

    /// Event channel capacity for async event processing
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Inventory batches with fewer available units than this are low stock
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,

    /// Outbound notifications: push gateway endpoint (fire-and-forget)
    #[serde(default)]
    pub push_webhook_url: Option<String>,

    /// Outbound notifications: transactional email endpoint
    #[serde(default)]
    pub email_api_url: Option<String>,

    /// Outbound notifications: email provider API key
    #[serde(default)]
    pub email_api_key: Option<String>,
}

fn default_auth_issuer() -> String {
    "safegear-api".to_string()
}
fn default_auth_audience() -> String {
    "safegear-clients".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_rate_limit_requests() -> u32 {
    DEFAULT_RATE_LIMIT_REQUESTS
}
fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}
fn default_event_channel_capacity() -> usize {
    1024
}
fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    // The dev default is acceptable only outside production; length is
    // checked by the length validator.
    if secret.chars().all(|c| c == ' ') {
        return Err(ValidationError::new("jwt_secret_blank"));
    }
    Ok(())
}

impl AppConfig {
    /// Construct a minimal configuration programmatically (used by tests).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        database_url: String,
        jwt_secret: String,
        jwt_expiration: u64,
        refresh_token_expiration: u64,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            refresh_token_expiration,
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            rate_limit_requests_per_window: default_rate_limit_requests(),
            rate_limit_window_seconds: default_rate_limit_window_secs(),
            event_channel_capacity: default_event_channel_capacity(),
            low_stock_threshold: default_low_stock_threshold(),
            push_webhook_url: None,
            email_api_url: None,
            email_api_key: None,
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Permissive CORS is only acceptable in development or when explicitly
    /// opted into.
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }
}

/// Loads configuration from files and environment.
///
/// Layering, lowest to highest precedence:
/// 1. `config/default.toml`
/// 2. `config/{environment}.toml`
/// 3. Environment variables prefixed `APP__` (double underscore separator)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", environment.clone())?
        .set_default("host", "0.0.0.0")?
        .set_default("database_url", "sqlite://safegear.db?mode=rwc")?
        .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
        .set_default("jwt_expiration", 3600)?
        .set_default("refresh_token_expiration", 7 * 24 * 3600)?;

    let default_path = Path::new(CONFIG_DIR).join("default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }
    let env_path = Path::new(CONFIG_DIR).join(format!("{environment}.toml"));
    if env_path.exists() {
        builder = builder.add_source(File::from(env_path));
    }

    let settings = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let cfg: AppConfig = settings.try_deserialize()?;

    if cfg.is_production() && cfg.jwt_secret == DEV_DEFAULT_JWT_SECRET {
        return Err(ConfigError::Message(
            "the development JWT secret must not be used in production".into(),
        ));
    }
    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    Ok(cfg)
}

/// Initializes the global tracing subscriber.
pub fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
    info!("tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            DEV_DEFAULT_JWT_SECRET.into(),
            3600,
            86_400,
            "127.0.0.1".into(),
            18_080,
            "test".into(),
        )
    }

    #[test]
    fn host_and_port_form_the_bind_address() {
        let cfg = test_config();
        let addr: std::net::SocketAddr = format!("{}:{}", cfg.host, cfg.port)
            .parse()
            .expect("bind address parses");
        assert_eq!(addr.to_string(), "127.0.0.1:18080");
    }

    #[test]
    fn development_environments_allow_permissive_cors() {
        let cfg = test_config();
        assert!(cfg.is_development());
        assert!(cfg.should_allow_permissive_cors());
    }

    #[test]
    fn production_requires_explicit_cors_override() {
        let mut cfg = test_config();
        cfg.environment = "production".into();
        assert!(!cfg.should_allow_permissive_cors());
        cfg.cors_allow_any_origin = true;
        assert!(cfg.should_allow_permissive_cors());
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut cfg = test_config();
        cfg.jwt_secret = "too-short".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn defaults_are_sensible() {
        let cfg = test_config();
        assert_eq!(cfg.low_stock_threshold, 5);
        assert_eq!(cfg.rate_limit_requests_per_window, 100);
        assert_eq!(cfg.event_channel_capacity, 1024);
    }
}
