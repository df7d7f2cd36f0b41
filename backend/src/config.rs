use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub static_config: StaticConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Connection settings for the hosted auth service that owns sessions.
/// This server never verifies tokens itself; it forwards session cookies
/// to the service's user endpoint and relays refreshed cookies back.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub gateway_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    pub enabled: bool,
    pub web_root: String,
}

/// Newsletter endpoint rate limiting (sliding window, per client IP).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Maximum requests allowed per window (default: 10)
    pub max_requests: u32,
    /// Window length in seconds (default: 60)
    pub window_secs: u64,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from config.toml file
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load() -> Result<Self, anyhow::Error> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit path, or search the default
    /// locations when none is given.
    pub fn load_from(path: Option<&str>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let config_path = path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_DATABASE_URL: Database URL (default: sqlite://data/tablefare.db)
    /// - APP_AUTH_GATEWAY_URL: Base URL of the hosted auth service
    /// - APP_AUTH_API_KEY: API key sent with auth service requests
    /// - APP_AUTH_TIMEOUT_SECS: Auth service request timeout in seconds
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,tablefare_web=debug")
    /// - APP_STATIC_WEB_ROOT: Directory the marketing site assets are served from
    /// - APP_RATE_LIMIT_ENABLED: Enable/disable the newsletter rate limiter
    /// - APP_RATE_LIMIT_MAX_REQUESTS: Requests allowed per window
    /// - APP_RATE_LIMIT_WINDOW_SECS: Window length in seconds
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(db_url) = std::env::var("APP_DATABASE_URL") {
            self.database.url = db_url;
            tracing::info!("Override database.url from env");
        }

        if let Ok(url) = std::env::var("APP_AUTH_GATEWAY_URL") {
            self.auth.gateway_url = url;
            tracing::info!("Override auth.gateway_url from env: {}", self.auth.gateway_url);
        }

        if let Ok(key) = std::env::var("APP_AUTH_API_KEY") {
            self.auth.api_key = key;
            tracing::info!("Override auth.api_key from env");
        }

        if let Ok(timeout) = std::env::var("APP_AUTH_TIMEOUT_SECS")
            && let Ok(timeout) = timeout.parse()
        {
            self.auth.timeout_secs = timeout;
            tracing::info!("Override auth.timeout_secs from env: {}", self.auth.timeout_secs);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(web_root) = std::env::var("APP_STATIC_WEB_ROOT") {
            self.static_config.web_root = web_root;
            tracing::info!(
                "Override static_config.web_root from env: {}",
                self.static_config.web_root
            );
        }

        if let Ok(enabled) = std::env::var("APP_RATE_LIMIT_ENABLED")
            && let Ok(val) = enabled.parse()
        {
            self.rate_limit.enabled = val;
            tracing::info!("Override rate_limit.enabled from env: {}", self.rate_limit.enabled);
        }

        if let Ok(max) = std::env::var("APP_RATE_LIMIT_MAX_REQUESTS")
            && let Ok(val) = max.parse()
        {
            self.rate_limit.max_requests = val;
            tracing::info!(
                "Override rate_limit.max_requests from env: {}",
                self.rate_limit.max_requests
            );
        }

        if let Ok(window) = std::env::var("APP_RATE_LIMIT_WINDOW_SECS")
            && let Ok(val) = window.parse()
        {
            self.rate_limit.window_secs = val;
            tracing::info!(
                "Override rate_limit.window_secs from env: {}",
                self.rate_limit.window_secs
            );
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.auth.gateway_url.is_empty() {
            anyhow::bail!("auth.gateway_url cannot be empty");
        }

        if self.auth.api_key == "dev-api-key-change-in-production" {
            tracing::warn!("⚠️  WARNING: Using default auth API key!");
            tracing::warn!("⚠️  Please set APP_AUTH_API_KEY environment variable or update config.toml");
            tracing::warn!("⚠️  This is INSECURE for production use!");
        }

        if self.auth.timeout_secs == 0 {
            anyhow::bail!("auth.timeout_secs must be > 0");
        }

        if self.rate_limit.max_requests == 0 {
            anyhow::bail!("rate_limit.max_requests must be > 0");
        }
        if self.rate_limit.window_secs == 0 {
            anyhow::bail!("rate_limit.window_secs must be > 0");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://data/tablefare.db".to_string() }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:9999".to_string(),
            api_key: "dev-api-key-change-in-production".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,tablefare_web=debug".to_string(), file: None }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self { enabled: true, web_root: "web".to_string() }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true, max_requests: 10, window_secs: 60 }
    }
}
