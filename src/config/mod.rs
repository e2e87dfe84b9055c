//! Configuration management
//!
//! This module handles loading and parsing configuration for the Vitrine session service.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::services::token::TtlPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Session and admin identity configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Login throttling configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Locale routing configuration
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based auth)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Deployment environment, decides the `Secure` cookie attribute
    #[serde(default)]
    pub environment: Environment,
    /// Directory holding the built site and back-office bundle
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            environment: Environment::default(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
}

impl Environment {
    /// Whether cookies must carry the `Secure` attribute
    pub fn secure_cookies(self) -> bool {
        self == Environment::Production
    }
}

/// Session lifetime, guarded area and admin identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Access token lifetime in seconds
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: i64,
    /// Refresh token lifetime in seconds for normal sessions
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: i64,
    /// Refresh token lifetime in seconds when "remember me" is set
    #[serde(default = "default_remember_me_refresh_ttl")]
    pub remember_me_refresh_ttl_seconds: i64,
    /// Path prefix of the back-office
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
    /// Login entry point, always reachable
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Email of the single admin account
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Argon2 PHC hash of the admin password (see the `hash-password` binary)
    #[serde(default)]
    pub admin_password_hash: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            remember_me_refresh_ttl_seconds: default_remember_me_refresh_ttl(),
            protected_prefix: default_protected_prefix(),
            login_path: default_login_path(),
            admin_email: default_admin_email(),
            admin_password_hash: String::new(),
        }
    }
}

fn default_access_ttl() -> i64 {
    60 * 60 // 1 hour
}

fn default_refresh_ttl() -> i64 {
    24 * 60 * 60 // 1 day
}

fn default_remember_me_refresh_ttl() -> i64 {
    30 * 24 * 60 * 60 // 30 days
}

fn default_protected_prefix() -> String {
    "/admin".to_string()
}

fn default_login_path() -> String {
    "/admin/login".to_string()
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

impl AuthConfig {
    /// TTL tiers as a policy value
    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            access_ttl_seconds: self.access_ttl_seconds,
            refresh_ttl_seconds: self.refresh_ttl_seconds,
            remember_me_refresh_ttl_seconds: self.remember_me_refresh_ttl_seconds,
        }
    }
}

/// Login throttling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Failed logins allowed per email inside the window
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: usize,
    /// Window for failed logins, in seconds
    #[serde(default = "default_failed_attempt_window")]
    pub failed_attempt_window_seconds: i64,
    /// Login requests allowed per client IP inside the window
    #[serde(default = "default_max_ip_requests")]
    pub max_ip_requests: usize,
    /// Window for per-IP requests, in seconds
    #[serde(default = "default_ip_window")]
    pub ip_window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            failed_attempt_window_seconds: default_failed_attempt_window(),
            max_ip_requests: default_max_ip_requests(),
            ip_window_seconds: default_ip_window(),
        }
    }
}

fn default_max_failed_attempts() -> usize {
    5
}

fn default_failed_attempt_window() -> i64 {
    15 * 60
}

fn default_max_ip_requests() -> usize {
    10
}

fn default_ip_window() -> i64 {
    60
}

/// Locale routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Supported locale path segments
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    /// Locale used when a path carries none
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            default_locale: default_locale(),
        }
    }
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "fr".to_string()]
}

fn default_locale() -> String {
    "en".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError {
        path: String,
        message: String,
    },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides,
    /// then validate the result.
    ///
    /// Environment variables follow the pattern:
    /// - VITRINE_SERVER_HOST
    /// - VITRINE_SERVER_PORT
    /// - VITRINE_SERVER_CORS_ORIGIN
    /// - VITRINE_SERVER_ENVIRONMENT
    /// - VITRINE_SERVER_PUBLIC_DIR
    /// - VITRINE_AUTH_ADMIN_EMAIL
    /// - VITRINE_AUTH_ADMIN_PASSWORD_HASH
    /// - VITRINE_AUTH_ACCESS_TTL_SECONDS
    /// - VITRINE_AUTH_REFRESH_TTL_SECONDS
    /// - VITRINE_AUTH_REMEMBER_ME_REFRESH_TTL_SECONDS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth
            .ttl_policy()
            .validate()
            .map_err(ConfigError::ValidationError)?;

        let prefix = &self.auth.protected_prefix;
        if !prefix.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "auth.protected_prefix must start with '/', got '{}'",
                prefix
            )));
        }
        let below_prefix = self
            .auth
            .login_path
            .strip_prefix(prefix.trim_end_matches('/'))
            .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1);
        if !below_prefix {
            return Err(ConfigError::ValidationError(format!(
                "auth.login_path '{}' must live strictly below auth.protected_prefix '{}'",
                self.auth.login_path, prefix
            )));
        }

        if !self.locale.locales.contains(&self.locale.default_locale) {
            return Err(ConfigError::ValidationError(format!(
                "locale.default_locale '{}' is not listed in locale.locales",
                self.locale.default_locale
            )));
        }

        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        // Server configuration
        if let Ok(host) = std::env::var("VITRINE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("VITRINE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("VITRINE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }
        if let Ok(environment) = std::env::var("VITRINE_SERVER_ENVIRONMENT") {
            match environment.to_lowercase().as_str() {
                "development" => self.server.environment = Environment::Development,
                "production" => self.server.environment = Environment::Production,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(dir) = std::env::var("VITRINE_SERVER_PUBLIC_DIR") {
            self.server.public_dir = PathBuf::from(dir);
        }

        // Auth configuration
        if let Ok(email) = std::env::var("VITRINE_AUTH_ADMIN_EMAIL") {
            self.auth.admin_email = email;
        }
        if let Ok(hash) = std::env::var("VITRINE_AUTH_ADMIN_PASSWORD_HASH") {
            self.auth.admin_password_hash = hash;
        }
        if let Some(ttl) = env_seconds("VITRINE_AUTH_ACCESS_TTL_SECONDS") {
            self.auth.access_ttl_seconds = ttl;
        }
        if let Some(ttl) = env_seconds("VITRINE_AUTH_REFRESH_TTL_SECONDS") {
            self.auth.refresh_ttl_seconds = ttl;
        }
        if let Some(ttl) = env_seconds("VITRINE_AUTH_REMEMBER_ME_REFRESH_TTL_SECONDS") {
            self.auth.remember_me_refresh_ttl_seconds = ttl;
        }
    }
}

fn env_seconds(name: &str) -> Option<i64> {
    std::env::var(name).ok().and_then(|v| v.parse::<i64>().ok())
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
