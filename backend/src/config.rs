//! Configuration management for the MSME Business Directory
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MSME_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Transactional email API configuration
    pub email: EmailConfig,

    /// File upload storage
    pub uploads: UploadConfig,

    /// Password-reset code settings
    pub otp: OtpConfig,

    /// Administrator bootstrap
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// When false, messages are logged instead of sent
    pub enabled: bool,

    /// Base URL of the email delivery API
    pub api_base_url: String,

    /// Server token sent with every request
    pub authorization_token: String,

    /// Sender address shown to recipients
    pub sender: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Public site URL used in message links
    pub site_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    pub dir: String,

    /// URL prefix the stored files are served from
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OtpConfig {
    /// Minutes a password-reset code stays valid
    pub expiry_minutes: i64,

    /// Wrong guesses allowed before the code is discarded
    pub max_attempts: i32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Email of the administrator created when none exists
    pub bootstrap_email: Option<String>,

    /// Password of the bootstrapped administrator
    pub bootstrap_password: Option<String>,

    /// Display name of the bootstrapped administrator
    pub bootstrap_name: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("MSME_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 86400)?
            .set_default("email.enabled", false)?
            .set_default("email.api_base_url", "https://api.postmarkapp.com")?
            .set_default("email.authorization_token", "")?
            .set_default("email.sender", "no-reply@msme.local")?
            .set_default("email.timeout_ms", 10000)?
            .set_default("email.site_url", "http://localhost:3000")?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.public_base_url", "/uploads")?
            .set_default("otp.expiry_minutes", 10)?
            .set_default("otp.max_attempts", 5)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MSME_ prefix)
            .add_source(
                Environment::with_prefix("MSME")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
impl Config {
    /// Settings for in-process router tests; nothing here touches a real service
    pub fn for_tests(upload_dir: &str) -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/unused".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
            },
            email: EmailConfig {
                enabled: false,
                api_base_url: "http://127.0.0.1:9".to_string(),
                authorization_token: String::new(),
                sender: "no-reply@msme.local".to_string(),
                timeout_ms: 100,
                site_url: "http://localhost:3000".to_string(),
            },
            uploads: UploadConfig {
                dir: upload_dir.to_string(),
                public_base_url: "/uploads".to_string(),
            },
            otp: OtpConfig {
                expiry_minutes: 10,
                max_attempts: 5,
            },
            admin: AdminConfig::default(),
        }
    }
}
