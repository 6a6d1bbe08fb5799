//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the LocumDesk API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: Secret key for verifying bearer tokens (required)
//! - `INTERNAL_SERVICE_KEY`: Shared secret for service-to-service calls (required)
//! - `TAX_SERVICE_URL`: Base URL of the external tax service (required)
//! - `TAX_SERVICE_TIMEOUT_SECONDS`: Per-request timeout for tax calls (default: 15)

use eyre::{Result, WrapErr};
use std::env;
use tracing::Level;

/// Configuration for the LocumDesk API server
///
/// This struct encapsulates all configuration options for the API server,
/// including networking, database connections, and security settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// JWT secret used to verify bearer tokens
    pub jwt_secret: String,

    /// Shared secret accepted on the `x-internal-key` header and sent to
    /// the tax service on outbound calls
    pub internal_service_key: String,

    /// Base URL of the tax calculation service
    pub tax_service_url: String,

    /// Timeout for a single outbound tax-service request, in seconds
    pub tax_timeout_secs: u64,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable (`DATABASE_URL`, `JWT_SECRET`,
    /// `INTERNAL_SERVICE_KEY`, `TAX_SERVICE_URL`) is not set, or if `API_PORT`
    /// cannot be parsed as a u16.
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Security settings
        let jwt_secret =
            env::var("JWT_SECRET").wrap_err("JWT_SECRET environment variable must be set")?;
        let internal_service_key = env::var("INTERNAL_SERVICE_KEY")
            .wrap_err("INTERNAL_SERVICE_KEY environment variable must be set")?;

        // Upstream tax service
        let tax_service_url = env::var("TAX_SERVICE_URL")
            .wrap_err("TAX_SERVICE_URL environment variable must be set")?;
        let tax_timeout_secs = env::var("TAX_SERVICE_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            internal_service_key,
            tax_service_url,
            tax_timeout_secs,
            request_timeout,
        })
    }

    /// Returns the socket address string for the server to bind to
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
