//! Service configuration assembled from the environment

use anyhow::{Context, Result};
use auth::AuthConfig;
use common::pagination::PagingConfig;
use common::store::StorageConfig;
use media::UploadConfig;
use std::env;
use std::net::SocketAddr;

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment name; `development` turns on error details
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "production".to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: bind address (default: `0.0.0.0`)
    /// - `PORT`: listen port (default: 3000)
    /// - `APP_ENV`: environment name (default: `production`)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?,
            Err(_) => defaults.port,
        };
        let environment = env::var("APP_ENV").unwrap_or(defaults.environment);

        Ok(Self {
            host,
            port,
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Everything the service needs to start
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub paging: PagingConfig,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            storage: StorageConfig::from_env(),
            uploads: UploadConfig::from_env(),
            paging: PagingConfig::from_env(),
            auth: AuthConfig::from_env()?,
        })
    }
}
