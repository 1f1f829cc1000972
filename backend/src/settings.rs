//! Server configuration loaded via OrthoConfig.
//!
//! Values come from defaults, configuration files, and `DEALS_*`
//! environment variables.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::token::DEFAULT_TOKEN_TTL_MINUTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Settings for the deals server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEALS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Content root for uploaded images.
    pub upload_dir: Option<PathBuf>,
    /// File holding the token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Permit a random per-process signing secret when no secret file is
    /// readable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: Option<i64>,
}

impl AppSettings {
    /// Parse the configured bind address.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::InvalidInput`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw:?}: {err}"),
            )
        })
    }

    /// Content root, defaulting to `uploads` under the working directory.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Database URL with blank values treated as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Token lifetime.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::InvalidInput`] for a zero or negative value.
    pub fn token_ttl(&self) -> io::Result<chrono::Duration> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        if minutes <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("token lifetime must be positive, got {minutes} minutes"),
            ));
        }
        Ok(chrono::Duration::minutes(minutes))
    }
}
