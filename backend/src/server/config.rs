//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use deals_backend::outbound::persistence::DbPool;
use zeroize::Zeroizing;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_dir: PathBuf,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: chrono::Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration backed by in-memory repositories.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        upload_dir: PathBuf,
        token_secret: Zeroizing<Vec<u8>>,
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            bind_addr,
            upload_dir,
            token_secret,
            token_ttl,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
