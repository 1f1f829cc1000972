//! Builds shared HTTP state from server configuration.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use deals_backend::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
use deals_backend::outbound::assets::CapStdAssetStore;
use deals_backend::outbound::memory::{InMemoryAccountRepository, InMemoryDealRepository};
use deals_backend::outbound::persistence::{DieselAccountRepository, DieselDealRepository};
use deals_backend::outbound::security::Argon2PasswordHasher;
use deals_backend::outbound::token::JwtTokenCodec;

use super::ServerConfig;

/// Wire services over Diesel repositories when a pool is configured,
/// otherwise over process-local ones.
///
/// # Errors
/// Returns [`io::Error`] when the content root cannot be created or opened.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let assets = CapStdAssetStore::open_in(&config.upload_dir, clock.clone()).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!(
                "failed to open upload directory {}: {err}",
                config.upload_dir.display()
            ),
        )
    })?;
    info!(upload_dir = %config.upload_dir.display(), "content root ready");

    let assets = Arc::new(assets);
    let tokens = Arc::new(JwtTokenCodec::new(
        config.token_secret.to_vec(),
        config.token_ttl,
        clock.clone(),
    ));
    let hasher = Arc::new(Argon2PasswordHasher::new());

    let ports: HttpStatePorts = match &config.db_pool {
        Some(pool) => Adapters {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            deals: Arc::new(DieselDealRepository::new(pool.clone())),
            assets,
            tokens,
            hasher,
        }
        .into(),
        None => {
            warn!("no database configured; accounts and deals are kept in memory");
            Adapters {
                accounts: Arc::new(InMemoryAccountRepository::new(clock.clone())),
                deals: Arc::new(InMemoryDealRepository::new(clock)),
                assets,
                tokens,
                hasher,
            }
            .into()
        }
    };

    Ok(web::Data::new(HttpState::new(ports)))
}
