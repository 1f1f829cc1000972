//! Backend entry-point: loads settings, wires storage, and runs the HTTP
//! server.

mod server;

use std::ffi::OsString;
use std::io;
use std::path::Path;

use actix_web::web;
use ortho_config::OrthoConfig;
use rand::RngCore;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use deals_backend::inbound::http::health::HealthState;
use deals_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use deals_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

const EPHEMERAL_SECRET_BYTES: usize = 32;
const DEFAULT_SECRET_PATH: &str = "/var/run/secrets/token_secret";

/// Read the signing secret, falling back to a random one where allowed.
fn load_token_secret(settings: &AppSettings) -> io::Result<Zeroizing<Vec<u8>>> {
    let path = settings
        .token_secret_file
        .clone()
        .unwrap_or_else(|| DEFAULT_SECRET_PATH.into());
    match read_secret(&path) {
        Ok(secret) => Ok(secret),
        Err(err) if cfg!(debug_assertions) || settings.allow_ephemeral_secret => {
            warn!(
                path = %path.display(),
                error = %err,
                "using ephemeral token secret; tokens will not survive a restart"
            );
            let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_BYTES]);
            rand::thread_rng().fill_bytes(&mut secret);
            Ok(secret)
        }
        Err(err) => Err(io::Error::new(
            err.kind(),
            format!("failed to read token secret at {}: {err}", path.display()),
        )),
    }
}

fn read_secret(path: &Path) -> io::Result<Zeroizing<Vec<u8>>> {
    let raw = Zeroizing::new(std::fs::read(path)?);
    let trimmed = raw.trim_ascii();
    if trimmed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "token secret file is empty",
        ));
    }
    Ok(Zeroizing::new(trimmed.to_vec()))
}

async fn connect_database(url: &str) -> io::Result<DbPool> {
    run_pending_migrations(url)
        .await
        .map_err(|err| io::Error::other(format!("database migrations failed: {err}")))?;
    DbPool::new(PoolConfig::new(url))
        .await
        .map_err(|err| io::Error::other(format!("database pool creation failed: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings.bind_addr()?;
    let token_ttl = settings.token_ttl()?;
    let token_secret = load_token_secret(&settings)?;

    let mut config = ServerConfig::new(bind_addr, settings.upload_dir(), token_secret, token_ttl);
    if let Some(url) = settings.database_url() {
        config = config.with_db_pool(connect_database(url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "deals API listening");
    server.await
}
