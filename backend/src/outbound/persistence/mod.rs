//! PostgreSQL persistence adapters.
//!
//! Diesel with `diesel-async` and a `bb8` pool back the account and deal
//! repository ports. Row structs and the table definitions stay private to
//! this module; only the repositories, the pool, and the migration runner are
//! exported.

mod diesel_account_repository;
mod diesel_deal_repository;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_deal_repository::DieselDealRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
