//! Process-local repositories used when no database is configured.
//!
//! Records live behind a [`std::sync::RwLock`] and vanish on restart. Each
//! operation holds the lock for its whole duration, which gives the same
//! single-record atomicity as the PostgreSQL adapters.

mod account_repository;
mod deal_repository;

pub use account_repository::InMemoryAccountRepository;
pub use deal_repository::InMemoryDealRepository;

use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn poisoned<T>(_: PoisonError<T>) -> String {
    "in-memory store lock poisoned".to_owned()
}

pub(crate) type ReadGuard<'a, T> = RwLockReadGuard<'a, T>;
pub(crate) type WriteGuard<'a, T> = RwLockWriteGuard<'a, T>;
