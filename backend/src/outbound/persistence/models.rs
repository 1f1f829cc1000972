//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, deals};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the deals table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = deals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DealRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub discount: f64,
    pub location: String,
    pub image: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new deals; timestamps come from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deals)]
pub(crate) struct NewDealRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub discount: f64,
    pub location: &'a str,
    pub image: &'a str,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Changeset for allow-listed deal fields; `None` columns are skipped.
///
/// `id`, `owner_id`, and `created_at` are deliberately absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = deals)]
pub(crate) struct DealChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub discount: Option<f64>,
    pub location: Option<&'a str>,
    pub image: Option<&'a str>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}
