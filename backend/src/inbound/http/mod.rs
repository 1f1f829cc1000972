//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod deal_form;
pub mod deals;
pub mod deals_dto;
pub mod error;
pub mod health;
pub mod routes;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;

pub use error::ApiResult;
