//! Inbound adapters translating external requests into domain service calls.

pub mod http;
