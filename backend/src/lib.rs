//! Deals backend library.
//!
//! Owners publish time-bounded discount deals with optional images; anyone
//! may browse them. The crate follows a hexagonal layout: [`domain`] holds
//! the rules and ports, [`inbound`] adapts HTTP onto the driving ports, and
//! [`outbound`] implements the driven ports against PostgreSQL, memory, the
//! filesystem, and JWT/Argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
