//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local repositories for runs without a database
//! - **assets**: uploaded images under a `cap_std` content root
//! - **token**: HS256 JSON Web Tokens
//! - **security**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod assets;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod token;
