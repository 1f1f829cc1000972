//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Lowercased email; unique.
        email -> Varchar,
        /// PHC-formatted Argon2 hash.
        password_hash -> Varchar,
        /// `user`, `owner`, or `admin`.
        role -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Deals published by owner accounts.
    deals (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Creating account; never updated.
        owner_id -> Uuid,
        /// Headline.
        title -> Text,
        /// Description.
        description -> Text,
        /// Discount percentage.
        discount -> Float8,
        /// Location.
        location -> Text,
        /// `/uploads/<name>` or the placeholder.
        image -> Text,
        /// Start of validity.
        start_date -> Timestamptz,
        /// End of validity (`CHECK end_date > start_date`).
        end_date -> Timestamptz,
        /// Insert timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp, bumped by the repository.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(deals -> accounts (owner_id));
diesel::allow_tables_to_appear_in_same_query!(accounts, deals);
