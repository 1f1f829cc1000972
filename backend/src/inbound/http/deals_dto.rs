//! Wire shapes for deal responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Deal;

/// Deal as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealResponse {
    /// Deal identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Identifier of the owning account.
    pub user: String,
    /// Headline.
    #[schema(example = "Pizza Night")]
    pub title: String,
    /// Description.
    pub description: String,
    /// Discount percentage.
    #[schema(example = 20.0)]
    pub discount: f64,
    /// Location.
    #[schema(example = "Downtown")]
    pub location: String,
    /// `/uploads/<name>` or `/uploads/default.png`.
    #[schema(example = "/uploads/default.png")]
    pub image: String,
    /// Start of validity.
    pub start_date: DateTime<Utc>,
    /// End of validity.
    pub end_date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Deal> for DealResponse {
    fn from(deal: Deal) -> Self {
        Self {
            id: deal.id.to_string(),
            user: deal.owner.to_string(),
            title: deal.title,
            description: deal.description,
            discount: deal.discount,
            location: deal.location,
            image: deal.image.into(),
            start_date: deal.start_date,
            end_date: deal.end_date,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
        }
    }
}

/// Mutation acknowledgement carrying the resulting deal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DealEnvelope {
    /// Human-readable outcome.
    pub message: String,
    /// The created or updated deal.
    pub deal: DealResponse,
}

impl DealEnvelope {
    /// Pair a message with a deal.
    pub fn new(message: impl Into<String>, deal: Deal) -> Self {
        Self {
            message: message.into(),
            deal: deal.into(),
        }
    }
}
