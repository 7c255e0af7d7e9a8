//! INV entity type - Invoice issued for a completed order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Invoice status; invoices are never mutated after issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum InvoiceStatus {
    #[default]
    Issued,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Issued => write!(f, "issued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier (INV-xxx)
    pub id: EntityId,

    /// Source order (ORD-xxx); may dangle once the order is deleted
    pub order_id: EntityId,

    /// `FV/{year}/{seq:04}`
    pub invoice_number: String,

    #[serde(default)]
    pub doctor_name: String,

    pub doctor_id: EntityId,

    #[serde(default)]
    pub prosthetic_name: String,

    #[serde(default)]
    pub teeth_numbers: String,

    pub teeth_count: u32,

    pub unit_price: f64,

    /// Copied verbatim from the order's total price
    pub amount: f64,

    pub issue_date: DateTime<Utc>,

    #[serde(default)]
    pub status: InvoiceStatus,
}

impl Entity for Invoice {
    const PREFIX: EntityPrefix = EntityPrefix::Inv;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.invoice_number
    }
}
