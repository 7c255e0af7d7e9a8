//! DECL entity type - Conformity declaration for a custom-made device

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Unique identifier (DECL-xxx)
    pub id: EntityId,

    /// Source order (ORD-xxx); may dangle once the order is deleted
    pub order_id: EntityId,

    /// `OSW/{year}/{n}`
    pub declaration_number: String,

    #[serde(default)]
    pub patient_code: String,

    #[serde(default)]
    pub doctor_name: String,

    #[serde(default)]
    pub prosthetic_name: String,

    /// Regulatory classification code of the device type
    #[serde(default)]
    pub gmlc_code: String,

    #[serde(default)]
    pub teeth_numbers: String,

    #[serde(default)]
    pub material: String,

    pub issue_date: DateTime<Utc>,

    /// Completion time of the order at generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
}

impl Entity for Declaration {
    const PREFIX: EntityPrefix = EntityPrefix::Decl;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.declaration_number
    }
}
