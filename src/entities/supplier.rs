//! SUP entity type - External supplier / subcontractor

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::doctor::merge_optional;

/// Suffix appended to a supplier name when it is used as a stage assignee
pub const SUPPLIER_ASSIGNEE_SUFFIX: &str = " (d)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    /// Unique identifier (SUP-xxx)
    pub id: EntityId,

    pub name: String,

    /// Service offered (milling, casting, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_service: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFields {
    pub name: Option<String>,
    pub service: Option<String>,
    pub contact: Option<String>,
    pub cost_per_service: Option<f64>,
}

impl Entity for Supplier {
    const PREFIX: EntityPrefix = EntityPrefix::Sup;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Supplier {
    pub fn new(name: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Sup),
            name,
            service: None,
            contact: None,
            cost_per_service: None,
        }
    }

    pub fn merge(&mut self, fields: SupplierFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        merge_optional(&mut self.service, fields.service);
        merge_optional(&mut self.contact, fields.contact);
        if let Some(cost) = fields.cost_per_service {
            self.cost_per_service = Some(cost);
        }
    }

    /// Name as written into a stage assignee slot
    pub fn assignee_label(&self) -> String {
        format!("{}{}", self.name, SUPPLIER_ASSIGNEE_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignee_label() {
        let supplier = Supplier::new("MillCenter".to_string());
        assert_eq!(supplier.assignee_label(), "MillCenter (d)");
    }
}
