//! EMP entity type - Laboratory employee

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::doctor::merge_optional;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier (EMP-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFields {
    pub name: Option<String>,
    pub position: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl Entity for Employee {
    const PREFIX: EntityPrefix = EntityPrefix::Emp;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Employee {
    pub fn new(name: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Emp),
            name,
            position: None,
            skills: Vec::new(),
        }
    }

    pub fn merge(&mut self, fields: EmployeeFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        merge_optional(&mut self.position, fields.position);
        if let Some(skills) = fields.skills {
            self.skills = skills;
        }
    }
}
