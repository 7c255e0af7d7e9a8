//! DOC entity type - Referring doctor

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Doctor who places orders with the lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Unique identifier (DOC-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<String>,
}

/// Doctor fields for create/update; `None` keeps the current value and an
/// empty string clears an optional field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorFields {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub clinic: Option<String>,
}

impl Entity for Doctor {
    const PREFIX: EntityPrefix = EntityPrefix::Doc;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Doctor {
    pub fn new(name: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Doc),
            name,
            specialty: None,
            phone: None,
            email: None,
            clinic: None,
        }
    }

    pub fn merge(&mut self, fields: DoctorFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        merge_optional(&mut self.specialty, fields.specialty);
        merge_optional(&mut self.phone, fields.phone);
        merge_optional(&mut self.email, fields.email);
        merge_optional(&mut self.clinic, fields.clinic);
    }
}

/// Overwrite an optional text field; an empty value clears it
pub(crate) fn merge_optional(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        *slot = Some(value).filter(|v| !v.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doctor_merge() {
        let mut doctor = Doctor::new("Dr Nowak".to_string());
        doctor.merge(DoctorFields {
            phone: Some("600 100 200".to_string()),
            clinic: Some("Dentica".to_string()),
            ..Default::default()
        });
        assert_eq!(doctor.phone.as_deref(), Some("600 100 200"));

        doctor.merge(DoctorFields {
            clinic: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(doctor.clinic, None);
        assert_eq!(doctor.name, "Dr Nowak");
    }

    #[test]
    fn test_doctor_omits_empty_optionals() {
        let doctor = Doctor::new("Dr Nowak".to_string());
        let json = serde_json::to_string(&doctor).unwrap();
        assert!(!json.contains("specialty"));
        assert!(json.contains("DOC-"));
    }
}
