//! PROS entity type - Prosthetic catalog item

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Catalog item: a prosthetic type with price and production stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prosthetic {
    /// Unique identifier (PROS-xxx)
    pub id: EntityId,

    pub name: String,

    /// Regulatory classification code printed on declarations
    #[serde(default)]
    pub gmlc_code: String,

    /// Minimum lead time in days
    #[serde(default)]
    pub min_days: u32,

    /// Unit price (per tooth)
    #[serde(default)]
    pub price: f64,

    /// Ordered production stages
    #[serde(default)]
    pub stages: Vec<String>,
}

/// Catalog fields for create/update; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProstheticFields {
    pub name: Option<String>,
    pub gmlc_code: Option<String>,
    pub min_days: Option<u32>,
    pub price: Option<f64>,
    pub stages: Option<Vec<String>>,
}

impl Entity for Prosthetic {
    const PREFIX: EntityPrefix = EntityPrefix::Pros;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}

impl Prosthetic {
    /// Create a new catalog item with no stages
    pub fn new(name: String, gmlc_code: String, min_days: u32, price: f64) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Pros),
            name,
            gmlc_code,
            min_days,
            price,
            stages: Vec::new(),
        }
    }

    /// Builder-style stage list
    pub fn with_stages<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages = stages.into_iter().map(Into::into).collect();
        self
    }

    pub fn merge(&mut self, fields: ProstheticFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(gmlc_code) = fields.gmlc_code {
            self.gmlc_code = gmlc_code;
        }
        if let Some(min_days) = fields.min_days {
            self.min_days = min_days;
        }
        if let Some(price) = fields.price {
            self.price = price;
        }
        if let Some(stages) = fields.stages {
            self.stages = stages;
        }
    }

    /// Catalog seeded into an empty store
    pub fn default_catalog() -> Vec<Prosthetic> {
        vec![
            Prosthetic::new(
                "Korona porcelanowa".to_string(),
                "GMLC-001".to_string(),
                7,
                450.0,
            )
            .with_stages(["Odlew", "Szlifowanie", "Porcelana", "Glazura"]),
            Prosthetic::new(
                "Most 3-punktowy".to_string(),
                "GMLC-002".to_string(),
                10,
                1200.0,
            )
            .with_stages(["Odlew", "Szlifowanie", "Porcelana", "Polerowanie"]),
            Prosthetic::new(
                "Proteza akrylowa".to_string(),
                "GMLC-003".to_string(),
                14,
                800.0,
            )
            .with_stages(["Wycisk", "Model", "Ustawienie", "Polimeryzacja"]),
        ]
    }
}

/// Split a comma-separated stage list, dropping blanks
pub fn parse_stage_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|stage| !stage.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Prosthetic::default_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].price, 450.0);
        assert_eq!(catalog[2].gmlc_code, "GMLC-003");
        assert!(catalog.iter().all(|p| p.stages.len() == 4));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut crown = Prosthetic::default_catalog().remove(0);
        crown.merge(ProstheticFields {
            price: Some(500.0),
            ..Default::default()
        });
        assert_eq!(crown.price, 500.0);
        assert_eq!(crown.name, "Korona porcelanowa");
        assert_eq!(crown.stages.len(), 4);
    }

    #[test]
    fn test_parse_stage_list() {
        assert_eq!(
            parse_stage_list("Odlew, Szlifowanie,, Glazura "),
            vec!["Odlew", "Szlifowanie", "Glazura"]
        );
        assert!(parse_stage_list("").is_empty());
    }

    #[test]
    fn test_json_uses_camel_case() {
        let crown = Prosthetic::default_catalog().remove(0);
        let json = serde_json::to_value(&crown).unwrap();
        assert_eq!(json["gmlcCode"], "GMLC-001");
        assert_eq!(json["minDays"], 7);
    }
}
