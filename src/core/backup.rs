//! Whole-dataset export and import

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::entity::Entity;
use crate::core::storage::CollectionKey;
use crate::entities::{Declaration, Doctor, Employee, Invoice, Order, Prosthetic, Supplier};
use crate::json::ImportParseError;

/// Version written into every export
pub const BACKUP_FORMAT_VERSION: &str = "2.0.0";

/// All collections held by a lab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabData {
    pub orders: Vec<Order>,
    pub doctors: Vec<Doctor>,
    pub prosthetics: Vec<Prosthetic>,
    pub employees: Vec<Employee>,
    pub suppliers: Vec<Supplier>,
    pub invoices: Vec<Invoice>,
    pub declarations: Vec<Declaration>,
}

impl LabData {
    /// Encode one collection as a JSON array
    pub fn collection_json(&self, key: CollectionKey) -> serde_json::Result<serde_json::Value> {
        match key {
            CollectionKey::Orders => serde_json::to_value(&self.orders),
            CollectionKey::Doctors => serde_json::to_value(&self.doctors),
            CollectionKey::Prosthetics => serde_json::to_value(&self.prosthetics),
            CollectionKey::Employees => serde_json::to_value(&self.employees),
            CollectionKey::Suppliers => serde_json::to_value(&self.suppliers),
            CollectionKey::Invoices => serde_json::to_value(&self.invoices),
            CollectionKey::Declarations => serde_json::to_value(&self.declarations),
        }
    }
}

/// Export document, borrowing the live collections
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRef<'a> {
    pub version: &'a str,
    pub export_date: DateTime<Utc>,
    pub orders: &'a [Order],
    pub doctors: &'a [Doctor],
    pub prosthetics: &'a [Prosthetic],
    pub employees: &'a [Employee],
    pub suppliers: &'a [Supplier],
    pub invoices: &'a [Invoice],
    pub declarations: &'a [Declaration],
}

impl<'a> BackupRef<'a> {
    pub fn new(data: &'a LabData, export_date: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION,
            export_date,
            orders: &data.orders,
            doctors: &data.doctors,
            prosthetics: &data.prosthetics,
            employees: &data.employees,
            suppliers: &data.suppliers,
            invoices: &data.invoices,
            declarations: &data.declarations,
        }
    }
}

/// Parsed import document; every collection is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub orders: Option<Vec<Order>>,
    #[serde(default)]
    pub doctors: Option<Vec<Doctor>>,
    #[serde(default)]
    pub prosthetics: Option<Vec<Prosthetic>>,
    #[serde(default)]
    pub employees: Option<Vec<Employee>>,
    #[serde(default)]
    pub suppliers: Option<Vec<Supplier>>,
    #[serde(default)]
    pub invoices: Option<Vec<Invoice>>,
    #[serde(default)]
    pub declarations: Option<Vec<Declaration>>,
}

impl BackupDocument {
    /// Parse an import file; nothing is applied on failure
    pub fn parse(source: &str, filename: &str) -> Result<Self, ImportParseError> {
        serde_json::from_str(source)
            .map_err(|err| ImportParseError::from_serde_error(&err, source, filename))
    }

    /// Check what the JSON shape alone cannot: unique IDs within each
    /// collection and consistent orders
    pub fn validate(&self) -> Result<(), String> {
        if let Some(orders) = &self.orders {
            unique_ids(orders, CollectionKey::Orders)?;
            for order in orders {
                order.check_consistency()?;
            }
        }
        if let Some(doctors) = &self.doctors {
            unique_ids(doctors, CollectionKey::Doctors)?;
        }
        if let Some(prosthetics) = &self.prosthetics {
            unique_ids(prosthetics, CollectionKey::Prosthetics)?;
        }
        if let Some(employees) = &self.employees {
            unique_ids(employees, CollectionKey::Employees)?;
        }
        if let Some(suppliers) = &self.suppliers {
            unique_ids(suppliers, CollectionKey::Suppliers)?;
        }
        if let Some(invoices) = &self.invoices {
            unique_ids(invoices, CollectionKey::Invoices)?;
        }
        if let Some(declarations) = &self.declarations {
            unique_ids(declarations, CollectionKey::Declarations)?;
        }
        Ok(())
    }

    /// Collections present in the document, in export order
    pub fn present_keys(&self) -> Vec<CollectionKey> {
        let mut keys = Vec::new();
        if self.orders.is_some() {
            keys.push(CollectionKey::Orders);
        }
        if self.doctors.is_some() {
            keys.push(CollectionKey::Doctors);
        }
        if self.prosthetics.is_some() {
            keys.push(CollectionKey::Prosthetics);
        }
        if self.employees.is_some() {
            keys.push(CollectionKey::Employees);
        }
        if self.suppliers.is_some() {
            keys.push(CollectionKey::Suppliers);
        }
        if self.invoices.is_some() {
            keys.push(CollectionKey::Invoices);
        }
        if self.declarations.is_some() {
            keys.push(CollectionKey::Declarations);
        }
        keys
    }
}

fn unique_ids<T: Entity>(items: &[T], key: CollectionKey) -> Result<(), String> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(format!("{}: duplicate id {}", key, item.id()));
        }
    }
    Ok(())
}

/// Default export file name for a given day
pub fn backup_file_name(day: NaiveDate) -> String {
    format!("pracownia-backup-{}.json", day.format("%Y-%m-%d"))
}
