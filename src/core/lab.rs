//! The lab service: owns every collection and mirrors it to storage
//!
//! Each mutating operation runs to completion on the in-memory collection,
//! writes the whole affected collection through the [`Storage`] and reports
//! a [`Notice`]. A failed write is reported and remembered but never rolls
//! back the in-memory change.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::core::backup::{BackupDocument, BackupRef, LabData};
use crate::core::clock::{Calendar, Clock};
use crate::core::dashboard::{dashboard, Dashboard};
use crate::core::documents::{
    build_declaration, build_invoice, next_declaration_number, next_invoice_number,
};
use crate::core::entity::{find, find_mut, Entity};
use crate::core::error::LabError;
use crate::core::identity::EntityId;
use crate::core::notify::{Notice, Notifier};
use crate::core::storage::{CollectionKey, Storage, StorageError};
use crate::entities::{
    Declaration, Doctor, DoctorFields, Employee, EmployeeFields, Invoice, Order, OrderInput,
    OrderPatch, OrderStatus, Prosthetic, ProstheticFields, StageStatus, Supplier, SupplierFields,
};

/// Default urgency window in days
pub const DEFAULT_URGENT_DAYS: i64 = 3;

/// Laboratory records service
pub struct Lab<S: Storage, N: Notifier> {
    store: S,
    notifier: N,
    clock: Clock,
    calendar: Calendar,
    urgent_days: i64,
    data: LabData,
    /// Collections whose last write failed, with the failure message
    unsaved: BTreeMap<CollectionKey, String>,
}

impl<S: Storage, N: Notifier> Lab<S, N> {
    /// Load every collection from the store
    ///
    /// Missing collections start empty, except the catalog, which is seeded
    /// with [`Prosthetic::default_catalog`] and written back immediately. A
    /// collection that exists but cannot be decoded aborts the open.
    pub fn open(store: S, notifier: N, clock: Clock) -> Result<Self, LabError> {
        let mut lab = Self {
            store,
            notifier,
            clock,
            calendar: Calendar::default(),
            urgent_days: DEFAULT_URGENT_DAYS,
            data: LabData::default(),
            unsaved: BTreeMap::new(),
        };

        lab.data.orders = lab.load_collection(CollectionKey::Orders)?.unwrap_or_default();
        lab.data.doctors = lab.load_collection(CollectionKey::Doctors)?.unwrap_or_default();
        lab.data.employees = lab
            .load_collection(CollectionKey::Employees)?
            .unwrap_or_default();
        lab.data.suppliers = lab
            .load_collection(CollectionKey::Suppliers)?
            .unwrap_or_default();
        lab.data.invoices = lab
            .load_collection(CollectionKey::Invoices)?
            .unwrap_or_default();
        lab.data.declarations = lab
            .load_collection(CollectionKey::Declarations)?
            .unwrap_or_default();

        match lab.load_collection(CollectionKey::Prosthetics)? {
            Some(prosthetics) => lab.data.prosthetics = prosthetics,
            None => {
                lab.data.prosthetics = Prosthetic::default_catalog();
                lab.persist(CollectionKey::Prosthetics);
                lab.notifier
                    .notify(Notice::info("Seeded the catalog with example prosthetics"));
            }
        }

        tracing::debug!(
            orders = lab.data.orders.len(),
            doctors = lab.data.doctors.len(),
            prosthetics = lab.data.prosthetics.len(),
            "lab opened"
        );
        Ok(lab)
    }

    /// Change the urgency window (days ahead of now)
    pub fn with_urgent_days(mut self, days: i64) -> Self {
        self.urgent_days = days.max(0);
        self
    }

    /// Read dates, months and sequence years in `calendar`
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    fn load_collection<T: DeserializeOwned>(
        &self,
        key: CollectionKey,
    ) -> Result<Option<Vec<T>>, LabError> {
        let Some(value) = self
            .store
            .load(key)
            .map_err(|source| LabError::Persistence { key, source })?
        else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| LabError::Persistence {
                key,
                source: StorageError::Corrupt { key, source },
            })
    }

    /// Write one collection whole; failures are reported, not returned
    fn persist(&mut self, key: CollectionKey) -> bool {
        let result = self
            .data
            .collection_json(key)
            .map_err(StorageError::from)
            .and_then(|value| self.store.save(key, &value));

        match result {
            Ok(()) => {
                self.unsaved.remove(&key);
                tracing::debug!(collection = %key, "collection persisted");
                true
            }
            Err(err) => {
                tracing::error!(
                    collection = %key,
                    error = %err,
                    "failed to persist collection; in-memory state kept"
                );
                let message = err.to_string();
                self.notifier.notify(Notice::error(format!(
                    "Failed to save {}: {}",
                    key, message
                )));
                self.unsaved.insert(key, message);
                false
            }
        }
    }

    /// Report a rejected operation and hand the error back
    fn reject(&mut self, err: LabError) -> LabError {
        tracing::warn!(error = %err, "operation rejected");
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }

    fn success(&mut self, message: impl Into<String>) {
        self.notifier.notify(Notice::success(message));
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Today's date on the lab's calendar
    pub fn today(&self) -> NaiveDate {
        self.calendar.date(self.clock.now())
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn urgent_days(&self) -> i64 {
        self.urgent_days
    }

    pub fn data(&self) -> &LabData {
        &self.data
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Collections whose latest write failed, with the reason
    pub fn unsaved_collections(&self) -> &BTreeMap<CollectionKey, String> {
        &self.unsaved
    }

    pub fn orders(&self) -> &[Order] {
        &self.data.orders
    }

    pub fn order(&self, id: &EntityId) -> Option<&Order> {
        find(&self.data.orders, id)
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.data.doctors
    }

    pub fn doctor(&self, id: &EntityId) -> Option<&Doctor> {
        find(&self.data.doctors, id)
    }

    pub fn prosthetics(&self) -> &[Prosthetic] {
        &self.data.prosthetics
    }

    pub fn prosthetic(&self, id: &EntityId) -> Option<&Prosthetic> {
        find(&self.data.prosthetics, id)
    }

    pub fn employees(&self) -> &[Employee] {
        &self.data.employees
    }

    pub fn employee(&self, id: &EntityId) -> Option<&Employee> {
        find(&self.data.employees, id)
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.data.suppliers
    }

    pub fn supplier(&self, id: &EntityId) -> Option<&Supplier> {
        find(&self.data.suppliers, id)
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.data.invoices
    }

    pub fn invoice(&self, id: &EntityId) -> Option<&Invoice> {
        find(&self.data.invoices, id)
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.data.declarations
    }

    pub fn declaration(&self, id: &EntityId) -> Option<&Declaration> {
        find(&self.data.declarations, id)
    }

    pub fn invoice_for_order(&self, order_id: &EntityId) -> Option<&Invoice> {
        self.data.invoices.iter().find(|inv| &inv.order_id == order_id)
    }

    pub fn declaration_for_order(&self, order_id: &EntityId) -> Option<&Declaration> {
        self.data
            .declarations
            .iter()
            .find(|decl| &decl.order_id == order_id)
    }

    // =====================================================================
    // Orders
    // =====================================================================

    /// Open a new order, pricing it from the catalog
    pub fn create_order(&mut self, input: OrderInput) -> Result<EntityId, LabError> {
        let Some(prosthetic) = find(&self.data.prosthetics, &input.prosthetic_id).cloned() else {
            let err = LabError::validation(format!("unknown prosthetic {}", input.prosthetic_id));
            return Err(self.reject(err));
        };
        if find(&self.data.doctors, &input.doctor_id).is_none() {
            let err = LabError::validation(format!("unknown doctor {}", input.doctor_id));
            return Err(self.reject(err));
        }

        let order = Order::new(input, &prosthetic, self.clock.now());
        let id = order.id.clone();
        tracing::info!(order = %id, total = order.total_price, "order created");
        let message = format!(
            "Order for patient {} added ({} x {})",
            order.patient_code, order.teeth_count, prosthetic.name
        );
        self.data.orders.push(order);
        self.persist(CollectionKey::Orders);
        self.success(message);
        Ok(id)
    }

    /// Edit an order; tooth count and total price are recomputed against the
    /// (possibly new) catalog item
    ///
    /// An unknown prosthetic fails with a validation error and leaves the
    /// order untouched. The stage snapshot is kept as it was.
    pub fn update_order(&mut self, id: &EntityId, patch: OrderPatch) -> Result<(), LabError> {
        let Some(current) = find(&self.data.orders, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        let prosthetic_id = patch
            .prosthetic_id
            .clone()
            .unwrap_or_else(|| current.prosthetic_id.clone());

        let Some(prosthetic) = find(&self.data.prosthetics, &prosthetic_id).cloned() else {
            let err = LabError::validation(format!("unknown prosthetic {}", prosthetic_id));
            return Err(self.reject(err));
        };
        if let Some(doctor_id) = &patch.doctor_id {
            if find(&self.data.doctors, doctor_id).is_none() {
                let err = LabError::validation(format!("unknown doctor {}", doctor_id));
                return Err(self.reject(err));
            }
        }

        let now = self.clock.now();
        if let Some(order) = find_mut(&mut self.data.orders, id) {
            order.merge(patch);
            order.reprice(&prosthetic);
            order.modified_at = Some(now);
        }
        self.persist(CollectionKey::Orders);
        self.success("Order updated");
        Ok(())
    }

    /// Remove an order
    ///
    /// Invoices and declarations issued for it are kept and keep pointing at
    /// the removed ID.
    pub fn delete_order(&mut self, id: &EntityId) -> Result<Order, LabError> {
        let Some(order) = remove_entity(&mut self.data.orders, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };

        let dangling = self.data.invoices.iter().filter(|i| &i.order_id == id).count()
            + self
                .data
                .declarations
                .iter()
                .filter(|d| &d.order_id == id)
                .count();
        if dangling > 0 {
            tracing::info!(order = %id, documents = dangling, "deleted order still has documents");
        }

        self.persist(CollectionKey::Orders);
        self.success("Order deleted");
        Ok(order)
    }

    /// Set the lifecycle status; any status may follow any other
    pub fn set_status(&mut self, id: &EntityId, status: OrderStatus) -> Result<(), LabError> {
        let now = self.clock.now();
        let Some(order) = find_mut(&mut self.data.orders, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        let previous = order.status;
        order.set_status(status, now);
        tracing::info!(order = %id, from = %previous, to = %status, "order status changed");

        self.persist(CollectionKey::Orders);
        self.success(format!("Status changed to: {}", status));
        Ok(())
    }

    /// Assign and advance one production stage (zero-based index)
    pub fn set_stage_progress(
        &mut self,
        order_id: &EntityId,
        stage_index: usize,
        assignee: impl Into<String>,
        status: StageStatus,
    ) -> Result<(), LabError> {
        let now = self.clock.now();
        let Some(order) = find_mut(&mut self.data.orders, order_id) else {
            return Err(self.reject(LabError::not_found(order_id)));
        };

        let stage_count = order.stage_progress.len();
        if stage_index >= stage_count {
            let err = LabError::validation(format!(
                "stage {} out of range (order has {} stage(s))",
                stage_index + 1,
                stage_count
            ));
            return Err(self.reject(err));
        }

        order.stage_progress[stage_index].apply(assignee.into(), status, now);
        let stage_name = order
            .stages
            .get(stage_index)
            .cloned()
            .unwrap_or_else(|| format!("#{}", stage_index + 1));

        self.persist(CollectionKey::Orders);
        self.success(format!("Stage '{}' set to {}", stage_name, status));
        Ok(())
    }

    /// Open orders due within the urgency window, soonest first
    pub fn urgent_orders(&self) -> Vec<&Order> {
        let today = self.today();
        let mut urgent: Vec<&Order> = self
            .data
            .orders
            .iter()
            .filter(|o| o.is_urgent(today, self.urgent_days))
            .collect();
        urgent.sort_by_key(|o| o.deadline);
        urgent
    }

    pub fn dashboard(&self) -> Dashboard {
        dashboard(&self.data, self.clock.now(), self.calendar, self.urgent_days)
    }

    // =====================================================================
    // Documents
    // =====================================================================

    /// Fetch an order eligible for a document of `kind`
    fn document_source(
        &mut self,
        order_id: &EntityId,
        kind: &'static str,
        existing: Option<String>,
    ) -> Result<Order, LabError> {
        let Some(order) = find(&self.data.orders, order_id).cloned() else {
            return Err(self.reject(LabError::not_found(order_id)));
        };
        if let Some(number) = existing {
            let err = LabError::DuplicateDocument {
                kind,
                order_id: order_id.clone(),
                number,
            };
            return Err(self.reject(err));
        }
        if !order.is_completed() {
            let err = LabError::validation(format!(
                "order {} is {}; a {} can only be issued for a completed order",
                order_id, order.status, kind
            ));
            return Err(self.reject(err));
        }
        Ok(order)
    }

    /// Issue the invoice for a completed order
    pub fn generate_invoice(&mut self, order_id: &EntityId) -> Result<Invoice, LabError> {
        let existing = self
            .invoice_for_order(order_id)
            .map(|inv| inv.invoice_number.clone());
        let order = self.document_source(order_id, "invoice", existing)?;

        let now = self.clock.now();
        let number = next_invoice_number(&self.data.invoices, self.calendar.year(now));
        let invoice = build_invoice(
            &order,
            find(&self.data.doctors, &order.doctor_id),
            find(&self.data.prosthetics, &order.prosthetic_id),
            number,
            now,
        );
        tracing::info!(order = %order_id, number = %invoice.invoice_number, "invoice issued");

        self.data.invoices.push(invoice.clone());
        self.persist(CollectionKey::Invoices);
        self.success(format!("Invoice issued: {}", invoice.invoice_number));
        Ok(invoice)
    }

    /// Issue the conformity declaration for a completed order
    pub fn generate_declaration(&mut self, order_id: &EntityId) -> Result<Declaration, LabError> {
        let existing = self
            .declaration_for_order(order_id)
            .map(|decl| decl.declaration_number.clone());
        let order = self.document_source(order_id, "declaration", existing)?;

        let now = self.clock.now();
        let number = next_declaration_number(&self.data.declarations, self.calendar.year(now));
        let declaration = build_declaration(
            &order,
            find(&self.data.doctors, &order.doctor_id),
            find(&self.data.prosthetics, &order.prosthetic_id),
            number,
            now,
        );
        tracing::info!(
            order = %order_id,
            number = %declaration.declaration_number,
            "declaration issued"
        );

        self.data.declarations.push(declaration.clone());
        self.persist(CollectionKey::Declarations);
        self.success(format!(
            "Declaration issued: {}",
            declaration.declaration_number
        ));
        Ok(declaration)
    }

    // =====================================================================
    // Registries
    // =====================================================================

    fn required_name(&mut self, name: Option<String>, kind: &str) -> Result<String, LabError> {
        match name.map(|n| n.trim().to_string()) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(self.reject(LabError::validation(format!("{} name is required", kind)))),
        }
    }

    /// Reject a blank replacement name; `None` is fine
    fn check_rename(&mut self, name: &Option<String>, kind: &str) -> Result<(), LabError> {
        match name {
            Some(name) if name.trim().is_empty() => Err(self.reject(LabError::validation(
                format!("{} name cannot be blank", kind),
            ))),
            _ => Ok(()),
        }
    }

    fn orders_referencing(&self, id: &EntityId) -> usize {
        self.data
            .orders
            .iter()
            .filter(|o| &o.doctor_id == id || &o.prosthetic_id == id)
            .count()
    }

    pub fn add_doctor(&mut self, fields: DoctorFields) -> Result<EntityId, LabError> {
        let name = self.required_name(fields.name.clone(), "doctor")?;
        let mut doctor = Doctor::new(name);
        doctor.merge(DoctorFields { name: None, ..fields });
        let id = doctor.id.clone();

        self.data.doctors.push(doctor);
        self.persist(CollectionKey::Doctors);
        self.success("Doctor added");
        Ok(id)
    }

    pub fn update_doctor(&mut self, id: &EntityId, fields: DoctorFields) -> Result<(), LabError> {
        self.check_rename(&fields.name, "doctor")?;
        let Some(doctor) = find_mut(&mut self.data.doctors, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        doctor.merge(fields);
        self.persist(CollectionKey::Doctors);
        self.success("Doctor updated");
        Ok(())
    }

    /// Remove a doctor no order refers to
    pub fn delete_doctor(&mut self, id: &EntityId) -> Result<Doctor, LabError> {
        self.ensure_unreferenced(id)?;
        let Some(doctor) = remove_entity(&mut self.data.doctors, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        self.persist(CollectionKey::Doctors);
        self.success("Doctor deleted");
        Ok(doctor)
    }

    pub fn add_prosthetic(&mut self, fields: ProstheticFields) -> Result<EntityId, LabError> {
        let name = self.required_name(fields.name.clone(), "prosthetic")?;
        self.check_price(fields.price)?;
        let mut prosthetic = Prosthetic::new(name, String::new(), 0, 0.0);
        prosthetic.merge(ProstheticFields { name: None, ..fields });
        let id = prosthetic.id.clone();

        self.data.prosthetics.push(prosthetic);
        self.persist(CollectionKey::Prosthetics);
        self.success("Prosthetic added");
        Ok(id)
    }

    /// Edit a catalog item; existing orders keep their stages and prices
    pub fn update_prosthetic(
        &mut self,
        id: &EntityId,
        fields: ProstheticFields,
    ) -> Result<(), LabError> {
        self.check_rename(&fields.name, "prosthetic")?;
        self.check_price(fields.price)?;
        let Some(prosthetic) = find_mut(&mut self.data.prosthetics, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        prosthetic.merge(fields);
        self.persist(CollectionKey::Prosthetics);
        self.success("Prosthetic updated");
        Ok(())
    }

    /// Remove a catalog item no order refers to
    pub fn delete_prosthetic(&mut self, id: &EntityId) -> Result<Prosthetic, LabError> {
        self.ensure_unreferenced(id)?;
        let Some(prosthetic) = remove_entity(&mut self.data.prosthetics, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        self.persist(CollectionKey::Prosthetics);
        self.success("Prosthetic deleted");
        Ok(prosthetic)
    }

    fn check_price(&mut self, price: Option<f64>) -> Result<(), LabError> {
        match price {
            Some(price) if !price.is_finite() || price < 0.0 => Err(self.reject(
                LabError::validation(format!("invalid price {}", price)),
            )),
            _ => Ok(()),
        }
    }

    fn ensure_unreferenced(&mut self, id: &EntityId) -> Result<(), LabError> {
        let count = self.orders_referencing(id);
        if count > 0 {
            let err = LabError::ReferenceInUse {
                kind: id.prefix().kind(),
                id: id.clone(),
                count,
            };
            return Err(self.reject(err));
        }
        Ok(())
    }

    pub fn add_employee(&mut self, fields: EmployeeFields) -> Result<EntityId, LabError> {
        let name = self.required_name(fields.name.clone(), "employee")?;
        let mut employee = Employee::new(name);
        employee.merge(EmployeeFields { name: None, ..fields });
        let id = employee.id.clone();

        self.data.employees.push(employee);
        self.persist(CollectionKey::Employees);
        self.success("Employee added");
        Ok(id)
    }

    pub fn update_employee(
        &mut self,
        id: &EntityId,
        fields: EmployeeFields,
    ) -> Result<(), LabError> {
        self.check_rename(&fields.name, "employee")?;
        let Some(employee) = find_mut(&mut self.data.employees, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        employee.merge(fields);
        self.persist(CollectionKey::Employees);
        self.success("Employee updated");
        Ok(())
    }

    pub fn delete_employee(&mut self, id: &EntityId) -> Result<Employee, LabError> {
        let Some(employee) = remove_entity(&mut self.data.employees, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        self.persist(CollectionKey::Employees);
        self.success("Employee deleted");
        Ok(employee)
    }

    pub fn add_supplier(&mut self, fields: SupplierFields) -> Result<EntityId, LabError> {
        let name = self.required_name(fields.name.clone(), "supplier")?;
        self.check_price(fields.cost_per_service)?;
        let mut supplier = Supplier::new(name);
        supplier.merge(SupplierFields { name: None, ..fields });
        let id = supplier.id.clone();

        self.data.suppliers.push(supplier);
        self.persist(CollectionKey::Suppliers);
        self.success("Supplier added");
        Ok(id)
    }

    pub fn update_supplier(
        &mut self,
        id: &EntityId,
        fields: SupplierFields,
    ) -> Result<(), LabError> {
        self.check_rename(&fields.name, "supplier")?;
        self.check_price(fields.cost_per_service)?;
        let Some(supplier) = find_mut(&mut self.data.suppliers, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        supplier.merge(fields);
        self.persist(CollectionKey::Suppliers);
        self.success("Supplier updated");
        Ok(())
    }

    pub fn delete_supplier(&mut self, id: &EntityId) -> Result<Supplier, LabError> {
        let Some(supplier) = remove_entity(&mut self.data.suppliers, id) else {
            return Err(self.reject(LabError::not_found(id)));
        };
        self.persist(CollectionKey::Suppliers);
        self.success("Supplier deleted");
        Ok(supplier)
    }

    // =====================================================================
    // Backup
    // =====================================================================

    /// Serialize the whole data set as a pretty-printed export document
    pub fn export(&mut self) -> Result<String, LabError> {
        let document = BackupRef::new(&self.data, self.clock.now());
        match serde_json::to_string_pretty(&document) {
            Ok(json) => {
                self.success("Data exported");
                Ok(json)
            }
            Err(err) => Err(self.reject(LabError::Export(err))),
        }
    }

    /// Replace every collection present in `source` and persist it
    ///
    /// The document is parsed and checked in full first; a document that
    /// fails either step changes nothing. Returns the replaced collections.
    pub fn import(&mut self, source: &str, filename: &str) -> Result<Vec<CollectionKey>, LabError> {
        let document = match BackupDocument::parse(source, filename) {
            Ok(document) => document,
            Err(err) => return Err(self.reject(LabError::ImportParse(err))),
        };
        if let Err(problem) = document.validate() {
            let err = LabError::validation(format!("{} rejected: {}", filename, problem));
            return Err(self.reject(err));
        }
        let keys = document.present_keys();

        if let Some(orders) = document.orders {
            self.data.orders = orders;
        }
        if let Some(doctors) = document.doctors {
            self.data.doctors = doctors;
        }
        if let Some(prosthetics) = document.prosthetics {
            self.data.prosthetics = prosthetics;
        }
        if let Some(employees) = document.employees {
            self.data.employees = employees;
        }
        if let Some(suppliers) = document.suppliers {
            self.data.suppliers = suppliers;
        }
        if let Some(invoices) = document.invoices {
            self.data.invoices = invoices;
        }
        if let Some(declarations) = document.declarations {
            self.data.declarations = declarations;
        }
        for key in &keys {
            self.persist(*key);
        }

        tracing::info!(
            collections = keys.len(),
            version = document.version.as_deref().unwrap_or("unknown"),
            "backup imported"
        );
        self.success(format!(
            "Data imported ({})",
            keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        ));
        Ok(keys)
    }
}

fn remove_entity<T: Entity>(items: &mut Vec<T>, id: &EntityId) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}
