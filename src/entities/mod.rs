//! Entity type definitions
//!
//! **Catalog & registries:**
//! - [`Prosthetic`] - Catalog item with unit price and production stages
//! - [`Doctor`] - Referring doctors
//! - [`Employee`] - Lab staff, assignable to stages
//! - [`Supplier`] - Subcontractors, assignable to stages
//!
//! **Ledger:**
//! - [`Order`] - Laboratory order with a stage checklist snapshot
//!
//! **Documents:**
//! - [`Invoice`] - Invoice derived from a completed order
//! - [`Declaration`] - Conformity declaration derived from a completed order

pub mod declaration;
pub mod doctor;
pub mod employee;
pub mod invoice;
pub mod order;
pub mod prosthetic;
pub mod supplier;

pub use declaration::Declaration;
pub use doctor::{Doctor, DoctorFields};
pub use employee::{Employee, EmployeeFields};
pub use invoice::{Invoice, InvoiceStatus};
pub use order::{Order, OrderInput, OrderPatch, OrderStatus, StageProgress, StageStatus};
pub use prosthetic::{Prosthetic, ProstheticFields};
pub use supplier::{Supplier, SupplierFields};
