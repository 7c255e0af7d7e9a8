//! labdesk: dental prosthetics laboratory desk
//!
//! Tracks laboratory orders through their production stages, keeps the
//! doctor, catalog, staff and supplier registries, and issues invoices and
//! conformity declarations for completed work. Every collection is stored
//! as a plain JSON file under `.labdesk/data/`.

pub mod cli;
pub mod core;
pub mod entities;
pub mod json;
