//! Entity trait - common interface for all entity types

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all stored records
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// The entity type prefix (e.g., ORD, DOC)
    const PREFIX: EntityPrefix;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the display title (name, patient code, document number)
    fn title(&self) -> &str;
}

/// Find an entity by ID in a collection
pub fn find<'a, T: Entity>(items: &'a [T], id: &EntityId) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Find an entity by ID in a collection, mutably
pub fn find_mut<'a, T: Entity>(items: &'a mut [T], id: &EntityId) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}
