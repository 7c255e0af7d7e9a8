//! Short ID system for easier entity selection
//!
//! Provides numeric aliases like `ORD@1`, `DOC@2` that map to full entity
//! IDs. Aliases are renumbered for a prefix every time that collection is
//! listed, and kept in `.labdesk/shortids.json` between invocations.

use std::collections::{BTreeMap, HashMap};
use std::fs;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;

const INDEX_FILE: &str = "shortids.json";

/// A mapping of short IDs (`PREFIX@N`) to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// Maps `PREFIX@N` to the full entity ID string
    entries: BTreeMap<String, String>,
    /// Reverse lookup, rebuilt on load
    #[serde(skip)]
    reverse: HashMap<String, String>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or create empty if not found
    pub fn load(project: &Project) -> Self {
        let path = project.labdesk_dir().join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };
        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(short, full)| (full.clone(), short.clone()))
                    .collect();
                index
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable short ID index");
                Self::new()
            }
        }
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.labdesk_dir().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Renumber every alias of `prefix` from 1, in the given order
    pub fn rebuild<'a>(&mut self, prefix: EntityPrefix, ids: impl IntoIterator<Item = &'a EntityId>) {
        let tag = format!("{}@", prefix);
        self.entries.retain(|short, _| !short.starts_with(&tag));
        self.reverse.retain(|_, short| !short.starts_with(&tag));

        for (n, id) in ids.into_iter().enumerate() {
            let short = format!("{}{}", tag, n + 1);
            let full = id.to_string();
            self.entries.insert(short.clone(), full.clone());
            self.reverse.insert(full, short);
        }
    }

    /// Add a single ID after the current highest alias of its prefix
    pub fn add(&mut self, id: &EntityId) -> String {
        let full = id.to_string();
        if let Some(short) = self.reverse.get(&full) {
            return short.clone();
        }
        let tag = format!("{}@", id.prefix());
        let next = self
            .entries
            .keys()
            .filter_map(|short| short.strip_prefix(&tag)?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let short = format!("{}{}", tag, next);
        self.entries.insert(short.clone(), full.clone());
        self.reverse.insert(full, short.clone());
        short
    }

    /// Resolve a `PREFIX@N` reference to a full entity ID
    ///
    /// Anything that is not alias-shaped passes through unchanged; an
    /// alias-shaped reference with no entry resolves to `None`.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let Some((prefix, number)) = reference.split_once('@') else {
            return Some(reference.to_string());
        };
        let prefix: EntityPrefix = prefix.parse().ok()?;
        let number: u32 = number.parse().ok()?;
        self.entries
            .get(&format!("{}@{}", prefix, number))
            .cloned()
    }

    /// Short alias for a full ID, if one is assigned
    pub fn get_short_id(&self, id: &EntityId) -> Option<&str> {
        self.reverse.get(&id.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_and_resolve() {
        let a = EntityId::new(EntityPrefix::Ord);
        let b = EntityId::new(EntityPrefix::Ord);
        let mut index = ShortIdIndex::new();
        index.rebuild(EntityPrefix::Ord, [&a, &b]);

        assert_eq!(index.resolve("ORD@1"), Some(a.to_string()));
        assert_eq!(index.resolve("ord@2"), Some(b.to_string()));
        assert_eq!(index.resolve("ORD@3"), None);
        assert_eq!(index.get_short_id(&b), Some("ORD@2"));
    }

    #[test]
    fn test_rebuild_keeps_other_prefixes() {
        let order = EntityId::new(EntityPrefix::Ord);
        let doctor = EntityId::new(EntityPrefix::Doc);
        let mut index = ShortIdIndex::new();
        index.rebuild(EntityPrefix::Doc, [&doctor]);
        index.rebuild(EntityPrefix::Ord, [&order]);
        index.rebuild(EntityPrefix::Ord, []);

        assert_eq!(index.resolve("DOC@1"), Some(doctor.to_string()));
        assert_eq!(index.resolve("ORD@1"), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("ORD-01ABC"), Some("ORD-01ABC".to_string()));
        assert_eq!(index.resolve("BOGUS@1"), None);
    }

    #[test]
    fn test_add_appends_and_dedups() {
        let first = EntityId::new(EntityPrefix::Emp);
        let second = EntityId::new(EntityPrefix::Emp);
        let mut index = ShortIdIndex::new();
        index.rebuild(EntityPrefix::Emp, [&first]);

        assert_eq!(index.add(&second), "EMP@2");
        assert_eq!(index.add(&second), "EMP@2");
        assert_eq!(index.add(&first), "EMP@1");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let id = EntityId::new(EntityPrefix::Sup);

        let mut index = ShortIdIndex::new();
        index.add(&id);
        index.save(&project).unwrap();

        let loaded = ShortIdIndex::load(&project);
        assert_eq!(loaded.resolve("SUP@1"), Some(id.to_string()));
        assert_eq!(loaded.get_short_id(&id), Some("SUP@1"));
    }
}
