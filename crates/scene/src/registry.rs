use std::collections::HashMap;

use crate::entity::EntityId;

/// Feature id -> scene entity lookup for click/focus targeting.
///
/// Owned by the view that created the entities and cleared when that view
/// unmounts; nothing else holds entity ids across a snapshot refresh.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    entries: HashMap<String, EntityId>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity` under `id`, returning the entity it replaced.
    pub fn register(&mut self, id: impl Into<String>, entity: EntityId) -> Option<EntityId> {
        self.entries.insert(id.into(), entity)
    }

    pub fn unregister(&mut self, id: &str) -> Option<EntityId> {
        self.entries.remove(id)
    }

    pub fn lookup(&self, id: &str) -> Option<EntityId> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
