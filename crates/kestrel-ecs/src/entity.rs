//! Entity identifiers and the canonical entity registry.
//!
//! An [`EntityId`] is a plain 64-bit integer allocated from a registry-local
//! monotonic counter. IDs strictly increase and are never reused within a
//! run, so the ID alone is a safe lookup key for stores and systems -- no
//! shared ownership and no generation bookkeeping is needed.
//!
//! The [`EntityRegistry`] holds the single authoritative record per entity.
//! Records are kept ordered by ID (appending a freshly allocated ID
//! preserves order), which lets lookups use the hybrid search in
//! [`crate::search`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::component::ComponentTypeId;
use crate::search::hybrid_search;
use crate::signature::Signature;
use crate::EcsError;

/// Initial record capacity reserved by a new registry.
pub const ENTITY_CAPACITY: usize = 512;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A process-unique entity identifier.
///
/// Monotonically increasing, never reused within a run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// The authoritative per-entity record: ID, attached-component bitmask, and
/// the flag deciding whether [`World::clear`](crate::world::World::clear)
/// destroys the entity.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    id: EntityId,
    signature: Signature,
    destroy_on_clear: bool,
}

impl EntityRecord {
    /// The entity's ID.
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The bitmask of component types currently attached.
    #[inline]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Whether a world-level `clear` destroys this entity.
    #[inline]
    pub fn destroy_on_clear(&self) -> bool {
        self.destroy_on_clear
    }

    /// Mark the entity as surviving (or not) a world-level `clear`.
    #[inline]
    pub fn set_destroy_on_clear(&mut self, destroy: bool) {
        self.destroy_on_clear = destroy;
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.signature)
    }
}

// ---------------------------------------------------------------------------
// EntityRegistry
// ---------------------------------------------------------------------------

/// Owns the ID-ordered list of live entities and allocates new IDs.
#[derive(Debug)]
pub struct EntityRegistry {
    /// Live records, ascending by ID.
    records: Vec<EntityRecord>,
    /// Next ID to hand out. Only ever incremented.
    next_id: u64,
}

impl EntityRegistry {
    /// Create an empty registry with the default capacity reservation.
    pub fn new() -> Self {
        Self::with_capacity(ENTITY_CAPACITY)
    }

    /// Create an empty registry reserving space for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            next_id: 0,
        }
    }

    /// Allocate a new entity with the next ID and append its record.
    ///
    /// New entities start with an empty signature and are flagged for
    /// destruction on `clear`. Appending keeps the list ID-ordered because
    /// IDs strictly increase.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.records.push(EntityRecord {
            id,
            signature: Signature::EMPTY,
            destroy_on_clear: true,
        });
        tracing::trace!(entity = %id, "entity created");
        id
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry holds no entities.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The live records, ascending by ID.
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Iterate over the live records, ascending by ID.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }

    /// Position of `id` in the record list, if present.
    fn index_of(&self, id: EntityId) -> Option<usize> {
        hybrid_search(&self.records, &id, |record| record.id)
    }

    /// Look up an entity's record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn get(&self, id: EntityId) -> Result<&EntityRecord, EcsError> {
        self.index_of(id)
            .map(|index| &self.records[index])
            .ok_or(EcsError::EntityNotFound { id })
    }

    /// Look up an entity's record mutably by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut EntityRecord, EcsError> {
        match self.index_of(id) {
            Some(index) => Ok(&mut self.records[index]),
            None => Err(EcsError::EntityNotFound { id }),
        }
    }

    /// Whether a live entity has this ID.
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Erase an entity's record.
    ///
    /// This touches nothing but the registry: component stores and systems
    /// must already have been torn down by the caller (the world's
    /// `destroy_entity` sequence).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn remove(&mut self, id: EntityId) -> Result<EntityRecord, EcsError> {
        match self.index_of(id) {
            Some(index) => Ok(self.records.remove(index)),
            None => Err(EcsError::EntityNotFound { id }),
        }
    }

    /// Set one signature bit for an entity.
    ///
    /// Only the world's coordinated add sequence may call this; the bit must
    /// agree with the corresponding component store.
    pub(crate) fn set_signature_bit(
        &mut self,
        id: EntityId,
        type_id: ComponentTypeId,
    ) -> Result<(), EcsError> {
        self.get_mut(id)?.signature.set(type_id);
        Ok(())
    }

    /// Clear one signature bit for an entity, without touching the
    /// corresponding store or any system.
    ///
    /// Only the world's coordinated removal sequences may call this, after
    /// the store entry is already gone.
    pub(crate) fn clear_signature_bit(
        &mut self,
        id: EntityId,
        type_id: ComponentTypeId,
    ) -> Result<(), EcsError> {
        self.get_mut(id)?.signature.clear(type_id);
        Ok(())
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_strictly_increase() {
        let mut registry = EntityRegistry::new();
        let ids: Vec<EntityId> = (0..100).map(|_| registry.create()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(registry.len(), 100);
    }

    #[test]
    fn lookup_found_and_missing() {
        let mut registry = EntityRegistry::new();
        let e0 = registry.create();
        let e1 = registry.create();
        assert_eq!(registry.get(e0).unwrap().id(), e0);
        assert_eq!(registry.get(e1).unwrap().id(), e1);

        let bogus = EntityId::from_raw(999);
        assert!(matches!(
            registry.get(bogus),
            Err(EcsError::EntityNotFound { id }) if id == bogus
        ));
    }

    #[test]
    fn remove_keeps_order_and_id_not_reused() {
        let mut registry = EntityRegistry::new();
        let ids: Vec<EntityId> = (0..10).map(|_| registry.create()).collect();
        registry.remove(ids[4]).unwrap();

        assert_eq!(registry.len(), 9);
        assert!(!registry.contains(ids[4]));
        for pair in registry.records().windows(2) {
            assert!(pair[0].id() < pair[1].id());
        }

        // Freshly allocated IDs keep climbing past the removed one.
        let fresh = registry.create();
        assert!(fresh > ids[9]);
    }

    #[test]
    fn remove_missing_is_recoverable() {
        let mut registry = EntityRegistry::new();
        let e = registry.create();
        registry.remove(e).unwrap();
        assert!(registry.remove(e).is_err());
    }

    #[test]
    fn signature_bit_primitives() {
        let mut registry = EntityRegistry::new();
        let e = registry.create();
        let type_id = ComponentTypeId(3);

        registry.set_signature_bit(e, type_id).unwrap();
        assert!(registry.get(e).unwrap().signature().contains(type_id));

        registry.clear_signature_bit(e, type_id).unwrap();
        assert!(!registry.get(e).unwrap().signature().contains(type_id));
    }

    #[test]
    fn new_entities_default_to_destroy_on_clear() {
        let mut registry = EntityRegistry::new();
        let e = registry.create();
        assert!(registry.get(e).unwrap().destroy_on_clear());
        registry.get_mut(e).unwrap().set_destroy_on_clear(false);
        assert!(!registry.get(e).unwrap().destroy_on_clear());
    }

    #[test]
    fn lookup_across_many_entities() {
        let mut registry = EntityRegistry::new();
        let ids: Vec<EntityId> = (0..600).map(|_| registry.create()).collect();
        // Punch holes so the ID sequence is sparse.
        for id in ids.iter().step_by(3) {
            registry.remove(*id).unwrap();
        }
        for (i, id) in ids.iter().enumerate() {
            if i % 3 == 0 {
                assert!(registry.get(*id).is_err());
            } else {
                assert_eq!(registry.get(*id).unwrap().id(), *id);
            }
        }
    }
}
