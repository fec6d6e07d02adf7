//! Per-type dense component storage.
//!
//! A [`ComponentStore<T>`] owns every live `T` value in the world, packed
//! into a fixed-capacity array so iteration touches contiguous memory.
//! Slot 0 is a reserved sentinel (`count == 1` means empty); live values
//! occupy slots `1..count`. An entity-to-slot map plus a per-slot owner
//! back-reference make both directions of the lookup O(1), and removal is
//! O(1) by swapping the last live slot into the vacated one.
//!
//! Iteration order is *not* stable across removals -- the swap reorders
//! live entries.

use std::any::Any;
use std::collections::HashMap;

use crate::component::ComponentTypeId;
use crate::entity::EntityId;

/// Maximum number of live components of one type.
pub const STORE_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// One dense slot: the component value plus the ID of the owning entity.
///
/// The owner back-reference is what lets removal repair the entity-to-slot
/// map after the swap, without searching. Sentinel and vacated slots carry
/// `None`.
#[derive(Debug, Default)]
struct Slot<T> {
    value: T,
    owner: Option<EntityId>,
}

/// Fixed-capacity dense storage for all components of type `T`.
///
/// Component types must be `Default` so vacated slots can be reset to an
/// inert value.
#[derive(Debug)]
pub struct ComponentStore<T> {
    /// This store's registered type ID (its bit position and table index).
    type_id: ComponentTypeId,
    /// `STORE_CAPACITY + 1` slots; slot 0 is the unused sentinel.
    slots: Vec<Slot<T>>,
    /// Entity -> live slot index (`1..count`).
    slot_of: HashMap<EntityId, usize>,
    /// One past the last live slot. `1` means empty.
    count: usize,
}

impl<T: Default + 'static> ComponentStore<T> {
    /// Create an empty store for the given registered type.
    pub fn new(type_id: ComponentTypeId) -> Self {
        let mut slots = Vec::with_capacity(STORE_CAPACITY + 1);
        slots.resize_with(STORE_CAPACITY + 1, Slot::default);
        Self {
            type_id,
            slots,
            slot_of: HashMap::new(),
            count: 1,
        }
    }

    /// The registered type ID this store was created for.
    #[inline]
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Number of live components.
    #[inline]
    pub fn len(&self) -> usize {
        self.count - 1
    }

    /// Whether the store holds no live components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 1
    }

    /// Whether `entity` has a live component in this store.
    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot_of.contains_key(&entity)
    }

    /// The live slot index currently holding `entity`'s component.
    pub fn slot_of(&self, entity: EntityId) -> Option<usize> {
        self.slot_of.get(&entity).copied()
    }

    /// The live component for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component here. Callers must check the
    /// entity's signature bit first; arriving without it is a caller bug.
    pub fn get(&self, entity: EntityId) -> &T {
        let slot = self.expect_slot(entity);
        &self.slots[slot].value
    }

    /// The live component for `entity`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component here.
    pub fn get_mut(&mut self, entity: EntityId) -> &mut T {
        let slot = self.expect_slot(entity);
        &mut self.slots[slot].value
    }

    fn expect_slot(&self, entity: EntityId) -> usize {
        match self.slot_of.get(&entity) {
            Some(&slot) => slot,
            None => panic!(
                "entity {} has no {} component; check the signature bit before accessing the store",
                entity,
                std::any::type_name::<T>(),
            ),
        }
    }

    /// Store a component for `entity` in the next free slot.
    ///
    /// Returns a mutable reference to the stored value.
    ///
    /// # Panics
    ///
    /// Panics if the store is at capacity, or if `entity` already has a
    /// component here (duplicate adds must be rejected by the caller's
    /// signature check before the stored value would be clobbered).
    pub fn add(&mut self, entity: EntityId, value: T) -> &mut T {
        if self.count > STORE_CAPACITY {
            panic!(
                "{} store is full ({} live components)",
                std::any::type_name::<T>(),
                STORE_CAPACITY,
            );
        }
        if self.slot_of.contains_key(&entity) {
            panic!(
                "entity {} already has a {} component",
                entity,
                std::any::type_name::<T>(),
            );
        }

        let slot = self.count;
        self.slot_of.insert(entity, slot);
        self.slots[slot] = Slot {
            value,
            owner: Some(entity),
        };
        self.count += 1;
        &mut self.slots[slot].value
    }

    /// Remove `entity`'s component by swapping the last live slot into its
    /// place.
    ///
    /// Sequence: clear the doomed slot's owner, move the last live slot's
    /// value (and owner) into it, reset the vacated last slot to a default,
    /// shrink the live range, then re-point the moved entity's map entry and
    /// erase the doomed entity's. When the doomed slot *is* the last live
    /// slot the move degenerates into a plain reset and no map entry needs
    /// re-pointing.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no component here.
    pub fn remove(&mut self, entity: EntityId) {
        let slot = self.expect_slot(entity);
        self.slots[slot].owner = None;

        let last = self.count - 1;
        if slot != last {
            self.slots.swap(slot, last);
        }
        self.slots[last] = Slot::default();
        self.count -= 1;

        if self.count > slot {
            let moved = self.slots[slot]
                .owner
                .expect("live slot moved during removal must have an owner");
            self.slot_of.insert(moved, slot);
        }
        self.slot_of.remove(&entity);
    }

    /// Iterate over the live components as `(owner, &value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots[1..self.count].iter().map(|slot| {
            let owner = slot.owner.expect("live slot must have an owner");
            (owner, &slot.value)
        })
    }

    /// Iterate over the live components as `(owner, &mut value)` pairs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.slots[1..self.count].iter_mut().map(|slot| {
            let owner = slot.owner.expect("live slot must have an owner");
            (owner, &mut slot.value)
        })
    }
}

// ---------------------------------------------------------------------------
// AnyStore -- type-erased handle for the world's store table
// ---------------------------------------------------------------------------

/// Type-erased view of a [`ComponentStore<T>`].
///
/// The world's store table holds one of these per registered type; typed
/// access goes through a checked [`Any`] downcast keyed by the concrete
/// store type.
pub(crate) trait AnyStore {
    /// Remove `entity`'s component. Same contract as
    /// [`ComponentStore::remove`].
    fn remove(&mut self, entity: EntityId);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Default + 'static> AnyStore for ComponentStore<T> {
    fn remove(&mut self, entity: EntityId) {
        ComponentStore::remove(self, entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
