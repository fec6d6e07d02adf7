//! Component type registration and metadata.
//!
//! Every component type used in the ECS must be registered in a
//! [`ComponentRegistry`]. Registration produces a [`ComponentTypeId`] that
//! doubles as the type's bit position in every entity [`Signature`](crate::signature::Signature)
//! and as its index into the world's store table. IDs are assigned in
//! declared registration order, so a fixed setup sequence yields the same
//! IDs on every run.

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::signature::MAX_COMPONENT_TYPES;

// ---------------------------------------------------------------------------
// ComponentTypeId
// ---------------------------------------------------------------------------

/// Opaque, lightweight identifier for a registered component type.
///
/// The numeric value is both a bitmask bit position (`0..32`) and the
/// component's slot in the world's store table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentTypeId(pub(crate) u32);

impl ComponentTypeId {
    /// The bit position this type occupies in a [`Signature`](crate::signature::Signature).
    #[inline]
    pub fn bit(self) -> u32 {
        self.0
    }

    /// The store-table index for this type.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentInfo
// ---------------------------------------------------------------------------

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Unique ID assigned at registration time.
    pub id: ComponentTypeId,
    /// Human-readable name (supplied by the caller).
    pub name: String,
    /// Rust `TypeId` for runtime type checking.
    pub type_id: TypeId,
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry mapping Rust types to [`ComponentTypeId`]s and their metadata.
///
/// A type can only be registered once; subsequent registrations of the same
/// Rust `TypeId` return the existing [`ComponentTypeId`]. At most
/// [`MAX_COMPONENT_TYPES`] types can be registered, since each one claims a
/// bit in the per-entity signature.
#[derive(Debug)]
pub struct ComponentRegistry {
    /// TypeId -> ComponentTypeId for dedup.
    by_type: HashMap<TypeId, ComponentTypeId>,
    /// Name -> ComponentTypeId for lookup by string name.
    by_name: HashMap<String, ComponentTypeId>,
    /// Indexed by ComponentTypeId.0.
    infos: Vec<ComponentInfo>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            infos: Vec::new(),
        }
    }

    /// Register a component type under the given `name`.
    ///
    /// If the type has already been registered, the existing
    /// [`ComponentTypeId`] is returned and `name` is ignored.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_COMPONENT_TYPES`] distinct types are
    /// registered, or if `name` is already taken by a different type.
    pub fn register<T: 'static>(&mut self, name: &str) -> ComponentTypeId {
        let rust_type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&rust_type_id) {
            return existing;
        }

        if self.infos.len() >= MAX_COMPONENT_TYPES {
            panic!(
                "cannot register component type '{}': all {} signature bits are taken",
                name, MAX_COMPONENT_TYPES
            );
        }
        if self.by_name.contains_key(name) {
            panic!(
                "component name '{}' is already registered for a different type",
                name
            );
        }

        let id = ComponentTypeId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            name: name.to_owned(),
            type_id: rust_type_id,
        });
        self.by_type.insert(rust_type_id, id);
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Look up a component type by its Rust `TypeId`.
    pub fn lookup<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Look up a component type by its registered string name.
    pub fn lookup_by_name(&self, name: &str) -> Option<ComponentTypeId> {
        self.by_name.get(name).copied()
    }

    /// Get the [`ComponentInfo`] for a registered component type ID.
    pub fn get_info(&self, id: ComponentTypeId) -> Option<&ComponentInfo> {
        self.infos.get(id.index())
    }

    /// Total number of registered component types.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether any component types have been registered.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Returns the names of all registered component types, sorted.
    pub fn registered_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl Default for ComponentRegistry {
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

    #[derive(Debug, Default, Clone)]
    struct Pos {
        _x: f32,
        _y: f32,
    }

    #[derive(Debug, Default, Clone)]
    struct Vel {
        _dx: f32,
        _dy: f32,
    }

    #[test]
    fn register_and_lookup() {
        let mut reg = ComponentRegistry::new();
        let id = reg.register::<Pos>("position");
        assert_eq!(reg.lookup::<Pos>(), Some(id));
        assert_eq!(reg.lookup_by_name("position"), Some(id));
    }

    #[test]
    fn same_type_same_id() {
        let mut reg = ComponentRegistry::new();
        let id1 = reg.register::<Pos>("position");
        let id2 = reg.register::<Pos>("position_again");
        assert_eq!(id1, id2);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn ids_follow_registration_order() {
        let mut reg = ComponentRegistry::new();
        let p = reg.register::<Pos>("position");
        let v = reg.register::<Vel>("velocity");
        assert_eq!(p.bit(), 0);
        assert_eq!(v.bit(), 1);
    }

    #[test]
    fn info_correctness() {
        let mut reg = ComponentRegistry::new();
        let id = reg.register::<Pos>("position");
        let info = reg.get_info(id).unwrap();
        assert_eq!(info.name, "position");
        assert_eq!(info.type_id, TypeId::of::<Pos>());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_name_rejected() {
        let mut reg = ComponentRegistry::new();
        reg.register::<Pos>("position");
        reg.register::<Vel>("position");
    }

    #[test]
    #[should_panic(expected = "signature bits are taken")]
    fn overflow_rejected() {
        struct Marker<const N: usize>;
        let mut reg = ComponentRegistry::new();
        reg.register::<Marker<0>>("t0");
        reg.register::<Marker<1>>("t1");
        reg.register::<Marker<2>>("t2");
        reg.register::<Marker<3>>("t3");
        reg.register::<Marker<4>>("t4");
        reg.register::<Marker<5>>("t5");
        reg.register::<Marker<6>>("t6");
        reg.register::<Marker<7>>("t7");
        reg.register::<Marker<8>>("t8");
        reg.register::<Marker<9>>("t9");
        reg.register::<Marker<10>>("t10");
        reg.register::<Marker<11>>("t11");
        reg.register::<Marker<12>>("t12");
        reg.register::<Marker<13>>("t13");
        reg.register::<Marker<14>>("t14");
        reg.register::<Marker<15>>("t15");
        reg.register::<Marker<16>>("t16");
        reg.register::<Marker<17>>("t17");
        reg.register::<Marker<18>>("t18");
        reg.register::<Marker<19>>("t19");
        reg.register::<Marker<20>>("t20");
        reg.register::<Marker<21>>("t21");
        reg.register::<Marker<22>>("t22");
        reg.register::<Marker<23>>("t23");
        reg.register::<Marker<24>>("t24");
        reg.register::<Marker<25>>("t25");
        reg.register::<Marker<26>>("t26");
        reg.register::<Marker<27>>("t27");
        reg.register::<Marker<28>>("t28");
        reg.register::<Marker<29>>("t29");
        reg.register::<Marker<30>>("t30");
        reg.register::<Marker<31>>("t31");
        // The 33rd distinct type has no signature bit left to claim.
        reg.register::<Marker<32>>("t32");
    }
}
