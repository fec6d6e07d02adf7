//! The [`World`] is the top-level container for the ECS. It owns the
//! [`Stage`] -- entity registry, component registry, and the per-type store
//! table -- plus the system table and the frame counter.
//!
//! Every entity/component mutation goes through the world so that the
//! entity bitmask, the component stores, and the systems' interest lists
//! never diverge. Systems receive the stage (never the world itself) during
//! frame phases, so the system table is never aliased while it is being
//! iterated.

use crate::component::{ComponentRegistry, ComponentTypeId};
use crate::entity::{EntityId, EntityRecord, EntityRegistry};
use crate::signature::{Signature, MAX_COMPONENT_TYPES};
use crate::store::{AnyStore, ComponentStore};
use crate::system::System;
use crate::EcsError;

/// Maximum number of registered systems.
pub const MAX_SYSTEMS: usize = 32;

// ---------------------------------------------------------------------------
// Stage -- the data half of the world
// ---------------------------------------------------------------------------

/// The entities and component storage systems operate on.
///
/// The stage is handed to systems during frame phases; mutation of the
/// entity/component *structure* (create, add, destroy) stays on [`World`],
/// which wraps the stage operations with system notification.
pub struct Stage {
    /// The canonical, ID-ordered list of live entities.
    entities: EntityRegistry,
    /// Component type registry; IDs follow declared registration order.
    registry: ComponentRegistry,
    /// Per-type stores, indexed by `ComponentTypeId`; `None` until a type's
    /// first component is added.
    stores: Vec<Option<Box<dyn AnyStore>>>,
}

impl Stage {
    fn new(registry: ComponentRegistry) -> Self {
        let mut stores = Vec::with_capacity(MAX_COMPONENT_TYPES);
        stores.resize_with(MAX_COMPONENT_TYPES, || None);
        Self {
            entities: EntityRegistry::new(),
            registry,
            stores,
        }
    }

    /// The entity registry.
    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// The component type registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Look up an entity's record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn get_entity(&self, id: EntityId) -> Result<&EntityRecord, EcsError> {
        self.entities.get(id)
    }

    /// An entity's current component bitmask.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn signature_of(&self, id: EntityId) -> Result<Signature, EcsError> {
        Ok(self.entities.get(id)?.signature())
    }

    /// Whether `entity` currently has a `T` component.
    ///
    /// Unregistered types and unknown entities simply report `false`.
    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        let Some(type_id) = self.registry.lookup::<T>() else {
            return false;
        };
        match self.entities.get(entity) {
            Ok(record) => record.signature().contains(type_id),
            Err(_) => false,
        }
    }

    /// The live `T` component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered, the entity does not exist, or the
    /// entity's signature bit for `T` is clear. All three are caller bugs;
    /// check with [`has_component`](Self::has_component) when absence is a
    /// legitimate outcome.
    pub fn get_component<T: Default + 'static>(&self, entity: EntityId) -> &T {
        let type_id = self.type_id_of::<T>();
        self.check_signature_bit::<T>(entity, type_id);
        self.typed_store::<T>(type_id).get(entity)
    }

    /// The live `T` component of `entity`, mutably.
    ///
    /// # Panics
    ///
    /// Same contract as [`get_component`](Self::get_component).
    pub fn get_component_mut<T: Default + 'static>(&mut self, entity: EntityId) -> &mut T {
        let type_id = self.type_id_of::<T>();
        self.check_signature_bit::<T>(entity, type_id);
        self.typed_store_mut::<T>(type_id).get_mut(entity)
    }

    /// The dense store for `T`, for whole-store iteration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered or no `T` component was ever added.
    pub fn components<T: Default + 'static>(&self) -> &ComponentStore<T> {
        let type_id = self.type_id_of::<T>();
        self.typed_store(type_id)
    }

    /// The dense store for `T`, mutably.
    ///
    /// # Panics
    ///
    /// Same contract as [`components`](Self::components).
    pub fn components_mut<T: Default + 'static>(&mut self) -> &mut ComponentStore<T> {
        let type_id = self.type_id_of::<T>();
        self.typed_store_mut(type_id)
    }

    // -- internal helpers ---------------------------------------------------

    fn type_id_of<T: 'static>(&self) -> ComponentTypeId {
        match self.registry.lookup::<T>() {
            Some(type_id) => type_id,
            None => panic!(
                "component type {} is not registered. Registered components: [{}]",
                std::any::type_name::<T>(),
                self.registry.registered_names().join(", "),
            ),
        }
    }

    fn check_signature_bit<T>(&self, entity: EntityId, type_id: ComponentTypeId) {
        let record = match self.entities.get(entity) {
            Ok(record) => record,
            Err(_) => panic!(
                "cannot access {} component of unknown entity {}",
                std::any::type_name::<T>(),
                entity,
            ),
        };
        if !record.signature().contains(type_id) {
            panic!(
                "entity {} has no {} component",
                entity,
                std::any::type_name::<T>(),
            );
        }
    }

    fn typed_store<T: Default + 'static>(&self, type_id: ComponentTypeId) -> &ComponentStore<T> {
        let store = match &self.stores[type_id.index()] {
            Some(store) => store.as_ref(),
            None => panic!(
                "no {} component has ever been added; the store does not exist",
                std::any::type_name::<T>(),
            ),
        };
        store
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
            .expect("store table entry holds a store of a different type")
    }

    fn typed_store_mut<T: Default + 'static>(
        &mut self,
        type_id: ComponentTypeId,
    ) -> &mut ComponentStore<T> {
        let store = match &mut self.stores[type_id.index()] {
            Some(store) => store.as_mut(),
            None => panic!(
                "no {} component has ever been added; the store does not exist",
                std::any::type_name::<T>(),
            ),
        };
        store
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .expect("store table entry holds a store of a different type")
    }

    /// Add a `T` component for `entity`: lazily create the store, insert the
    /// value, set the signature bit. Returns the entity's updated bitmask.
    ///
    /// The caller (the world) broadcasts to systems *after* this returns, so
    /// systems always observe the final state.
    fn add_component_value<T: Default + 'static>(
        &mut self,
        entity: EntityId,
        value: T,
    ) -> Signature {
        let type_id = self.type_id_of::<T>();
        let record = match self.entities.get(entity) {
            Ok(record) => record,
            Err(_) => panic!(
                "cannot add {} component to unknown entity {}",
                std::any::type_name::<T>(),
                entity,
            ),
        };
        if record.signature().contains(type_id) {
            panic!(
                "entity {} already has a {} component",
                entity,
                std::any::type_name::<T>(),
            );
        }

        if self.stores[type_id.index()].is_none() {
            self.stores[type_id.index()] = Some(Box::new(ComponentStore::<T>::new(type_id)));
        }
        self.typed_store_mut::<T>(type_id).add(entity, value);
        self.entities
            .set_signature_bit(entity, type_id)
            .expect("entity existence verified above");
        self.entities
            .get(entity)
            .expect("entity existence verified above")
            .signature()
    }

    /// Remove a `T` component for `entity` and clear its signature bit.
    /// Returns the type's ID for the caller's system notification pass.
    fn remove_component_value<T: Default + 'static>(&mut self, entity: EntityId) -> ComponentTypeId {
        let type_id = self.type_id_of::<T>();
        self.check_signature_bit::<T>(entity, type_id);
        self.typed_store_mut::<T>(type_id).remove(entity);
        self.entities
            .clear_signature_bit(entity, type_id)
            .expect("entity existence verified above");
        type_id
    }

    /// Tear out every component named in `signature`, clearing each bit as
    /// its store entry goes. Part of the world's destroy sequence.
    fn strip_components(&mut self, entity: EntityId, signature: Signature) {
        for type_id in signature.iter() {
            let store = self.stores[type_id.index()]
                .as_mut()
                .expect("a set signature bit implies the store exists");
            store.remove(entity);
            self.entities
                .clear_signature_bit(entity, type_id)
                .expect("entity is live during teardown");
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("entity_count", &self.entities.len())
            .field("component_types", &self.registry.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The orchestrator owning the stage, the system table, and the frame
/// counter.
///
/// The system table is populated once, in a fixed order, at construction;
/// frame phases and mutation broadcasts always run in that registration
/// order.
pub struct World {
    stage: Stage,
    systems: Vec<Box<dyn System>>,
    frame_count: u64,
}

impl World {
    /// Create a world with no systems and an empty component registry.
    ///
    /// Component types can be registered afterwards with
    /// [`register_component`](Self::register_component).
    pub fn new() -> Self {
        Self::with_systems(ComponentRegistry::new(), Vec::new())
    }

    /// Create a world from a pre-populated component registry and the full,
    /// ordered system table.
    ///
    /// Registering component types *before* constructing the world lets
    /// systems build their signatures from the resulting
    /// [`ComponentTypeId`]s.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_SYSTEMS`] systems are supplied.
    pub fn with_systems(registry: ComponentRegistry, systems: Vec<Box<dyn System>>) -> Self {
        if systems.len() > MAX_SYSTEMS {
            panic!(
                "cannot register {} systems (maximum is {})",
                systems.len(),
                MAX_SYSTEMS,
            );
        }
        Self {
            stage: Stage::new(registry),
            systems,
            frame_count: 0,
        }
    }

    /// Register a component type under the given `name`.
    ///
    /// IDs are assigned in declared registration order, so a fixed setup
    /// sequence produces the same IDs on every run.
    pub fn register_component<T: Default + 'static>(&mut self, name: &str) -> ComponentTypeId {
        self.stage.registry.register::<T>(name)
    }

    /// The stage (entities + component storage).
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The stage, mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Number of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Number of completed `update` calls.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate a new, component-less entity.
    pub fn create_entity(&mut self) -> EntityId {
        self.stage.entities.create()
    }

    /// Look up an entity's record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn get_entity(&self, id: EntityId) -> Result<&EntityRecord, EcsError> {
        self.stage.entities.get(id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.stage.entities.len()
    }

    /// Choose whether a world-level [`clear`](Self::clear) destroys this
    /// entity. Freshly created entities default to being destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn set_destroy_on_clear(&mut self, id: EntityId, destroy: bool) -> Result<(), EcsError> {
        self.stage.entities.get_mut(id)?.set_destroy_on_clear(destroy);
        Ok(())
    }

    /// Destroy an entity: strict three-phase teardown.
    ///
    /// 1. Remove every component the entity's bitmask names, store by store.
    /// 2. Notify every system's [`entity_removed`](System::entity_removed),
    ///    in registration order.
    /// 3. Erase the entity from the registry.
    ///
    /// Components are gone *before* systems hear about the destruction, so
    /// system logic that still queries one during teardown fails loudly
    /// instead of reading stale data.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if no live entity has this ID.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<(), EcsError> {
        let signature = self.stage.entities.get(entity)?.signature();

        self.stage.strip_components(entity, signature);
        for system in &mut self.systems {
            system.entity_removed(entity);
        }
        self.stage.entities.remove(entity)?;

        tracing::debug!(entity = %entity, components = signature.count(), "entity destroyed");
        Ok(())
    }

    /// Destroy every entity flagged destroy-on-clear; entities not flagged
    /// survive with IDs and components untouched.
    ///
    /// The scan runs in reverse index order so in-place removal never
    /// invalidates an index the scan has yet to visit.
    pub fn clear(&mut self) {
        let mut destroyed = 0usize;
        for index in (0..self.stage.entities.len()).rev() {
            let record = &self.stage.entities.records()[index];
            let id = record.id();
            if record.destroy_on_clear() {
                self.destroy_entity(id)
                    .expect("record was taken from the live list");
                destroyed += 1;
            }
        }
        tracing::debug!(destroyed, remaining = self.stage.entities.len(), "world cleared");
    }

    // -- component access ---------------------------------------------------

    /// Attach a `T` component to `entity` and return a reference to the
    /// stored value.
    ///
    /// The store and the entity's bitmask are fully updated *before* every
    /// system's [`component_added`](System::component_added) fires (in
    /// registration order), so late re-checks inside systems observe final
    /// state.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered, the entity does not exist, the entity
    /// already has a `T` component, or the `T` store is at capacity.
    pub fn add_component<T: Default + 'static>(&mut self, entity: EntityId, value: T) -> &mut T {
        let signature = self.stage.add_component_value(entity, value);
        tracing::trace!(
            entity = %entity,
            component = std::any::type_name::<T>(),
            "component added"
        );
        for system in &mut self.systems {
            system.component_added(entity, signature);
        }
        self.stage.get_component_mut::<T>(entity)
    }

    /// Detach the `T` component from `entity`.
    ///
    /// The store entry and the signature bit are cleared first (the bit via
    /// the registry's narrow clear-bit primitive), then every system whose
    /// signature names `T` receives
    /// [`entity_removed`](System::entity_removed) -- the entity can no
    /// longer match them.
    ///
    /// # Panics
    ///
    /// Panics if `T` is unregistered, the entity does not exist, or the
    /// entity has no `T` component.
    pub fn remove_component<T: Default + 'static>(&mut self, entity: EntityId) {
        let type_id = self.stage.remove_component_value::<T>(entity);
        tracing::trace!(
            entity = %entity,
            component = std::any::type_name::<T>(),
            "component removed"
        );
        for system in &mut self.systems {
            if system.signature().contains(type_id) {
                system.entity_removed(entity);
            }
        }
    }

    /// The live `T` component of `entity`. See [`Stage::get_component`].
    pub fn get_component<T: Default + 'static>(&self, entity: EntityId) -> &T {
        self.stage.get_component::<T>(entity)
    }

    /// The live `T` component of `entity`, mutably. See
    /// [`Stage::get_component_mut`].
    pub fn get_component_mut<T: Default + 'static>(&mut self, entity: EntityId) -> &mut T {
        self.stage.get_component_mut::<T>(entity)
    }

    /// Whether `entity` currently has a `T` component.
    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        self.stage.has_component::<T>(entity)
    }

    // -- frame phases -------------------------------------------------------

    /// One-time system setup, in registration order. The call site invokes
    /// this exactly once before any frame phase.
    pub fn init(&mut self) {
        for system in &mut self.systems {
            system.init(&mut self.stage);
        }
    }

    /// Per-frame input phase, in registration order.
    pub fn input(&mut self, dt: f32) {
        for system in &mut self.systems {
            system.input(&mut self.stage, dt);
        }
    }

    /// Per-frame update phase, in registration order. The frame counter
    /// increments strictly after all systems have run.
    pub fn update(&mut self, dt: f32) {
        for system in &mut self.systems {
            system.update(&mut self.stage, dt);
        }
        self.frame_count += 1;
    }

    /// Per-frame draw phase, in registration order.
    pub fn draw(&mut self) {
        for system in &mut self.systems {
            system.draw(&mut self.stage);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entity_count", &self.stage.entities.len())
            .field("system_count", &self.systems.len())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
