//! Kestrel ECS -- dense-storage Entity Component System for real-time
//! simulations.
//!
//! Per-entity state lives in plain-data components; behavior lives in
//! systems. Each component type gets its own fixed-capacity dense store
//! with O(1) add and O(1) swap-with-last removal, and every entity carries
//! a bitmask of its attached types. Systems declare a required-component
//! bitmask and track the entities whose bitmask is a superset of it. The
//! [`World`](world::World) mediates every mutation so bitmasks, stores, and
//! system interest lists never diverge.
//!
//! # Quick Start
//!
//! ```
//! use kestrel_ecs::prelude::*;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>("position");
//!
//! let e = world.create_entity();
//! world.add_component(e, Position { x: 1.0, y: 2.0 });
//!
//! assert_eq!(world.get_component::<Position>(e), &Position { x: 1.0, y: 2.0 });
//! world.destroy_entity(e).unwrap();
//! assert!(world.get_entity(e).is_err());
//! ```
//!
//! Execution is single-threaded and synchronous; delta-time is accepted
//! opaquely and passed through to systems.

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod search;
pub mod signature;
pub mod store;
pub mod system;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Recoverable lookup misses produced by ECS operations.
///
/// Precondition violations (duplicate adds, access to absent components,
/// store capacity exhaustion) are caller bugs and panic instead; continuing
/// past them would corrupt the dense-packing invariants.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// No live entity has this ID.
    #[error("entity {id} does not exist")]
    EntityNotFound { id: entity::EntityId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{ComponentInfo, ComponentRegistry, ComponentTypeId};
    pub use crate::entity::{EntityId, EntityRecord, EntityRegistry};
    pub use crate::signature::{Signature, MAX_COMPONENT_TYPES};
    pub use crate::store::{ComponentStore, STORE_CAPACITY};
    pub use crate::system::System;
    pub use crate::world::{Stage, World, MAX_SYSTEMS};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    // -- test component types -----------------------------------------------

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    // -- a concrete system --------------------------------------------------

    /// Integrates position by velocity for every tracked entity.
    struct MovementSystem {
        signature: Signature,
        tracked: Vec<EntityId>,
    }

    impl MovementSystem {
        fn new(signature: Signature) -> Self {
            Self {
                signature,
                tracked: Vec::new(),
            }
        }
    }

    impl System for MovementSystem {
        fn signature(&self) -> Signature {
            self.signature
        }

        fn component_added(&mut self, entity: EntityId, signature: Signature) {
            if self.signature.fits(signature) && !self.tracked.contains(&entity) {
                self.tracked.push(entity);
            }
        }

        fn entity_removed(&mut self, entity: EntityId) {
            self.tracked.retain(|&tracked| tracked != entity);
        }

        fn update(&mut self, stage: &mut Stage, dt: f32) {
            for &entity in &self.tracked {
                let (dx, dy) = {
                    let vel = stage.get_component::<Velocity>(entity);
                    (vel.dx, vel.dy)
                };
                let pos = stage.get_component_mut::<Position>(entity);
                pos.x += dx * dt;
                pos.y += dy * dt;
            }
        }
    }

    /// World with Position + Velocity registered and a movement system.
    fn movement_world() -> World {
        let mut registry = ComponentRegistry::new();
        let pos = registry.register::<Position>("position");
        let vel = registry.register::<Velocity>("velocity");
        let signature = Signature::EMPTY.with(pos).with(vel);
        World::with_systems(registry, vec![Box::new(MovementSystem::new(signature))])
    }

    #[test]
    fn movement_system_moves_only_qualified_entities() {
        let mut world = movement_world();

        let mover = world.create_entity();
        world.add_component(mover, Position { x: 0.0, y: 0.0 });
        world.add_component(mover, Velocity { dx: 1.0, dy: -2.0 });

        let still = world.create_entity();
        world.add_component(still, Position { x: 7.0, y: 7.0 });

        world.init();
        world.input(1.0);
        world.update(1.0);
        world.draw();

        assert_eq!(
            world.get_component::<Position>(mover),
            &Position { x: 1.0, y: -2.0 }
        );
        assert_eq!(
            world.get_component::<Position>(still),
            &Position { x: 7.0, y: 7.0 }
        );
        assert_eq!(world.frame_count(), 1);
    }

    #[test]
    fn destroyed_entity_stops_moving() {
        let mut world = movement_world();

        let a = world.create_entity();
        world.add_component(a, Position::default());
        world.add_component(a, Velocity { dx: 1.0, dy: 1.0 });

        let b = world.create_entity();
        world.add_component(b, Position::default());
        world.add_component(b, Velocity { dx: 1.0, dy: 1.0 });

        world.init();
        world.update(1.0);
        world.destroy_entity(a).unwrap();
        world.update(1.0);

        // `a` is gone; `b` advanced two frames.
        assert!(world.get_entity(a).is_err());
        assert_eq!(
            world.get_component::<Position>(b),
            &Position { x: 2.0, y: 2.0 }
        );
    }

    #[test]
    fn removing_required_component_stops_tracking() {
        let mut world = movement_world();

        let e = world.create_entity();
        world.add_component(e, Position::default());
        world.add_component(e, Velocity { dx: 1.0, dy: 0.0 });

        world.init();
        world.update(1.0);
        world.remove_component::<Velocity>(e);
        // If the system still tracked `e`, this update would panic trying to
        // read the missing Velocity.
        world.update(1.0);

        assert_eq!(
            world.get_component::<Position>(e),
            &Position { x: 1.0, y: 0.0 }
        );
    }

    #[test]
    fn clear_resets_scene_but_keeps_persistent_entities() {
        let mut world = movement_world();

        let scene_entity = world.create_entity();
        world.add_component(scene_entity, Position::default());
        world.add_component(scene_entity, Velocity { dx: 1.0, dy: 0.0 });

        let persistent = world.create_entity();
        world.set_destroy_on_clear(persistent, false).unwrap();
        world.add_component(persistent, Position { x: 3.0, y: 3.0 });
        world.add_component(persistent, Velocity { dx: 0.0, dy: 1.0 });

        world.init();
        world.clear();
        world.update(1.0);

        assert!(world.get_entity(scene_entity).is_err());
        assert_eq!(
            world.get_component::<Position>(persistent),
            &Position { x: 3.0, y: 4.0 }
        );
    }
}
