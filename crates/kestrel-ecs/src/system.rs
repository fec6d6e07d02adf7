//! The behavior contract concrete systems implement.
//!
//! A system declares a required-component [`Signature`] and keeps its own
//! set of tracked entities. The [`World`](crate::world::World) pushes two
//! kinds of notifications at it:
//!
//! - [`System::component_added`] fires for **every** component addition to
//!   **any** entity, not just relevant ones. The implementation must run the
//!   subset test itself ([`Signature::fits`]) against the entity's full
//!   bitmask before starting to track it.
//! - [`System::entity_removed`] is the single "stop tracking" signal. It has
//!   one meaning -- unconditionally drop the entity from the tracked set --
//!   and the world guarantees it fires whenever an entity can no longer be
//!   assumed to match: on full destruction, and when a component named in
//!   the system's signature is removed.
//!
//! Frame phases run in system-registration order. `init` is called exactly
//! once before any frame phase; `input`, `update`, and `draw` run once per
//! logical frame while the world lives. Each system must confine its
//! effects to its own tracked entities. Delta-time is passed through
//! opaquely from the caller.

use crate::entity::EntityId;
use crate::signature::Signature;
use crate::world::Stage;

/// A behavior that runs over the entities matching its signature.
pub trait System {
    /// The component types an entity must carry for this system to track it.
    fn signature(&self) -> Signature;

    /// An entity gained a component somewhere in the world. `signature` is
    /// the entity's full bitmask *after* the addition; the store and bitmask
    /// are already consistent when this fires.
    fn component_added(&mut self, entity: EntityId, signature: Signature);

    /// Unconditionally stop tracking `entity`, whatever the cause.
    fn entity_removed(&mut self, entity: EntityId);

    /// One-time setup, called before any frame phase.
    fn init(&mut self, _stage: &mut Stage) {}

    /// Per-frame input handling.
    fn input(&mut self, _stage: &mut Stage, _dt: f32) {}

    /// Per-frame simulation step.
    fn update(&mut self, _stage: &mut Stage, _dt: f32) {}

    /// Per-frame presentation pass.
    fn draw(&mut self, _stage: &mut Stage) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal tracked-set bookkeeping, the way a concrete system would do it.
    struct Tracker {
        signature: Signature,
        tracked: Vec<EntityId>,
    }

    impl System for Tracker {
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
    }

    #[test]
    fn tracks_only_after_signature_satisfied() {
        use crate::component::ComponentTypeId;

        let a = ComponentTypeId(0);
        let b = ComponentTypeId(1);
        let mut sys = Tracker {
            signature: Signature::EMPTY.with(a).with(b),
            tracked: Vec::new(),
        };
        let e = EntityId::from_raw(1);

        // First addition: only `a` present, no tracking yet.
        sys.component_added(e, Signature::EMPTY.with(a));
        assert!(sys.tracked.is_empty());

        // Second addition completes the signature.
        sys.component_added(e, Signature::EMPTY.with(a).with(b));
        assert_eq!(sys.tracked, vec![e]);

        // Removal drops unconditionally.
        sys.entity_removed(e);
        assert!(sys.tracked.is_empty());

        // Removing an untracked entity is a no-op.
        sys.entity_removed(e);
        assert!(sys.tracked.is_empty());
    }
}
