//! Per-entity component bitmasks and system signatures.
//!
//! A [`Signature`] records which component types are attached to an entity
//! (one bit per registered [`ComponentTypeId`]). Systems declare the set of
//! component types they require as a signature too, and use [`Signature::fits`]
//! to test whether an entity qualifies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::component::ComponentTypeId;

/// Maximum number of distinct component types, one per signature bit.
pub const MAX_COMPONENT_TYPES: usize = 32;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A fixed-size bitmask over the registered component types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Signature(u32);

impl Signature {
    /// The signature with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Construct from a raw bit pattern.
    #[inline]
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bit pattern.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Set the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.bit();
    }

    /// Clear the bit for `id`.
    #[inline]
    pub fn clear(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.bit());
    }

    /// Builder-style variant of [`set`](Self::set).
    #[inline]
    #[must_use]
    pub fn with(mut self, id: ComponentTypeId) -> Self {
        self.set(id);
        self
    }

    /// Whether the bit for `id` is set.
    #[inline]
    pub fn contains(self, id: ComponentTypeId) -> bool {
        self.0 & (1 << id.bit()) != 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Subset test: does every set bit of `self` also appear in `keyhole`?
    ///
    /// A signature with more bits than the keyhole can never fit, so that
    /// case is rejected before the mask comparison.
    #[inline]
    pub fn fits(self, keyhole: Signature) -> bool {
        if self.count() > keyhole.count() {
            return false;
        }
        self.0 & keyhole.0 == self.0
    }

    /// Iterate over the [`ComponentTypeId`]s whose bits are set, in
    /// ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        (0..MAX_COMPONENT_TYPES as u32)
            .filter(move |bit| self.0 & (1 << bit) != 0)
            .map(ComponentTypeId)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
