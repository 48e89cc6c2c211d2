//! Dispatch: pluggable vehicle-trip matching policies.
//!
//! This module provides a trait-based system for implementing different
//! dispatch policies. The baseline policy is nearest-available (see
//! [`nearest::NearestAvailable`]); the trait exists so alternative policies
//! (e.g. forward-dispatch-aware, or batch-optimizing) can be swapped in
//! without touching the tick driver.
//!
//! Two first-class, incrementally-maintained data structures back every
//! policy:
//!
//! - [`IdleSet`]: the set of currently idle (P1) vehicles, updated on every
//!   phase transition rather than recomputed per tick.
//! - [`UnassignedQueue`]: trips still in `UNASSIGNED` phase, in request order.
//!
//! Recomputing either from scratch every tick was the dominant cost in the
//! source this engine is modeled on; both are maintained in O(1) per update.

pub mod idle_set;
pub mod nearest;
pub mod policy;
pub mod types;

pub use idle_set::IdleSet;
pub use policy::DispatchPolicy;
pub use types::DispatchOutcome;

use bevy_ecs::prelude::{Entity, Resource};
use std::collections::VecDeque;

/// Trips currently in `UNASSIGNED` phase, oldest request first. Trips that
/// find no vehicle on a given tick remain here and are retried next tick;
/// new requests are pushed to the back, so iteration order is always
/// request order (stable by trip id within a tick, since ties cannot occur
/// -- each trip is pushed exactly once).
#[derive(Debug, Clone, Default, Resource)]
pub struct UnassignedQueue {
    trips: VecDeque<Entity>,
}

impl UnassignedQueue {
    pub fn push(&mut self, trip: Entity) {
        self.trips.push_back(trip);
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.trips.iter()
    }

    /// Remove every trip in `assigned` (typically the dispatcher's outcome
    /// this tick), preserving relative order of the remainder.
    pub fn retain_unassigned(&mut self, assigned: &std::collections::HashSet<Entity>) {
        self.trips.retain(|t| !assigned.contains(t));
    }
}

#[derive(Resource)]
pub struct DispatchPolicyResource(pub Box<dyn DispatchPolicy>);

impl std::ops::Deref for DispatchPolicyResource {
    type Target = dyn DispatchPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
