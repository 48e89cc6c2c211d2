use bevy_ecs::prelude::Entity;

use crate::city::{City, Direction, Location};

use super::types::DispatchOutcome;

/// A candidate idle vehicle: its id, current location, and current heading
/// (needed to compute `travel_distance` without forcing a mid-block U-turn).
#[derive(Debug, Clone, Copy)]
pub struct IdleVehicle {
    pub vehicle: Entity,
    pub location: Location,
    pub direction: Direction,
}

/// A trip still waiting for a vehicle.
#[derive(Debug, Clone, Copy)]
pub struct PendingTrip {
    pub trip: Entity,
    pub origin: Location,
}

/// Trait for dispatch policies that pair idle vehicles with unassigned trips.
///
/// Contract: at most one assignment per trip, at most one binding per
/// vehicle, per call. Implementations must be at most
/// `O(|unassigned| * |idle|)` -- the idle set and unassigned queue are
/// already maintained incrementally by the caller, so a policy should never
/// need to rebuild either from scratch.
pub trait DispatchPolicy: Send + Sync {
    /// Match as many `pending` trips to `idle` vehicles as possible, in
    /// `pending`'s order. Returns one [`DispatchOutcome`] per match; a trip
    /// with no acceptable vehicle is simply omitted (no error path -- it
    /// remains unassigned and is retried next tick).
    fn assign(
        &self,
        city: &City,
        pending: &[PendingTrip],
        idle: &[IdleVehicle],
    ) -> Vec<DispatchOutcome>;
}
