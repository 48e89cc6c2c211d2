//! Entity Component System: components and state enums for vehicles and trips.
//!
//! This module defines the core data structures used in the simulation:
//!
//! - **Components**: `Vehicle`, `Position`, `Trip`, `TripTiming`
//! - **State Enums**: `VehiclePhase`, `TripPhase`
//!
//! Vehicles and trips are tagged records (phase + payload), not a class
//! hierarchy: polymorphism over phase is a variant with exhaustive matching,
//! not dynamic dispatch. Cross references between a vehicle and its bound
//! trip are plain `Entity` ids resolved through the owning `World`, which
//! keeps the two free of ownership cycles.

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::city::{Direction, Location};

/// Driver phase: idle / en-route to pickup / with rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehiclePhase {
    /// Idle and available for dispatch.
    P1,
    /// Dispatched, en route to the trip's origin.
    P2,
    /// Carrying the rider, en route to the trip's destination.
    P3,
}

impl VehiclePhase {
    pub fn label(self) -> &'static str {
        match self {
            VehiclePhase::P1 => "P1",
            VehiclePhase::P2 => "P2",
            VehiclePhase::P3 => "P3",
        }
    }
}

/// A vehicle agent: position, heading, phase, and the trip it is currently
/// bound to (if any). Invariant: `phase == P1` iff `bound_trip.is_none()`;
/// `phase in {P2, P3}` iff `bound_trip.is_some()` and that trip's phase
/// agrees (`P2` <-> `WAITING`, `P3` <-> `RIDING`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Vehicle {
    pub phase: VehiclePhase,
    pub direction: Direction,
    pub bound_trip: Option<Entity>,
}

impl Vehicle {
    pub fn new_idle(direction: Direction) -> Self {
        Self {
            phase: VehiclePhase::P1,
            direction,
            bound_trip: None,
        }
    }
}

/// Current grid location of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub Location);

/// Trip lifecycle phase. May only move forward:
/// `UNASSIGNED -> WAITING -> RIDING -> COMPLETED`. `CANCELLED` is reserved --
/// no path in the baseline dispatch policy reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripPhase {
    Unassigned,
    Waiting,
    Riding,
    Completed,
    Cancelled,
}

impl TripPhase {
    pub fn label(self) -> &'static str {
        match self {
            TripPhase::Unassigned => "UNASSIGNED",
            TripPhase::Waiting => "WAITING",
            TripPhase::Riding => "RIDING",
            TripPhase::Completed => "COMPLETED",
            TripPhase::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TripPhase::Completed | TripPhase::Cancelled)
    }
}

/// A trip request record: origin, destination, phase, and the vehicle bound
/// to it (if any). `distance` is the torus L1 distance between origin and
/// destination, computed once at creation time; invariant: `0 < distance`,
/// `distance >= min_trip_distance`, and `distance <= max_trip_distance` when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Trip {
    pub phase: TripPhase,
    pub origin: Location,
    pub destination: Location,
    pub distance: u32,
    pub vehicle: Option<Entity>,
}

/// Block-unit timestamps recorded at each phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component)]
pub struct TripTiming {
    pub requested_at: u64,
    pub assigned_at: Option<u64>,
    pub pickup_at: Option<u64>,
    pub dropoff_at: Option<u64>,
}

impl TripTiming {
    /// Wait time: block of pickup minus block of request.
    pub fn wait_time(&self) -> Option<u64> {
        self.pickup_at.map(|pickup| pickup - self.requested_at)
    }

    /// Unassigned time: block of assignment minus block of request.
    pub fn unassigned_time(&self) -> Option<u64> {
        self.assigned_at.map(|assigned| assigned - self.requested_at)
    }

    /// Awaiting (en-route) time: block of pickup minus block of assignment.
    pub fn awaiting_time(&self) -> Option<u64> {
        match (self.assigned_at, self.pickup_at) {
            (Some(assigned), Some(pickup)) => Some(pickup - assigned),
            _ => None,
        }
    }

    /// Riding time: block of dropoff minus block of pickup (equals trip distance).
    pub fn riding_time(&self) -> Option<u64> {
        match (self.pickup_at, self.dropoff_at) {
            (Some(pickup), Some(dropoff)) => Some(dropoff - pickup),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_timings_follow_checkpoints() {
        let timing = TripTiming {
            requested_at: 10,
            assigned_at: Some(12),
            pickup_at: Some(15),
            dropoff_at: Some(20),
        };
        assert_eq!(timing.wait_time(), Some(5));
        assert_eq!(timing.unassigned_time(), Some(2));
        assert_eq!(timing.awaiting_time(), Some(3));
        assert_eq!(timing.riding_time(), Some(5));
    }
}
