//! Phase transitions triggered by arrival at origin or destination.
//!
//! Runs after movement, so a vehicle that reaches its target this block
//! transitions in the same tick (§4.2: "transitions are atomic within a
//! block and take effect before history is recorded").

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::SimulationClock;
use crate::dispatch::IdleSet;
use crate::ecs::{Position, Trip, TripPhase, Vehicle, VehiclePhase};

use super::history_record::BlockAccumulator;

/// A trip that reached `COMPLETED` this block is despawned once its stats
/// are folded into the accumulator: nothing downstream (history, snapshots,
/// the dispatcher) ever needs a terminal trip again, and keeping it around
/// would grow the `Trip` table without bound over a long run and corrupt
/// `TRIP_COUNT`'s "number of active trips" meaning.
pub fn apply_phase_transitions_system(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    mut idle_set: ResMut<IdleSet>,
    mut accumulator: ResMut<BlockAccumulator>,
    mut vehicles: Query<(bevy_ecs::prelude::Entity, &mut Vehicle, &Position)>,
    mut trips: Query<(&mut Trip, &mut crate::ecs::TripTiming)>,
) {
    let block = clock.block();

    for (vehicle_entity, mut vehicle, position) in vehicles.iter_mut() {
        let Some(trip_entity) = vehicle.bound_trip else {
            continue;
        };
        let Ok((mut trip, mut timing)) = trips.get_mut(trip_entity) else {
            continue;
        };

        match vehicle.phase {
            VehiclePhase::P2 if position.0 == trip.origin => {
                vehicle.phase = VehiclePhase::P3;
                trip.phase = TripPhase::Riding;
                timing.pickup_at = Some(block);
            }
            VehiclePhase::P3 if position.0 == trip.destination => {
                vehicle.phase = VehiclePhase::P1;
                vehicle.bound_trip = None;
                trip.phase = TripPhase::Completed;
                timing.dropoff_at = Some(block);

                idle_set.insert(vehicle_entity);
                accumulator.trip_completed_count += 1;
                if let Some(awaiting) = timing.awaiting_time() {
                    accumulator.trip_awaiting_total += awaiting as f64;
                }
                if let Some(unassigned) = timing.unassigned_time() {
                    accumulator.trip_unassigned_total += unassigned as f64;
                }
                if let Some(riding) = timing.riding_time() {
                    accumulator.trip_riding_total += riding as f64;
                }
                accumulator.trip_distance_total += trip.distance as f64;

                commands.entity(trip_entity).despawn();
            }
            _ => {}
        }
    }
}
