//! Dispatch system: runs the configured policy and applies its outcomes.

use std::collections::HashSet;

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::city::City;
use crate::clock::SimulationClock;
use crate::dispatch::{
    policy::{IdleVehicle, PendingTrip},
    DispatchPolicyResource, IdleSet, UnassignedQueue,
};
use crate::ecs::{Position, Trip, TripPhase, TripTiming, Vehicle, VehiclePhase};

use super::history_record::BlockAccumulator;

pub fn run_dispatch_system(
    city: Res<City>,
    clock: Res<SimulationClock>,
    policy: Res<DispatchPolicyResource>,
    mut idle_set: ResMut<IdleSet>,
    mut unassigned: ResMut<UnassignedQueue>,
    mut accumulator: ResMut<BlockAccumulator>,
    trips: Query<&Trip>,
    vehicles: Query<(&Vehicle, &Position)>,
    mut trip_writer: Query<(&mut Trip, &mut TripTiming)>,
    mut vehicle_writer: Query<&mut Vehicle>,
) {
    let pending: Vec<PendingTrip> = unassigned
        .iter()
        .filter_map(|&trip_entity| {
            trips.get(trip_entity).ok().map(|trip| PendingTrip {
                trip: trip_entity,
                origin: trip.origin,
            })
        })
        .collect();

    let idle: Vec<IdleVehicle> = idle_set
        .iter()
        .filter_map(|&vehicle_entity| {
            vehicles.get(vehicle_entity).ok().map(|(vehicle, position)| IdleVehicle {
                vehicle: vehicle_entity,
                location: position.0,
                direction: vehicle.direction,
            })
        })
        .collect();

    if pending.is_empty() || idle.is_empty() {
        return;
    }

    let outcomes = policy.assign(&city, &pending, &idle);
    if outcomes.is_empty() {
        return;
    }

    let mut assigned_trips = HashSet::with_capacity(outcomes.len());
    let block = clock.block();

    for outcome in &outcomes {
        if let Ok((mut trip, mut timing)) = trip_writer.get_mut(outcome.trip) {
            trip.phase = TripPhase::Waiting;
            trip.vehicle = Some(outcome.vehicle);
            timing.assigned_at = Some(block);
        }
        if let Ok(mut vehicle) = vehicle_writer.get_mut(outcome.vehicle) {
            vehicle.phase = VehiclePhase::P2;
            vehicle.bound_trip = Some(outcome.trip);
        }
        idle_set.remove(outcome.vehicle);
        assigned_trips.insert(outcome.trip);
        if outcome.forward_dispatch {
            accumulator.trip_forward_dispatch_count += 1;
        }
    }

    unassigned.retain_unassigned(&assigned_trips);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{Direction, Location};
    use crate::dispatch::nearest::NearestAvailable;
    use bevy_ecs::prelude::World;
    use bevy_ecs::schedule::Schedule;

    #[test]
    fn dispatch_binds_nearest_idle_vehicle_to_waiting_trip() {
        let mut world = World::new();
        world.insert_resource(City {
            size: 10,
            ..City::default()
        });
        world.insert_resource(SimulationClock::new());
        world.insert_resource(DispatchPolicyResource(Box::new(NearestAvailable)));
        world.insert_resource(BlockAccumulator::default());

        let vehicle = world
            .spawn((Vehicle::new_idle(Direction::North), Position(Location::new(0, 0))))
            .id();
        let trip = world
            .spawn((
                Trip {
                    phase: TripPhase::Unassigned,
                    origin: Location::new(1, 0),
                    destination: Location::new(5, 5),
                    distance: 9,
                    vehicle: None,
                },
                TripTiming::default(),
            ))
            .id();

        let mut idle_set = IdleSet::default();
        idle_set.insert(vehicle);
        world.insert_resource(idle_set);

        let mut unassigned = UnassignedQueue::default();
        unassigned.push(trip);
        world.insert_resource(unassigned);

        let mut schedule = Schedule::default();
        schedule.add_systems(run_dispatch_system);
        schedule.run(&mut world);

        assert!(world.resource::<IdleSet>().is_empty());
        assert!(world.resource::<UnassignedQueue>().is_empty());
        assert_eq!(world.get::<Trip>(trip).unwrap().phase, TripPhase::Waiting);
        assert_eq!(world.get::<Vehicle>(vehicle).unwrap().phase, VehiclePhase::P2);
    }
}
