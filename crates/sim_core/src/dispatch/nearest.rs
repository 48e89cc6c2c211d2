//! Baseline dispatch policy: nearest-available vehicle per trip.
//!
//! For each unassigned trip, in request order, scan the idle vehicles and
//! bind the one with the smallest `travel_distance` to the trip's origin,
//! breaking ties by lowest vehicle id. A vehicle matched to one trip is
//! unavailable to later trips within the same pass.

use std::collections::HashSet;

use crate::city::City;

use super::policy::{DispatchPolicy, IdleVehicle, PendingTrip};
use super::types::DispatchOutcome;

#[derive(Debug, Default)]
pub struct NearestAvailable;

impl DispatchPolicy for NearestAvailable {
    fn assign(
        &self,
        city: &City,
        pending: &[PendingTrip],
        idle: &[IdleVehicle],
    ) -> Vec<DispatchOutcome> {
        let mut used: HashSet<bevy_ecs::prelude::Entity> = HashSet::new();
        let mut outcomes = Vec::new();

        for trip in pending {
            let mut best: Option<(u32, &IdleVehicle)> = None;
            for candidate in idle {
                if used.contains(&candidate.vehicle) {
                    continue;
                }
                let distance = city.travel_distance(candidate.location, candidate.direction, trip.origin);
                let better = match best {
                    None => true,
                    Some((best_distance, best_vehicle)) => {
                        distance < best_distance
                            || (distance == best_distance
                                && candidate.vehicle.index() < best_vehicle.vehicle.index())
                    }
                };
                if better {
                    best = Some((distance, candidate));
                }
            }

            if let Some((_, vehicle)) = best {
                let forward_dispatch =
                    city.travel_distance(vehicle.location, vehicle.direction, trip.origin)
                        == city.distance(vehicle.location, trip.origin)
                        && vehicle.location != trip.origin;
                used.insert(vehicle.vehicle);
                outcomes.push(DispatchOutcome {
                    trip: trip.trip,
                    vehicle: vehicle.vehicle,
                    forward_dispatch,
                });
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::{City, Direction, Location};
    use bevy_ecs::prelude::{Entity, World};

    fn city() -> City {
        City {
            size: 10,
            ..City::default()
        }
    }

    #[test]
    fn picks_the_nearest_vehicle() {
        let mut world = World::new();
        let near = world.spawn_empty().id();
        let far = world.spawn_empty().id();

        let idle = vec![
            IdleVehicle {
                vehicle: far,
                location: Location::new(0, 0),
                direction: Direction::North,
            },
            IdleVehicle {
                vehicle: near,
                location: Location::new(5, 5),
                direction: Direction::North,
            },
        ];
        let pending = vec![PendingTrip {
            trip: world.spawn_empty().id(),
            origin: Location::new(5, 6),
        }];

        let outcomes = NearestAvailable.assign(&city(), &pending, &idle);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].vehicle, near);
    }

    #[test]
    fn each_vehicle_matched_at_most_once_per_pass() {
        let mut world = World::new();
        let only_vehicle = world.spawn_empty().id();
        let idle = vec![IdleVehicle {
            vehicle: only_vehicle,
            location: Location::new(0, 0),
            direction: Direction::North,
        }];
        let pending = vec![
            PendingTrip {
                trip: world.spawn_empty().id(),
                origin: Location::new(1, 1),
            },
            PendingTrip {
                trip: world.spawn_empty().id(),
                origin: Location::new(2, 2),
            },
        ];

        let outcomes = NearestAvailable.assign(&city(), &pending, &idle);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].vehicle, only_vehicle);
    }

    #[test]
    fn unmatched_trips_are_simply_omitted() {
        let pending = vec![PendingTrip {
            trip: Entity::from_raw(0),
            origin: Location::new(1, 1),
        }];
        let outcomes = NearestAvailable.assign(&city(), &pending, &[]);
        assert!(outcomes.is_empty());
    }
}
