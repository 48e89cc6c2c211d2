//! Movement: direction choice, then location update, run as two strict
//! sub-steps (§4.2 requires direction to be re-chosen before the vehicle
//! advances).

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::city::{City, Direction, Location};
use crate::ecs::{Position, Trip, Vehicle, VehiclePhase};
use crate::rng::SimRng;

/// Pick the next direction for every vehicle: uniform random (reverse
/// excluded) while idle and moving, greedy toward the current leg's target
/// while dispatched.
pub fn update_direction_system(
    city: Res<City>,
    mut rng: ResMut<SimRng>,
    trips: Query<&Trip>,
    mut vehicles: Query<(&mut Vehicle, &Position)>,
) {
    for (mut vehicle, position) in vehicles.iter_mut() {
        let next_direction = match vehicle.phase {
            VehiclePhase::P1 => {
                if city.idle_vehicles_moving {
                    rng.sample_direction_excluding(vehicle.direction.opposite())
                } else {
                    vehicle.direction
                }
            }
            VehiclePhase::P2 | VehiclePhase::P3 => {
                let target = vehicle
                    .bound_trip
                    .and_then(|trip_entity| trips.get(trip_entity).ok())
                    .map(|trip| match vehicle.phase {
                        VehiclePhase::P2 => trip.origin,
                        _ => trip.destination,
                    });
                match target {
                    Some(target) => choose_direction_toward(&city, &mut rng, position.0, target),
                    None => vehicle.direction,
                }
            }
        };
        vehicle.direction = next_direction;
    }
}

/// Any direction that does not increase L1 distance to `target`, chosen
/// uniformly among the acceptable candidates.
fn choose_direction_toward(city: &City, rng: &mut SimRng, origin: Location, target: Location) -> Direction {
    let current_distance = city.distance(origin, target);
    let candidates: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&direction| city.distance(city.step(origin, direction), target) <= current_distance)
        .collect();

    if candidates.is_empty() {
        rng.choose_direction(&Direction::ALL)
    } else {
        rng.choose_direction(&candidates)
    }
}

/// Advance every vehicle one unit along its (already updated) direction.
/// Idle vehicles stand still when `idle_vehicles_moving` is false.
pub fn update_location_system(city: Res<City>, mut vehicles: Query<(&Vehicle, &mut Position)>) {
    for (vehicle, mut position) in vehicles.iter_mut() {
        if vehicle.phase == VehiclePhase::P1 && !city.idle_vehicles_moving {
            continue;
        }
        position.0 = city.step(position.0, vehicle.direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;
    use bevy_ecs::schedule::Schedule;

    #[test]
    fn stationary_idle_vehicles_do_not_move() {
        let mut world = World::new();
        world.insert_resource(City {
            size: 10,
            idle_vehicles_moving: false,
            ..City::default()
        });
        let vehicle = world
            .spawn((Vehicle::new_idle(Direction::North), Position(Location::new(3, 3))))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_location_system);
        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(vehicle).unwrap().0, Location::new(3, 3));
    }

    #[test]
    fn moving_idle_vehicles_advance_one_step() {
        let mut world = World::new();
        world.insert_resource(City {
            size: 10,
            idle_vehicles_moving: true,
            ..City::default()
        });
        let vehicle = world
            .spawn((Vehicle::new_idle(Direction::East), Position(Location::new(3, 3))))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_location_system);
        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(vehicle).unwrap().0, Location::new(4, 3));
    }

    #[test]
    fn direction_choice_never_increases_distance_to_target() {
        let mut world = World::new();
        world.insert_resource(City {
            size: 10,
            ..City::default()
        });
        world.insert_resource(SimRng::from_seed(5));
        let mut vehicle = Vehicle::new_idle(Direction::North);
        vehicle.phase = VehiclePhase::P2;
        let trip = world
            .spawn(Trip {
                phase: crate::ecs::TripPhase::Waiting,
                origin: Location::new(8, 8),
                destination: Location::new(2, 2),
                distance: 4,
                vehicle: None,
            })
            .id();
        vehicle.bound_trip = Some(trip);
        let vehicle_entity = world.spawn((vehicle, Position(Location::new(0, 0)))).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(update_direction_system);

        let city = *world.resource::<City>();
        let before = city.distance(Location::new(0, 0), Location::new(8, 8));
        schedule.run(&mut world);
        let chosen = world.get::<Vehicle>(vehicle_entity).unwrap().direction;
        let after = city.distance(city.step(Location::new(0, 0), chosen), Location::new(8, 8));
        assert!(after <= before);
    }
}
