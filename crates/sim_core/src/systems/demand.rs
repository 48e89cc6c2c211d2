//! Demand sampling: draw new trip requests for this block.

use bevy_ecs::prelude::{Commands, Res, ResMut, Resource};

use crate::city::City;
use crate::clock::SimulationClock;
use crate::dispatch::UnassignedQueue;
use crate::ecs::{Trip, TripPhase, TripTiming};
use crate::equilibrator::EquilibratorState;
use crate::rng::SimRng;

/// Tracks whether the impossible-geometry warning has already fired this
/// run, so it logs at most once (see the error handling contract).
#[derive(Debug, Default, Resource)]
pub struct DemandWarnings {
    pub impossible_geometry_logged: bool,
    pub impossible_geometry_count: u64,
}

pub fn sample_demand_system(
    mut commands: Commands,
    city: Res<City>,
    clock: Res<SimulationClock>,
    equilibrator: Res<EquilibratorState>,
    mut rng: ResMut<SimRng>,
    mut unassigned: ResMut<UnassignedQueue>,
    mut warnings: ResMut<DemandWarnings>,
) {
    let request_count = rng.poisson(equilibrator.current_request_rate);
    for _ in 0..request_count {
        match city.sample_trip(&mut rng) {
            Some((origin, destination)) => {
                let distance = city.distance(origin, destination);
                let trip = commands
                    .spawn((
                        Trip {
                            phase: TripPhase::Unassigned,
                            origin,
                            destination,
                            distance,
                            vehicle: None,
                        },
                        TripTiming {
                            requested_at: clock.block(),
                            ..TripTiming::default()
                        },
                    ))
                    .id();
                unassigned.push(trip);
            }
            None => {
                warnings.impossible_geometry_count += 1;
                if !warnings.impossible_geometry_logged {
                    log::warn!(
                        "block {}: min_trip_distance/max_trip_distance cannot be satisfied in a city this small; dropping this request",
                        clock.block()
                    );
                    warnings.impossible_geometry_logged = true;
                }
            }
        }
    }
}
