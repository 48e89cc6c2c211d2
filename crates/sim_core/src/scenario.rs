//! Scenario construction: turn a validated [`SimulationConfig`] plus an
//! optional impulse schedule into a runnable [`Simulation`].
//!
//! Mirrors the teacher scenario's shape -- a params struct consumed by a
//! single `build_*` entry point that populates a fresh `World` with every
//! resource the schedule needs -- generalized from "spawn riders/drivers per
//! spawner config" to "spawn `vehicle_count` idle vehicles on the grid".

use bevy_ecs::prelude::World;

use crate::city::City;
use crate::clock::SimulationClock;
use crate::config::{ConfigError, SimulationConfig};
use crate::dispatch::nearest::NearestAvailable;
use crate::dispatch::{DispatchPolicyResource, IdleSet, UnassignedQueue};
use crate::ecs::{Position, Vehicle};
use crate::equilibrator::{self, EquilibratorState};
use crate::history::History;
use crate::impulses::{Impulse, ImpulseList};
use crate::rng::SimRng;
use crate::runner;
use crate::simulation::Simulation;
use crate::snapshot::NullSink;
use crate::systems::{BlockAccumulator, DemandWarnings};

/// Everything needed to build one [`Simulation`] beyond the bare
/// [`SimulationConfig`]: the impulse schedule and a human-readable run name
/// (carried through to every [`crate::snapshot::BlockResult`]).
#[derive(Debug, Clone, Default)]
pub struct ScenarioParams {
    pub config: SimulationConfig,
    pub impulses: Vec<Impulse>,
    pub name: String,
}

impl ScenarioParams {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            impulses: Vec::new(),
            name: "sim".to_string(),
        }
    }

    pub fn with_impulses(mut self, impulses: Vec<Impulse>) -> Self {
        self.impulses = impulses;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

fn city_from_config(config: &SimulationConfig) -> City {
    City {
        size: config.city_size,
        inhomogeneity: config.trip_inhomogeneity,
        min_trip_distance: config.min_trip_distance,
        max_trip_distance: config.max_trip_distance,
        idle_vehicles_moving: config.idle_vehicles_moving,
        trip_inhomogeneous_destinations: config.trip_inhomogeneous_destinations,
    }
}

/// Build a simulation from a bare config, with no impulses and the default
/// run name. The common case -- see the crate-level doc example.
pub fn build_simulation(config: SimulationConfig) -> Result<Simulation, ConfigError> {
    build_simulation_from_params(ScenarioParams::new(config))
}

/// Build a simulation from full [`ScenarioParams`]: validates the config,
/// populates a fresh `World` with every resource the schedule reads, spawns
/// the initial fleet, and wires up the baseline nearest-available dispatch
/// policy. The only thing it doesn't do is attach a non-default snapshot
/// sink -- call [`Simulation::set_sink`] for that.
pub fn build_simulation_from_params(params: ScenarioParams) -> Result<Simulation, ConfigError> {
    params.config.validate()?;

    let config = params.config;
    let mut world = World::new();

    let mut rng = match config.random_number_seed {
        Some(seed) => SimRng::from_seed(seed),
        None => SimRng::from_entropy(),
    };

    let city = city_from_config(&config);
    let initial_request_rate =
        equilibrator::effective_request_rate(config.base_demand, config.price, config.demand_elasticity);

    for _ in 0..config.vehicle_count {
        let location = city.random_location(&mut rng, false);
        let direction = rng.choose_direction(&crate::city::Direction::ALL);
        world.spawn((Vehicle::new_idle(direction), Position(location)));
    }

    // IdleSet membership must mirror the freshly spawned fleet; all of it
    // starts in P1, so every vehicle entity belongs in the set.
    let mut idle_set = IdleSet::default();
    for (entity, vehicle) in world.query::<(bevy_ecs::prelude::Entity, &Vehicle)>().iter(&world) {
        debug_assert_eq!(vehicle.phase, crate::ecs::VehiclePhase::P1);
        idle_set.insert(entity);
    }

    world.insert_resource(city);
    world.insert_resource(config);
    world.insert_resource(SimulationClock::new());
    world.insert_resource(rng);
    world.insert_resource(EquilibratorState::new(initial_request_rate));
    world.insert_resource(idle_set);
    world.insert_resource(UnassignedQueue::default());
    world.insert_resource(DispatchPolicyResource(Box::new(NearestAvailable)));
    world.insert_resource(BlockAccumulator::default());
    world.insert_resource(DemandWarnings::default());
    world.insert_resource(History::new(config.smoothing_window, config.results_window));
    world.insert_resource(ImpulseList::new(params.impulses));

    let schedule = runner::build_schedule();

    Ok(Simulation::new(world, schedule, params.name, Box::new(NullSink)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_simulation_rejects_invalid_config() {
        let mut config = SimulationConfig::default();
        config.city_size = 7;
        assert!(build_simulation(config).is_err());
    }

    #[test]
    fn build_simulation_spawns_the_configured_fleet() {
        let config = SimulationConfig {
            city_size: 8,
            vehicle_count: 5,
            random_number_seed: Some(1),
            ..SimulationConfig::default()
        };
        let sim = build_simulation(config).expect("valid config");
        assert_eq!(sim.vehicle_count(), 5);
    }

    #[test]
    fn scenario_params_carry_a_name_through_to_snapshots() {
        let config = SimulationConfig {
            city_size: 8,
            vehicle_count: 1,
            random_number_seed: Some(2),
            ..SimulationConfig::default()
        };
        let mut sim =
            build_simulation_from_params(ScenarioParams::new(config).with_name("scenario-a")).expect("valid");
        let result = sim.next_block();
        assert_eq!(result.name, "scenario-a");
    }
}
