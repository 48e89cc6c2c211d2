//! Test helpers for common scenario setup, mirroring the ancestor's
//! `create_test_world` -- a single small, deterministic config used across
//! test files so they don't each hand-roll slightly different fixtures.

use crate::config::SimulationConfig;
use crate::scenario::build_simulation;
use crate::simulation::Simulation;

/// A small, deterministic config: an 8x8 city, four vehicles, modest
/// demand, seeded RNG. Cheap enough to run dozens of blocks per test.
pub fn small_city_config() -> SimulationConfig {
    SimulationConfig {
        city_size: 8,
        vehicle_count: 4,
        base_demand: 0.3,
        random_number_seed: Some(1),
        results_window: 10,
        smoothing_window: 5,
        time_blocks: 50,
        ..SimulationConfig::default()
    }
}

/// Build a `Simulation` from [`small_city_config`]. Panics on an invalid
/// config, which would indicate a bug in the fixture itself, not the
/// system under test.
pub fn build_test_simulation() -> Simulation {
    build_simulation(small_city_config()).expect("small_city_config should always be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_city_config_is_valid() {
        assert!(small_city_config().validate().is_ok());
    }

    #[test]
    fn build_test_simulation_starts_at_block_zero() {
        let sim = build_test_simulation();
        assert_eq!(sim.block(), 0);
    }
}
