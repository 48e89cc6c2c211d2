//! Exercises the CLI's collaborator layer (config loading, overrides,
//! scenario construction) end to end, without going through `main`'s
//! process exit/stdout plumbing.

use std::io::Write;

use sim_cli::{config_file, error, overrides};
use sim_core::scenario::{build_simulation_from_params, ScenarioParams};

fn write_temp_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn loads_a_config_file_and_builds_a_runnable_simulation() {
    let file = write_temp_config(
        "[SIMULATION]\n\
         city_size = 8\n\
         vehicle_count = 6\n\
         base_demand = 0.3\n\
         random_number_seed = 5\n\
         results_window = 10\n\
         smoothing_window = 5\n\
         time_blocks = 20\n",
    );

    let loaded = config_file::load_from_path(file.path()).expect("valid config");
    assert_eq!(loaded.config.vehicle_count, 6);

    let params = ScenarioParams::new(loaded.config).with_impulses(loaded.impulses);
    let mut sim = build_simulation_from_params(params).expect("valid config");
    for _ in 0..loaded.config.time_blocks {
        sim.next_block();
    }
    let results = sim.compute_end_state();
    assert_eq!(results.blocks_simulated, 20);
}

#[test]
fn cli_overrides_apply_on_top_of_the_file() {
    let file = write_temp_config("[SIMULATION]\nvehicle_count = 6\ncity_size = 8\n");
    let mut loaded = config_file::load_from_path(file.path()).expect("valid config");

    let args = vec!["vehicle_count=12".to_string()];
    overrides::apply_cli_overrides(&args, &mut loaded.config, &mut loaded.cli_options).expect("valid overrides");

    assert_eq!(loaded.config.vehicle_count, 12);
}

#[test]
fn impulse_schedule_round_trips_through_a_real_run() {
    let file = write_temp_config(
        "[SIMULATION]\n\
         city_size = 8\n\
         vehicle_count = 4\n\
         random_number_seed = 1\n\
         results_window = 10\n\
         smoothing_window = 5\n\
         time_blocks = 30\n\
         [IMPULSES]\n\
         price_bump = {\"block\": 10, \"price\": 2.0}\n",
    );

    let loaded = config_file::load_from_path(file.path()).expect("valid config");
    assert_eq!(loaded.impulses.len(), 1);

    let params = ScenarioParams::new(loaded.config).with_impulses(loaded.impulses);
    let mut sim = build_simulation_from_params(params).expect("valid config");
    for _ in 0..30 {
        sim.next_block();
    }
}

#[test]
fn missing_config_file_is_reported_as_io_error() {
    let err = config_file::load_from_path(std::path::Path::new("/does/not/exist.ini")).unwrap_err();
    assert!(matches!(err, error::CliError::Io { .. }));
}
