//! `simulate`: the command-line collaborator for the ridehail engine
//! (§6.4). Loads an INI config file, applies trailing `key=value`
//! overrides, runs either a single simulation or a parameter sweep, and
//! prints the result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sim_cli::error::CliError;
use sim_cli::{cli_options, config_file, output, overrides};
use sim_core::scenario::{build_simulation_from_params, ScenarioParams};
use sim_core::sequence::run_sequence;
use sim_core::snapshot::BufferedSink;

/// Run a ridehail market simulation from an INI configuration file.
#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Run a ridehail market simulation")]
struct Args {
    /// Path to an INI-style configuration file.
    config_path: PathBuf,

    /// Additional `key=value` overrides, applied after the config file in
    /// the order given.
    overrides: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut loaded = config_file::load_from_path(&args.config_path)?;
    overrides::apply_cli_overrides(&args.overrides, &mut loaded.config, &mut loaded.cli_options)?;

    env_logger::Builder::new()
        .filter_level(loaded.cli_options.log_level())
        .init();

    if loaded.cli_options.use_city_scale {
        match loaded.city_scale {
            Some(scale) => {
                let derived = scale.derive();
                loaded.config.price = derived.price;
                loaded.config.reservation_wage = derived.reservation_wage;
            }
            None => log::warn!("use_city_scale is set but no [CITY_SCALE] section was provided; ignoring"),
        }
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if loaded.cli_options.run_sequence {
        let sequence = loaded.sequence.ok_or_else(|| CliError::InvalidOverride {
            key: "run_sequence".to_string(),
            value: "true".to_string(),
            reason: "no [SEQUENCE] section was provided".to_string(),
        })?;
        let rows = run_sequence(&sequence);
        return output::write_sequence(&mut handle, &rows);
    }

    let time_blocks = loaded.config.time_blocks;
    let params = ScenarioParams::new(loaded.config)
        .with_impulses(loaded.impulses)
        .with_name(loaded.cli_options.title.clone());
    let mut sim = build_simulation_from_params(params)?;

    if loaded.cli_options.animation_style != cli_options::AnimationStyle::None {
        sim.set_sink(Box::new(BufferedSink::new(1)));
    }

    for _ in 0..time_blocks {
        sim.next_block();
    }

    let results = sim.compute_end_state();
    output::write_results(&mut handle, &results)
}
