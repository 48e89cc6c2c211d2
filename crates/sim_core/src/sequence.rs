//! Sequence runner: executes a parameterized family of simulations over a
//! cartesian product of vehicle count and request rate, each point repeated
//! `request_rate_repeat` times.
//!
//! Grounded on the parallel-experiment runner this codebase's ancestor uses
//! for the same job (rayon over independent `World`s, one per parameter
//! point) -- generalized from an arbitrary builder-style `ParameterSpace` to
//! the two swept axes §4.8 names, since this engine has no richer parameter
//! space to sweep.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::results::Results;
use crate::scenario::build_simulation;

/// One axis of the sweep: `start..=max` stepped by `increment`. An
/// `increment` of zero (or negative, for the float axis) collapses the axis
/// to the single `start` value -- the sequence runner's equivalent of "this
/// knob isn't being swept this run".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SequenceAxis<T> {
    pub start: T,
    pub max: T,
    pub increment: T,
}

fn stepped_range_u32(axis: SequenceAxis<u32>) -> Vec<u32> {
    if axis.increment == 0 {
        return vec![axis.start];
    }
    let mut values = Vec::new();
    let mut value = axis.start;
    while value <= axis.max {
        values.push(value);
        match value.checked_add(axis.increment) {
            Some(next) => value = next,
            None => break,
        }
    }
    values
}

fn stepped_range_f64(axis: SequenceAxis<f64>) -> Vec<f64> {
    if axis.increment <= 0.0 {
        return vec![axis.start];
    }
    let mut values = Vec::new();
    let mut value = axis.start;
    // Half a step of tolerance guards against the max not landing exactly
    // on a step boundary due to floating point accumulation.
    while value <= axis.max + axis.increment / 2.0 {
        values.push(value);
        value += axis.increment;
    }
    values
}

/// Configuration for one sequence run: a base config (everything except the
/// two swept fields) plus the axes and repeat count from §4.8.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    pub base_config: SimulationConfig,
    pub vehicle_count: SequenceAxis<u32>,
    pub request_rate: SequenceAxis<f64>,
    pub request_rate_repeat: u32,
}

/// The parameter point one run in the sequence was executed with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SequencePoint {
    pub vehicle_count: u32,
    pub request_rate: f64,
    pub repeat_index: u32,
}

/// One row of the sequence's output table: the point plus its end-state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRow {
    pub point: SequencePoint,
    pub results: Results,
}

/// Mix a base seed with a parameter point so repeats of the same point get
/// distinct (but reproducible) RNG streams, while distinct points don't
/// collide. Plain bit-mixing, not a cryptographic hash -- collisions only
/// cost a duplicated trajectory in an already-repeated point, not a
/// correctness failure.
fn derive_seed(base_seed: u64, point: &SequencePoint) -> u64 {
    let mut seed = base_seed;
    seed ^= (point.vehicle_count as u64).wrapping_mul(0x9E3779B97F4A7C15);
    seed ^= point.request_rate.to_bits().wrapping_mul(0xC2B2AE3D27D4EB4F);
    seed ^= (point.repeat_index as u64).wrapping_mul(0x165667B19E3779F9);
    seed
}

/// Execute the full sweep. Each point runs in its own freshly-built
/// `Simulation` (§5: the sequence runner must never share one engine
/// instance across parallel runs) and the whole grid runs in parallel via
/// rayon, the same way the ancestor's experiment runner parallelizes its
/// parameter space.
pub fn run_sequence(sequence: &SequenceConfig) -> Vec<SequenceRow> {
    let vehicle_counts = stepped_range_u32(sequence.vehicle_count);
    let request_rates = stepped_range_f64(sequence.request_rate);
    let repeats = sequence.request_rate_repeat.max(1);

    let mut points = Vec::with_capacity(vehicle_counts.len() * request_rates.len() * repeats as usize);
    for &vehicle_count in &vehicle_counts {
        for &request_rate in &request_rates {
            for repeat_index in 0..repeats {
                points.push(SequencePoint {
                    vehicle_count,
                    request_rate,
                    repeat_index,
                });
            }
        }
    }

    points
        .par_iter()
        .map(|point| {
            let mut config = sequence.base_config;
            config.vehicle_count = point.vehicle_count;
            config.base_demand = point.request_rate;
            if let Some(seed) = config.random_number_seed {
                config.random_number_seed = Some(derive_seed(seed, point));
            }

            let mut sim = build_simulation(config)
                .expect("sequence axes must only ever produce individually valid configs");
            for _ in 0..config.time_blocks {
                sim.next_block();
            }

            SequenceRow {
                point: *point,
                results: sim.compute_end_state(),
            }
        })
        .collect()
}
