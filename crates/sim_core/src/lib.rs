//! # Ridehail Simulation Core
//!
//! A discrete-time, block-stepped simulation engine for modeling a ridehail
//! marketplace on a toroidal grid city.
//!
//! ## Overview
//!
//! This crate provides the core simulation engine, including:
//!
//! - **City**: toroidal grid geometry, wrap-around distance, location sampling
//! - **ECS Framework**: Entity Component System for vehicle/trip state
//! - **Dispatcher**: pluggable vehicle-trip matching strategies
//! - **History**: fixed-schema rolling-window statistics aggregator
//! - **Equilibrator**: price/commission-driven supply and demand control loop
//! - **Sequence runner**: parameter sweeps over vehicle count and request rate
//!
//! ## Key Concepts
//!
//! - **Block-stepped**: simulation time advances one discrete block at a time
//! - **Deterministic**: a seeded RNG threaded in a fixed sub-stream order
//!   ensures reproducible results given identical config and call sequence
//! - **Snapshot-based observation**: `next_block()` returns a read-only
//!   snapshot; the engine owns all mutable state
//!
//! ## Example
//!
//! ```rust,no_run
//! use sim_core::config::SimulationConfig;
//! use sim_core::scenario::build_simulation;
//!
//! let config = SimulationConfig::default();
//! let mut sim = build_simulation(config).expect("valid configuration");
//! for _ in 0..100 {
//!     let _block_result = sim.next_block();
//! }
//! let _end_state = sim.compute_end_state();
//! ```

pub mod city;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod ecs;
pub mod equilibrator;
pub mod history;
pub mod impulses;
pub mod results;
pub mod rng;
pub mod runner;
pub mod scenario;
pub mod sequence;
pub mod simulation;
pub mod snapshot;
pub mod systems;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
