//! Live simulation configuration: a plain record read once per block.
//!
//! The engine reads this record at the start of each block; impulses and the
//! `update_options` collaborator API mutate it between blocks only -- there
//! are no mid-block reads. Parsing this record out of an INI-style file is an
//! external collaborator's job (see the CLI crate); this module only owns the
//! in-memory shape and its validation.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equilibration mode: whether and how the control loop adjusts supply/demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquilibrationMode {
    None,
    Price,
}

/// Configuration errors, fatal before a simulation is constructed (see the
/// error handling design: these are reported to the caller and no engine is
/// created).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("city_size must be a positive even integer, got {0}")]
    InvalidCitySize(i32),
    #[error("min_trip_distance ({min}) must not exceed max_trip_distance ({max})")]
    MinExceedsMaxTripDistance { min: u32, max: u32 },
    #[error("price must be positive when equilibrating, got {0}")]
    NonPositivePrice(f64),
    #[error("demand_elasticity must be non-negative, got {0}")]
    NegativeDemandElasticity(f64),
    #[error("equilibration_interval must be at least 1 block")]
    ZeroEquilibrationInterval,
    #[error("results_window must be at least 1 block")]
    ZeroResultsWindow,
}

/// Full, mutable, engine-facing configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub city_size: i32,
    pub vehicle_count: u32,
    pub base_demand: f64,
    pub trip_inhomogeneity: f64,
    pub trip_inhomogeneous_destinations: bool,
    pub min_trip_distance: u32,
    pub max_trip_distance: Option<u32>,
    pub idle_vehicles_moving: bool,
    pub random_number_seed: Option<u64>,
    pub results_window: usize,
    pub smoothing_window: usize,
    pub animate_update_period: u64,
    /// Number of blocks a single run advances for, absent live reconfiguration
    /// or early host cancellation. Purely a collaborator convenience (the CLI
    /// driver loop and the sequence runner read it); `Simulation` itself has
    /// no concept of a run length and will tick forever if asked to.
    pub time_blocks: u64,

    pub equilibrate: EquilibrationMode,
    pub price: f64,
    pub platform_commission: f64,
    pub reservation_wage: f64,
    pub demand_elasticity: f64,
    pub equilibration_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            city_size: 10,
            vehicle_count: 10,
            base_demand: 0.2,
            trip_inhomogeneity: 0.0,
            trip_inhomogeneous_destinations: false,
            min_trip_distance: 0,
            max_trip_distance: None,
            idle_vehicles_moving: true,
            random_number_seed: None,
            results_window: 50,
            smoothing_window: 20,
            animate_update_period: 1,
            time_blocks: 1000,
            equilibrate: EquilibrationMode::None,
            price: 1.0,
            platform_commission: 0.0,
            reservation_wage: 0.3,
            demand_elasticity: 0.0,
            equilibration_interval: 5,
        }
    }
}

impl SimulationConfig {
    /// Validate the record, returning the configuration-error taxonomy
    /// described in the error handling design. Called once, before a
    /// `Simulation` is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.city_size <= 0 || self.city_size % 2 != 0 {
            return Err(ConfigError::InvalidCitySize(self.city_size));
        }
        if let Some(max) = self.max_trip_distance {
            if self.min_trip_distance > max {
                return Err(ConfigError::MinExceedsMaxTripDistance {
                    min: self.min_trip_distance,
                    max,
                });
            }
        }
        if self.results_window == 0 {
            return Err(ConfigError::ZeroResultsWindow);
        }
        if self.equilibrate == EquilibrationMode::Price {
            if self.price <= 0.0 {
                return Err(ConfigError::NonPositivePrice(self.price));
            }
            if self.demand_elasticity < 0.0 {
                return Err(ConfigError::NegativeDemandElasticity(self.demand_elasticity));
            }
            if self.equilibration_interval == 0 {
                return Err(ConfigError::ZeroEquilibrationInterval);
            }
        }
        Ok(())
    }
}

/// City-scale parameters (§6.1 `[CITY_SCALE]`): real-world units from which
/// the per-block price and reservation wage can be derived, as an
/// alternative to setting them directly in `[EQUILIBRATION]`. Pure unit
/// conversion, kept here (rather than in the CLI config loader) so it's
/// testable without going through file parsing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CityScaleConfig {
    pub mean_vehicle_speed: f64,
    pub minutes_per_block: f64,
    pub per_km_ops_cost: f64,
    pub per_hour_opportunity_cost: f64,
    pub per_km_price: f64,
    pub per_minute_price: f64,
}

impl Default for CityScaleConfig {
    fn default() -> Self {
        Self {
            mean_vehicle_speed: 30.0,
            minutes_per_block: 1.0,
            per_km_ops_cost: 0.5,
            per_hour_opportunity_cost: 10.0,
            per_km_price: 1.0,
            per_minute_price: 0.1,
        }
    }
}

/// Derived per-block price and reservation wage, ready to be written into
/// `SimulationConfig::price` / `SimulationConfig::reservation_wage`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedCityScale {
    pub price: f64,
    pub reservation_wage: f64,
}

impl CityScaleConfig {
    /// `km_per_block = speed(km/h) * minutes_per_block / 60`.
    pub fn km_per_block(&self) -> f64 {
        self.mean_vehicle_speed * self.minutes_per_block / 60.0
    }

    /// Price per block: distance-based plus time-based fare components.
    /// Reservation wage per block: opportunity cost of the driver's time
    /// plus the vehicle's per-km operating cost over that same distance.
    pub fn derive(&self) -> DerivedCityScale {
        let km = self.km_per_block();
        let price = self.per_km_price * km + self.per_minute_price * self.minutes_per_block;
        let reservation_wage =
            self.per_hour_opportunity_cost * (self.minutes_per_block / 60.0) + self.per_km_ops_cost * km;
        DerivedCityScale { price, reservation_wage }
    }
}

/// Sparse overrides applied via `Simulation::update_options` between blocks.
/// Only the fields collaborators are allowed to change live are present here
/// (vehicle count, request rate via `base_demand`, price, commission,
/// reservation wage, smoothing window); other fields require a fresh
/// simulation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub vehicle_count: Option<u32>,
    pub base_demand: Option<f64>,
    pub price: Option<f64>,
    pub platform_commission: Option<f64>,
    pub reservation_wage: Option<f64>,
    pub smoothing_window: Option<usize>,
}

impl SimulationConfig {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.vehicle_count {
            self.vehicle_count = v;
        }
        if let Some(v) = overrides.base_demand {
            self.base_demand = v;
        }
        if let Some(v) = overrides.price {
            self.price = v;
        }
        if let Some(v) = overrides.platform_commission {
            self.platform_commission = v;
        }
        if let Some(v) = overrides.reservation_wage {
            self.reservation_wage = v;
        }
        if let Some(v) = overrides.smoothing_window {
            self.smoothing_window = v;
        }
    }
}
