//! Equilibrator: periodic demand/supply adjustment based on driver utility,
//! platform commission, reservation wage, and demand elasticity.
//!
//! This module holds the pure arithmetic; `systems::equilibration` wires it
//! into the ECS (spawning/despawning vehicle entities, updating the live
//! request rate). Keeping the formulas free of `World` access makes them
//! directly testable, the way fare arithmetic is kept separate from its
//! entity lookups elsewhere in this codebase.

use bevy_ecs::prelude::Resource;

/// Damping factor `k` applied to the raw utility-weighted vehicle-count
/// delta, so a single equilibration step never swings supply too far.
pub const SUPPLY_DAMPING: f64 = 0.2;

/// Utility must clear this threshold (in either direction) before supply
/// is adjusted at all; utility within the band is treated as equilibrium.
pub const SUPPLY_UTILITY_THRESHOLD: f64 = 0.01;

/// Recompute the effective request rate from the demand curve
/// `R = R_0 * p^-e`. Called whenever price changes.
pub fn effective_request_rate(base_demand: f64, price: f64, demand_elasticity: f64) -> f64 {
    base_demand * price.powf(-demand_elasticity)
}

/// Per-block driver utility `U = p * B * (1 - F) - c`, where `B` is the
/// rolling P3 fraction, `F` is platform commission, `c` is reservation wage.
pub fn driver_utility(price: f64, p3_fraction: f64, platform_commission: f64, reservation_wage: f64) -> f64 {
    price * p3_fraction * (1.0 - platform_commission) - reservation_wage
}

/// Outcome of one equilibration step's supply decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyAdjustment {
    Add(u32),
    Remove(u32),
    None,
}

/// Decide how many vehicles to add or remove given this block's utility.
/// `vehicle_count` bounds the removal so the fleet never drops below 1.
pub fn supply_adjustment(utility: f64, vehicle_count: u32) -> SupplyAdjustment {
    if vehicle_count == 0 {
        return SupplyAdjustment::None;
    }

    if utility > SUPPLY_UTILITY_THRESHOLD {
        let delta = (SUPPLY_DAMPING * utility * vehicle_count as f64).round();
        if delta >= 1.0 {
            SupplyAdjustment::Add(delta as u32)
        } else {
            SupplyAdjustment::None
        }
    } else if utility < -SUPPLY_UTILITY_THRESHOLD {
        let raw = (SUPPLY_DAMPING * utility.abs() * vehicle_count as f64).round() as i64;
        let max_removable = vehicle_count as i64 - 1;
        let delta = raw.min(max_removable).max(0);
        if delta >= 1 {
            SupplyAdjustment::Remove(delta as u32)
        } else {
            SupplyAdjustment::None
        }
    } else {
        SupplyAdjustment::None
    }
}

/// Tracks the live request rate between equilibration steps; price changes
/// (from an impulse or a manual override) invalidate it until the next
/// scheduled recompute.
#[derive(Debug, Clone, Copy, Resource)]
pub struct EquilibratorState {
    pub current_request_rate: f64,
}

impl EquilibratorState {
    pub fn new(base_demand: f64) -> Self {
        Self {
            current_request_rate: base_demand,
        }
    }
}
