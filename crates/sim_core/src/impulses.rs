//! Impulses: scheduled configuration overrides applied at specific blocks.
//!
//! An impulse list is a sequence of `{block, overrides}` records. At the
//! start of block `b`, any impulse scheduled for `b` is applied in place to
//! the live `SimulationConfig` -- exactly like a live `update_options` call,
//! but driven by the clock rather than an external collaborator.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::config::ConfigOverrides;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Impulse {
    pub block: u64,
    pub overrides: ConfigOverrides,
}

/// Resource holding the impulse schedule for a run. Consumed in block order;
/// impulses are expected to be sorted ascending by block but the apply step
/// tolerates any order since it simply filters by exact match each tick.
#[derive(Debug, Clone, Default, Resource)]
pub struct ImpulseList {
    pub impulses: Vec<Impulse>,
}

impl ImpulseList {
    pub fn new(mut impulses: Vec<Impulse>) -> Self {
        impulses.sort_by_key(|i| i.block);
        Self { impulses }
    }

    /// Overrides (if any) scheduled for exactly this block, merged in list
    /// order so a later entry for the same block wins field-by-field.
    pub fn overrides_for_block(&self, block: u64) -> Option<ConfigOverrides> {
        let mut merged: Option<ConfigOverrides> = None;
        for impulse in self.impulses.iter().filter(|i| i.block == block) {
            merged = Some(match merged {
                None => impulse.overrides,
                Some(mut acc) => {
                    if impulse.overrides.vehicle_count.is_some() {
                        acc.vehicle_count = impulse.overrides.vehicle_count;
                    }
                    if impulse.overrides.base_demand.is_some() {
                        acc.base_demand = impulse.overrides.base_demand;
                    }
                    if impulse.overrides.price.is_some() {
                        acc.price = impulse.overrides.price;
                    }
                    if impulse.overrides.platform_commission.is_some() {
                        acc.platform_commission = impulse.overrides.platform_commission;
                    }
                    if impulse.overrides.reservation_wage.is_some() {
                        acc.reservation_wage = impulse.overrides.reservation_wage;
                    }
                    if impulse.overrides.smoothing_window.is_some() {
                        acc.smoothing_window = impulse.overrides.smoothing_window;
                    }
                    acc
                }
            });
        }
        merged
    }
}
