//! Block runner: builds the fixed-order per-block schedule the tick
//! contract requires (§4.7: demand, dispatch, movement, phase transitions,
//! history, equilibration) and advances the clock once it has run.
//!
//! Unlike the event-routed schedule this engine's ancestor uses -- which
//! dispatches a different system subset per event kind -- every block here
//! runs the same systems in the same order; only equilibration is
//! conditional, gated on the configured interval. `apply_deferred` sync
//! points are inserted exactly where a later system needs to see an earlier
//! one's spawned/despawned entities, the same discipline the event-routed
//! schedule uses for the same reason.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::SimulationClock;
use crate::config::{EquilibrationMode, SimulationConfig};
use crate::systems::{
    apply_phase_transitions_system, record_history_system, run_dispatch_system,
    run_equilibration_system, sample_demand_system, update_direction_system,
    update_location_system,
};

/// Condition: this block falls on an equilibration boundary and
/// equilibration is enabled.
fn equilibration_due(clock: Res<SimulationClock>, config: Res<SimulationConfig>) -> bool {
    config.equilibrate != EquilibrationMode::None
        && config.equilibration_interval > 0
        && clock.block() % config.equilibration_interval == 0
}

/// Build the schedule run once per block. Systems are chained so bevy's
/// executor preserves the tick contract's ordering even though most of them
/// don't conflict on resource access and could otherwise run out of order.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            sample_demand_system,
            apply_deferred,
            run_dispatch_system,
            update_direction_system,
            update_location_system,
            apply_phase_transitions_system,
            apply_deferred,
            record_history_system,
            run_equilibration_system.run_if(equilibration_due),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// Run exactly one block's schedule, then advance the clock so the next
/// call processes the following block.
pub fn run_block(world: &mut World, schedule: &mut Schedule) {
    schedule.run(world);
    world.resource_mut::<SimulationClock>().advance();
}
