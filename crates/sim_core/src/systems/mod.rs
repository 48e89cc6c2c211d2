//! Per-block systems, run in the fixed order the tick contract requires
//! (see `runner`): demand, dispatch, movement, phase transitions, history,
//! equilibration, snapshot.

pub mod demand;
pub mod dispatch;
pub mod equilibration;
pub mod history_record;
pub mod movement;
pub mod phase_transition;

pub use demand::{sample_demand_system, DemandWarnings};
pub use dispatch::run_dispatch_system;
pub use equilibration::run_equilibration_system;
pub use history_record::{record_history_system, BlockAccumulator};
pub use movement::{update_direction_system, update_location_system};
pub use phase_transition::apply_phase_transitions_system;
