//! History recording: accumulate this block's counters, then append a row.

use bevy_ecs::prelude::{Query, Res, ResMut, Resource};

use crate::clock::SimulationClock;
use crate::config::SimulationConfig;
use crate::ecs::{Vehicle, VehiclePhase};
use crate::equilibrator::EquilibratorState;
use crate::history::{History, HistoryRow, Metric};

/// Totals accumulated by other systems during this block (completed-trip
/// sums, forward-dispatch count), reset once `record_history_system` has
/// folded them into a row.
#[derive(Debug, Default, Resource)]
pub struct BlockAccumulator {
    pub trip_completed_count: u64,
    pub trip_awaiting_total: f64,
    pub trip_unassigned_total: f64,
    pub trip_riding_total: f64,
    pub trip_distance_total: f64,
    pub trip_forward_dispatch_count: u64,
}

impl BlockAccumulator {
    fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

pub fn record_history_system(
    clock: Res<SimulationClock>,
    config: Res<SimulationConfig>,
    equilibrator: Res<EquilibratorState>,
    mut accumulator: ResMut<BlockAccumulator>,
    mut history: ResMut<History>,
    vehicles: Query<&Vehicle>,
    trips: Query<&crate::ecs::Trip>,
) {
    let taken = accumulator.take();

    let mut row = HistoryRow::new(clock.block());

    let mut p1 = 0.0;
    let mut p2 = 0.0;
    let mut p3 = 0.0;
    for vehicle in vehicles.iter() {
        match vehicle.phase {
            VehiclePhase::P1 => p1 += 1.0,
            VehiclePhase::P2 => p2 += 1.0,
            VehiclePhase::P3 => p3 += 1.0,
        }
    }
    let vehicle_count = p1 + p2 + p3;

    row.set(Metric::VehicleCount, vehicle_count);
    row.set(Metric::VehicleTime, vehicle_count);
    row.set(Metric::VehicleTimeP1, p1);
    row.set(Metric::VehicleTimeP2, p2);
    row.set(Metric::VehicleTimeP3, p3);
    row.set(Metric::TripCount, trips.iter().count() as f64);
    row.set(Metric::TripRequestRate, equilibrator.current_request_rate);
    row.set(Metric::TripPrice, config.price);
    row.set(Metric::TripCompletedCount, taken.trip_completed_count as f64);
    row.set(Metric::TripAwaitingTime, taken.trip_awaiting_total);
    row.set(Metric::TripUnassignedTime, taken.trip_unassigned_total);
    row.set(Metric::TripRidingTime, taken.trip_riding_total);
    row.set(Metric::TripDistance, taken.trip_distance_total);
    row.set(
        Metric::TripForwardDispatchCount,
        taken.trip_forward_dispatch_count as f64,
    );

    history.push(row);

    if let Some(residual) = history.convergence_residual() {
        if let Some(last) = history.latest_mut() {
            last.set(Metric::ConvergenceMaxRmsResidual, residual);
        }
    }
}
