//! History: a fixed-schema ring buffer of per-block counters plus the two
//! rolling-window views (smoothing, for animation; results, for terminal
//! statistics) that consumers read from it.
//!
//! Mirrors the ring-buffer-with-a-capacity-cap approach used for telemetry
//! snapshots elsewhere in this codebase, but keyed by a fixed metric schema
//! rather than an entity snapshot, and exposes windowed averages instead of
//! a raw history list.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;

/// Stable identifier for one history metric. Order matches the schema; do
/// not reorder without bumping any serialized snapshot format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    VehicleCount,
    VehicleTime,
    VehicleTimeP1,
    VehicleTimeP2,
    VehicleTimeP3,
    TripCount,
    TripRequestRate,
    TripCompletedCount,
    TripAwaitingTime,
    TripUnassignedTime,
    TripRidingTime,
    TripDistance,
    TripPrice,
    TripForwardDispatchCount,
    ConvergenceMaxRmsResidual,
}

pub const METRIC_COUNT: usize = 15;

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::VehicleCount,
        Metric::VehicleTime,
        Metric::VehicleTimeP1,
        Metric::VehicleTimeP2,
        Metric::VehicleTimeP3,
        Metric::TripCount,
        Metric::TripRequestRate,
        Metric::TripCompletedCount,
        Metric::TripAwaitingTime,
        Metric::TripUnassignedTime,
        Metric::TripRidingTime,
        Metric::TripDistance,
        Metric::TripPrice,
        Metric::TripForwardDispatchCount,
        Metric::ConvergenceMaxRmsResidual,
    ];

    /// Stable identifier, as used in the snapshot and terminal-results output.
    pub fn name(self) -> &'static str {
        match self {
            Metric::VehicleCount => "VEHICLE_COUNT",
            Metric::VehicleTime => "VEHICLE_TIME",
            Metric::VehicleTimeP1 => "VEHICLE_TIME_P1",
            Metric::VehicleTimeP2 => "VEHICLE_TIME_P2",
            Metric::VehicleTimeP3 => "VEHICLE_TIME_P3",
            Metric::TripCount => "TRIP_COUNT",
            Metric::TripRequestRate => "TRIP_REQUEST_RATE",
            Metric::TripCompletedCount => "TRIP_COMPLETED_COUNT",
            Metric::TripAwaitingTime => "TRIP_AWAITING_TIME",
            Metric::TripUnassignedTime => "TRIP_UNASSIGNED_TIME",
            Metric::TripRidingTime => "TRIP_RIDING_TIME",
            Metric::TripDistance => "TRIP_DISTANCE",
            Metric::TripPrice => "TRIP_PRICE",
            Metric::TripForwardDispatchCount => "TRIP_FORWARD_DISPATCH_COUNT",
            Metric::ConvergenceMaxRmsResidual => "CONVERGENCE_MAX_RMS_RESIDUAL",
        }
    }
}

/// One block's worth of the fixed schema.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRow {
    pub block: u64,
    values: [f64; METRIC_COUNT],
}

impl HistoryRow {
    pub fn new(block: u64) -> Self {
        Self {
            block,
            values: [0.0; METRIC_COUNT],
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        self.values[metric as usize]
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.values[metric as usize] = value;
    }

    pub fn add(&mut self, metric: Metric, delta: f64) {
        self.values[metric as usize] += delta;
    }

    /// Flat `name -> value` view, e.g. for snapshot serialization.
    pub fn as_pairs(&self) -> Vec<(&'static str, f64)> {
        Metric::ALL.iter().map(|&m| (m.name(), self.get(m))).collect()
    }
}

/// Identities that should hold, within tolerance, over the results window.
#[derive(Debug, Clone, Copy)]
pub struct ValidationIdentities {
    pub p1_fraction: f64,
    pub p2_fraction: f64,
    pub p3_fraction: f64,
    pub phase_fraction_residual: f64,
    pub littles_law_p3_residual: f64,
    pub littles_law_p2_residual: f64,
}

/// Fixed-capacity ring of history rows with windowed-average views.
///
/// Capacity is `max(2 * smoothing_window, results_window)` -- twice the
/// smoothing window because `convergence_residual` compares two consecutive,
/// non-overlapping smoothing windows and needs both retained at once.
/// Pushing past capacity evicts the oldest row. Window queries are O(window)
/// rather than O(1) -- they run at most once per block, not per candidate in
/// a hot loop, so the simplicity is worth it here.
#[derive(Debug, Resource)]
pub struct History {
    capacity: usize,
    smoothing_window: usize,
    results_window: usize,
    rows: VecDeque<HistoryRow>,
}

impl History {
    pub fn new(smoothing_window: usize, results_window: usize) -> Self {
        let smoothing_window = smoothing_window.max(1);
        let results_window = results_window.max(1);
        let capacity = (2 * smoothing_window).max(results_window);
        Self {
            capacity,
            smoothing_window,
            results_window,
            rows: VecDeque::with_capacity(capacity),
        }
    }

    pub fn set_smoothing_window(&mut self, window: usize) {
        self.smoothing_window = window.max(1);
        self.grow_capacity_if_needed();
    }

    pub fn set_results_window(&mut self, window: usize) {
        self.results_window = window.max(1);
        self.grow_capacity_if_needed();
    }

    fn grow_capacity_if_needed(&mut self) {
        self.capacity = self.capacity.max(2 * self.smoothing_window).max(self.results_window);
    }

    pub fn push(&mut self, row: HistoryRow) {
        if self.rows.len() >= self.capacity {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    pub fn latest(&self) -> Option<&HistoryRow> {
        self.rows.back()
    }

    pub fn latest_mut(&mut self) -> Option<&mut HistoryRow> {
        self.rows.back_mut()
    }

    pub fn blocks_recorded(&self) -> usize {
        self.rows.len()
    }

    fn window_average(&self, metric: Metric, window: usize) -> f64 {
        let n = window.min(self.rows.len());
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.rows.iter().rev().take(n).map(|r| r.get(metric)).sum();
        sum / n as f64
    }

    /// Rolling average over the trailing `smoothing_window` blocks.
    pub fn smoothing_average(&self, metric: Metric) -> f64 {
        self.window_average(metric, self.smoothing_window)
    }

    /// Rolling average over the trailing `results_window` blocks.
    pub fn results_average(&self, metric: Metric) -> f64 {
        self.window_average(metric, self.results_window)
    }

    /// RMS residual of the three phase fractions between the current
    /// smoothing window and the one immediately preceding it. `None` until
    /// two full, non-overlapping smoothing windows have been recorded.
    pub fn convergence_residual(&self) -> Option<f64> {
        let w = self.smoothing_window;
        if self.rows.len() < 2 * w {
            return None;
        }
        let recent: Vec<&HistoryRow> = self.rows.iter().rev().take(w).collect();
        let prior: Vec<&HistoryRow> = self.rows.iter().rev().skip(w).take(w).collect();

        let phase_fraction = |rows: &[&HistoryRow], metric: Metric| -> f64 {
            let vehicle_time: f64 = rows.iter().map(|r| r.get(Metric::VehicleTime)).sum();
            if vehicle_time <= 0.0 {
                return 0.0;
            }
            let phase_time: f64 = rows.iter().map(|r| r.get(metric)).sum();
            phase_time / vehicle_time
        };

        let phases = [Metric::VehicleTimeP1, Metric::VehicleTimeP2, Metric::VehicleTimeP3];
        let mut squared_sum = 0.0;
        for phase in phases {
            let residual = phase_fraction(&recent, phase) - phase_fraction(&prior, phase);
            squared_sum += residual * residual;
        }
        Some((squared_sum / phases.len() as f64).sqrt())
    }

    /// Validation identities computed over the results window (see module
    /// docs in `runner` for when this is expected to hold).
    pub fn validation_identities(&self) -> ValidationIdentities {
        let vehicle_time = self.results_average(Metric::VehicleTime).max(f64::EPSILON);
        let p1_fraction = self.results_average(Metric::VehicleTimeP1) / vehicle_time;
        let p2_fraction = self.results_average(Metric::VehicleTimeP2) / vehicle_time;
        let p3_fraction = self.results_average(Metric::VehicleTimeP3) / vehicle_time;

        let n = self.results_average(Metric::VehicleCount);
        let r = self.results_average(Metric::TripRequestRate);
        let completed = self.results_average(Metric::TripCompletedCount).max(f64::EPSILON);
        let mean_trip_length = self.results_average(Metric::TripDistance) / completed;
        let mean_awaiting_time = self.results_average(Metric::TripAwaitingTime) / completed;

        ValidationIdentities {
            p1_fraction,
            p2_fraction,
            p3_fraction,
            phase_fraction_residual: (p1_fraction + p2_fraction + p3_fraction - 1.0).abs(),
            littles_law_p3_residual: (n * p3_fraction) - (r * mean_trip_length),
            littles_law_p2_residual: (n * p2_fraction) - (r * mean_awaiting_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(block: u64, p1: f64, p2: f64, p3: f64) -> HistoryRow {
        let mut r = HistoryRow::new(block);
        r.set(Metric::VehicleCount, p1 + p2 + p3);
        r.set(Metric::VehicleTime, p1 + p2 + p3);
        r.set(Metric::VehicleTimeP1, p1);
        r.set(Metric::VehicleTimeP2, p2);
        r.set(Metric::VehicleTimeP3, p3);
        r
    }

    #[test]
    fn ring_buffer_evicts_oldest_past_capacity() {
        // capacity is max(2 * smoothing_window, results_window) = 4 here.
        let mut history = History::new(2, 2);
        for block in 0..6 {
            history.push(row(block, 1.0, 0.0, 0.0));
        }
        assert_eq!(history.blocks_recorded(), 4);
        assert_eq!(history.latest().unwrap().block, 5);
    }

    #[test]
    fn smoothing_average_tracks_recent_window_only() {
        let mut history = History::new(2, 10);
        history.push(row(0, 10.0, 0.0, 0.0));
        history.push(row(1, 10.0, 0.0, 0.0));
        history.push(row(2, 2.0, 0.0, 0.0));
        history.push(row(3, 2.0, 0.0, 0.0));
        assert_eq!(history.smoothing_average(Metric::VehicleTimeP1), 2.0);
    }

    #[test]
    fn phase_fractions_sum_to_one_in_steady_state() {
        let mut history = History::new(2, 3);
        for block in 0..3 {
            history.push(row(block, 3.0, 2.0, 5.0));
        }
        let identities = history.validation_identities();
        assert!(identities.phase_fraction_residual < 1e-9);
    }

    #[test]
    fn convergence_residual_is_zero_when_stable() {
        let mut history = History::new(3, 10);
        for block in 0..6 {
            history.push(row(block, 3.0, 2.0, 5.0));
        }
        let residual = history.convergence_residual().expect("two full windows recorded");
        assert!(residual < 1e-9);
    }

    #[test]
    fn convergence_residual_is_none_before_two_windows() {
        let mut history = History::new(3, 10);
        history.push(row(0, 1.0, 0.0, 0.0));
        assert!(history.convergence_residual().is_none());
    }
}
