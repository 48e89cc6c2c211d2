//! Per-block snapshot format (engine -> observer) and the emission sink.
//!
//! Snapshot emission is best-effort: a sink that refuses or fails a
//! snapshot must never interrupt the simulation (see the error handling
//! notes in `runner`). `Simulation::next_block` always returns a
//! [`BlockResult`] regardless of whether any sink accepted it.

use serde::{Deserialize, Serialize};

use crate::city::{Direction, Location};
use crate::ecs::{TripPhase, VehiclePhase};
use crate::history::HistoryRow;

/// One vehicle's public state, as rendered on a map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VehicleView {
    pub phase: &'static str,
    pub location: Location,
    pub direction: &'static str,
}

impl VehicleView {
    pub fn new(phase: VehiclePhase, location: Location, direction: Direction) -> Self {
        Self {
            phase: phase.label(),
            location,
            direction: direction_label(direction),
        }
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::North => "NORTH",
        Direction::East => "EAST",
        Direction::South => "SOUTH",
        Direction::West => "WEST",
    }
}

/// One trip's public state. Only non-terminal trips are included, per the
/// snapshot contract -- completed and cancelled trips drop out of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripView {
    pub phase: &'static str,
    pub origin: Location,
    pub destination: Location,
    pub distance: u32,
}

impl TripView {
    pub fn new(phase: TripPhase, origin: Location, destination: Location, distance: u32) -> Self {
        Self {
            phase: phase.label(),
            origin,
            destination,
            distance,
        }
    }
}

/// A single flat `metric_name -> value` row, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRowView {
    pub block: u64,
    pub metrics: std::collections::BTreeMap<&'static str, f64>,
}

impl From<&HistoryRow> for HistoryRowView {
    fn from(row: &HistoryRow) -> Self {
        Self {
            block: row.block,
            metrics: row.as_pairs().into_iter().collect(),
        }
    }
}

/// The per-block result returned from `next_block` and, optionally, handed
/// to a [`SnapshotSink`]. Consumers may copy fields out but must not assume
/// they can mutate the simulation through this value -- it is a read-only
/// view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResult {
    pub name: String,
    pub block: u64,
    pub vehicles: Vec<VehicleView>,
    pub trips: Vec<TripView>,
    pub history_row: Option<HistoryRowView>,
}

/// Receives best-effort snapshot emissions. A sink that returns without
/// accepting the snapshot (e.g. a full channel) never propagates an error
/// back into the tick loop.
pub trait SnapshotSink: Send + Sync {
    fn emit(&mut self, snapshot: &BlockResult);
}

/// A sink that simply drops every snapshot; the default when no observer
/// is attached.
#[derive(Debug, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn emit(&mut self, _snapshot: &BlockResult) {}
}

/// A sink that retains the most recent `capacity` snapshots, for tests and
/// embedders that poll rather than subscribe.
#[derive(Debug, Default)]
pub struct BufferedSink {
    capacity: usize,
    snapshots: std::collections::VecDeque<BlockResult>,
}

impl BufferedSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            snapshots: std::collections::VecDeque::new(),
        }
    }

    pub fn latest(&self) -> Option<&BlockResult> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockResult> {
        self.snapshots.iter()
    }
}

impl SnapshotSink for BufferedSink {
    fn emit(&mut self, snapshot: &BlockResult) {
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_sink_caps_at_capacity() {
        let mut sink = BufferedSink::new(2);
        for block in 0..5u64 {
            sink.emit(&BlockResult {
                name: "run".into(),
                block,
                vehicles: vec![],
                trips: vec![],
                history_row: None,
            });
        }
        assert_eq!(sink.iter().count(), 2);
        assert_eq!(sink.latest().unwrap().block, 4);
    }

    #[test]
    fn null_sink_accepts_and_drops() {
        let mut sink = NullSink;
        sink.emit(&BlockResult {
            name: "run".into(),
            block: 0,
            vehicles: vec![],
            trips: vec![],
            history_row: None,
        });
    }
}
