//! The tick driver: owns a `World` and a `Schedule`, exposes the three
//! operations collaborators are allowed to call (§4.7): `next_block`,
//! `compute_end_state`, `update_options`. Everything else -- impulses,
//! equilibration, snapshot emission -- is composed here, in the fixed order
//! the spec requires, rather than left to the caller.

use bevy_ecs::prelude::{Entity, Schedule, World};

use crate::city::Direction;
use crate::clock::SimulationClock;
use crate::config::{ConfigOverrides, SimulationConfig};
use crate::ecs::{Position, Trip, TripPhase, Vehicle};
use crate::equilibrator::{self, EquilibratorState};
use crate::history::History;
use crate::impulses::ImpulseList;
use crate::results::Results;
use crate::runner;
use crate::snapshot::{BlockResult, HistoryRowView, SnapshotSink, TripView, VehicleView};

/// Owns all simulation state. Observers only ever see [`BlockResult`]
/// snapshots and [`Results`]; nothing here is exposed mutably except through
/// `update_options`, which takes effect at the next block boundary (never
/// mid-tick, per §5's shared-resource policy).
pub struct Simulation {
    world: World,
    schedule: Schedule,
    name: String,
    sink: Box<dyn SnapshotSink>,
}

impl Simulation {
    pub(crate) fn new(world: World, schedule: Schedule, name: String, sink: Box<dyn SnapshotSink>) -> Self {
        Self {
            world,
            schedule,
            name,
            sink,
        }
    }

    /// Attach a snapshot sink. Replaces whatever was attached before
    /// (a [`crate::snapshot::NullSink`] by default).
    pub fn set_sink(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sink = sink;
    }

    /// Index of the block most recently completed (or, before the first
    /// `next_block` call, zero).
    pub fn block(&self) -> u64 {
        self.world.resource::<SimulationClock>().block()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vehicle_count(&mut self) -> usize {
        self.world.query::<&Vehicle>().iter(&self.world).count()
    }

    /// Live config changes (vehicle count, request rate, price, commission,
    /// reservation wage, smoothing window). Applied between blocks, like an
    /// impulse; never read mid-block.
    pub fn update_options(&mut self, overrides: ConfigOverrides) {
        self.apply_overrides(&overrides);
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let price_or_demand_changed = overrides.price.is_some() || overrides.base_demand.is_some();
        self.world.resource_mut::<SimulationConfig>().apply_overrides(overrides);
        if price_or_demand_changed {
            self.recompute_effective_request_rate();
        }
        if let Some(window) = overrides.smoothing_window {
            self.world.resource_mut::<History>().set_smoothing_window(window);
        }
        if let Some(target) = overrides.vehicle_count {
            self.resize_fleet_to(target);
        }
    }

    fn recompute_effective_request_rate(&mut self) {
        let config = *self.world.resource::<SimulationConfig>();
        let rate = equilibrator::effective_request_rate(config.base_demand, config.price, config.demand_elasticity);
        self.world.resource_mut::<EquilibratorState>().current_request_rate = rate;
    }

    /// Grow or shrink the fleet to `target`, the same way equilibration does
    /// (new vehicles idle at random locations; removals prefer P1, never
    /// touching a P2/P3 vehicle, and never dropping below 1 -- see §4.6).
    fn resize_fleet_to(&mut self, target: u32) {
        let target = target.max(1);
        let current = self.vehicle_count() as u32;
        if target > current {
            self.grow_fleet(target - current);
        } else if target < current {
            self.shrink_fleet(current - target);
        }
    }

    fn grow_fleet(&mut self, additional: u32) {
        let city = *self.world.resource::<crate::city::City>();
        for _ in 0..additional {
            let (location, direction) = {
                let mut rng = self.world.resource_mut::<crate::rng::SimRng>();
                let location = city.random_location(&mut rng, false);
                let direction = rng.choose_direction(&Direction::ALL);
                (location, direction)
            };
            let vehicle = self
                .world
                .spawn((Vehicle::new_idle(direction), Position(location)))
                .id();
            self.world.resource_mut::<crate::dispatch::IdleSet>().insert(vehicle);
        }
    }

    fn shrink_fleet(&mut self, removal_target: u32) {
        let candidates: Vec<Entity> = self
            .world
            .resource::<crate::dispatch::IdleSet>()
            .iter()
            .copied()
            .collect();
        let mut removed = 0u32;
        for vehicle in candidates {
            if removed >= removal_target {
                break;
            }
            self.world.despawn(vehicle);
            self.world.resource_mut::<crate::dispatch::IdleSet>().remove(vehicle);
            removed += 1;
        }
    }

    /// Advance exactly one block: apply any impulse scheduled for it, run
    /// the fixed-order schedule, then emit a snapshot if this block falls on
    /// `animate_update_period`.
    pub fn next_block(&mut self) -> BlockResult {
        let block = self.block();

        if let Some(overrides) = self.world.resource::<ImpulseList>().overrides_for_block(block) {
            self.apply_overrides(&overrides);
        }

        runner::run_block(&mut self.world, &mut self.schedule);

        let result = self.snapshot(block);

        let period = self.world.resource::<SimulationConfig>().animate_update_period.max(1);
        if block % period == 0 {
            self.sink.emit(&result);
        }

        result
    }

    fn snapshot(&mut self, block: u64) -> BlockResult {
        let vehicles: Vec<VehicleView> = self
            .world
            .query::<(&Vehicle, &Position)>()
            .iter(&self.world)
            .map(|(vehicle, position)| VehicleView::new(vehicle.phase, position.0, vehicle.direction))
            .collect();

        let trips: Vec<TripView> = self
            .world
            .query::<&Trip>()
            .iter(&self.world)
            .filter(|trip| !trip.phase.is_terminal())
            .map(|trip| TripView::new(trip.phase, trip.origin, trip.destination, trip.distance))
            .collect();

        let history_row = self.world.resource::<History>().latest().map(HistoryRowView::from);

        BlockResult {
            name: self.name.clone(),
            block,
            vehicles,
            trips,
            history_row,
        }
    }

    /// Average over the trailing `results_window` blocks: the validation
    /// identities and convergence metric collaborators read at the end of a
    /// run (§4.7).
    pub fn compute_end_state(&self) -> Results {
        Results::from_history(self.world.resource::<History>(), self.block())
    }
}
