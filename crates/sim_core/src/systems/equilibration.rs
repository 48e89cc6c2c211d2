//! Equilibration: periodic demand/supply adjustment, run every
//! `equilibration_interval` blocks when enabled.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::city::{City, Direction};
use crate::config::{EquilibrationMode, SimulationConfig};
use crate::dispatch::IdleSet;
use crate::ecs::{Position, Vehicle};
use crate::equilibrator::{self, EquilibratorState, SupplyAdjustment};
use crate::history::{History, Metric};
use crate::rng::SimRng;

pub fn run_equilibration_system(
    mut commands: Commands,
    config: Res<SimulationConfig>,
    city: Res<City>,
    history: Res<History>,
    mut rng: ResMut<SimRng>,
    mut equilibrator_state: ResMut<EquilibratorState>,
    mut idle_set: ResMut<IdleSet>,
    vehicles: Query<&Vehicle>,
) {
    if config.equilibrate == EquilibrationMode::None {
        return;
    }

    equilibrator_state.current_request_rate =
        equilibrator::effective_request_rate(config.base_demand, config.price, config.demand_elasticity);

    let vehicle_count = vehicles.iter().count() as u32;
    if vehicle_count == 0 {
        return;
    }

    let vehicle_time = history.smoothing_average(Metric::VehicleTime).max(f64::EPSILON);
    let p3_fraction = history.smoothing_average(Metric::VehicleTimeP3) / vehicle_time;
    let utility = equilibrator::driver_utility(
        config.price,
        p3_fraction,
        config.platform_commission,
        config.reservation_wage,
    );

    match equilibrator::supply_adjustment(utility, vehicle_count) {
        SupplyAdjustment::Add(delta) => {
            for _ in 0..delta {
                let location = city.random_location(&mut rng, false);
                let direction = rng.choose_direction(&Direction::ALL);
                let vehicle = commands
                    .spawn((Vehicle::new_idle(direction), Position(location)))
                    .id();
                idle_set.insert(vehicle);
            }
        }
        SupplyAdjustment::Remove(delta) => {
            let mut removed = 0u32;
            let candidates: Vec<_> = idle_set.iter().copied().collect();
            for vehicle in candidates {
                if removed >= delta {
                    break;
                }
                commands.entity(vehicle).despawn();
                idle_set.remove(vehicle);
                removed += 1;
            }
            // Never touch P2/P3 vehicles even if the damped delta asked for
            // more removals than the idle set could supply.
        }
        SupplyAdjustment::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::Location;
    use bevy_ecs::prelude::World;
    use bevy_ecs::schedule::Schedule;

    fn base_world() -> World {
        let mut world = World::new();
        world.insert_resource(SimulationConfig::default());
        world.insert_resource(City::default());
        world.insert_resource(SimRng::from_seed(1));
        world.insert_resource(EquilibratorState::new(0.2));
        world.insert_resource(IdleSet::default());
        world.insert_resource(History::new(3, 3));
        world
    }

    #[test]
    fn disabled_equilibration_leaves_fleet_untouched() {
        let mut world = base_world();
        world.resource_mut::<SimulationConfig>().equilibrate = EquilibrationMode::None;
        world.spawn((Vehicle::new_idle(crate::city::Direction::North), Position(Location::new(0, 0))));

        let mut schedule = Schedule::default();
        schedule.add_systems(run_equilibration_system);
        schedule.run(&mut world);

        assert_eq!(world.query::<&Vehicle>().iter(&world).count(), 1);
    }

    #[test]
    fn high_utility_grows_the_fleet() {
        let mut world = base_world();
        {
            let mut config = world.resource_mut::<SimulationConfig>();
            config.equilibrate = EquilibrationMode::Price;
            config.price = 5.0;
            config.platform_commission = 0.0;
            config.reservation_wage = 0.0;
        }
        for _ in 0..10 {
            let vehicle = world
                .spawn((Vehicle::new_idle(crate::city::Direction::North), Position(Location::new(0, 0))))
                .id();
            world.resource_mut::<IdleSet>().insert(vehicle);
        }
        let mut history = History::new(3, 3);
        for block in 0..3u64 {
            let mut row = crate::history::HistoryRow::new(block);
            row.set(Metric::VehicleTime, 10.0);
            row.set(Metric::VehicleTimeP3, 8.0);
            history.push(row);
        }
        world.insert_resource(history);

        let before = world.query::<&Vehicle>().iter(&world).count();
        let mut schedule = Schedule::default();
        schedule.add_systems(run_equilibration_system);
        schedule.run(&mut world);
        let after = world.query::<&Vehicle>().iter(&world).count();
        assert!(after > before);
    }
}
