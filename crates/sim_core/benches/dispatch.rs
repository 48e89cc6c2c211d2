//! Performance benchmarks for the dispatch policy and the full block tick,
//! mirroring the teacher's `performance.rs` shape: one group per concern, a
//! handful of scenario sizes each.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sim_core::city::{City, Direction, Location};
use sim_core::config::SimulationConfig;
use sim_core::dispatch::nearest::NearestAvailable;
use sim_core::dispatch::policy::{DispatchPolicy, IdleVehicle, PendingTrip};
use sim_core::scenario::build_simulation;

fn bench_nearest_available(c: &mut Criterion) {
    let city = City {
        size: 64,
        ..City::default()
    };
    let policy = NearestAvailable;

    let mut group = c.benchmark_group("nearest_available_dispatch");
    for &(idle, pending) in &[(50usize, 20usize), (500, 200), (2000, 800)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{idle}idle_{pending}pending")),
            &(idle, pending),
            |b, &(idle, pending)| {
                let mut world = bevy_ecs::prelude::World::new();
                let idle_vehicles: Vec<IdleVehicle> = (0..idle)
                    .map(|i| IdleVehicle {
                        vehicle: world.spawn_empty().id(),
                        location: Location::new((i as i32 * 7) % city.size, (i as i32 * 13) % city.size),
                        direction: Direction::North,
                    })
                    .collect();
                let pending_trips: Vec<PendingTrip> = (0..pending)
                    .map(|i| PendingTrip {
                        trip: world.spawn_empty().id(),
                        origin: Location::new((i as i32 * 3) % city.size, (i as i32 * 17) % city.size),
                    })
                    .collect();

                b.iter(|| black_box(policy.assign(&city, &pending_trips, &idle_vehicles)));
            },
        );
    }
    group.finish();
}

fn bench_block_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_block_tick");
    for &(vehicles, demand) in &[(50u32, 1.0f64), (500, 10.0), (2000, 40.0)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{vehicles}vehicles")),
            &(vehicles, demand),
            |b, &(vehicles, demand)| {
                let config = SimulationConfig {
                    city_size: 64,
                    vehicle_count: vehicles,
                    base_demand: demand,
                    random_number_seed: Some(42),
                    results_window: 50,
                    smoothing_window: 20,
                    ..SimulationConfig::default()
                };
                let mut sim = build_simulation(config).expect("valid config");
                // Warm up the fleet so most vehicles are dispatched/riding by
                // the time the timed loop starts, matching steady-state cost.
                for _ in 0..100 {
                    sim.next_block();
                }
                b.iter(|| black_box(sim.next_block()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_nearest_available, bench_block_tick);
criterion_main!(benches);
