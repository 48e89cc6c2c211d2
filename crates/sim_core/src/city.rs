//! City geometry: a toroidal grid with wrap-around distance and location sampling.
//!
//! Unlike the H3-based geography used for real-road-network markets, the city
//! here is a uniform `C x C` grid with periodic boundary conditions. Distance
//! is L1 ("Manhattan") on the torus, so no location is farther than `C` blocks
//! from any other.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::rng::SimRng;

/// One grid intersection, `0 <= x, y < size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compass direction of travel. Only the axis currently being traversed
/// changes on any single block step; the other coordinate is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step `(dx, dy)` for this direction.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Geometry and demand-shape configuration for the city.
#[derive(Debug, Clone, Copy, Resource)]
pub struct City {
    /// Grid side length. Must be a positive even integer.
    pub size: i32,
    /// Probability mass placed on the central quarter of the city when
    /// sampling origins (and, if enabled, destinations).
    pub inhomogeneity: f64,
    /// Minimum trip distance (inclusive); trips shorter than this are rejected.
    pub min_trip_distance: u32,
    /// Maximum trip distance (inclusive), if any.
    pub max_trip_distance: Option<u32>,
    /// Whether idle (P1) vehicles move between blocks.
    pub idle_vehicles_moving: bool,
    /// When set, destinations are also drawn with center bias (not just origins).
    pub trip_inhomogeneous_destinations: bool,
}

impl Default for City {
    fn default() -> Self {
        Self {
            size: 10,
            inhomogeneity: 0.0,
            min_trip_distance: 0,
            max_trip_distance: None,
            idle_vehicles_moving: true,
            trip_inhomogeneous_destinations: false,
        }
    }
}

/// Maximum rejection-sampling attempts before giving up on a trip distance
/// constraint that cannot be satisfied in a city this small (see impossible
/// geometry in the error handling design).
pub const MAX_DISTANCE_REJECTION_ATTEMPTS: usize = 100;

impl City {
    /// Torus L1 distance between two locations. Symmetric and bounded by `size`.
    pub fn distance(&self, a: Location, b: Location) -> u32 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        let wrap_dx = dx.min(self.size - dx);
        let wrap_dy = dy.min(self.size - dy);
        (wrap_dx + wrap_dy) as u32
    }

    /// Wrap a coordinate back into `[0, size)`.
    fn wrap(&self, v: i32) -> i32 {
        v.rem_euclid(self.size)
    }

    /// Advance one unit from `location` along `direction`, wrapping modulo `size`.
    pub fn step(&self, location: Location, direction: Direction) -> Location {
        let (dx, dy) = direction.step();
        Location::new(self.wrap(location.x + dx), self.wrap(location.y + dy))
    }

    /// Shortest-path length from `origin` to `destination` that respects
    /// `direction`'s axis for its very next step (so a vehicle never has to
    /// perform an immediate U-turn mid-block). Ties between the two
    /// directions on the current axis are broken toward whichever heading
    /// reduces the remaining distance; if the axis is already exhausted
    /// (current coordinate already matches the target on that axis), the
    /// path degrades to the plain torus distance.
    pub fn travel_distance(&self, origin: Location, direction: Direction, destination: Location) -> u32 {
        let (along_origin, along_dest, cross_origin, cross_dest) = match direction {
            Direction::North | Direction::South => (origin.y, destination.y, origin.x, destination.x),
            Direction::East | Direction::West => (origin.x, destination.x, origin.y, destination.y),
        };
        let cross_dx = (cross_origin - cross_dest).abs();
        let cross_distance = cross_dx.min(self.size - cross_dx) as u32;

        if along_origin == along_dest {
            return cross_distance;
        }

        let forward_sign = match direction {
            Direction::North | Direction::East => 1,
            Direction::South | Direction::West => -1,
        };
        let forward_distance = self.wrap((along_dest - along_origin) * forward_sign) as u32;

        // The current heading can only take the forward branch without an
        // immediate reversal, so travel distance along this axis is the
        // forward length, even when reversing would be shorter on the plain
        // torus distance -- that's the whole point of this function.
        forward_distance + cross_distance
    }

    /// Sample a location uniformly, or -- when `center_bias` and
    /// `inhomogeneity > 0` -- with probability `inhomogeneity`, uniformly
    /// from the central square of side `size / 2`.
    pub fn random_location(&self, rng: &mut SimRng, center_bias: bool) -> Location {
        let use_center = center_bias
            && self.inhomogeneity > 0.0
            && rng.unit_interval() < self.inhomogeneity;

        if use_center {
            let quarter = self.size / 2;
            let offset = self.size / 4;
            let x = offset + rng.gen_range_i32(0, quarter);
            let y = offset + rng.gen_range_i32(0, quarter);
            Location::new(self.wrap(x), self.wrap(y))
        } else {
            let x = rng.gen_range_i32(0, self.size);
            let y = rng.gen_range_i32(0, self.size);
            Location::new(x, y)
        }
    }

    /// Sample an origin/destination pair whose distance satisfies
    /// `min_trip_distance..=max_trip_distance`, giving up after a bounded
    /// number of rejection-sampling attempts. Returns `None` when the
    /// constraint is not satisfiable within that budget (impossible
    /// geometry, e.g. a max distance larger than the city supports).
    pub fn sample_trip(&self, rng: &mut SimRng) -> Option<(Location, Location)> {
        for _ in 0..MAX_DISTANCE_REJECTION_ATTEMPTS {
            let origin = self.random_location(rng, true);
            let destination = self.random_location(rng, self.trip_inhomogeneous_destinations);
            let distance = self.distance(origin, destination);
            if distance == 0 {
                continue;
            }
            if distance < self.min_trip_distance {
                continue;
            }
            if let Some(max) = self.max_trip_distance {
                if distance > max {
                    continue;
                }
            }
            return Some((origin, destination));
        }
        None
    }
}
