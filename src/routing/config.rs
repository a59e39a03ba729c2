//! Configuration for the routing engine

use std::time::Duration;

use serde::Deserialize;

use super::types::Direction;

/// Default bend penalty, in length units per bend
pub const DEFAULT_BEND_PENALTY: f64 = 50.0;

/// Engine-wide tuning knobs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Distance of the first nudge node from its anchor
    pub nudge_distance: f64,

    /// Minimum distance the refiner keeps between route segments and obstacle edges
    pub clearance: f64,

    /// Manhattan radius within which nudge nodes are joined to graph nodes
    pub connection_radius: f64,

    /// Hard cap on A* expansions before falling back to a straight connector
    pub max_iterations: usize,

    /// How long a cached visibility graph stays valid
    #[serde(with = "seconds")]
    pub cache_ttl: Duration,

    /// Maximum number of cached visibility graphs
    pub cache_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            nudge_distance: 10.0,
            clearance: 10.0,
            connection_radius: 600.0,
            max_iterations: 10_000,
            cache_ttl: Duration::from_secs(5),
            cache_capacity: 10,
        }
    }
}

impl RouterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first nudge distance
    pub fn with_nudge_distance(mut self, distance: f64) -> Self {
        self.nudge_distance = distance;
        self
    }

    /// Set the refiner clearance
    pub fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// Set the synthetic connection radius
    pub fn with_connection_radius(mut self, radius: f64) -> Self {
        self.connection_radius = radius;
        self
    }

    /// Set the A* iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the cache time-to-live
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// Per-call routing options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    /// Direction the route leaves the start anchor
    pub start_dir: Direction,
    /// Side of the target the route enters through
    pub end_dir: Direction,
    pub bend_penalty: f64,
    /// Run the nudging and simplification passes
    pub refine: bool,
    pub use_cache: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            start_dir: Direction::East,
            end_dir: Direction::West,
            bend_penalty: DEFAULT_BEND_PENALTY,
            refine: true,
            use_cache: true,
        }
    }
}

impl RouteOptions {
    /// Set the start and end directions
    pub fn with_directions(mut self, start_dir: Direction, end_dir: Direction) -> Self {
        self.start_dir = start_dir;
        self.end_dir = end_dir;
        self
    }

    pub fn with_bend_penalty(mut self, penalty: f64) -> Self {
        self.bend_penalty = penalty;
        self
    }

    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
