//! Core types for the routing engine

use serde::Deserialize;

/// A 2D point in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move this point `distance` units in `dir`
    pub fn offset(&self, dir: Direction, distance: f64) -> Point {
        let (dx, dy) = dir.unit();
        Point::new(self.x + dx * distance, self.y + dy * distance)
    }
}

/// Cardinal direction of travel or of a shape side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "n", alias = "top")]
    North,
    #[serde(alias = "s", alias = "bottom")]
    South,
    #[serde(alias = "e", alias = "right")]
    East,
    #[serde(alias = "w", alias = "left")]
    West,
}

impl Direction {
    /// All directions in enumeration order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Unit step for this direction in screen space
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::North => (0.0, -1.0),
            Direction::South => (0.0, 1.0),
            Direction::East => (1.0, 0.0),
            Direction::West => (-1.0, 0.0),
        }
    }
}

/// An axis-aligned rectangular obstacle, snapshotted from the caller's shape store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Obstacle {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Obstacle {
    pub fn new(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Midpoint of the side facing `dir`
    pub fn side_midpoint(&self, dir: Direction) -> Point {
        match dir {
            Direction::North => Point::new(self.x + self.width / 2.0, self.y),
            Direction::South => Point::new(self.x + self.width / 2.0, self.bottom()),
            Direction::West => Point::new(self.x, self.y + self.height / 2.0),
            Direction::East => Point::new(self.right(), self.y + self.height / 2.0),
        }
    }

    /// The four corners, clockwise from top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// Geometry is finite and non-negative in size
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}
