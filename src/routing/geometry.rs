//! Direction algebra, distances and segment/obstacle intersection tests

use super::types::{Direction, Obstacle, Point};

impl Direction {
    /// Flip by 180 degrees
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Rotate 90 degrees clockwise (`right(North) == East`)
    pub fn right(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// Rotate 90 degrees counter-clockwise
    pub fn left(self) -> Direction {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }
}

/// Directions in which `to` lies relative to `from`.
///
/// Holds at most one vertical and one horizontal member, vertical first.
/// Empty when the points coincide.
pub fn dirns(from: Point, to: Point) -> Vec<Direction> {
    let mut result = Vec::with_capacity(2);
    if to.y < from.y {
        result.push(Direction::North);
    } else if to.y > from.y {
        result.push(Direction::South);
    }
    if to.x > from.x {
        result.push(Direction::East);
    } else if to.x < from.x {
        result.push(Direction::West);
    }
    result
}

/// Direction of travel along an axis-aligned hop, `None` for a zero-length or diagonal hop
pub fn direction_between(from: Point, to: Point) -> Option<Direction> {
    match dirns(from, to).as_slice() {
        [dir] => Some(*dir),
        _ => None,
    }
}

pub fn manhattan_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Whether the axis-aligned segment `a`-`b` passes through the interior of `obstacle`.
///
/// The segment's span along its own axis must overlap the obstacle's span, and its
/// fixed coordinate must lie strictly inside the obstacle's other span. Running along
/// or ending on a boundary is not an intersection.
pub fn segment_intersects(a: Point, b: Point, obstacle: &Obstacle) -> bool {
    let (x1, x2) = (a.x.min(b.x), a.x.max(b.x));
    let (y1, y2) = (a.y.min(b.y), a.y.max(b.y));

    if a.y == b.y {
        let overlaps = x1 < obstacle.right() && x2 > obstacle.x;
        overlaps && a.y > obstacle.y && a.y < obstacle.bottom()
    } else if a.x == b.x {
        let overlaps = y1 < obstacle.bottom() && y2 > obstacle.y;
        overlaps && a.x > obstacle.x && a.x < obstacle.right()
    } else {
        // Diagonal hops never come out of the graph; treat the bounding box conservatively
        x1 < obstacle.right() && x2 > obstacle.x && y1 < obstacle.bottom() && y2 > obstacle.y
    }
}

/// Whether the segment `a`-`b` is clear of every obstacle
pub fn segment_clear(a: Point, b: Point, obstacles: &[Obstacle]) -> bool {
    !obstacles.iter().any(|ob| segment_intersects(a, b, ob))
}

/// Whether a polyline is purely orthogonal
pub fn is_orthogonal(points: &[Point]) -> bool {
    points
        .windows(2)
        .all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_algebra_bijections() {
        for dir in Direction::ALL {
            assert_eq!(dir.reverse().reverse(), dir);
            assert_eq!(dir.left().right(), dir);
            assert_eq!(dir.right().right(), dir.reverse());
        }
        assert_eq!(Direction::North.right(), Direction::East);
        assert_eq!(Direction::North.left(), Direction::West);
    }

    #[test]
    fn test_dirns_diagonal_has_two_members() {
        let from = Point::new(0.0, 0.0);
        assert_eq!(
            dirns(from, Point::new(10.0, -10.0)),
            vec![Direction::North, Direction::East]
        );
        assert_eq!(dirns(from, Point::new(-5.0, 0.0)), vec![Direction::West]);
        assert!(dirns(from, from).is_empty());
    }

    #[test]
    fn test_distances() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, -4.0);
        assert_eq!(manhattan_distance(a, b), 7.0);
        assert_eq!(euclidean_distance(a, b), 5.0);
    }

    #[test]
    fn test_horizontal_segment_through_interior() {
        let ob = Obstacle::new("o", 10.0, 10.0, 20.0, 20.0);
        assert!(segment_intersects(
            Point::new(0.0, 20.0),
            Point::new(40.0, 20.0),
            &ob
        ));
    }

    #[test]
    fn test_boundary_contact_is_not_intersection() {
        let ob = Obstacle::new("o", 10.0, 10.0, 20.0, 20.0);
        // Along the top edge
        assert!(!segment_intersects(
            Point::new(0.0, 10.0),
            Point::new(40.0, 10.0),
            &ob
        ));
        // Ending on the left edge
        assert!(!segment_intersects(
            Point::new(0.0, 20.0),
            Point::new(10.0, 20.0),
            &ob
        ));
        // Along the right edge vertically
        assert!(!segment_intersects(
            Point::new(30.0, 0.0),
            Point::new(30.0, 40.0),
            &ob
        ));
    }

    #[test]
    fn test_vertical_segment_through_interior() {
        let ob = Obstacle::new("o", 10.0, 10.0, 20.0, 20.0);
        assert!(segment_intersects(
            Point::new(15.0, 0.0),
            Point::new(15.0, 12.0),
            &ob
        ));
        assert!(!segment_intersects(
            Point::new(15.0, 0.0),
            Point::new(15.0, 10.0),
            &ob
        ));
    }

    #[test]
    fn test_direction_between() {
        let a = Point::new(0.0, 0.0);
        assert_eq!(
            direction_between(a, Point::new(0.0, 5.0)),
            Some(Direction::South)
        );
        assert_eq!(direction_between(a, Point::new(5.0, 5.0)), None);
        assert_eq!(direction_between(a, a), None);
    }
}
