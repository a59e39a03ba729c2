//! Connection point resolution between two shapes

use super::geometry::euclidean_distance;
use super::types::{Direction, Obstacle, Point};

/// The chosen attachment sides and points for a connector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    /// Side of the source shape the connector leaves from
    pub source_dir: Direction,
    /// Side of the target shape the connector enters through
    pub target_dir: Direction,
    pub start: Point,
    pub end: Point,
}

/// Pick the side-midpoint pair with the smallest Euclidean distance.
///
/// All 16 side combinations are tried in `Direction::ALL` order; the first minimum wins.
pub fn resolve_anchors(source: &Obstacle, target: &Obstacle) -> AnchorPair {
    let candidates = Direction::ALL.iter().flat_map(|&source_dir| {
        Direction::ALL.iter().map(move |&target_dir| {
            let start = source.side_midpoint(source_dir);
            let end = target.side_midpoint(target_dir);
            AnchorPair {
                source_dir,
                target_dir,
                start,
                end,
            }
        })
    });

    let mut best = AnchorPair {
        source_dir: Direction::North,
        target_dir: Direction::North,
        start: source.side_midpoint(Direction::North),
        end: target.side_midpoint(Direction::North),
    };
    let mut best_distance = f64::INFINITY;
    for pair in candidates {
        let distance = euclidean_distance(pair.start, pair.end);
        if distance < best_distance {
            best_distance = distance;
            best = pair;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_by_side_uses_facing_sides() {
        let a = Obstacle::new("a", 0.0, 0.0, 100.0, 60.0);
        let b = Obstacle::new("b", 300.0, 0.0, 100.0, 60.0);
        let pair = resolve_anchors(&a, &b);
        assert_eq!(pair.source_dir, Direction::East);
        assert_eq!(pair.target_dir, Direction::West);
        assert_eq!(pair.start, Point::new(100.0, 30.0));
        assert_eq!(pair.end, Point::new(300.0, 30.0));
    }

    #[test]
    fn test_stacked_uses_bottom_to_top() {
        let a = Obstacle::new("a", 0.0, 0.0, 50.0, 50.0);
        let b = Obstacle::new("b", 0.0, 200.0, 50.0, 50.0);
        let pair = resolve_anchors(&a, &b);
        assert_eq!(pair.source_dir, Direction::South);
        assert_eq!(pair.target_dir, Direction::North);
    }

    #[test]
    fn test_reversed_order() {
        let a = Obstacle::new("a", 300.0, 0.0, 100.0, 60.0);
        let b = Obstacle::new("b", 0.0, 0.0, 100.0, 60.0);
        let pair = resolve_anchors(&a, &b);
        assert_eq!(pair.source_dir, Direction::West);
        assert_eq!(pair.target_dir, Direction::East);
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        // Identical shapes: every side pairs with itself at distance zero, North first
        let a = Obstacle::new("a", 0.0, 0.0, 40.0, 40.0);
        let pair = resolve_anchors(&a, &a.clone());
        assert_eq!(pair.source_dir, Direction::North);
        assert_eq!(pair.target_dir, Direction::North);
    }
}
