//! Post-search clean-up of routes: obstacle clearance, then redundant point removal

use super::geometry::{direction_between, segment_clear};
use super::types::{Obstacle, Point};

/// Nudge segments away from obstacle edges, then simplify
pub fn refine_route(route: &[Point], obstacles: &[Obstacle], clearance: f64) -> Vec<Point> {
    simplify(&nudge_segments(route, obstacles, clearance))
}

/// Move interior segments that run within `clearance` of an obstacle edge out to
/// `edge ± clearance`.
///
/// Both endpoints of a moved segment move with it, so the neighboring segments stretch
/// or shrink and the route keeps its bend count. The first and last points never move.
/// A move is skipped if it would cut through an obstacle or turn a neighboring segment
/// around.
pub fn nudge_segments(route: &[Point], obstacles: &[Obstacle], clearance: f64) -> Vec<Point> {
    let mut out = simplify(route);
    if out.len() < 4 || clearance <= 0.0 {
        return out;
    }

    for i in 1..out.len() - 2 {
        let (a, b) = (out[i], out[i + 1]);
        let Some((a2, b2)) = shifted_segment(a, b, obstacles, clearance) else {
            continue;
        };
        let (before, after) = (out[i - 1], out[i + 2]);
        let keeps_heading = direction_between(before, a) == direction_between(before, a2)
            && direction_between(b, after) == direction_between(b2, after);
        if keeps_heading
            && segment_clear(before, a2, obstacles)
            && segment_clear(a2, b2, obstacles)
            && segment_clear(b2, after, obstacles)
        {
            out[i] = a2;
            out[i + 1] = b2;
        }
    }

    out
}

/// The replacement for segment `a`-`b` driven by the closest edge within clearance
fn shifted_segment(
    a: Point,
    b: Point,
    obstacles: &[Obstacle],
    clearance: f64,
) -> Option<(Point, Point)> {
    if a == b {
        return None;
    }

    if a.y == b.y {
        let (x1, x2) = (a.x.min(b.x), a.x.max(b.x));
        let y = a.y;
        let target = closest_shift(
            obstacles
                .iter()
                .filter(|ob| x1 < ob.right() && x2 > ob.x)
                .map(|ob| (ob.y, ob.bottom())),
            y,
            clearance,
        )?;
        Some((Point::new(a.x, target), Point::new(b.x, target)))
    } else if a.x == b.x {
        let (y1, y2) = (a.y.min(b.y), a.y.max(b.y));
        let x = a.x;
        let target = closest_shift(
            obstacles
                .iter()
                .filter(|ob| y1 < ob.bottom() && y2 > ob.y)
                .map(|ob| (ob.x, ob.right())),
            x,
            clearance,
        )?;
        Some((Point::new(target, a.y), Point::new(target, b.y)))
    } else {
        None
    }
}

/// Given obstacle spans `(low, high)` across the segment's axis, the coordinate the
/// segment at `at` should move to, if any edge is closer than `clearance`.
fn closest_shift(
    spans: impl Iterator<Item = (f64, f64)>,
    at: f64,
    clearance: f64,
) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for (low, high) in spans {
        let candidate = if at <= low && low - at < clearance {
            Some((low - at, low - clearance))
        } else if at >= high && at - high < clearance {
            Some((at - high, high + clearance))
        } else {
            None
        };
        if let Some((distance, target)) = candidate {
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, target));
            }
        }
    }
    best.map(|(_, target)| target)
}

/// Drop duplicate points and points lying on a straight run between their neighbors.
///
/// Runs to a fixed point, so simplifying twice changes nothing.
pub fn simplify(route: &[Point]) -> Vec<Point> {
    let mut current = route.to_vec();
    loop {
        let next = simplify_pass(&current);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn simplify_pass(route: &[Point]) -> Vec<Point> {
    if route.len() <= 2 {
        return route.to_vec();
    }

    let mut out: Vec<Point> = Vec::with_capacity(route.len());
    out.push(route[0]);
    for i in 1..route.len() - 1 {
        let prev = out[out.len() - 1];
        let cur = route[i];
        let next = route[i + 1];
        if cur == prev {
            continue;
        }
        let collinear =
            (prev.x == cur.x && cur.x == next.x) || (prev.y == cur.y && cur.y == next.y);
        if !collinear {
            out.push(cur);
        }
    }

    let end = route[route.len() - 1];
    if out.len() > 1 && out[out.len() - 1] == end {
        out.pop();
    }
    out.push(end);
    out
}
