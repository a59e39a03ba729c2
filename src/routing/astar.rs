//! Direction-aware A* search over the visibility graph
//!
//! The search state is `(node, entry direction)` but the closed set is keyed by node
//! alone: once a node has been expanded from any direction, later arrivals are
//! discarded. This keeps the state count linear in the graph size at the price of
//! per-direction optimality, and it fixes the tie-breaking the router's output
//! depends on.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::config::RouterConfig;
use super::error::{Endpoint, RoutingError};
use super::geometry::{dirns, manhattan_distance, segment_clear};
use super::types::{Direction, Obstacle, Point};
use super::visibility::{NodeId, OrthogonalVisibilityGraph};

/// Everything the pathfinder needs to know about one connector
#[derive(Debug, Clone, Copy)]
pub struct PathRequest<'a> {
    pub start: Point,
    pub end: Point,
    pub start_dir: Direction,
    pub end_dir: Direction,
    pub obstacles: &'a [Obstacle],
    pub bend_penalty: f64,
}

/// Synthetic waypoints off an anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    /// Fixed distance off the anchor
    pub inner: Point,
    /// Where the route joins the graph; equal to `inner` when there is no room for more
    pub outer: Point,
}

/// Place the nudge nodes for an anchor leaving in `dir`.
///
/// The outer node sits halfway to `toward` along `dir` when that is further than the
/// nudge distance, pulled back to keep `distance` clear of any obstacle ahead.
pub fn nudge_points(
    anchor: Point,
    dir: Direction,
    toward: Point,
    obstacles: &[Obstacle],
    distance: f64,
) -> Nudge {
    let inner = anchor.offset(dir, distance);
    let (ux, uy) = dir.unit();
    let gap = (toward.x - anchor.x) * ux + (toward.y - anchor.y) * uy;

    let mut reach = gap / 2.0;
    if reach <= distance {
        return Nudge {
            inner,
            outer: inner,
        };
    }

    for ob in obstacles {
        let in_lane = match dir {
            Direction::East | Direction::West => anchor.y > ob.y && anchor.y < ob.bottom(),
            Direction::North | Direction::South => anchor.x > ob.x && anchor.x < ob.right(),
        };
        if !in_lane {
            continue;
        }
        let entry = match dir {
            Direction::East => ob.x - anchor.x,
            Direction::West => anchor.x - ob.right(),
            Direction::South => ob.y - anchor.y,
            Direction::North => anchor.y - ob.bottom(),
        };
        if entry > 0.0 && entry < reach + distance {
            reach = reach.min(entry - distance);
        }
    }

    let outer = if reach > distance {
        anchor.offset(dir, reach)
    } else {
        inner
    };
    Nudge { inner, outer }
}

/// Estimated bends still needed when travelling `dir` at `pos` to arrive at `goal`
/// travelling `goal_dir`.
pub fn estimate_bends(dir: Direction, pos: Point, goal: Point, goal_dir: Direction) -> u32 {
    let toward = dirns(pos, goal);
    let aligned = toward.as_slice() == [dir];

    if dir == goal_dir {
        if aligned || toward.is_empty() {
            0
        } else {
            2
        }
    } else if dir == goal_dir.reverse() {
        if aligned {
            4
        } else {
            2
        }
    } else if toward.contains(&dir) {
        1
    } else {
        3
    }
}

/// Search bookkeeping returned to debugging callers
#[derive(Debug, Clone, Default)]
pub struct SearchTrace {
    /// Nodes in the order they were popped, the goal included
    pub visited: Vec<Point>,
    pub iterations: usize,
    /// The graph that was searched, synthetic nodes included
    pub graph: Option<OrthogonalVisibilityGraph>,
    /// Whether the returned route is a fallback
    pub fell_back: bool,
    record: bool,
}

impl SearchTrace {
    /// A trace that records visited nodes and the searched graph
    pub fn recording() -> Self {
        Self {
            record: true,
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.record
    }

    /// Forget everything recorded so far, keeping the recording mode
    pub fn restart(&mut self) {
        *self = Self {
            record: self.record,
            ..Self::default()
        };
    }
}

/// One step of the search, stored in an arena and linked to its parent by index
#[derive(Debug, Clone, Copy)]
struct SearchState {
    node: NodeId,
    entry: Direction,
    length: f64,
    bends: u32,
    parent: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    cost: f64,
    seq: usize,
    state: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior, earlier pushes first on ties
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Route through `graph` (a private copy) from `request.start` to `request.end`.
///
/// Returns `[start, inner start nudge, ..search path.., inner end nudge, end]`.
pub fn find_path(
    mut graph: OrthogonalVisibilityGraph,
    request: &PathRequest<'_>,
    config: &RouterConfig,
    trace: &mut SearchTrace,
) -> Result<Vec<Point>, RoutingError> {
    let distance = config.nudge_distance;
    let start_nudge = nudge_points(
        request.start,
        request.start_dir,
        request.end,
        request.obstacles,
        distance,
    );
    let end_nudge = nudge_points(
        request.end,
        request.end_dir,
        request.start,
        request.obstacles,
        distance,
    );

    let start_candidates = graph.nodes_within(start_nudge.outer, config.connection_radius);
    let mut end_candidates = graph.nodes_within(end_nudge.outer, config.connection_radius);

    let start_inner = graph.add_node(start_nudge.inner);
    let start_outer = graph.add_node(start_nudge.outer);
    graph.add_edge(start_inner, start_outer);
    connect_node(&mut graph, start_outer, &start_candidates, request.obstacles);

    let end_inner = graph.add_node(end_nudge.inner);
    let end_outer = graph.add_node(end_nudge.outer);
    graph.add_edge(end_outer, end_inner);
    end_candidates.push(start_outer);
    connect_node(&mut graph, end_outer, &end_candidates, request.obstacles);

    if start_outer != end_outer {
        if graph.edges_from(start_outer).iter().all(|e| e.to == start_inner) {
            return Err(RoutingError::disconnected(Endpoint::Start));
        }
        if graph.edges_from(end_outer).iter().all(|e| e.to == end_inner) {
            return Err(RoutingError::disconnected(Endpoint::End));
        }
    }

    tracing::trace!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "searching visibility graph"
    );

    let search = Search {
        graph: &graph,
        goal: end_outer,
        goal_point: end_nudge.outer,
        goal_dir: request.end_dir.reverse(),
        end: request.end,
        bend_penalty: request.bend_penalty,
        max_iterations: config.max_iterations,
    };
    let result = search.run(start_outer, request.start_dir, trace);
    if trace.is_recording() {
        trace.graph = Some(graph.clone());
    }
    let path = result?;

    let mut route = Vec::with_capacity(path.len() + 4);
    route.push(request.start);
    route.push(start_nudge.inner);
    route.extend(path);
    route.push(end_nudge.inner);
    route.push(request.end);
    route.dedup();
    Ok(route)
}

/// Join `id` to each candidate with the L-shaped hops that clear every obstacle
fn connect_node(
    graph: &mut OrthogonalVisibilityGraph,
    id: NodeId,
    candidates: &[NodeId],
    obstacles: &[Obstacle],
) {
    let Some(from) = graph.node(id).map(|n| n.point()) else {
        return;
    };

    for &candidate in candidates {
        if candidate == id {
            continue;
        }
        let Some(to) = graph.node(candidate).map(|n| n.point()) else {
            continue;
        };

        // Horizontal first, then vertical first
        for corner in [Point::new(to.x, from.y), Point::new(from.x, to.y)] {
            if segment_clear(from, corner, obstacles) && segment_clear(corner, to, obstacles) {
                let corner_id = graph.add_node(corner);
                graph.add_bidirectional_edge(id, corner_id);
                graph.add_bidirectional_edge(corner_id, candidate);
            }
        }
    }
}

struct Search<'g> {
    graph: &'g OrthogonalVisibilityGraph,
    goal: NodeId,
    goal_point: Point,
    goal_dir: Direction,
    end: Point,
    bend_penalty: f64,
    max_iterations: usize,
}

impl Search<'_> {
    fn heuristic(&self, dir: Direction, pos: Point) -> f64 {
        let bends = estimate_bends(dir, pos, self.goal_point, self.goal_dir);
        manhattan_distance(pos, self.end) + f64::from(bends) * self.bend_penalty
    }

    fn run(
        &self,
        start: NodeId,
        start_dir: Direction,
        trace: &mut SearchTrace,
    ) -> Result<Vec<Point>, RoutingError> {
        let mut arena: Vec<SearchState> = Vec::new();
        let mut open = BinaryHeap::new();
        let mut closed: HashSet<NodeId> = HashSet::new();

        let start_point = start.point();
        arena.push(SearchState {
            node: start,
            entry: start_dir,
            length: 0.0,
            bends: 0,
            parent: None,
        });
        open.push(OpenEntry {
            cost: self.heuristic(start_dir, start_point),
            seq: 0,
            state: 0,
        });

        let mut iterations = 0;
        while let Some(OpenEntry { state: index, .. }) = open.pop() {
            let state = arena[index];
            if closed.contains(&state.node) {
                continue;
            }
            if trace.is_recording() {
                trace.visited.push(state.node.point());
            }
            if state.node == self.goal {
                trace.iterations = iterations;
                tracing::debug!(iterations, bends = state.bends, "path found");
                return Ok(self.reconstruct(&arena, index));
            }
            if iterations >= self.max_iterations {
                trace.iterations = iterations;
                return Err(RoutingError::IterationLimit {
                    limit: self.max_iterations,
                });
            }
            iterations += 1;
            closed.insert(state.node);

            for edge in self.graph.edges_from(state.node) {
                if closed.contains(&edge.to) {
                    continue;
                }
                let Some(target) = self.graph.node(edge.to) else {
                    continue;
                };
                let length = state.length + edge.length;
                let bends = state.bends + u32::from(edge.direction != state.entry);
                let cost = length
                    + f64::from(bends) * self.bend_penalty
                    + self.heuristic(edge.direction, target.point());

                arena.push(SearchState {
                    node: edge.to,
                    entry: edge.direction,
                    length,
                    bends,
                    parent: Some(index),
                });
                open.push(OpenEntry {
                    cost,
                    seq: arena.len() - 1,
                    state: arena.len() - 1,
                });
            }
        }

        trace.iterations = iterations;
        Err(RoutingError::NoPath { iterations })
    }

    fn reconstruct(&self, arena: &[SearchState], mut index: usize) -> Vec<Point> {
        let mut path = Vec::new();
        loop {
            let state = &arena[index];
            path.push(state.node.point());
            match state.parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::geometry::is_orthogonal;
    use crate::routing::visibility::build_visibility_graph;

    fn request<'a>(
        start: Point,
        end: Point,
        start_dir: Direction,
        end_dir: Direction,
        obstacles: &'a [Obstacle],
    ) -> PathRequest<'a> {
        PathRequest {
            start,
            end,
            start_dir,
            end_dir,
            obstacles,
            bend_penalty: 50.0,
        }
    }

    #[test]
    fn test_estimate_bends_table() {
        let pos = Point::new(0.0, 0.0);
        // Heading east with the goal straight ahead, arriving east
        assert_eq!(
            estimate_bends(Direction::East, pos, Point::new(10.0, 0.0), Direction::East),
            0
        );
        // Heading east, must arrive south, goal is to the south-east
        assert_eq!(
            estimate_bends(Direction::East, pos, Point::new(10.0, 10.0), Direction::South),
            1
        );
        // Heading east, must arrive east, goal is offset
        assert_eq!(
            estimate_bends(Direction::East, pos, Point::new(10.0, 10.0), Direction::East),
            2
        );
        // Heading east, must arrive south, goal is behind
        assert_eq!(
            estimate_bends(Direction::East, pos, Point::new(-10.0, 10.0), Direction::South),
            3
        );
        // Heading east, must arrive west, goal straight ahead
        assert_eq!(
            estimate_bends(Direction::East, pos, Point::new(10.0, 0.0), Direction::West),
            4
        );
    }

    #[test]
    fn test_nudge_halfway_when_room() {
        let nudge = nudge_points(
            Point::new(100.0, 30.0),
            Direction::East,
            Point::new(300.0, 30.0),
            &[],
            10.0,
        );
        assert_eq!(nudge.inner, Point::new(110.0, 30.0));
        assert_eq!(nudge.outer, Point::new(200.0, 30.0));
    }

    #[test]
    fn test_nudge_stops_before_obstacle() {
        let middle = [Obstacle::new("m", 150.0, 0.0, 50.0, 60.0)];
        let nudge = nudge_points(
            Point::new(100.0, 30.0),
            Direction::East,
            Point::new(300.0, 30.0),
            &middle,
            10.0,
        );
        assert_eq!(nudge.outer, Point::new(140.0, 30.0));
    }

    #[test]
    fn test_nudge_pointing_away_has_single_node() {
        let nudge = nudge_points(
            Point::new(50.0, 0.0),
            Direction::North,
            Point::new(350.0, 100.0),
            &[],
            10.0,
        );
        assert_eq!(nudge.inner, Point::new(50.0, -10.0));
        assert_eq!(nudge.outer, nudge.inner);
    }

    #[test]
    fn test_empty_graph_links_the_nudges() {
        let route = find_path(
            OrthogonalVisibilityGraph::new(),
            &request(
                Point::new(0.0, 0.0),
                Point::new(200.0, 100.0),
                Direction::East,
                Direction::North,
                &[],
            ),
            &RouterConfig::default(),
            &mut SearchTrace::default(),
        )
        .unwrap();
        assert_eq!(route.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(route.last(), Some(&Point::new(200.0, 100.0)));
        assert!(is_orthogonal(&route));
        assert!(route.contains(&Point::new(200.0, 0.0)));
    }

    #[test]
    fn test_detour_avoids_middle_obstacle() {
        let obstacles = vec![
            Obstacle::new("a", 0.0, 0.0, 100.0, 60.0),
            Obstacle::new("m", 150.0, 0.0, 50.0, 60.0),
            Obstacle::new("b", 300.0, 0.0, 100.0, 60.0),
        ];
        let graph = build_visibility_graph(&obstacles);
        let route = find_path(
            graph,
            &request(
                Point::new(100.0, 30.0),
                Point::new(300.0, 30.0),
                Direction::East,
                Direction::West,
                &obstacles,
            ),
            &RouterConfig::default(),
            &mut SearchTrace::default(),
        )
        .unwrap();
        assert!(is_orthogonal(&route));
        assert!(route.windows(2).all(|w| segment_clear(w[0], w[1], &obstacles)));
        assert!(route.iter().any(|p| p.y <= 0.0 || p.y >= 60.0));
    }

    #[test]
    fn test_iteration_cap() {
        let obstacles = vec![
            Obstacle::new("a", 0.0, 0.0, 100.0, 60.0),
            Obstacle::new("m", 150.0, 0.0, 50.0, 60.0),
            Obstacle::new("b", 300.0, 0.0, 100.0, 60.0),
        ];
        let graph = build_visibility_graph(&obstacles);
        let mut trace = SearchTrace::default();
        let result = find_path(
            graph,
            &request(
                Point::new(100.0, 30.0),
                Point::new(300.0, 30.0),
                Direction::East,
                Direction::West,
                &obstacles,
            ),
            &RouterConfig::default().with_max_iterations(1),
            &mut trace,
        );
        assert_eq!(result, Err(RoutingError::IterationLimit { limit: 1 }));
        assert_eq!(trace.iterations, 1);
    }

    #[test]
    fn test_restart_keeps_recording_mode() {
        let mut trace = SearchTrace::recording();
        trace.iterations = 7;
        trace.fell_back = true;
        trace.visited.push(Point::new(1.0, 2.0));
        trace.restart();
        assert!(trace.is_recording());
        assert_eq!(trace.iterations, 0);
        assert!(!trace.fell_back);
        assert!(trace.visited.is_empty());
    }

    #[test]
    fn test_recording_trace_keeps_graph() {
        let mut trace = SearchTrace::recording();
        find_path(
            OrthogonalVisibilityGraph::new(),
            &request(
                Point::new(0.0, 0.0),
                Point::new(200.0, 0.0),
                Direction::East,
                Direction::West,
                &[],
            ),
            &RouterConfig::default(),
            &mut trace,
        )
        .unwrap();
        assert!(trace.graph.is_some());
    }
}
