//! Orthogonal visibility graph over a set of rectangular obstacles
//!
//! The graph is built in three stages:
//! 1. every obstacle corner becomes an interesting point;
//! 2. points sharing a row (or column) are joined pairwise in sorted order, dropping
//!    pairs whose connecting stretch crosses an obstacle interior;
//! 3. the points plus every crossing of a surviving horizontal and vertical segment
//!    become nodes, each linked to its nearest unobstructed neighbor per direction.

use std::fmt;

use indexmap::IndexMap;

use super::geometry::{direction_between, manhattan_distance, segment_clear};
use super::types::{Direction, Obstacle, Point};

/// Canonical key for a coordinate pair; coincident points share an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    x: u64,
    y: u64,
}

impl NodeId {
    pub fn of(point: Point) -> Self {
        Self {
            x: canonical_bits(point.x),
            y: canonical_bits(point.y),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(f64::from_bits(self.x), f64::from_bits(self.y))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.point();
        write!(f, "{},{}", p.x, p.y)
    }
}

fn canonical_bits(value: f64) -> u64 {
    // -0.0 and 0.0 must collapse to the same node
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

impl VisibilityNode {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A directed, obstacle-free, axis-aligned hop between two nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub direction: Direction,
    pub length: f64,
}

/// Waypoints and the straight hops between them.
///
/// Both maps keep insertion order so searches over the graph are deterministic.
#[derive(Debug, Clone, Default)]
pub struct OrthogonalVisibilityGraph {
    nodes: IndexMap<NodeId, VisibilityNode>,
    edges: IndexMap<NodeId, Vec<VisibilityEdge>>,
}

impl OrthogonalVisibilityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node at `point`, returning the existing id when one is already there
    pub fn add_node(&mut self, point: Point) -> NodeId {
        let id = NodeId::of(point);
        self.nodes.entry(id).or_insert(VisibilityNode {
            id,
            x: point.x,
            y: point.y,
        });
        id
    }

    /// Add a directed edge between two existing nodes.
    ///
    /// Returns false for zero-length or diagonal hops, unknown nodes, and duplicates.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.nodes.get(&from), self.nodes.get(&to)) else {
            return false;
        };
        let (a, b) = (a.point(), b.point());
        let Some(direction) = direction_between(a, b) else {
            return false;
        };

        let list = self.edges.entry(from).or_default();
        if list.iter().any(|e| e.to == to) {
            return false;
        }
        list.push(VisibilityEdge {
            from,
            to,
            direction,
            length: manhattan_distance(a, b),
        });
        true
    }

    /// Add edges in both directions
    pub fn add_bidirectional_edge(&mut self, a: NodeId, b: NodeId) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    pub fn node(&self, id: NodeId) -> Option<&VisibilityNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &VisibilityNode> {
        self.nodes.values()
    }

    pub fn edges_from(&self, id: NodeId) -> &[VisibilityEdge] {
        self.edges.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes within `radius` Manhattan distance of `point`, in insertion order
    pub fn nodes_within(&self, point: Point, radius: f64) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| manhattan_distance(n.point(), point) <= radius)
            .map(|n| n.id)
            .collect()
    }
}

/// A horizontal or vertical segment between two interesting points
#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Point,
    b: Point,
}

/// Build the visibility graph for the given obstacles
pub fn build_visibility_graph(obstacles: &[Obstacle]) -> OrthogonalVisibilityGraph {
    let points = interesting_points(obstacles);

    let horizontal = interesting_segments(&points, obstacles, Axis::Horizontal);
    let vertical = interesting_segments(&points, obstacles, Axis::Vertical);

    let mut graph = OrthogonalVisibilityGraph::new();
    for point in &points {
        graph.add_node(*point);
    }
    for h in &horizontal {
        for v in &vertical {
            let x = v.a.x;
            let y = h.a.y;
            if x >= h.a.x && x <= h.b.x && y >= v.a.y && y <= v.b.y {
                graph.add_node(Point::new(x, y));
            }
        }
    }

    link_nearest_neighbors(&mut graph, obstacles);

    tracing::trace!(
        obstacles = obstacles.len(),
        points = points.len(),
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        "visibility graph stages"
    );
    graph
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Unique obstacle corners, in obstacle order
fn interesting_points(obstacles: &[Obstacle]) -> Vec<Point> {
    let mut unique: IndexMap<NodeId, Point> = IndexMap::new();
    for ob in obstacles {
        for corner in ob.corners() {
            unique.entry(NodeId::of(corner)).or_insert(corner);
        }
    }
    unique.into_values().collect()
}

/// Group points by the coordinate fixed along `axis`, each group sorted along the axis
fn group_along(points: &[Point], axis: Axis) -> Vec<Vec<Point>> {
    let mut groups: IndexMap<u64, Vec<Point>> = IndexMap::new();
    for p in points {
        let key = match axis {
            Axis::Horizontal => canonical_bits(p.y),
            Axis::Vertical => canonical_bits(p.x),
        };
        groups.entry(key).or_default().push(*p);
    }
    groups
        .into_values()
        .map(|mut group| {
            match axis {
                Axis::Horizontal => group.sort_by(|a, b| a.x.total_cmp(&b.x)),
                Axis::Vertical => group.sort_by(|a, b| a.y.total_cmp(&b.y)),
            }
            group
        })
        .collect()
}

fn interesting_segments(points: &[Point], obstacles: &[Obstacle], axis: Axis) -> Vec<Segment> {
    group_along(points, axis)
        .iter()
        .flat_map(|group| group.windows(2))
        .filter(|pair| pair[0] != pair[1] && segment_clear(pair[0], pair[1], obstacles))
        .map(|pair| Segment {
            a: pair[0],
            b: pair[1],
        })
        .collect()
}

/// Connect every node to its nearest neighbor in each direction when the stretch is clear
fn link_nearest_neighbors(graph: &mut OrthogonalVisibilityGraph, obstacles: &[Obstacle]) {
    let points: Vec<Point> = graph.nodes().map(|n| n.point()).collect();

    for axis in [Axis::Horizontal, Axis::Vertical] {
        for group in group_along(&points, axis) {
            for pair in group.windows(2) {
                if segment_clear(pair[0], pair[1], obstacles) {
                    graph.add_bidirectional_edge(NodeId::of(pair[0]), NodeId::of(pair[1]));
                }
            }
        }
    }
}
