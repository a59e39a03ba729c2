//! The routing facade: graph caching, search, refinement and fallbacks

use super::anchors::{resolve_anchors, AnchorPair};
use super::astar::{find_path, PathRequest, SearchTrace};
use super::cache::{cache_key, GraphCache};
use super::config::{RouteOptions, RouterConfig};
use super::error::{Endpoint, RoutingError};
use super::geometry::euclidean_distance;
use super::refine::refine_route;
use super::types::{Obstacle, Point};
use super::visibility::{build_visibility_graph, OrthogonalVisibilityGraph};

/// How a connector is drawn between its anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    /// A single straight segment
    Straight,
    /// A cubic Bezier leaving and entering along the anchor directions
    Curved,
    /// Horizontal and vertical segments around obstacles
    #[default]
    Orthogonal,
}

/// Geometry of a routed connector
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorPath {
    /// Polyline through the points
    Polyline(Vec<Point>),
    /// Cubic Bezier: start, control 1, control 2, end
    Cubic([Point; 4]),
}

/// A connector between two shapes
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub anchors: AnchorPair,
    pub style: ConnectorStyle,
    pub path: ConnectorPath,
}

/// Orthogonal connector router owning its visibility graph cache
#[derive(Debug, Clone)]
pub struct Router {
    config: RouterConfig,
    cache: GraphCache,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        let cache = GraphCache::new(config.cache_ttl, config.cache_capacity);
        Self { config, cache }
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Route from `start` to `end` around `obstacles`.
    ///
    /// Always returns at least `[start, end]`; any internal failure degrades to that
    /// straight connector.
    pub fn route(
        &mut self,
        start: Point,
        end: Point,
        obstacles: &[Obstacle],
        options: &RouteOptions,
    ) -> Vec<Point> {
        self.route_with_trace(start, end, obstacles, options, &mut SearchTrace::default())
    }

    /// Like [`Router::route`], also returning the searched graph and visited nodes
    pub fn route_traced(
        &mut self,
        start: Point,
        end: Point,
        obstacles: &[Obstacle],
        options: &RouteOptions,
    ) -> (Vec<Point>, SearchTrace) {
        let mut trace = SearchTrace::recording();
        let route = self.route_with_trace(start, end, obstacles, options, &mut trace);
        (route, trace)
    }

    fn route_with_trace(
        &mut self,
        start: Point,
        end: Point,
        obstacles: &[Obstacle],
        options: &RouteOptions,
        trace: &mut SearchTrace,
    ) -> Vec<Point> {
        match self.try_route(start, end, obstacles, options, trace) {
            Ok(route) => route,
            Err(err) => {
                tracing::debug!(error = %err, "falling back to a straight connector");
                trace.fell_back = true;
                vec![start, end]
            }
        }
    }

    /// Route, surfacing the reason when no orthogonal route could be produced
    pub fn try_route(
        &mut self,
        start: Point,
        end: Point,
        obstacles: &[Obstacle],
        options: &RouteOptions,
        trace: &mut SearchTrace,
    ) -> Result<Vec<Point>, RoutingError> {
        validate_point(start, Endpoint::Start)?;
        validate_point(end, Endpoint::End)?;
        validate_obstacles(obstacles)?;

        let graph = self.visibility_graph(obstacles, options.use_cache);
        let request = PathRequest {
            start,
            end,
            start_dir: options.start_dir,
            end_dir: options.end_dir,
            obstacles,
            bend_penalty: options.bend_penalty,
        };
        let route = find_path(graph, &request, &self.config, trace)?;

        if options.refine {
            Ok(refine_route(&route, obstacles, self.config.clearance))
        } else {
            Ok(route)
        }
    }

    /// A private copy of the graph for `obstacles`, from the cache when fresh
    fn visibility_graph(
        &mut self,
        obstacles: &[Obstacle],
        use_cache: bool,
    ) -> OrthogonalVisibilityGraph {
        if !use_cache {
            return build_visibility_graph(obstacles);
        }

        let key = cache_key(obstacles);
        if let Some(graph) = self.cache.get(&key) {
            tracing::trace!(obstacles = obstacles.len(), "visibility graph cache hit");
            return graph;
        }

        let graph = build_visibility_graph(obstacles);
        tracing::debug!(
            obstacles = obstacles.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built visibility graph"
        );
        self.cache.insert(key, graph.clone());
        graph
    }

    /// Connect two shapes, choosing anchors automatically.
    ///
    /// With `advanced` every shape in `shapes` is an obstacle; if that fails for any
    /// reason the connector is routed again around `source` and `target` only.
    pub fn connect(
        &mut self,
        source: &Obstacle,
        target: &Obstacle,
        shapes: &[Obstacle],
        style: ConnectorStyle,
        advanced: bool,
    ) -> Connector {
        let anchors = resolve_anchors(source, target);
        let options =
            RouteOptions::default().with_directions(anchors.source_dir, anchors.target_dir);
        self.connect_with(source, target, shapes, style, advanced, anchors, &options)
    }

    /// Connect two shapes with explicit anchors and options
    #[allow(clippy::too_many_arguments)]
    pub fn connect_with(
        &mut self,
        source: &Obstacle,
        target: &Obstacle,
        shapes: &[Obstacle],
        style: ConnectorStyle,
        advanced: bool,
        anchors: AnchorPair,
        options: &RouteOptions,
    ) -> Connector {
        let mut trace = SearchTrace::default();
        self.connect_inner(source, target, shapes, style, advanced, anchors, options, &mut trace)
    }

    /// Like [`Router::connect_with`], also returning the search behind the drawn path.
    ///
    /// When advanced routing falls back, the trace describes the retry.
    #[allow(clippy::too_many_arguments)]
    pub fn connect_traced(
        &mut self,
        source: &Obstacle,
        target: &Obstacle,
        shapes: &[Obstacle],
        style: ConnectorStyle,
        advanced: bool,
        anchors: AnchorPair,
        options: &RouteOptions,
    ) -> (Connector, SearchTrace) {
        let mut trace = SearchTrace::recording();
        let connector = self.connect_inner(
            source, target, shapes, style, advanced, anchors, options, &mut trace,
        );
        (connector, trace)
    }

    #[allow(clippy::too_many_arguments)]
    fn connect_inner(
        &mut self,
        source: &Obstacle,
        target: &Obstacle,
        shapes: &[Obstacle],
        style: ConnectorStyle,
        advanced: bool,
        anchors: AnchorPair,
        options: &RouteOptions,
        trace: &mut SearchTrace,
    ) -> Connector {
        let path = match style {
            ConnectorStyle::Straight => ConnectorPath::Polyline(vec![anchors.start, anchors.end]),
            ConnectorStyle::Curved => ConnectorPath::Cubic(curve_through(&anchors)),
            ConnectorStyle::Orthogonal => ConnectorPath::Polyline(self.route_between(
                source, target, shapes, advanced, &anchors, options, trace,
            )),
        };
        Connector {
            anchors,
            style,
            path,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route_between(
        &mut self,
        source: &Obstacle,
        target: &Obstacle,
        shapes: &[Obstacle],
        advanced: bool,
        anchors: &AnchorPair,
        options: &RouteOptions,
        trace: &mut SearchTrace,
    ) -> Vec<Point> {
        let simple = [source.clone(), target.clone()];

        if advanced {
            match self.try_route(anchors.start, anchors.end, shapes, options, trace) {
                Ok(route) => return route,
                Err(err) => {
                    tracing::warn!(
                        source = %source.id,
                        target = %target.id,
                        error = %err,
                        "obstacle-aware routing failed, retrying around source and target only"
                    );
                    trace.restart();
                }
            }
        }

        self.route_with_trace(anchors.start, anchors.end, &simple, options, trace)
    }
}

/// Route with a fresh router; see [`Router::route`]
pub fn route(
    start: Point,
    end: Point,
    obstacles: &[Obstacle],
    options: &RouteOptions,
) -> Vec<Point> {
    Router::default().route(start, end, obstacles, options)
}

/// Control points extend from each anchor along its side direction by half the anchor distance
fn curve_through(anchors: &AnchorPair) -> [Point; 4] {
    let reach = euclidean_distance(anchors.start, anchors.end) / 2.0;
    [
        anchors.start,
        anchors.start.offset(anchors.source_dir, reach),
        anchors.end.offset(anchors.target_dir, reach),
        anchors.end,
    ]
}

fn validate_point(point: Point, endpoint: Endpoint) -> Result<(), RoutingError> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(RoutingError::InvalidPoint { endpoint, point })
    }
}

fn validate_obstacles(obstacles: &[Obstacle]) -> Result<(), RoutingError> {
    for ob in obstacles {
        if !ob.is_well_formed() {
            let reason = if [ob.x, ob.y, ob.width, ob.height].iter().any(|v| !v.is_finite()) {
                "geometry is not finite"
            } else {
                "size is negative"
            };
            return Err(RoutingError::invalid_obstacle(ob.id.clone(), reason));
        }
    }
    Ok(())
}
