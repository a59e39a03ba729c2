//! Orthogonal connector routing
//!
//! Given obstacle rectangles and a pair of anchors with required exit/entry sides,
//! computes a path of horizontal and vertical segments that avoids the obstacles and
//! keeps bends to a minimum. The pipeline per call is: visibility graph (cached by
//! obstacle geometry) → A* from nudged start to nudged end → refinement.

pub mod anchors;
pub mod astar;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod refine;
pub mod types;
pub mod visibility;

pub use anchors::{resolve_anchors, AnchorPair};
pub use astar::SearchTrace;
pub use cache::GraphCache;
pub use config::{RouteOptions, RouterConfig, DEFAULT_BEND_PENALTY};
pub use engine::{route, Connector, ConnectorPath, ConnectorStyle, Router};
pub use error::{Endpoint, RoutingError};
pub use refine::simplify;
pub use types::*;
pub use visibility::{build_visibility_graph, NodeId, OrthogonalVisibilityGraph};
