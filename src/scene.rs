//! Scene documents: shapes, the connectors between them, and router settings
//!
//! Scenes are TOML files:
//!
//! ```toml
//! [router]
//! clearance = 12.0
//!
//! [[shape]]
//! id = "client"
//! x = 0.0
//! y = 0.0
//! width = 100.0
//! height = 60.0
//!
//! [[connector]]
//! from = "client"
//! to = "server"
//! style = "orthogonal"
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::routing::{
    resolve_anchors, AnchorPair, Connector, ConnectorStyle, Direction, Obstacle, Point,
    RouteOptions, Router, RouterConfig,
};

/// Errors that can occur when loading or validating scenes
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("duplicate shape id '{id}'")]
    DuplicateShape { id: String },
    #[error("connector {index} refers to unknown shape '{id}'")]
    UnknownShape { index: usize, id: String },
}

/// A rectangle on the canvas
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Shape {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: Option<String>,
}

impl Shape {
    /// Snapshot of this shape's geometry for routing
    pub fn obstacle(&self) -> Obstacle {
        Obstacle::new(self.id.clone(), self.x, self.y, self.width, self.height)
    }
}

fn default_advanced() -> bool {
    true
}

/// A connector between two shapes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectorSpec {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub style: ConnectorStyle,
    /// Treat every shape as an obstacle, not only the endpoints
    #[serde(default = "default_advanced")]
    pub advanced: bool,
    /// Side of the source to leave from; chosen automatically when absent
    pub start_dir: Option<Direction>,
    /// Side of the target to enter through; chosen automatically when absent
    pub end_dir: Option<Direction>,
    pub bend_penalty: Option<f64>,
}

impl ConnectorSpec {
    /// Anchors for this connector, honoring explicit sides over the resolver's choice
    pub fn anchors(&self, source: &Obstacle, target: &Obstacle) -> AnchorPair {
        let resolved = resolve_anchors(source, target);
        let source_dir = self.start_dir.unwrap_or(resolved.source_dir);
        let target_dir = self.end_dir.unwrap_or(resolved.target_dir);
        AnchorPair {
            source_dir,
            target_dir,
            start: source.side_midpoint(source_dir),
            end: target.side_midpoint(target_dir),
        }
    }

    /// Routing options for the given anchors
    pub fn options(&self, anchors: &AnchorPair) -> RouteOptions {
        let mut options =
            RouteOptions::default().with_directions(anchors.source_dir, anchors.target_dir);
        if let Some(penalty) = self.bend_penalty {
            options = options.with_bend_penalty(penalty);
        }
        options
    }
}

/// A complete scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub shapes: Vec<Shape>,
    pub connectors: Vec<ConnectorSpec>,
    pub router: RouterConfig,
}

/// TOML structure for deserializing scenes
#[derive(Deserialize)]
struct TomlScene {
    #[serde(default, rename = "shape")]
    shapes: Vec<Shape>,
    #[serde(default, rename = "connector")]
    connectors: Vec<ConnectorSpec>,
    #[serde(default)]
    router: RouterConfig,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let parsed: TomlScene = toml::from_str(content)?;
        let scene = Scene {
            shapes: parsed.shapes,
            connectors: parsed.connectors,
            router: parsed.router,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Check shape ids are unique and every connector refers to a known shape
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut ids = HashSet::new();
        for shape in &self.shapes {
            if !ids.insert(shape.id.as_str()) {
                return Err(SceneError::DuplicateShape {
                    id: shape.id.clone(),
                });
            }
        }
        for (index, connector) in self.connectors.iter().enumerate() {
            for id in [&connector.from, &connector.to] {
                if !ids.contains(id.as_str()) {
                    return Err(SceneError::UnknownShape {
                        index,
                        id: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Every shape as an obstacle
    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.shapes.iter().map(Shape::obstacle).collect()
    }

    /// Route every connector with one shared router, in document order.
    ///
    /// With `trace`, orthogonal connectors also report the nodes their search visited.
    pub fn route(
        &self,
        router: &mut Router,
        refine: bool,
        trace: bool,
    ) -> Result<Vec<RoutedConnector>, SceneError> {
        let obstacles = self.obstacles();
        let mut routed = Vec::with_capacity(self.connectors.len());

        for (index, spec) in self.connectors.iter().enumerate() {
            let lookup = |id: &String| {
                self.shape(id)
                    .map(Shape::obstacle)
                    .ok_or_else(|| SceneError::UnknownShape {
                        index,
                        id: id.clone(),
                    })
            };
            let source = lookup(&spec.from)?;
            let target = lookup(&spec.to)?;

            let anchors = spec.anchors(&source, &target);
            let options = spec.options(&anchors).with_refine(refine);
            let (connector, visited) = if trace {
                let (connector, search) = router.connect_traced(
                    &source,
                    &target,
                    &obstacles,
                    spec.style,
                    spec.advanced,
                    anchors,
                    &options,
                );
                (connector, search.visited)
            } else {
                let connector = router.connect_with(
                    &source,
                    &target,
                    &obstacles,
                    spec.style,
                    spec.advanced,
                    anchors,
                    &options,
                );
                (connector, Vec::new())
            };

            tracing::debug!(
                from = %spec.from,
                to = %spec.to,
                style = ?spec.style,
                "routed connector"
            );
            routed.push(RoutedConnector {
                from: spec.from.clone(),
                to: spec.to.clone(),
                connector,
                visited,
            });
        }

        Ok(routed)
    }
}

/// A connector of a scene after routing
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnector {
    pub from: String,
    pub to: String,
    pub connector: Connector,
    /// Nodes expanded by the search, when traced
    pub visited: Vec<Point>,
}
