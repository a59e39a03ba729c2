//! Ortho Router - orthogonal connector routing for box-and-arrow diagrams
//!
//! This library routes connectors between rectangles with horizontal and vertical
//! segments that avoid the other rectangles, and renders routed scenes as SVG.
//!
//! # Example
//!
//! ```rust
//! use ortho_router::{route, Obstacle, Point, RouteOptions};
//!
//! let obstacles = vec![
//!     Obstacle::new("a", 0.0, 0.0, 100.0, 60.0),
//!     Obstacle::new("b", 300.0, 0.0, 100.0, 60.0),
//! ];
//! let path = route(
//!     Point::new(100.0, 30.0),
//!     Point::new(300.0, 30.0),
//!     &obstacles,
//!     &RouteOptions::default(),
//! );
//! assert_eq!(path, vec![Point::new(100.0, 30.0), Point::new(300.0, 30.0)]);
//! ```

pub mod renderer;
pub mod routing;
pub mod scene;

pub use renderer::{render_svg, SvgConfig};
pub use routing::{
    resolve_anchors, route, AnchorPair, Connector, ConnectorPath, ConnectorStyle, Direction,
    Obstacle, Point, RouteOptions, Router, RouterConfig, RoutingError,
};
pub use scene::{RoutedConnector, Scene, SceneError};

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error loading or validating the scene
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Run the clearance and simplification pass on orthogonal routes
    pub refine: bool,
    /// Debug mode: overlay the nodes each search visited
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            svg: SvgConfig::default(),
            refine: true,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Enable or disable route refinement
    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Render a TOML scene to SVG with default configuration
///
/// # Example
///
/// ```rust
/// use ortho_router::render;
///
/// let svg = render(r#"
/// [[shape]]
/// id = "server"
/// x = 0.0
/// y = 0.0
/// width = 100.0
/// height = 60.0
///
/// [[shape]]
/// id = "client"
/// x = 300.0
/// y = 0.0
/// width = 100.0
/// height = 60.0
///
/// [[connector]]
/// from = "server"
/// to = "client"
/// "#).unwrap();
///
/// assert!(svg.contains("<svg"));
/// assert!(svg.contains("server"));
/// ```
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a TOML scene to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use ortho_router::{render_with_config, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_refine(false)
///     .with_svg(SvgConfig::default().with_viewbox_padding(50.0));
///
/// let svg = render_with_config("", config).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let scene = Scene::from_str(source)?;
    render_scene(&scene, &config)
}

/// Route and render an already loaded scene
pub fn render_scene(scene: &Scene, config: &RenderConfig) -> Result<String, RenderError> {
    let mut router = Router::new(scene.router.clone());
    let routed = scene.route(&mut router, config.refine, config.debug)?;
    let svg_config = config.svg.clone().with_debug(config.debug || config.svg.debug);
    Ok(render_svg(scene, &routed, &svg_config))
}
