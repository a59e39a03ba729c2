//! SVG renderer for routed scenes
//!
//! Takes a scene plus its routed connectors and produces an SVG string
//! with CSS classes for styling.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, Extent, SvgBuilder};
