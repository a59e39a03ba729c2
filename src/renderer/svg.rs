//! SVG generation from routed scenes

use crate::routing::{ConnectorPath, Point};
use crate::scene::{RoutedConnector, Scene};

use super::SvgConfig;

/// Axis-aligned extent of everything drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Extent {
    /// Smallest extent covering all `points`; empty input gives a zero extent at the origin
    pub fn covering(points: impl IntoIterator<Item = Point>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        };
        let (mut min, mut max) = (first, first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    elements: Vec<String>,
    connections: Vec<String>,
    overlay: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            elements: vec![],
            connections: vec![],
            overlay: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        self.indent_at(self.indent)
    }

    fn indent_at(&self, level: usize) -> String {
        if self.config.pretty_print {
            "  ".repeat(level)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the arrow marker drawn at the target end of every connector
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        let (nl, outer, inner) = (self.newline(), self.indent_at(2), self.indent_at(3));
        // Points along +X; orient="auto" turns it to the final segment
        let marker = format!(
            concat!(
                r#"{outer}<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" "#,
                r#"markerWidth="4" markerHeight="4" markerUnits="strokeWidth" orient="auto">{nl}"#,
                r#"{inner}<path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/>{nl}"#,
                r#"{outer}</marker>"#
            ),
            outer = outer,
            inner = inner,
            prefix = prefix,
            nl = nl,
        );
        self.defs.push(marker);
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, id: &str, x: f64, y: f64, w: f64, h: f64) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<rect id="{}" class="{}shape {}rect" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.indent_str(),
            escape_xml(id),
            prefix,
            prefix,
            x,
            y,
            w,
            h
        ));
    }

    /// Add a centered text label
    pub fn add_text(&mut self, text: &str, x: f64, y: f64) {
        let prefix = self.prefix();
        self.elements.push(format!(
            concat!(
                r#"{}<text class="{}label" x="{}" y="{}" "#,
                r#"text-anchor="middle" dominant-baseline="middle">{}</text>"#
            ),
            self.indent_str(),
            prefix,
            x,
            y,
            escape_xml(text)
        ));
    }

    /// Add a connector path ending in the arrow marker
    pub fn add_connection_path(&mut self, d: &str, style: &str) {
        let prefix = self.prefix();
        self.connections.push(format!(
            r#"{}<path class="{}connection {}{}" d="{}" fill="none" marker-end="url(#{}arrow)"/>"#,
            self.indent_str(),
            prefix,
            prefix,
            style,
            d,
            prefix
        ));
    }

    /// Mark a node the search expanded
    pub fn add_visited_node(&mut self, p: Point) {
        let prefix = self.prefix();
        self.overlay.push(format!(
            r#"{}<circle class="{}visited" cx="{}" cy="{}" r="2"/>"#,
            self.indent_str(),
            prefix,
            p.x,
            p.y
        ));
    }

    /// Build the final SVG string
    pub fn build(self, extent: Extent) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = extent.x - padding;
        let vb_y = extent.y - padding;
        let vb_w = extent.width + 2.0 * padding;
        let vb_h = extent.height + 2.0 * padding;

        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            vb_x, vb_y, vb_w, vb_h
        ));
        svg.push_str(nl);

        if !self.defs.is_empty() {
            let indent = self.indent_at(1);
            svg.push_str(&indent);
            svg.push_str("<defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str(&indent);
            svg.push_str("</defs>");
            svg.push_str(nl);
        }

        for element in self
            .elements
            .iter()
            .chain(&self.connections)
            .chain(&self.overlay)
        {
            svg.push_str(element);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg.push_str(nl);

        svg
    }
}

/// Render a scene and its routed connectors to an SVG string
pub fn render_svg(scene: &Scene, connectors: &[RoutedConnector], config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());

    if !connectors.is_empty() {
        builder.add_arrow_marker();
    }

    for shape in &scene.shapes {
        builder.add_rect(&shape.id, shape.x, shape.y, shape.width, shape.height);
        if let Some(label) = &shape.label {
            builder.add_text(label, shape.x + shape.width / 2.0, shape.y + shape.height / 2.0);
        }
    }

    for routed in connectors {
        let style = format!("{:?}", routed.connector.style).to_lowercase();
        builder.add_connection_path(&connector_to_d(&routed.connector.path), &style);
        if config.debug {
            for p in &routed.visited {
                builder.add_visited_node(*p);
            }
        }
    }

    builder.build(scene_extent(scene, connectors))
}

fn scene_extent(scene: &Scene, connectors: &[RoutedConnector]) -> Extent {
    let corners = scene.shapes.iter().flat_map(|s| {
        [
            Point::new(s.x, s.y),
            Point::new(s.x + s.width, s.y + s.height),
        ]
    });
    let paths = connectors.iter().flat_map(|c| match &c.connector.path {
        ConnectorPath::Polyline(points) => points.clone(),
        ConnectorPath::Cubic(points) => points.to_vec(),
    });
    Extent::covering(corners.chain(paths))
}

fn connector_to_d(path: &ConnectorPath) -> String {
    match path {
        ConnectorPath::Polyline(points) => path_to_d(points),
        ConnectorPath::Cubic([start, c1, c2, end]) => format!(
            "M{} {} C{} {}, {} {}, {} {}",
            start.x, start.y, c1.x, c1.y, c2.x, c2.y, end.x, end.y
        ),
    }
}

/// Convert a polyline to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut d = format!("M{} {}", path[0].x, path[0].y);
    for point in &path[1..] {
        d.push_str(&format!(" L{} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Router;

    const SCENE: &str = r#"
[[shape]]
id = "a"
x = 0.0
y = 0.0
width = 100.0
height = 60.0
label = "A & B"

[[shape]]
id = "b"
x = 300.0
y = 0.0
width = 100.0
height = 60.0

[[connector]]
from = "a"
to = "b"
"#;

    fn routed(scene: &Scene, trace: bool) -> Vec<RoutedConnector> {
        let mut router = Router::new(scene.router.clone());
        scene.route(&mut router, true, trace).expect("Should route")
    }

    #[test]
    fn test_path_to_d() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        assert_eq!(path_to_d(&path), "M0 0 L100 0 L100 100");
    }

    #[test]
    fn test_cubic_to_d() {
        let path = ConnectorPath::Cubic([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 5.0),
            Point::new(30.0, 5.0),
        ]);
        assert_eq!(connector_to_d(&path), "M0 0 C10 0, 20 5, 30 5");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
    }

    #[test]
    fn test_extent_covering() {
        let extent = Extent::covering([Point::new(10.0, -5.0), Point::new(-2.0, 20.0)]);
        assert_eq!(
            extent,
            Extent {
                x: -2.0,
                y: -5.0,
                width: 12.0,
                height: 25.0
            }
        );
        assert_eq!(Extent::covering(Vec::new()).width, 0.0);
    }

    #[test]
    fn test_render_scene() {
        let scene = Scene::from_str(SCENE).expect("Should parse");
        let svg = render_svg(&scene, &routed(&scene, false), &SvgConfig::default());

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"viewBox="-40 -40 480 140""#));
        assert!(svg.contains(r#"<rect id="a" class="or-shape or-rect""#));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.contains(r#"d="M100 30 L300 30""#));
        assert!(svg.contains(r#"marker-end="url(#or-arrow)""#));
        assert!(!svg.contains("or-visited"));
    }

    #[test]
    fn test_debug_overlay() {
        let scene = Scene::from_str(SCENE).expect("Should parse");
        let config = SvgConfig::default().with_debug(true);
        let svg = render_svg(&scene, &routed(&scene, true), &config);
        assert!(svg.contains(r#"class="or-visited""#));
    }

    #[test]
    fn test_compact_output_has_no_whitespace_between_tags() {
        let scene = Scene::from_str(SCENE).expect("Should parse");
        let config = SvgConfig::default().with_pretty_print(false);
        let svg = render_svg(&scene, &routed(&scene, false), &config);
        assert!(!svg.contains('\n'));
        assert!(!svg.contains(">  <"));
        assert!(svg.contains("<defs><marker id=\"or-arrow\""));
        assert!(svg.contains("</marker></defs><rect"));
    }

    #[test]
    fn test_no_marker_without_connectors() {
        let source = "[[shape]]\nid = \"a\"\nx = 0.0\ny = 0.0\nwidth = 10.0\nheight = 10.0\n";
        let scene = Scene::from_str(source).expect("Should parse");
        let config = SvgConfig::default()
            .with_standalone(false)
            .with_pretty_print(false)
            .without_class_prefix();
        let svg = render_svg(&scene, &[], &config);
        assert!(!svg.contains("<defs>"));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"class="shape rect""#));
    }
}
