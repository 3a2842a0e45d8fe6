//! SVG rendering of a laid out model.
//!
//! Groups are drawn first, then edges, then nodes, all inside one group
//! translated so that the content's top-left corner sits at the margin.
//! Elements without a position are drawn at the origin with their default
//! size.

use log::{debug, info, warn};
use svg::{
    Document,
    node::element::{
        Definitions, Ellipse, Group, Line, LinearGradient, Marker, Path, Polygon, RadialGradient,
        Rectangle, Stop, Text,
    },
};

use diagen_core::{
    ir::{ArrowHead, DiagramEdge, DiagramGroup, DiagramNode, NodeShape, Position, Size},
    model::DiagramModel,
    style::{GradientKind, LineType, NodeStyle},
};

use super::Exporter;
use crate::{
    error::DiagenError,
    layout::{DEFAULT_GROUP_HEIGHT, DEFAULT_GROUP_WIDTH, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH},
};

/// Space around the content.
pub const MARGIN: f64 = 50.0;

const FONT_FAMILY: &str = "system-ui, sans-serif";
const ARROW_END: &str = "arrowhead";
const ARROW_START: &str = "arrowhead-start";

/// Options of [`export_svg`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SvgOptions {
    /// Fixed document width; the content width plus margins when `None`.
    pub width: Option<f64>,
    /// Fixed document height; the content height plus margins when `None`.
    pub height: Option<f64>,
    /// Background fill, white when `None`. `transparent` draws no background.
    pub background_color: Option<String>,
}

/// [`Exporter`] producing SVG documents.
#[derive(Debug, Clone, Default)]
pub struct SvgExporter {
    options: SvgOptions,
}

impl SvgExporter {
    pub fn new(options: SvgOptions) -> Self {
        Self { options }
    }
}

impl Exporter for SvgExporter {
    fn export(&self, model: &DiagramModel) -> Result<String, DiagenError> {
        let svg = export_svg(model, &self.options);
        info!(bytes = svg.len(); "SVG rendered");
        Ok(svg)
    }
}

/// Renders `model` as a standalone SVG document.
pub fn export_svg(model: &DiagramModel, options: &SvgOptions) -> String {
    let bounds = Bounds::of(model);
    let width = options.width.unwrap_or(bounds.width() + MARGIN * 2.0);
    let height = options.height.unwrap_or(bounds.height() + MARGIN * 2.0);
    debug!(width, height; "SVG dimensions");

    let mut document = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height))
        .add(definitions(model));

    let background = options.background_color.as_deref().unwrap_or("#ffffff");
    if background != "transparent" {
        document = document.add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", background),
        );
    }

    let mut content = Group::new().set(
        "transform",
        format!(
            "translate({}, {})",
            MARGIN - bounds.min_x,
            MARGIN - bounds.min_y
        ),
    );
    for group in model.groups() {
        content = content.add(render_group(group));
    }
    for edge in model.edges() {
        match render_edge(edge, model) {
            Some(rendered) => content = content.add(rendered),
            None => warn!(edge = edge.id.to_string(); "Edge skipped, endpoint is not a node"),
        }
    }
    for node in model.nodes() {
        content = content.add(render_node(node));
    }

    document.add(content).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Bounding box of every node and group; 400x300 at the origin when
    /// the model is empty.
    fn of(model: &DiagramModel) -> Self {
        let boxes = model
            .nodes()
            .map(node_box)
            .chain(model.groups().map(group_box));

        let mut bounds: Option<Bounds> = None;
        for (position, size) in boxes {
            let next = Bounds {
                min_x: position.x,
                min_y: position.y,
                max_x: position.x + size.width,
                max_y: position.y + size.height,
            };
            bounds = Some(match bounds {
                Some(b) => Bounds {
                    min_x: b.min_x.min(next.min_x),
                    min_y: b.min_y.min(next.min_y),
                    max_x: b.max_x.max(next.max_x),
                    max_y: b.max_y.max(next.max_y),
                },
                None => next,
            });
        }

        bounds.unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 400.0,
            max_y: 300.0,
        })
    }

    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

fn node_box(node: &DiagramNode) -> (Position, Size) {
    (
        node.position.unwrap_or_default(),
        node.size
            .unwrap_or(Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)),
    )
}

fn group_box(group: &DiagramGroup) -> (Position, Size) {
    (
        group.position.unwrap_or_default(),
        group
            .size
            .unwrap_or(Size::new(DEFAULT_GROUP_WIDTH, DEFAULT_GROUP_HEIGHT)),
    )
}

fn gradient_id(node: &DiagramNode) -> String {
    format!("gradient-{}", node.id)
}

fn definitions(model: &DiagramModel) -> Definitions {
    let arrow = |id: &str, orient: &str| {
        Marker::new()
            .set("id", id)
            .set("markerWidth", 10)
            .set("markerHeight", 7)
            .set("refX", 9)
            .set("refY", 3.5)
            .set("orient", orient)
            .add(
                Polygon::new()
                    .set("points", "0 0, 10 3.5, 0 7")
                    .set("fill", "#333"),
            )
    };
    let mut defs = Definitions::new()
        .add(arrow(ARROW_END, "auto"))
        .add(arrow(ARROW_START, "auto-start-reverse"));

    for node in model.nodes() {
        let Some(gradient) = node.style.as_ref().and_then(|s| s.gradient.as_ref()) else {
            continue;
        };
        let from = Stop::new()
            .set("offset", "0%")
            .set("style", format!("stop-color:{}", gradient.from));
        let to = Stop::new()
            .set("offset", "100%")
            .set("style", format!("stop-color:{}", gradient.to));
        defs = match gradient.kind {
            GradientKind::Linear => defs.add(
                LinearGradient::new()
                    .set("id", gradient_id(node))
                    .set("x1", "0%")
                    .set("y1", "0%")
                    .set("x2", "0%")
                    .set("y2", "100%")
                    .add(from)
                    .add(to),
            ),
            GradientKind::Radial => defs.add(
                RadialGradient::new()
                    .set("id", gradient_id(node))
                    .add(from)
                    .add(to),
            ),
        };
    }
    defs
}

fn render_group(group: &DiagramGroup) -> Group {
    let (position, size) = group_box(group);
    let style = group.style.clone().unwrap_or_default();

    let mut rendered = Group::new()
        .set("class", "group")
        .set("id", format!("group-{}", group.id))
        .add(
            Rectangle::new()
                .set("x", position.x)
                .set("y", position.y)
                .set("width", size.width)
                .set("height", size.height)
                .set("rx", style.border_radius.unwrap_or(8.0))
                .set(
                    "fill",
                    style.fill.as_deref().unwrap_or("rgba(240, 240, 240, 0.5)"),
                )
                .set("stroke", style.stroke.as_deref().unwrap_or("#cccccc"))
                .set("stroke-width", style.stroke_width.unwrap_or(1.0)),
        );

    if let Some(label) = &group.label {
        rendered = rendered.add(
            Text::new(label.as_str())
                .set("x", position.x + 10.0)
                .set("y", position.y + 20.0)
                .set("font-size", 12)
                .set("font-family", FONT_FAMILY)
                .set("font-weight", 500),
        );
    }
    rendered
}

fn render_node(node: &DiagramNode) -> Group {
    let (position, size) = node_box(node);
    let style = node.style.clone().unwrap_or_default();
    let fill = if style.gradient.is_some() {
        format!("url(#{})", gradient_id(node))
    } else {
        style.fill.clone().unwrap_or_else(|| "#ffffff".to_string())
    };

    let mut rendered = Group::new()
        .set("class", "node")
        .set("id", format!("node-{}", node.id));
    rendered = add_shape(rendered, &node.shape, position, size, &style, &fill);

    rendered.add(
        Text::new(node.label.as_str())
            .set("x", position.x + size.width / 2.0)
            .set("y", position.y + size.height / 2.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-size", 14)
            .set("font-family", FONT_FAMILY),
    )
}

/// Applies fill, stroke, dash and opacity of `style` to a shape element.
macro_rules! painted {
    ($element:expr, $style:expr, $fill:expr) => {{
        let stroke = $style.stroke.as_deref().unwrap_or("#e2e8f0");
        let element = $element
            .set("fill", $fill)
            .set("stroke", stroke)
            .set("stroke-width", $style.stroke_width.unwrap_or(1.0))
            .set("opacity", $style.opacity.unwrap_or(1.0));
        if $style.dashed.unwrap_or(false) {
            element.set("stroke-dasharray", "5,5")
        } else {
            element
        }
    }};
}

fn add_shape(
    group: Group,
    shape: &NodeShape,
    Position { x, y }: Position,
    Size {
        width: w,
        height: h,
    }: Size,
    style: &NodeStyle,
    fill: &str,
) -> Group {
    match shape {
        NodeShape::Circle | NodeShape::Ellipse => group.add(painted!(
            Ellipse::new()
                .set("cx", x + w / 2.0)
                .set("cy", y + h / 2.0)
                .set("rx", w / 2.0)
                .set("ry", h / 2.0),
            style,
            fill
        )),
        NodeShape::Diamond => {
            let (cx, cy) = (x + w / 2.0, y + h / 2.0);
            let points = format!("{cx},{y} {},{cy} {cx},{} {x},{cy}", x + w, y + h);
            group.add(painted!(Polygon::new().set("points", points), style, fill))
        }
        NodeShape::Hexagon => {
            let offset = w * 0.15;
            let points = format!(
                "{},{y} {},{y} {},{} {},{} {},{} {x},{}",
                x + offset,
                x + w - offset,
                x + w,
                y + h / 2.0,
                x + w - offset,
                y + h,
                x + offset,
                y + h,
                y + h / 2.0,
            );
            group.add(painted!(Polygon::new().set("points", points), style, fill))
        }
        NodeShape::Cylinder | NodeShape::Database => {
            let ry = h * 0.1;
            let stroke = style.stroke.as_deref().unwrap_or("#e2e8f0");
            let stroke_width = style.stroke_width.unwrap_or(1.0);
            let cap = |cy: f64| {
                painted!(
                    Ellipse::new()
                        .set("cx", x + w / 2.0)
                        .set("cy", cy)
                        .set("rx", w / 2.0 - 1.0)
                        .set("ry", ry),
                    style,
                    fill
                )
            };
            let side = |lx: f64| {
                Line::new()
                    .set("x1", lx)
                    .set("y1", y + ry)
                    .set("x2", lx)
                    .set("y2", y + h - ry)
                    .set("stroke", stroke)
                    .set("stroke-width", stroke_width)
            };
            group
                .add(cap(y + h - ry))
                .add(
                    Rectangle::new()
                        .set("x", x + 1.0)
                        .set("y", y + ry)
                        .set("width", w - 2.0)
                        .set("height", h - 2.0 * ry)
                        .set("fill", fill)
                        .set("stroke", "none"),
                )
                .add(side(x + 1.0))
                .add(side(x + w - 1.0))
                .add(cap(y + ry))
        }
        NodeShape::Cloud => {
            let d = format!(
                "M{},{} a{},{} 0 0,1 0,-{} a{},{} 0 0,1 {},-{} a{},{} 0 0,1 {},{} a{},{} 0 0,1 -{},{} Z",
                x + w * 0.2,
                y + h * 0.75,
                w * 0.15,
                w * 0.15,
                h * 0.5,
                w * 0.2,
                w * 0.2,
                w * 0.35,
                h * 0.15,
                w * 0.25,
                w * 0.25,
                w * 0.4,
                h * 0.3,
                w * 0.15,
                w * 0.15,
                w * 0.1,
                h * 0.35,
            );
            group.add(painted!(Path::new().set("d", d), style, fill))
        }
        _ => group.add(painted!(
            Rectangle::new()
                .set("x", x)
                .set("y", y)
                .set("width", w)
                .set("height", h)
                .set("rx", style.border_radius.unwrap_or(4.0)),
            style,
            fill
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Start and end points on the facing borders of two nodes.
fn connection_points(source: &DiagramNode, target: &DiagramNode) -> (Position, Position, Side) {
    let (sp, ss) = node_box(source);
    let (tp, ts) = node_box(target);
    let (scx, scy) = (sp.x + ss.width / 2.0, sp.y + ss.height / 2.0);
    let (tcx, tcy) = (tp.x + ts.width / 2.0, tp.y + ts.height / 2.0);
    let (dx, dy) = (tcx - scx, tcy - scy);

    let point = |x, y| Position { x, y };
    if dy.abs() > dx.abs() {
        if dy > 0.0 {
            (point(scx, sp.y + ss.height), point(tcx, tp.y), Side::Bottom)
        } else {
            (point(scx, sp.y), point(tcx, tp.y + ts.height), Side::Top)
        }
    } else if dx > 0.0 {
        (point(sp.x + ss.width, scy), point(tp.x, tcy), Side::Right)
    } else {
        (point(sp.x, scy), point(tp.x + ts.width, tcy), Side::Left)
    }
}

fn render_edge(edge: &DiagramEdge, model: &DiagramModel) -> Option<Group> {
    let source = model.get_node(edge.source)?;
    let target = model.get_node(edge.target)?;
    let (start, end, side) = connection_points(source, target);

    let style = edge.style.clone().unwrap_or_default();
    let control = (end.x - start.x).abs().min((end.y - start.y).abs()).min(50.0) + 30.0;
    let d = match side {
        Side::Bottom | Side::Top => {
            let sign = if side == Side::Bottom { 1.0 } else { -1.0 };
            format!(
                "M{},{} C{},{} {},{} {},{}",
                start.x,
                start.y,
                start.x,
                start.y + sign * control,
                end.x,
                end.y - sign * control,
                end.x,
                end.y
            )
        }
        Side::Right | Side::Left => {
            let sign = if side == Side::Right { 1.0 } else { -1.0 };
            format!(
                "M{},{} C{},{} {},{} {},{}",
                start.x,
                start.y,
                start.x + sign * control,
                start.y,
                end.x - sign * control,
                end.y,
                end.x,
                end.y
            )
        }
    };

    let mut path = Path::new()
        .set("d", d)
        .set("fill", "none")
        .set("stroke", style.stroke.as_deref().unwrap_or("#475569"))
        .set("stroke-width", style.stroke_width.unwrap_or(1.5));
    if style.line_type == Some(LineType::Dashed) {
        path = path.set("stroke-dasharray", "5,5");
    }
    if let Some(opacity) = style.opacity {
        path = path.set("opacity", opacity);
    }
    if edge.target_arrow != Some(ArrowHead::None) {
        path = path.set("marker-end", format!("url(#{ARROW_END})"));
    }
    if edge.source_arrow.is_some_and(|arrow| arrow != ArrowHead::None) {
        path = path.set("marker-start", format!("url(#{ARROW_START})"));
    }

    let mut rendered = Group::new()
        .set("class", "edge")
        .set("id", format!("edge-{}", edge.id))
        .add(path);

    if let Some(label) = &edge.label {
        let (lx, ly) = ((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        rendered = rendered
            .add(
                Rectangle::new()
                    .set("x", lx - 20.0)
                    .set("y", ly - 10.0)
                    .set("width", 40)
                    .set("height", 20)
                    .set("fill", "white")
                    .set("stroke", "#e0e0e0")
                    .set("rx", 4),
            )
            .add(
                Text::new(label.as_str())
                    .set("x", lx)
                    .set("y", ly)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "middle")
                    .set("font-size", 12)
                    .set("font-family", FONT_FAMILY),
            );
    }
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use diagen_core::{
        identifier::Id,
        ir::DiagramIr,
        style::{EdgeStyle, Gradient},
    };

    use super::*;

    fn node_at(id: &str, x: f64, y: f64) -> DiagramNode {
        DiagramNode {
            position: Some(Position { x, y }),
            size: Some(Size::new(150.0, 50.0)),
            ..DiagramNode::new(Id::new(id), id)
        }
    }

    fn model(nodes: Vec<DiagramNode>, edges: Vec<DiagramEdge>) -> DiagramModel {
        DiagramModel::from_ir(&DiagramIr {
            nodes,
            edges,
            ..DiagramIr::default()
        })
    }

    #[test]
    fn test_dimensions_include_margin() {
        let model = model(vec![node_at("a", 0.0, 0.0), node_at("b", 0.0, 130.0)], Vec::new());

        let svg = export_svg(&model, &SvgOptions::default());

        assert!(svg.contains("width=\"250\""));
        assert!(svg.contains("height=\"280\""));
        assert!(svg.contains("translate(50, 50)"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_empty_model_and_fixed_size() {
        let empty = model(Vec::new(), Vec::new());
        assert!(export_svg(&empty, &SvgOptions::default()).contains("width=\"500\""));

        let options = SvgOptions {
            width: Some(1024.0),
            height: Some(768.0),
            background_color: Some("transparent".to_string()),
        };
        let svg = export_svg(&empty, &options);
        assert!(svg.contains("width=\"1024\""));
        assert!(svg.contains("height=\"768\""));
        assert!(!svg.contains("100%"));
    }

    #[test]
    fn test_edges_with_missing_endpoints_are_skipped() {
        let model = model(
            vec![node_at("a", 0.0, 0.0), node_at("b", 0.0, 130.0)],
            vec![
                DiagramEdge::new(Id::new("e1"), Id::new("a"), Id::new("b")).with_label("go"),
                DiagramEdge::new(Id::new("e2"), Id::new("a"), Id::new("ghost")),
            ],
        );

        let svg = export_svg(&model, &SvgOptions::default());

        assert!(svg.contains("edge-e1"));
        assert!(!svg.contains("edge-e2"));
        assert!(svg.contains(">go<"));
    }

    #[test]
    fn test_dashed_and_bidirectional_edges() {
        let mut edge = DiagramEdge::new(Id::new("e1"), Id::new("a"), Id::new("b"))
            .with_style(EdgeStyle::with_line_type(LineType::Dashed));
        edge.source_arrow = Some(ArrowHead::Arrow);
        edge.target_arrow = Some(ArrowHead::Arrow);
        let model = model(vec![node_at("a", 0.0, 0.0), node_at("b", 300.0, 0.0)], vec![edge]);

        let svg = export_svg(&model, &SvgOptions::default());

        assert!(svg.contains("stroke-dasharray=\"5,5\""));
        assert!(svg.contains("marker-start=\"url(#arrowhead-start)\""));
        assert!(svg.contains("marker-end=\"url(#arrowhead)\""));
    }

    #[test]
    fn test_shapes_and_gradients() {
        let mut db = node_at("db", 0.0, 0.0).with_shape(NodeShape::Database);
        db.style = Some(NodeStyle {
            gradient: Some(Gradient::linear("#ff0000", "#0000ff")),
            ..NodeStyle::default()
        });
        let decision = node_at("ok", 200.0, 0.0).with_shape(NodeShape::Diamond);
        let model = model(vec![db, decision], Vec::new());

        let svg = export_svg(&model, &SvgOptions::default());

        assert!(svg.contains("<linearGradient"));
        assert!(svg.contains("url(#gradient-db)"));
        assert!(svg.contains("<line"));
        assert!(svg.contains("points=\"275,0 350,25 275,50 200,25\""));
    }
}
