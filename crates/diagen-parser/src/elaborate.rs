//! IR construction for the Diagen syntax tree
//!
//! This module walks the [`parser_types`] tree and builds a
//! [`DiagramIr`]: it collects nodes, groups and edges, expands edge chains
//! and fan-out lists, resolves `group.node` references and converts
//! attribute lists into styles, shapes and ports.

use indexmap::IndexMap;
use log::{debug, info, trace};

use diagen_core::{
    identifier::Id,
    ir::{
        ArrowHead, DiagramEdge, DiagramGroup, DiagramIr, DiagramNode, Direction, DocumentMeta,
        NodeShape, Port, PortSide,
    },
    style::{EdgeStyle, Gradient, GradientKind, NodeStyle, Shadow},
    value::{ArrayItem, Value},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result, SourceLocation},
    parser_types as types,
    span::Span,
};

/// Attributes of a node or group after conversion.
#[derive(Debug, Default)]
struct ElementAttributes {
    shape: Option<NodeShape>,
    style: NodeStyle,
    icon: Option<String>,
    ports: Vec<Port>,
    label: Option<String>,
    direction: Option<Direction>,
}

/// A resolved edge endpoint, optionally pointing at a port.
#[derive(Debug, Clone)]
struct Endpoint {
    node: String,
    port: Option<String>,
}

/// Result of visiting a node set that appears in an edge chain.
struct EdgeNodeSet {
    endpoints: Vec<Endpoint>,
    label: Option<String>,
}

pub struct Builder<'a> {
    source: &'a str,
    nodes: IndexMap<Id, DiagramNode>,
    groups: IndexMap<Id, DiagramGroup>,
    edges: Vec<DiagramEdge>,
    edge_counter: usize,
}

impl<'a> Builder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            nodes: IndexMap::new(),
            groups: IndexMap::new(),
            edges: Vec::new(),
            edge_counter: 0,
        }
    }

    // ============================================================================
    // Main Entry Methods
    // ============================================================================

    pub fn build(mut self, document: &types::Document<'_>) -> Result<DiagramIr> {
        let kind = *document.header.kind.inner();
        let subtype = document
            .header
            .subtype
            .as_ref()
            .map(|subtype| subtype.inner().to_string());
        debug!(kind:%, subtype:?; "Building diagram IR");

        let meta = Self::build_meta(&document.meta)?;
        trace!(meta:?; "Document metadata");

        self.build_body(&document.body, None)?;

        info!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            groups = self.groups.len();
            "IR construction completed",
        );

        Ok(DiagramIr {
            kind,
            subtype,
            meta,
            nodes: self.nodes.into_values().collect(),
            edges: self.edges,
            groups: self.groups.into_values().collect(),
        })
    }

    fn build_meta(properties: &[types::MetaProperty<'_>]) -> Result<DocumentMeta> {
        let mut meta = DocumentMeta::default();

        for property in properties {
            let key = *property.key.inner();
            match key {
                "title" => {
                    meta.title = Some(Self::extract_text(&property.value, key)?.to_string());
                }
                "theme" => {
                    meta.theme = Some(Self::extract_text(&property.value, key)?.to_string());
                }
                "direction" => {
                    meta.direction = Some(Self::extract_direction(&property.value)?);
                }
                _ => {
                    meta.extra
                        .insert(key.to_string(), Self::convert_value(&property.value));
                }
            }
        }

        Ok(meta)
    }

    // ============================================================================
    // Statement Methods
    // ============================================================================

    fn build_body(&mut self, body: &[types::Statement<'_>], group: Option<Id>) -> Result<()> {
        for statement in body {
            match statement {
                types::Statement::NodeOrEdge(stmt) => self.build_node_or_edge(stmt, group)?,
                types::Statement::Group(group_def) => self.build_group(group_def, group)?,
                types::Statement::Place(place) => {
                    let placement = place.placement.inner();
                    debug!(
                        location:% = self.location(place.placement.span()),
                        x = placement.x,
                        y = placement.y,
                        width = placement.width,
                        height = placement.height,
                        kind:% = place.document.header.kind.inner(),
                        statements = place.document.body.len();
                        "Skipping place block, page composition produces no diagram content",
                    );
                }
                types::Statement::Element(element) => {
                    let entries = element.block.as_deref().unwrap_or_default();
                    let count = |kind: types::BlockEntry| entries.iter().filter(|e| **e == kind).count();
                    debug!(
                        location:% = self.location(element.keyword.span()),
                        keyword = *element.keyword.inner(),
                        id = element.id.inner().as_str(),
                        properties = count(types::BlockEntry::Property),
                        elements = count(types::BlockEntry::Element),
                        statements = count(types::BlockEntry::Statement);
                        "Skipping element definition, infographic elements produce no diagram content",
                    );
                }
            }
        }
        Ok(())
    }

    fn build_node_or_edge(
        &mut self,
        stmt: &types::NodeOrEdgeStatement<'_>,
        group: Option<Id>,
    ) -> Result<()> {
        if stmt.chain.is_empty() {
            // A lone parenthesized list only references nodes.
            if let types::NodeSet::Single(def) = &stmt.head {
                self.build_standalone_node(def, group)?;
            }
            return Ok(());
        }

        let mut sources = self.visit_edge_node_set(&stmt.head, group)?.endpoints;

        for hop in &stmt.chain {
            let target_set = self.visit_edge_node_set(&hop.target, group)?;
            let label = target_set
                .label
                .or_else(|| hop.label.as_ref().map(|label| label.inner().clone()));
            let arrow = *hop.arrow.inner();

            for source in &sources {
                for target in &target_set.endpoints {
                    self.edge_counter += 1;
                    let mut edge = DiagramEdge::new(
                        Id::from_sequence("e", self.edge_counter),
                        Id::new(&source.node),
                        Id::new(&target.node),
                    )
                    .with_style(EdgeStyle::with_line_type(arrow.line_type()));

                    edge.source_port = source.port.as_deref().map(Id::new);
                    edge.target_port = target.port.as_deref().map(Id::new);
                    edge.label = label.clone();
                    edge.target_arrow = Some(ArrowHead::Arrow);
                    if arrow.is_bidirectional() {
                        edge.source_arrow = Some(ArrowHead::Arrow);
                    }

                    trace!(edge:?; "Created edge");
                    self.edges.push(edge);
                }
            }

            sources = target_set.endpoints;
        }

        Ok(())
    }

    /// Define a node outside of an edge chain. The first definition of an id
    /// wins; later ones are ignored.
    fn build_standalone_node(&mut self, def: &types::NodeDef<'_>, group: Option<Id>) -> Result<()> {
        let full_id = def.path.joined();

        let label = match &def.suffix {
            Some(types::NodeSuffix::Port(_)) => return Ok(()),
            Some(types::NodeSuffix::Label(label)) => label.inner().clone(),
            None => def.path.first().to_string(),
        };

        let id = Id::new(&full_id);
        if self.nodes.contains_key(&id) {
            debug!(id:%; "Node already defined, keeping first definition");
            return Ok(());
        }

        let attrs = Self::extract_attributes(&def.attributes, false)?;
        let node = Self::new_node(id, label, attrs, group);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Visit a node set inside an edge chain.
    ///
    /// A single definition may create its node, with the id as label; its
    /// trailing string becomes the edge label. Dotted references that name a
    /// node declared inside the group resolve to that node.
    fn visit_edge_node_set(
        &mut self,
        set: &types::NodeSet<'_>,
        group: Option<Id>,
    ) -> Result<EdgeNodeSet> {
        let def = match set {
            types::NodeSet::List(refs) => {
                let endpoints = refs
                    .iter()
                    .map(|node_ref| Endpoint {
                        node: self.resolve_node_id(&node_ref.path.joined()),
                        port: node_ref.port.as_ref().map(|port| port.inner().to_string()),
                    })
                    .collect();
                return Ok(EdgeNodeSet {
                    endpoints,
                    label: None,
                });
            }
            types::NodeSet::Single(def) => def,
        };

        let full_id = def.path.joined();
        let resolved = self.resolve_node_id(&full_id);

        let label = match &def.suffix {
            Some(types::NodeSuffix::Port(port)) => {
                return Ok(EdgeNodeSet {
                    endpoints: vec![Endpoint {
                        node: resolved,
                        port: Some(port.inner().to_string()),
                    }],
                    label: None,
                });
            }
            Some(types::NodeSuffix::Label(label)) => Some(label.inner().clone()),
            None => None,
        };

        let id = Id::new(&resolved);
        if resolved == full_id && !self.nodes.contains_key(&id) {
            let attrs = Self::extract_attributes(&def.attributes, false)?;
            let node = Self::new_node(id, full_id, attrs, group);
            self.nodes.insert(id, node);
        }

        Ok(EdgeNodeSet {
            endpoints: vec![Endpoint {
                node: resolved,
                port: None,
            }],
            label,
        })
    }

    /// Resolve `group.node` to `node` when `node` was declared inside `group`.
    ///
    /// Only two-segment paths are resolved; anything else is returned as is.
    fn resolve_node_id(&self, full_id: &str) -> String {
        if let Some((group, node)) = full_id.split_once('.') {
            if !node.contains('.') && self.groups.contains_key(&Id::new(group)) {
                let group_id = Id::new(group);
                if let Some(existing) = self.nodes.get(&Id::new(node)) {
                    if existing.parent_id == Some(group_id) {
                        return node.to_string();
                    }
                }
            }
            debug!(reference = full_id; "Dotted reference kept as a literal id");
        }
        full_id.to_string()
    }

    fn new_node(id: Id, label: String, attrs: ElementAttributes, group: Option<Id>) -> DiagramNode {
        let mut node =
            DiagramNode::new(id, label).with_shape(attrs.shape.unwrap_or(NodeShape::Rect));
        if !attrs.style.is_empty() {
            node.style = Some(attrs.style);
        }
        node.icon = attrs.icon;
        node.ports = attrs.ports;
        node.parent_id = group;
        node
    }

    fn build_group(&mut self, def: &types::GroupDef<'_>, parent: Option<Id>) -> Result<()> {
        let id = Id::new(def.id.inner());
        let attrs = Self::extract_attributes(&def.attributes, true)?;

        let mut group = DiagramGroup::new(id);
        group.label = Some(attrs.label.unwrap_or_else(|| def.id.inner().to_string()));
        if !attrs.style.is_empty() {
            group.style = Some(attrs.style);
        }
        group.parent_id = parent;
        group.direction = attrs.direction;
        debug!(id:%, parent:?; "Building group");

        self.groups.insert(id, group);
        self.build_body(&def.body, Some(id))?;

        let children: Vec<Id> = self
            .nodes
            .values()
            .filter(|node| node.parent_id == Some(id))
            .map(|node| node.id)
            .collect();
        if let Some(group) = self.groups.get_mut(&id) {
            group.children = children;
        }

        Ok(())
    }

    // ============================================================================
    // Attribute Methods
    // ============================================================================

    /// Convert an attribute list into shape, style, icon and ports.
    ///
    /// A bare attribute names the shape. Later attributes replace earlier
    /// ones. Style flags are only applied when their value is truthy.
    /// `label` and `direction` are only read for groups.
    fn extract_attributes(
        attributes: &[types::Attribute<'_>],
        is_group: bool,
    ) -> Result<ElementAttributes> {
        let mut attrs = ElementAttributes::default();

        for attr in attributes {
            let name = *attr.name.inner();
            let Some(value) = &attr.value else {
                attrs.shape = Some(NodeShape::from(name));
                continue;
            };

            match name {
                "shape" => attrs.shape = Some(NodeShape::from(Self::extract_text(value, name)?)),
                "icon" => attrs.icon = Some(Self::extract_text(value, name)?.to_string()),
                "ports" => attrs.ports = Self::extract_ports(attr, value)?,
                "label" if is_group => {
                    attrs.label = Some(Self::extract_text(value, name)?.to_string());
                }
                "direction" if is_group => attrs.direction = Some(Self::extract_direction(value)?),
                _ if !value_is_truthy(value) => {}
                "fill" => match Self::extract_gradient(value) {
                    Some(gradient) => attrs.style.gradient = Some(gradient),
                    None => attrs.style.fill = Some(Self::extract_text(value, name)?.to_string()),
                },
                "stroke" => {
                    attrs.style.stroke = Some(Self::extract_text(value, name)?.to_string());
                }
                "strokeWidth" => {
                    attrs.style.stroke_width = Some(Self::extract_number(value, name)?);
                }
                "borderRadius" => {
                    attrs.style.border_radius = Some(Self::extract_number(value, name)?);
                }
                "opacity" => attrs.style.opacity = Some(Self::extract_fraction(value, name)?),
                "dashed" => attrs.style.dashed = Some(Self::extract_bool(value, name)?),
                "shadow" => attrs.style.shadow = Some(Shadow::default()),
                "gradient" => {
                    let gradient = Self::extract_gradient(value).ok_or_else(|| {
                        Self::invalid_value(value, name, "a gradient such as `linear(#ffffff, #000000)`")
                    })?;
                    attrs.style.gradient = Some(gradient);
                }
                other => trace!(attribute = other; "Ignoring unknown attribute"),
            }
        }

        Ok(attrs)
    }

    /// `radial(...)` selects a radial gradient, any other name a linear one.
    fn extract_gradient(value: &types::Value<'_>) -> Option<Gradient> {
        let types::Value::Gradient { name, from, to } = value else {
            return None;
        };
        let mut gradient = Gradient::linear(*from.inner(), *to.inner());
        if *name.inner() == "radial" {
            gradient.kind = GradientKind::Radial;
        }
        Some(gradient)
    }

    /// Extract the port list of a `ports: (...)` attribute.
    ///
    /// Each item's value is the port id. The side comes from a `side:` or
    /// `position:` attribute or a bare `top`, `bottom`, `left` or `right`.
    fn extract_ports(attr: &types::Attribute<'_>, value: &types::Value<'_>) -> Result<Vec<Port>> {
        let types::Value::Array(items) = value else {
            return Err(Diagnostic::error(format!(
                "invalid ports value, expected an array but found `{value}`"
            ))
            .with_code(ErrorCode::E303)
            .with_label(attr.span(), "invalid ports")
            .with_help("list ports as `ports: (in [side: left], out [side: right])`"));
        };

        items
            .iter()
            .map(|item| {
                let id = value_text(&item.value).ok_or_else(|| {
                    Diagnostic::error(format!("invalid port id `{}`", item.value))
                        .with_code(ErrorCode::E303)
                        .with_label(item.value.span(), "invalid port id")
                        .with_help("port ids must be identifiers or strings")
                })?;

                let mut port = Port {
                    id: Id::new(id),
                    side: PortSide::default(),
                    label: None,
                };

                for port_attr in &item.attributes {
                    let name = *port_attr.name.inner();
                    match (&port_attr.value, name) {
                        (None, side) => port.side = Self::port_side(side, port_attr.span())?,
                        (Some(side), "side" | "position") => {
                            let text = Self::extract_text(side, name)?;
                            port.side = Self::port_side(text, side.span())?;
                        }
                        (Some(label), "label") => {
                            port.label = Some(Self::extract_text(label, name)?.to_string());
                        }
                        (Some(_), other) => {
                            trace!(attribute = other; "Ignoring unknown port attribute");
                        }
                    }
                }

                Ok(port)
            })
            .collect()
    }

    fn port_side(text: &str, span: Span) -> Result<PortSide> {
        text.parse().map_err(|err: String| {
            Diagnostic::error(format!("invalid port: {err}"))
                .with_code(ErrorCode::E303)
                .with_label(span, "invalid port side")
                .with_help("use one of top, bottom, left, right")
        })
    }

    // ============================================================================
    // Value Extraction Helpers
    // ============================================================================

    fn invalid_value(value: &types::Value<'_>, key: &str, expected: &str) -> Diagnostic {
        Diagnostic::error(format!("invalid {key} value `{value}`"))
            .with_code(ErrorCode::E301)
            .with_label(value.span(), format!("invalid {key} value"))
            .with_help(format!("{key} must be {expected}"))
    }

    /// Extract text from a string, identifier or color value.
    fn extract_text<'b>(value: &'b types::Value<'_>, key: &str) -> Result<&'b str> {
        value_text(value).ok_or_else(|| Self::invalid_value(value, key, "a string"))
    }

    fn extract_number(value: &types::Value<'_>, key: &str) -> Result<f64> {
        match value {
            types::Value::Number(n) => Ok(*n.inner()),
            other => Err(Self::invalid_value(other, key, "a number")),
        }
    }

    /// Extract a number, accepting a percentage as a fraction of one.
    fn extract_fraction(value: &types::Value<'_>, key: &str) -> Result<f64> {
        match value {
            types::Value::Percent(p) => Ok(*p.inner() as f64 / 100.0),
            other => Self::extract_number(other, key),
        }
    }

    fn extract_bool(value: &types::Value<'_>, key: &str) -> Result<bool> {
        match value {
            types::Value::Bool(b) => Ok(*b.inner()),
            other => Err(Self::invalid_value(other, key, "`true` or `false`")),
        }
    }

    fn extract_direction(value: &types::Value<'_>) -> Result<Direction> {
        let text = value_text(value).unwrap_or_default();
        text.parse().map_err(|err: String| {
            Diagnostic::error(err)
                .with_code(ErrorCode::E302)
                .with_label(value.span(), "invalid direction")
                .with_help("use one of TB, BT, LR, RL")
        })
    }

    /// Convert a literal into its IR value.
    ///
    /// Bare attributes of array items become `true` flags.
    fn convert_value(value: &types::Value<'_>) -> Value {
        match value {
            types::Value::String(s) => Value::String(s.inner().clone()),
            types::Value::Number(n) => Value::Number(*n.inner()),
            types::Value::Bool(b) => Value::Bool(*b.inner()),
            types::Value::Color(c) => Value::Color(c.inner().to_string()),
            types::Value::Percent(p) => Value::Percent(*p.inner()),
            types::Value::Gradient { name, from, to } => Value::Gradient {
                name: name.inner().to_string(),
                from: from.inner().to_string(),
                to: to.inner().to_string(),
            },
            types::Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| {
                        let attributes = item
                            .attributes
                            .iter()
                            .map(|attr| {
                                let value = attr
                                    .value
                                    .as_ref()
                                    .map(Self::convert_value)
                                    .unwrap_or(Value::Bool(true));
                                (attr.name.inner().to_string(), value)
                            })
                            .collect();
                        ArrayItem::with_attributes(Self::convert_value(&item.value), attributes)
                    })
                    .collect(),
            ),
            types::Value::Identifier(id) => Value::Identifier(id.inner().to_string()),
        }
    }

    fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::from_offset(self.source, span.start())
    }
}

fn value_text<'b>(value: &'b types::Value<'_>) -> Option<&'b str> {
    match value {
        types::Value::String(s) => Some(s.inner().as_str()),
        types::Value::Identifier(s) | types::Value::Color(s) => Some(s.inner()),
        _ => None,
    }
}

/// `false`, `0` and `""` do not set a style flag.
fn value_is_truthy(value: &types::Value<'_>) -> bool {
    match value {
        types::Value::Bool(b) => *b.inner(),
        types::Value::Number(n) => *n.inner() != 0.0,
        types::Value::String(s) => !s.inner().is_empty(),
        types::Value::Percent(p) => *p.inner() != 0,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser, span::Spanned};

    use diagen_core::style::LineType;

    fn build(source: &str) -> Result<DiagramIr> {
        let tokens = lexer::tokenize(source).expect("lexing should succeed");
        let document = parser::build_document(&tokens).expect("parsing should succeed");
        Builder::new(source).build(&document)
    }

    fn build_ok(source: &str) -> DiagramIr {
        build(source).unwrap_or_else(|err| panic!("IR construction failed: {err}"))
    }

    fn node<'a>(ir: &'a DiagramIr, id: &str) -> &'a DiagramNode {
        ir.node(Id::new(id))
            .unwrap_or_else(|| panic!("node `{id}` not found"))
    }

    #[test]
    fn test_header_and_meta() {
        let ir = build_ok(
            "@diagram flowchart\n---\ntitle: \"Flow\"\ntheme: modern\ndirection: LR\nwidth: 640\n---\n",
        );
        assert_eq!(ir.subtype.as_deref(), Some("flowchart"));
        assert_eq!(ir.meta.title.as_deref(), Some("Flow"));
        assert_eq!(ir.meta.theme.as_deref(), Some("modern"));
        assert_eq!(ir.meta.direction, Some(Direction::LR));
        assert_eq!(ir.meta.number("width"), Some(640.0));
    }

    #[test]
    fn test_invalid_meta_direction() {
        let err = build("@diagram\n---\ndirection: UP\n---\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E302));
    }

    #[test]
    fn test_chain_creates_nodes_and_edges() {
        let ir = build_ok("@diagram\nA -> B --> C\n");
        let ids: Vec<String> = ir.nodes.iter().map(|n| n.id.as_string()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(node(&ir, "B").label, "B");
        assert_eq!(ir.edges.len(), 2);
        assert_eq!(ir.edges[0].id, "e1");
        assert_eq!(ir.edges[1].id, "e2");
        assert_eq!(ir.edges[1].source, "B");
        assert_eq!(
            ir.edges[1].style.as_ref().and_then(|s| s.line_type),
            Some(LineType::Dashed)
        );
        assert_eq!(ir.edges[0].target_arrow, Some(ArrowHead::Arrow));
        assert_eq!(ir.edges[0].source_arrow, None);
    }

    #[test]
    fn test_bidirectional_arrow_heads() {
        let ir = build_ok("@diagram\nA <=> B\n");
        let edge = &ir.edges[0];
        assert_eq!(edge.source_arrow, Some(ArrowHead::Arrow));
        assert_eq!(
            edge.style.as_ref().and_then(|s| s.line_type),
            Some(LineType::Bold)
        );
    }

    #[test]
    fn test_edge_label_from_target() {
        let ir = build_ok("@diagram\nA -> B: \"calls\"\n");
        assert_eq!(ir.edges[0].label.as_deref(), Some("calls"));
        assert_eq!(node(&ir, "B").label, "B");
    }

    #[test]
    fn test_fan_out_cross_product() {
        let ir = build_ok("@diagram\nA\nB\nC\nD\n(A, B) -> (C, D)\n");
        let pairs: Vec<(String, String)> = ir
            .edges
            .iter()
            .map(|e| (e.source.as_string(), e.target.as_string()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("A".to_string(), "C".to_string()),
                ("A".to_string(), "D".to_string()),
                ("B".to_string(), "C".to_string()),
                ("B".to_string(), "D".to_string()),
            ]
        );
    }

    #[test]
    fn test_ports_on_edges() {
        let ir = build_ok("@diagram\nA:out -> B:in\n(A:x) -> B\n");
        assert_eq!(ir.edges[0].source_port, Some(Id::new("out")));
        assert_eq!(ir.edges[0].target_port, Some(Id::new("in")));
        assert_eq!(ir.edges[1].source_port, Some(Id::new("x")));
        // Port references never create nodes.
        assert!(ir.nodes.iter().all(|n| n.id != "A"));
    }

    #[test]
    fn test_first_definition_wins() {
        let ir = build_ok("@diagram\nA: \"First\" [diamond]\nA: \"Second\" [circle]\nA -> B\n");
        let a = node(&ir, "A");
        assert_eq!(a.label, "First");
        assert_eq!(a.shape, NodeShape::Diamond);
        assert_eq!(ir.nodes.len(), 2);
    }

    #[test]
    fn test_standalone_label_defaults_to_first_segment() {
        let ir = build_ok("@diagram\nsvc.api\n");
        let n = node(&ir, "svc.api");
        assert_eq!(n.label, "svc");
    }

    #[test]
    fn test_groups_and_children() {
        let source = r#"
            @diagram architecture
            group backend [label: "Backend", direction: LR, fill: #eeeeee] {
                api
                db [cylinder]
                group cache {
                    redis
                }
            }
            web -> backend.api
        "#;
        let ir = build_ok(source);

        let backend = ir.group(Id::new("backend")).expect("backend group");
        assert_eq!(backend.label.as_deref(), Some("Backend"));
        assert_eq!(backend.direction, Some(Direction::LR));
        assert_eq!(backend.children, [Id::new("api"), Id::new("db")]);
        assert_eq!(
            backend.style.as_ref().and_then(|s| s.fill.as_deref()),
            Some("#eeeeee")
        );

        let cache = ir.group(Id::new("cache")).expect("cache group");
        assert_eq!(cache.parent_id, Some(Id::new("backend")));
        assert_eq!(cache.label.as_deref(), Some("cache"));
        assert_eq!(node(&ir, "redis").parent_id, Some(Id::new("cache")));

        // `backend.api` resolves to the declared node.
        assert_eq!(ir.edges[0].target, "api");
        assert!(ir.nodes.iter().all(|n| n.id != "backend.api"));
        assert_eq!(node(&ir, "web").parent_id, None);
    }

    #[test]
    fn test_unresolved_dotted_reference_creates_node() {
        let ir = build_ok("@diagram\nA -> other.B\n");
        assert_eq!(ir.edges[0].target, "other.B");
        assert_eq!(node(&ir, "other.B").label, "other.B");
    }

    #[test]
    fn test_invalid_group_direction() {
        let err = build("@diagram\ngroup g [direction: sideways] {\n}\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E302));
    }

    #[test]
    fn test_node_style_attributes() {
        let source = "@diagram\nA [fill: #ff0000, stroke: #000000, strokeWidth: 2, opacity: 50%, dashed: true, shadow: true, borderRadius: 6, gradient: radial(#ffffff, #000000), icon: server]\n";
        let ir = build_ok(source);
        let a = node(&ir, "A");
        let style = a.style.as_ref().expect("style");
        assert_eq!(style.fill.as_deref(), Some("#ff0000"));
        assert_eq!(style.stroke.as_deref(), Some("#000000"));
        assert_eq!(style.stroke_width, Some(2.0));
        assert_eq!(style.opacity, Some(0.5));
        assert_eq!(style.dashed, Some(true));
        assert_eq!(style.shadow, Some(Shadow::default()));
        assert_eq!(style.border_radius, Some(6.0));
        assert_eq!(
            style.gradient.as_ref().map(|g| g.kind),
            Some(GradientKind::Radial)
        );
        assert_eq!(a.icon.as_deref(), Some("server"));
    }

    #[test]
    fn test_falsy_flags_are_ignored() {
        let ir = build_ok("@diagram\nA [dashed: false, shadow: false, strokeWidth: 0]\n");
        assert!(node(&ir, "A").style.is_none());
    }

    #[test]
    fn test_shape_attribute_and_custom_shape() {
        let ir = build_ok("@diagram\nA [shape: hexagon]\nB [primary]\n");
        assert_eq!(node(&ir, "A").shape, NodeShape::Hexagon);
        assert_eq!(node(&ir, "B").shape, NodeShape::Custom("primary".into()));
    }

    #[test]
    fn test_type_mismatch() {
        let err = build("@diagram\nA [strokeWidth: \"wide\"]\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E301));
        assert!(err.message().contains("strokeWidth"));
    }

    #[test]
    fn test_ports_attribute() {
        let source = "@diagram\nA [ports: (in [side: left], out [bottom, label: \"Out\"], aux)]\n";
        let ir = build_ok(source);
        let ports = &node(&ir, "A").ports;
        assert_eq!(ports.len(), 3);
        assert_eq!(ports[0].side, PortSide::Left);
        assert_eq!(ports[1].side, PortSide::Bottom);
        assert_eq!(ports[1].label.as_deref(), Some("Out"));
        assert_eq!(ports[2].side, PortSide::Right);
    }

    #[test]
    fn test_invalid_port_side() {
        let err = build("@diagram\nA [ports: (in [side: up])]\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E303));
    }

    #[test]
    fn test_ports_must_be_array() {
        let err = build("@diagram\nA [ports: in]\n").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E303));
    }

    #[test]
    fn test_place_and_elements_produce_no_ir() {
        let source = "@page\nplace [0, 0, 100, 100] {\n@diagram\nX -> Y\n}\nstep \"Design\" {\n  status: done\n}\n";
        let ir = build_ok(source);
        assert!(ir.nodes.is_empty());
        assert!(ir.edges.is_empty());
    }

    #[test]
    fn test_meta_array_value() {
        let ir = build_ok("@diagram\n---\nlegend: (\"a\" [bold], 2)\n---\n");
        let Some(Value::Array(items)) = ir.meta.get("legend") else {
            panic!("Expected array");
        };
        assert_eq!(items[0].attributes.get("bold"), Some(&Value::Bool(true)));
        assert_eq!(items[1].value, Value::Number(2.0));
    }

    #[test]
    fn test_extract_text_error() {
        let value = types::Value::Number(Spanned::new(1.0, Span::new(0..1)));
        let err = Builder::extract_text(&value, "title").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E301));
        assert!(err.to_string().contains("invalid title value"));
    }
}
