//! Intermediate representation of a parsed diagram.
//!
//! The IR is flat: nodes, edges and groups live in three ordered lists and
//! refer to each other by [`Id`]. Group membership is expressed twice, once
//! through `parent_id` on the member and once through the group's
//! `children` list.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    identifier::Id,
    style::{EdgeStyle, NodeStyle},
    value::Value,
};

/// Shape of a node.
///
/// Names outside the built-in set are kept as [`NodeShape::Custom`]; theme
/// tables use such names as style variants (`[primary]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeShape {
    #[default]
    Rect,
    RoundRect,
    Circle,
    Ellipse,
    Diamond,
    Hexagon,
    Octagon,
    Parallelogram,
    Cylinder,
    Cloud,
    Person,
    Document,
    Queue,
    Storage,
    Database,
    Folder,
    Custom(String),
}

impl NodeShape {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rect => "rect",
            Self::RoundRect => "roundRect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Hexagon => "hexagon",
            Self::Octagon => "octagon",
            Self::Parallelogram => "parallelogram",
            Self::Cylinder => "cylinder",
            Self::Cloud => "cloud",
            Self::Person => "person",
            Self::Document => "document",
            Self::Queue => "queue",
            Self::Storage => "storage",
            Self::Database => "database",
            Self::Folder => "folder",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` for the built-in shapes.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl From<&str> for NodeShape {
    fn from(name: &str) -> Self {
        match name {
            "rect" => Self::Rect,
            "roundRect" => Self::RoundRect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "diamond" => Self::Diamond,
            "hexagon" => Self::Hexagon,
            "octagon" => Self::Octagon,
            "parallelogram" => Self::Parallelogram,
            "cylinder" => Self::Cylinder,
            "cloud" => Self::Cloud,
            "person" => Self::Person,
            "document" => Self::Document,
            "queue" => Self::Queue,
            "storage" => Self::Storage,
            "database" => Self::Database,
            "folder" => Self::Folder,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for NodeShape {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<NodeShape> for String {
    fn from(shape: NodeShape) -> Self {
        shape.as_str().to_string()
    }
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortSide {
    Top,
    Bottom,
    Left,
    #[default]
    Right,
}

impl FromStr for PortSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown port side `{other}`")),
        }
    }
}

impl fmt::Display for PortSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Named attachment point on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: Id,
    #[serde(rename = "position")]
    pub side: PortSide,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Arrow head drawn at an edge end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowHead {
    #[default]
    None,
    Arrow,
    Diamond,
    Circle,
}

/// Layout direction of a diagram or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    TB,
    /// Bottom to top.
    BT,
    /// Left to right.
    LR,
    /// Right to left.
    RL,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LR | Self::RL)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TB => "TB",
            Self::BT => "BT",
            Self::LR => "LR",
            Self::RL => "RL",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(Self::TB),
            "BT" => Ok(Self::BT),
            "LR" => Ok(Self::LR),
            "RL" => Ok(Self::RL),
            other => Err(format!(
                "unknown direction `{other}`, expected one of TB, BT, LR, RL"
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A node of the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub id: Id,
    pub label: String,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl DiagramNode {
    /// Creates a `rect` node without style, ports or parent.
    pub fn new(id: Id, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            shape: NodeShape::default(),
            style: None,
            icon: None,
            ports: Vec::new(),
            parent_id: None,
            position: None,
            size: None,
        }
    }

    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// A directed connection between two nodes or groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: Id,
    pub source: Id,
    pub target: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_arrow: Option<ArrowHead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_arrow: Option<ArrowHead>,
}

impl DiagramEdge {
    pub fn new(id: Id, source: Id, target: Id) -> Self {
        Self {
            id,
            source,
            target,
            source_port: None,
            target_port: None,
            label: None,
            style: None,
            source_arrow: None,
            target_arrow: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Returns `true` if the edge starts or ends at `id`.
    pub fn touches(&self, id: Id) -> bool {
        self.source == id || self.target == id
    }
}

/// A named container of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramGroup {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default)]
    pub children: Vec<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl DiagramGroup {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            label: None,
            style: None,
            children: Vec::new(),
            parent_id: None,
            direction: None,
            position: None,
            size: None,
        }
    }

    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_children(mut self, children: Vec<Id>) -> Self {
        self.children = children;
        self
    }

    /// Returns the label, falling back to the id.
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.as_string())
    }
}

/// Kind of document named by the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    #[default]
    Diagram,
    Infographic,
    Page,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Diagram => "diagram",
            Self::Infographic => "infographic",
            Self::Page => "page",
        })
    }
}

/// Document metadata from the `---` block.
///
/// The well-known keys are typed; every other key is kept in `extra` in
/// source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, flatten)]
    pub extra: IndexMap<String, Value>,
}

impl DocumentMeta {
    /// Looks up a custom metadata entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns a custom entry as a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }
}

/// The complete intermediate representation of one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramIr {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
    #[serde(default)]
    pub groups: Vec<DiagramGroup>,
}

impl DiagramIr {
    pub fn node(&self, id: Id) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: Id) -> Option<&DiagramEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn group(&self, id: Id) -> Option<&DiagramGroup> {
        self.groups.iter().find(|group| group.id == id)
    }
}
