//! Partial style records for nodes, groups and edges.
//!
//! Every field is optional. Style layers combine with [`NodeStyle::merge`] and
//! [`EdgeStyle::merge`], where a field set on the overlay replaces the same
//! field of the base and unset fields are inherited. The merge is shallow: a
//! gradient or shadow is replaced as a whole.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of a color gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

/// Two-stop gradient fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

impl Gradient {
    /// Creates a linear gradient between two colors.
    pub fn linear(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: GradientKind::Linear,
            from: from.into(),
            to: to.into(),
            angle: None,
        }
    }
}

/// Drop shadow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

impl Default for Shadow {
    /// The shadow used when an element only says `shadow: true`.
    fn default() -> Self {
        Self {
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 4.0,
            color: "rgba(0,0,0,0.2)".to_string(),
        }
    }
}

/// Style of a node or a group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashed: Option<bool>,
}

impl NodeStyle {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a new style with the fields of `overlay` laid over `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use diagen_core::style::NodeStyle;
    ///
    /// let base = NodeStyle {
    ///     fill: Some("#ffffff".into()),
    ///     stroke: Some("#000000".into()),
    ///     ..NodeStyle::default()
    /// };
    /// let overlay = NodeStyle {
    ///     fill: Some("#ff0000".into()),
    ///     ..NodeStyle::default()
    /// };
    /// let merged = base.merge(&overlay);
    /// assert_eq!(merged.fill.as_deref(), Some("#ff0000"));
    /// assert_eq!(merged.stroke.as_deref(), Some("#000000"));
    /// ```
    pub fn merge(&self, overlay: &NodeStyle) -> NodeStyle {
        NodeStyle {
            fill: overlay.fill.clone().or_else(|| self.fill.clone()),
            stroke: overlay.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_width: overlay.stroke_width.or(self.stroke_width),
            gradient: overlay.gradient.clone().or_else(|| self.gradient.clone()),
            shadow: overlay.shadow.clone().or_else(|| self.shadow.clone()),
            border_radius: overlay.border_radius.or(self.border_radius),
            opacity: overlay.opacity.or(self.opacity),
            dashed: overlay.dashed.or(self.dashed),
        }
    }
}

/// Line type of an edge, chosen by the arrow operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Bold,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Bold => "bold",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "bold" => Ok(Self::Bold),
            other => Err(format!("unknown line type `{other}`")),
        }
    }
}

/// Style of an edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

impl EdgeStyle {
    /// Creates a style that only sets the line type.
    pub fn with_line_type(line_type: LineType) -> Self {
        Self {
            line_type: Some(line_type),
            ..Self::default()
        }
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a new style with the fields of `overlay` laid over `self`.
    pub fn merge(&self, overlay: &EdgeStyle) -> EdgeStyle {
        EdgeStyle {
            stroke: overlay.stroke.clone().or_else(|| self.stroke.clone()),
            stroke_width: overlay.stroke_width.or(self.stroke_width),
            line_type: overlay.line_type.or(self.line_type),
            opacity: overlay.opacity.or(self.opacity),
            animated: overlay.animated.or(self.animated),
        }
    }
}

/// Text style used by theme tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
