//! Built-in theme tables.
//!
//! A [`Theme`] supplies default styles for nodes, edges, groups and text,
//! plus named variants. Node variants are selected by the node's shape name
//! and edge variants by the edge's line type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::style::{EdgeStyle, Gradient, LineType, NodeStyle, Shadow, TextStyle};

/// Name of the theme used when none is selected or a name is unknown.
pub const DEFAULT_THEME: &str = "professional";

/// Color palette of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_secondary: String,
    pub border: String,
    pub success: String,
    pub warning: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub xs: f64,
    pub sm: f64,
    pub md: f64,
    pub lg: f64,
    pub xl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontWeights {
    pub normal: u16,
    pub medium: u16,
    pub bold: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTypography {
    pub font_family: String,
    pub font_size: FontSizes,
    pub font_weight: FontWeights,
}

/// Default style plus named variants for one element kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementTheme<S> {
    pub default: S,
    #[serde(default)]
    pub variants: IndexMap<String, S>,
}

impl<S> ElementTheme<S> {
    pub fn variant(&self, name: &str) -> Option<&S> {
        self.variants.get(name)
    }
}

/// Spacing hints for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSpacing {
    pub node_node: f64,
    pub node_node_between_layers: f64,
    pub edge_node: f64,
}

/// A complete theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    pub typography: ThemeTypography,
    pub node: ElementTheme<NodeStyle>,
    pub edge: ElementTheme<EdgeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ElementTheme<NodeStyle>>,
    pub text: ElementTheme<TextStyle>,
    pub spacing: ThemeSpacing,
}

impl Theme {
    /// Resolves the node style for the variant `name`, layered on the default.
    pub fn node_style(&self, name: &str) -> NodeStyle {
        match self.node.variant(name) {
            Some(variant) => self.node.default.merge(variant),
            None => self.node.default.clone(),
        }
    }

    /// Resolves the edge style for the variant `name`, layered on the default.
    pub fn edge_style(&self, name: &str) -> EdgeStyle {
        match self.edge.variant(name) {
            Some(variant) => self.edge.default.merge(variant),
            None => self.edge.default.clone(),
        }
    }
}

/// Names of the built-in themes.
pub fn theme_names() -> [&'static str; 3] {
    ["professional", "modern", "minimal"]
}

/// Looks up a built-in theme by name.
pub fn find_theme(name: &str) -> Option<Theme> {
    match name {
        "professional" => Some(professional()),
        "modern" => Some(modern()),
        "minimal" => Some(minimal()),
        _ => None,
    }
}

/// Looks up a built-in theme, falling back to `professional`.
pub fn get_theme(name: &str) -> Theme {
    find_theme(name).unwrap_or_else(|| {
        log::warn!(theme = name; "Theme not found, falling back to professional");
        professional()
    })
}

fn node(fill: &str, stroke: &str, stroke_width: f64) -> NodeStyle {
    NodeStyle {
        fill: Some(fill.to_string()),
        stroke: Some(stroke.to_string()),
        stroke_width: Some(stroke_width),
        ..NodeStyle::default()
    }
}

fn gradient_node(from: &str, to: &str, stroke: Option<&str>) -> NodeStyle {
    NodeStyle {
        gradient: Some(Gradient::linear(from, to)),
        stroke: stroke.map(str::to_string),
        stroke_width: Some(0.0),
        ..NodeStyle::default()
    }
}

fn edge(stroke: &str, stroke_width: f64, line_type: LineType) -> EdgeStyle {
    EdgeStyle {
        stroke: Some(stroke.to_string()),
        stroke_width: Some(stroke_width),
        line_type: Some(line_type),
        ..EdgeStyle::default()
    }
}

fn text(font_size: f64, font_weight: Option<u16>, color: &str) -> TextStyle {
    TextStyle {
        font_family: None,
        font_size: Some(font_size),
        font_weight,
        color: Some(color.to_string()),
    }
}

fn shadow(offset_y: f64, blur: f64, color: &str) -> Shadow {
    Shadow {
        offset_x: 0.0,
        offset_y,
        blur,
        color: color.to_string(),
    }
}

fn variants<S>(entries: Vec<(&str, S)>) -> IndexMap<String, S> {
    entries
        .into_iter()
        .map(|(name, style)| (name.to_string(), style))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn palette(
    primary: &str,
    secondary: &str,
    accent: &str,
    background: &str,
    surface: &str,
    text: &str,
    text_secondary: &str,
    border: &str,
    [success, warning, error]: [&str; 3],
) -> ThemeColors {
    ThemeColors {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        accent: accent.to_string(),
        background: background.to_string(),
        surface: surface.to_string(),
        text: text.to_string(),
        text_secondary: text_secondary.to_string(),
        border: border.to_string(),
        success: success.to_string(),
        warning: warning.to_string(),
        error: error.to_string(),
    }
}

/// Clean blue and gray colors for business presentations.
pub fn professional() -> Theme {
    Theme {
        name: "professional".to_string(),
        colors: palette(
            "#2563eb",
            "#64748b",
            "#0891b2",
            "#ffffff",
            "#f8fafc",
            "#1e293b",
            "#64748b",
            "#e2e8f0",
            ["#16a34a", "#ca8a04", "#dc2626"],
        ),
        typography: ThemeTypography {
            font_family:
                "system-ui, -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif"
                    .to_string(),
            font_size: FontSizes {
                xs: 10.0,
                sm: 12.0,
                md: 14.0,
                lg: 16.0,
                xl: 20.0,
            },
            font_weight: FontWeights {
                normal: 400,
                medium: 500,
                bold: 600,
            },
        },
        node: ElementTheme {
            default: NodeStyle {
                border_radius: Some(6.0),
                shadow: Some(shadow(1.0, 3.0, "rgba(0, 0, 0, 0.1)")),
                ..node("#ffffff", "#e2e8f0", 1.0)
            },
            variants: variants(vec![
                ("primary", node("#2563eb", "#1d4ed8", 1.0)),
                ("secondary", node("#f1f5f9", "#cbd5e1", 1.0)),
                ("accent", node("#0891b2", "#0e7490", 1.0)),
                ("success", node("#dcfce7", "#16a34a", 1.0)),
                ("warning", node("#fef9c3", "#ca8a04", 1.0)),
                ("error", node("#fee2e2", "#dc2626", 1.0)),
            ]),
        },
        edge: ElementTheme {
            default: edge("#475569", 1.5, LineType::Solid),
            variants: variants(vec![
                ("primary", edge("#2563eb", 2.0, LineType::Solid)),
                ("dashed", edge("#64748b", 1.5, LineType::Dashed)),
                ("bold", edge("#1e293b", 2.5, LineType::Solid)),
            ]),
        },
        group: None,
        text: ElementTheme {
            default: TextStyle {
                font_family: Some("system-ui, sans-serif".to_string()),
                ..text(14.0, Some(400), "#1e293b")
            },
            variants: variants(vec![
                ("title", text(20.0, Some(600), "#0f172a")),
                ("label", text(12.0, Some(500), "#475569")),
                ("caption", text(10.0, None, "#64748b")),
            ]),
        },
        spacing: ThemeSpacing {
            node_node: 50.0,
            node_node_between_layers: 80.0,
            edge_node: 30.0,
        },
    }
}

/// Vibrant gradients and contemporary design.
pub fn modern() -> Theme {
    Theme {
        name: "modern".to_string(),
        colors: palette(
            "#8b5cf6",
            "#ec4899",
            "#06b6d4",
            "#fafafa",
            "#ffffff",
            "#18181b",
            "#71717a",
            "#e4e4e7",
            ["#22c55e", "#f59e0b", "#ef4444"],
        ),
        typography: ThemeTypography {
            font_family: "\"Inter\", system-ui, -apple-system, sans-serif".to_string(),
            font_size: FontSizes {
                xs: 10.0,
                sm: 12.0,
                md: 14.0,
                lg: 18.0,
                xl: 24.0,
            },
            font_weight: FontWeights {
                normal: 400,
                medium: 500,
                bold: 700,
            },
        },
        node: ElementTheme {
            default: NodeStyle {
                border_radius: Some(12.0),
                shadow: Some(shadow(4.0, 12.0, "rgba(0, 0, 0, 0.08)")),
                ..node("#ffffff", "#e4e4e7", 1.0)
            },
            variants: variants(vec![
                ("primary", gradient_node("#8b5cf6", "#6366f1", Some("#7c3aed"))),
                ("secondary", gradient_node("#ec4899", "#f43f5e", Some("#db2777"))),
                ("accent", gradient_node("#06b6d4", "#0ea5e9", Some("#0891b2"))),
                ("success", gradient_node("#22c55e", "#10b981", None)),
                ("warning", gradient_node("#f59e0b", "#f97316", None)),
                ("error", gradient_node("#ef4444", "#dc2626", None)),
                (
                    "glass",
                    NodeStyle {
                        opacity: Some(0.9),
                        ..node("rgba(255, 255, 255, 0.7)", "rgba(255, 255, 255, 0.3)", 1.0)
                    },
                ),
            ]),
        },
        edge: ElementTheme {
            default: edge("#52525b", 1.5, LineType::Solid),
            variants: variants(vec![
                ("primary", edge("#8b5cf6", 2.0, LineType::Solid)),
                ("dashed", edge("#a1a1aa", 1.5, LineType::Dashed)),
                ("bold", edge("#18181b", 3.0, LineType::Solid)),
                (
                    "animated",
                    EdgeStyle {
                        animated: Some(true),
                        ..edge("#8b5cf6", 2.0, LineType::Solid)
                    },
                ),
            ]),
        },
        group: None,
        text: ElementTheme {
            default: TextStyle {
                font_family: Some("\"Inter\", sans-serif".to_string()),
                ..text(14.0, Some(400), "#18181b")
            },
            variants: variants(vec![
                ("title", text(24.0, Some(700), "#09090b")),
                ("label", text(12.0, Some(500), "#52525b")),
                ("caption", text(10.0, None, "#71717a")),
            ]),
        },
        spacing: ThemeSpacing {
            node_node: 60.0,
            node_node_between_layers: 100.0,
            edge_node: 40.0,
        },
    }
}

/// Black and white with subtle accents.
pub fn minimal() -> Theme {
    Theme {
        name: "minimal".to_string(),
        colors: palette(
            "#171717",
            "#525252",
            "#404040",
            "#ffffff",
            "#fafafa",
            "#171717",
            "#737373",
            "#e5e5e5",
            ["#171717", "#171717", "#171717"],
        ),
        typography: ThemeTypography {
            font_family: "\"SF Mono\", \"Fira Code\", \"Consolas\", monospace".to_string(),
            font_size: FontSizes {
                xs: 10.0,
                sm: 11.0,
                md: 13.0,
                lg: 15.0,
                xl: 18.0,
            },
            font_weight: FontWeights {
                normal: 400,
                medium: 500,
                bold: 600,
            },
        },
        node: ElementTheme {
            default: NodeStyle {
                border_radius: Some(0.0),
                ..node("#ffffff", "#171717", 1.0)
            },
            variants: variants(vec![
                ("primary", node("#171717", "#171717", 1.0)),
                ("secondary", node("#fafafa", "#171717", 1.0)),
                ("accent", node("#f5f5f5", "#171717", 2.0)),
                (
                    "dashed",
                    NodeStyle {
                        dashed: Some(true),
                        ..node("#ffffff", "#171717", 1.0)
                    },
                ),
            ]),
        },
        edge: ElementTheme {
            default: edge("#171717", 1.0, LineType::Solid),
            variants: variants(vec![
                ("primary", edge("#171717", 1.0, LineType::Solid)),
                ("dashed", edge("#171717", 1.0, LineType::Dashed)),
                ("bold", edge("#171717", 2.0, LineType::Solid)),
            ]),
        },
        group: None,
        text: ElementTheme {
            default: TextStyle {
                font_family: Some("\"SF Mono\", monospace".to_string()),
                ..text(13.0, Some(400), "#171717")
            },
            variants: variants(vec![
                ("title", text(18.0, Some(600), "#171717")),
                ("label", text(11.0, Some(500), "#525252")),
                ("caption", text(10.0, None, "#737373")),
            ]),
        },
        spacing: ThemeSpacing {
            node_node: 40.0,
            node_node_between_layers: 60.0,
            edge_node: 25.0,
        },
    }
}
