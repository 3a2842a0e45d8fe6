//! Theme application.
//!
//! Resolved styles are layered from least to most specific; a field set on a
//! later layer replaces the same field of an earlier one.
//!
//! | element | layers                                                    |
//! |---------|-----------------------------------------------------------|
//! | node    | theme default, shape variant, default node style, own     |
//! | edge    | theme default, line type variant, default edge style, own |
//! | group   | theme group default (or the built-in fallback), own       |

use log::debug;

use diagen_core::{
    ir::{DiagramEdge, DiagramGroup, DiagramIr, DiagramNode},
    style::{EdgeStyle, NodeStyle},
    theme::{self, Theme},
};

/// How the theme is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeSelection {
    /// One of the built-in themes, looked up by name.
    Named(String),
    /// A complete theme supplied by the caller.
    Inline(Box<Theme>),
}

impl From<&str> for ThemeSelection {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<Theme> for ThemeSelection {
    fn from(theme: Theme) -> Self {
        Self::Inline(Box::new(theme))
    }
}

/// Options of [`apply_theme`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeOptions {
    /// Falls back to the document's `theme` metadata when `None`.
    pub theme: Option<ThemeSelection>,
    pub default_node_style: Option<NodeStyle>,
    pub default_edge_style: Option<EdgeStyle>,
}

/// Style of groups when the theme has no group table.
pub fn fallback_group_style() -> NodeStyle {
    NodeStyle {
        fill: Some("rgba(240, 240, 240, 0.5)".to_string()),
        stroke: Some("#cccccc".to_string()),
        stroke_width: Some(1.0),
        border_radius: Some(8.0),
        ..NodeStyle::default()
    }
}

/// Picks the theme for `ir`.
///
/// Unknown names log a warning and resolve to `professional`.
pub fn resolve_theme(selection: Option<&ThemeSelection>, ir: &DiagramIr) -> Theme {
    match selection {
        Some(ThemeSelection::Inline(theme)) => theme.as_ref().clone(),
        Some(ThemeSelection::Named(name)) => theme::get_theme(name),
        None => match ir.meta.theme.as_deref() {
            Some(name) => theme::get_theme(name),
            None => theme::professional(),
        },
    }
}

/// Returns a copy of `ir` with fully resolved styles on every element.
pub fn apply_theme(ir: &DiagramIr, options: &ThemeOptions) -> DiagramIr {
    let theme = resolve_theme(options.theme.as_ref(), ir);
    debug!(theme = theme.name.as_str(); "Applying theme");

    DiagramIr {
        nodes: ir
            .nodes
            .iter()
            .map(|node| theme_node(node, &theme, options.default_node_style.as_ref()))
            .collect(),
        edges: ir
            .edges
            .iter()
            .map(|edge| theme_edge(edge, &theme, options.default_edge_style.as_ref()))
            .collect(),
        groups: ir
            .groups
            .iter()
            .map(|group| theme_group(group, &theme))
            .collect(),
        ..ir.clone()
    }
}

fn theme_node(node: &DiagramNode, theme: &Theme, default: Option<&NodeStyle>) -> DiagramNode {
    let mut style = theme.node_style(node.shape.as_str());
    if let Some(default) = default {
        style = style.merge(default);
    }
    if let Some(own) = &node.style {
        style = style.merge(own);
    }
    DiagramNode {
        style: Some(style),
        ..node.clone()
    }
}

fn theme_edge(edge: &DiagramEdge, theme: &Theme, default: Option<&EdgeStyle>) -> DiagramEdge {
    let line_type = edge.style.as_ref().and_then(|style| style.line_type);
    let mut style = match line_type {
        Some(line_type) => theme.edge_style(line_type.as_str()),
        None => theme.edge.default.clone(),
    };
    if let Some(default) = default {
        style = style.merge(default);
    }
    if let Some(own) = &edge.style {
        style = style.merge(own);
    }
    DiagramEdge {
        style: Some(style),
        ..edge.clone()
    }
}

fn theme_group(group: &DiagramGroup, theme: &Theme) -> DiagramGroup {
    let base = match &theme.group {
        Some(table) => table.default.clone(),
        None => fallback_group_style(),
    };
    let style = match &group.style {
        Some(own) => base.merge(own),
        None => base,
    };
    DiagramGroup {
        style: Some(style),
        ..group.clone()
    }
}
