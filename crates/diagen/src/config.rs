//! Configuration types for Diagen compilation and rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are compiled, laid out and styled. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining all sections.
//! - [`CompilerConfig`] - Validation strictness, node auto-creation and theme.
//! - [`LayoutConfig`] - Direction override and spacing for the layout engine.
//! - [`StyleConfig`] - Visual options such as background color and SVG size.
//!
//! # Example
//!
//! ```
//! # use diagen::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert!(config.compiler().auto_create_nodes());
//! ```

use serde::Deserialize;

use diagen_core::{color::Color, ir::Direction};

use crate::{
    compiler::{CompilerOptions, ThemeSelection},
    layout::{self, LayoutOptions},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Compiler configuration section.
    #[serde(default)]
    compiler: CompilerConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its three sections.
    pub fn new(compiler: CompilerConfig, layout: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            compiler,
            layout,
            style,
        }
    }

    /// Returns the compiler configuration.
    pub fn compiler(&self) -> &CompilerConfig {
        &self.compiler
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns a mutable reference to the compiler configuration.
    ///
    /// Used by front ends that let command-line flags override the file.
    pub fn compiler_mut(&mut self) -> &mut CompilerConfig {
        &mut self.compiler
    }
}

/// Compiler behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Abort compilation when validation reports errors.
    strict: bool,

    /// Skip the validation stage entirely.
    skip_validation: bool,

    /// Synthesize nodes for edge endpoints that were never defined.
    auto_create_nodes: bool,

    /// Shape name given to synthesized nodes.
    default_shape: String,

    /// Name of the built-in theme to apply. When unset, the document's own
    /// `theme` metadata is used.
    theme: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            skip_validation: false,
            auto_create_nodes: true,
            default_shape: "rect".to_string(),
            theme: None,
        }
    }
}

impl CompilerConfig {
    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn skip_validation(&self) -> bool {
        self.skip_validation
    }

    pub fn auto_create_nodes(&self) -> bool {
        self.auto_create_nodes
    }

    pub fn default_shape(&self) -> &str {
        &self.default_shape
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn set_theme(&mut self, theme: Option<String>) {
        self.theme = theme;
    }

    /// Converts this section into [`CompilerOptions`].
    pub fn to_options(&self) -> CompilerOptions {
        CompilerOptions {
            strict: self.strict,
            skip_validation: self.skip_validation,
            auto_create_nodes: self.auto_create_nodes,
            default_shape: self.default_shape.as_str().into(),
            theme: self.theme.clone().map(ThemeSelection::Named),
            ..CompilerOptions::default()
        }
    }
}

/// Layout engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Overrides the document's direction when set.
    direction: Option<String>,

    /// Spacing between nodes in the same layer.
    node_spacing: f64,

    /// Spacing between consecutive layers.
    layer_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: None,
            node_spacing: layout::DEFAULT_NODE_SPACING,
            layer_spacing: layout::DEFAULT_LAYER_SPACING,
        }
    }
}

impl LayoutConfig {
    /// Returns the parsed [`Direction`] override, or `None` if not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured direction is not one of
    /// `TB`, `BT`, `LR` or `RL`.
    pub fn direction(&self) -> Result<Option<Direction>, String> {
        self.direction
            .as_deref()
            .map(str::parse::<Direction>)
            .transpose()
            .map_err(|err| format!("Invalid layout direction in config: {err}"))
    }

    pub fn node_spacing(&self) -> f64 {
        self.node_spacing
    }

    pub fn layer_spacing(&self) -> f64 {
        self.layer_spacing
    }

    /// Converts this section into [`LayoutOptions`].
    ///
    /// # Errors
    ///
    /// Returns an error if the direction override is invalid.
    pub fn to_options(&self) -> Result<LayoutOptions, String> {
        Ok(LayoutOptions {
            direction: self.direction()?,
            node_spacing: self.node_spacing,
            layer_spacing: self.layer_spacing,
        })
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background color for diagrams, as a color string.
    background_color: Option<String>,

    /// Fixed SVG width.
    width: Option<f64>,

    /// Fixed SVG height.
    height: Option<f64>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// The configured background color string, as written.
    pub fn background_color_str(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }
}
