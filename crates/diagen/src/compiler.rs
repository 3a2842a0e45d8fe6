//! IR to [`DiagramModel`] compilation.
//!
//! [`compile`] chains the compiler stages:
//!
//! 1. [`validate`] (unless skipped). In strict mode any error aborts with
//!    no model; otherwise errors are demoted to warnings.
//! 2. [`normalize`] synthesizes nodes for undefined edge endpoints.
//! 3. [`apply_theme`] resolves every element's style.
//! 4. The themed IR is loaded into a [`DiagramModel`]: groups first, then
//!    nodes, then edges, in IR order.
//!
//! # Example
//!
//! ```
//! use diagen::compiler::{CompilerOptions, compile};
//!
//! let ir = diagen_parser::parse("@diagram\nweb -> api\n").expect("valid source");
//! let result = compile(&ir, &CompilerOptions::default());
//!
//! let model = result.model.expect("model");
//! assert_eq!(model.node_count(), 2);
//! assert!(result.errors.is_empty());
//! ```

mod issue;
mod normalizer;
mod theme_applier;
mod validator;

pub use issue::{Issue, IssueCode};
pub use normalizer::{
    NodeReference, NormalizerOptions, PortReference, normalize, parse_port_reference,
    resolve_node_reference,
};
pub use theme_applier::{
    ThemeOptions, ThemeSelection, apply_theme, fallback_group_style, resolve_theme,
};
pub use validator::{ValidationResult, validate};

use log::{debug, info, trace, warn};

use diagen_core::{
    ir::{DiagramIr, NodeShape},
    model::{DiagramModel, ModelError},
    style::{EdgeStyle, NodeStyle},
};

/// Options of [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOptions {
    /// Abort with no model when validation reports errors.
    pub strict: bool,
    pub skip_validation: bool,
    /// Falls back to the document's `theme` metadata when `None`.
    pub theme: Option<ThemeSelection>,
    pub default_node_style: Option<NodeStyle>,
    pub default_edge_style: Option<EdgeStyle>,
    pub auto_create_nodes: bool,
    pub default_shape: NodeShape,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            skip_validation: false,
            theme: None,
            default_node_style: None,
            default_edge_style: None,
            auto_create_nodes: true,
            default_shape: NodeShape::Rect,
        }
    }
}

impl CompilerOptions {
    fn normalizer_options(&self) -> NormalizerOptions {
        NormalizerOptions {
            auto_create_nodes: self.auto_create_nodes,
            default_shape: self.default_shape.clone(),
        }
    }

    fn theme_options(&self) -> ThemeOptions {
        ThemeOptions {
            theme: self.theme.clone(),
            default_node_style: self.default_node_style.clone(),
            default_edge_style: self.default_edge_style.clone(),
        }
    }
}

/// Outcome of [`compile`].
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// `None` only when strict validation failed.
    pub model: Option<DiagramModel>,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// `None` when validation was skipped.
    pub validation: Option<ValidationResult>,
}

impl CompileResult {
    /// Messages of every error, one per line.
    pub fn error_messages(&self) -> String {
        join_messages(&self.errors)
    }
}

pub(crate) fn join_messages(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles `ir` into a themed [`DiagramModel`].
pub fn compile(ir: &DiagramIr, options: &CompilerOptions) -> CompileResult {
    let mut warnings = Vec::new();

    let validation = if options.skip_validation {
        None
    } else {
        Some(validate(ir))
    };

    if let Some(validation) = &validation {
        warnings.extend(validation.warnings.iter().cloned());

        if !validation.valid {
            if options.strict {
                info!(errors = validation.errors.len(); "Strict validation failed");
                return CompileResult {
                    model: None,
                    errors: validation.errors.clone(),
                    warnings,
                    validation: Some(validation.clone()),
                };
            }
            warnings.extend(validation.errors.iter().cloned());
        }
    }

    let normalized = normalize(ir, &options.normalizer_options());
    let themed = apply_theme(&normalized, &options.theme_options());
    let model = build_model(&themed, &mut warnings);

    info!(
        nodes = model.node_count(),
        edges = model.edge_count(),
        groups = model.group_count(),
        warnings = warnings.len();
        "Diagram compiled"
    );
    trace!(model:?; "Compiled model");

    CompileResult {
        model: Some(model),
        errors: Vec::new(),
        warnings,
        validation,
    }
}

/// [`compile`] with the theme replaced by `theme`.
pub fn compile_with_theme(
    ir: &DiagramIr,
    theme: impl Into<ThemeSelection>,
    options: &CompilerOptions,
) -> CompileResult {
    let options = CompilerOptions {
        theme: Some(theme.into()),
        ..options.clone()
    };
    compile(ir, &options)
}

fn build_model(ir: &DiagramIr, warnings: &mut Vec<Issue>) -> DiagramModel {
    let mut model = DiagramModel::from_ir(&DiagramIr {
        kind: ir.kind,
        subtype: ir.subtype.clone(),
        meta: ir.meta.clone(),
        ..DiagramIr::default()
    });

    let mut record = |err: ModelError| {
        warn!(err:%; "Element skipped while building model");
        warnings.push(Issue::new(IssueCode::DuplicateId, err.to_string()));
    };

    for group in &ir.groups {
        if let Err(err) = model.add_group(group.clone()) {
            record(err);
        }
    }
    for node in &ir.nodes {
        if let Err(err) = model.add_node(node.clone()) {
            record(err);
        }
    }
    for edge in &ir.edges {
        if let Err(err) = model.add_edge(edge.clone()) {
            record(err);
        }
    }

    debug!(nodes = model.node_count(); "Model built");
    model
}
