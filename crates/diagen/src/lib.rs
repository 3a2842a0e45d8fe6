//! Diagen - A text DSL for architecture diagrams and infographics.
//!
//! Compilation, layout, and SVG rendering for the Diagen diagram language.
//! Source text is parsed by [`diagen_parser`] into a [`DiagramIr`], compiled
//! into a themed [`DiagramModel`], laid out, and exported to SVG.
//!
//! The [`DiagramBuilder`] drives the pipeline from an [`AppConfig`]. The free
//! functions [`compile_dsl`], [`dsl_to_svg`] and [`create_diagram`] do the
//! same from explicit [`PipelineOptions`].

pub mod compiler;
pub mod config;
pub mod export;
pub mod layout;

mod error;

pub use diagen_core::{color, identifier, ir, model, style, theme, value};

pub use error::DiagenError;

use log::{debug, info, trace};

use diagen_core::{
    identifier::Id,
    ir::{DiagramEdge, DiagramGroup, DiagramIr, DiagramNode, DocumentKind, DocumentMeta},
    model::DiagramModel,
    style::EdgeStyle,
};

use compiler::{CompileResult, CompilerOptions, Issue};
use config::AppConfig;
use export::{
    Exporter,
    svg::{SvgExporter, SvgOptions},
};
use layout::LayoutOptions;

/// Options of the end-to-end functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub compiler: CompilerOptions,
    pub layout: LayoutOptions,
    /// Return the compiled model without positions.
    pub skip_layout: bool,
    pub svg: SvgOptions,
}

/// A compiled, and unless layout was skipped, laid out diagram.
#[derive(Debug, Clone)]
pub struct CompiledDiagram {
    pub model: DiagramModel,
    /// The IR the model was compiled from.
    pub ir: DiagramIr,
    /// Compiler warnings, including validation errors demoted outside strict mode.
    pub warnings: Vec<Issue>,
}

/// Builder for compiling and rendering Diagen diagrams.
///
/// # Examples
///
/// ```
/// use diagen::{DiagramBuilder, config::AppConfig};
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// let diagram = builder.build("@diagram\nweb -> api -> db\n").expect("valid diagram");
/// assert_eq!(diagram.model.node_count(), 3);
///
/// let svg = builder.render_svg(&diagram).expect("rendered");
/// assert!(svg.contains("<svg"));
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into the diagram IR.
    ///
    /// # Errors
    ///
    /// Returns [`DiagenError::Parse`] carrying every diagnostic together with
    /// the source, for lexical, syntax and IR construction errors.
    pub fn parse(&self, source: &str) -> Result<DiagramIr, DiagenError> {
        info!("Parsing diagram");
        let ir = diagen_parser::parse(source)
            .map_err(|err| DiagenError::new_parse_error(err, source))?;

        debug!(nodes = ir.nodes.len(), edges = ir.edges.len(), groups = ir.groups.len(); "Diagram parsed");
        trace!(ir:?; "Parsed IR");
        Ok(ir)
    }

    /// Compile `ir` with the configured compiler options.
    pub fn compile(&self, ir: &DiagramIr) -> CompileResult {
        compiler::compile(ir, &self.config.compiler().to_options())
    }

    /// Parse, compile and lay out `source`.
    ///
    /// # Errors
    ///
    /// Returns a parse error, [`DiagenError::Validation`] when strict
    /// validation fails, or a configuration or layout error.
    pub fn build(&self, source: &str) -> Result<CompiledDiagram, DiagenError> {
        let ir = self.parse(source)?;
        let options = self.pipeline_options()?;
        finish(ir, &options)
    }

    /// Render a compiled diagram to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`DiagenError::Config`] if the configured background color
    /// is invalid.
    pub fn render_svg(&self, diagram: &CompiledDiagram) -> Result<String, DiagenError> {
        let options = svg_options(&self.svg_config()?, &diagram.ir.meta);
        SvgExporter::new(options).export(&diagram.model)
    }

    fn pipeline_options(&self) -> Result<PipelineOptions, DiagenError> {
        Ok(PipelineOptions {
            compiler: self.config.compiler().to_options(),
            layout: self
                .config
                .layout()
                .to_options()
                .map_err(DiagenError::Config)?,
            skip_layout: false,
            svg: self.svg_config()?,
        })
    }

    fn svg_config(&self) -> Result<SvgOptions, DiagenError> {
        let style = self.config.style();
        style.background_color().map_err(DiagenError::Config)?;
        Ok(SvgOptions {
            width: style.width(),
            height: style.height(),
            background_color: style.background_color_str().map(str::to_string),
        })
    }
}

/// Compiles, then unless `skip_layout` is set lays out, an IR.
fn finish(ir: DiagramIr, options: &PipelineOptions) -> Result<CompiledDiagram, DiagenError> {
    let result = compiler::compile(&ir, &options.compiler);
    let Some(mut model) = result.model else {
        return Err(DiagenError::Validation(result.errors));
    };

    if !options.skip_layout {
        layout::layout_model(&mut model, &options.layout)?;
    }

    Ok(CompiledDiagram {
        model,
        ir,
        warnings: result.warnings,
    })
}

/// SVG options with the document's `width` and `height` metadata filling
/// in sizes that are not configured.
fn svg_options(configured: &SvgOptions, meta: &DocumentMeta) -> SvgOptions {
    SvgOptions {
        width: configured.width.or_else(|| meta.number("width")),
        height: configured.height.or_else(|| meta.number("height")),
        background_color: configured.background_color.clone(),
    }
}

/// Parses, compiles and lays out `source`.
///
/// # Errors
///
/// Parse failures return [`DiagenError::Compile`] with a `Parse error:`
/// summary of every diagnostic; strict validation failures return
/// [`DiagenError::Validation`], displayed as a `Compilation failed:` summary.
///
/// # Examples
///
/// ```
/// use diagen::{PipelineOptions, compile_dsl};
///
/// let diagram = compile_dsl("@diagram\na -> b\n", &PipelineOptions::default()).expect("valid");
/// assert!(diagram.model.nodes().all(|node| node.position.is_some()));
///
/// let err = compile_dsl("@diagram\na -> \"b\"\n", &PipelineOptions::default()).unwrap_err();
/// assert!(err.to_string().starts_with("Parse error:"));
/// ```
pub fn compile_dsl(source: &str, options: &PipelineOptions) -> Result<CompiledDiagram, DiagenError> {
    let ir = diagen_parser::parse(source)
        .map_err(|err| DiagenError::Compile(DiagenError::parse_summary(&err, source)))?;
    finish(ir, options)
}

/// [`compile_dsl`] followed by SVG export.
pub fn dsl_to_svg(source: &str, options: &PipelineOptions) -> Result<String, DiagenError> {
    let diagram = compile_dsl(source, options)?;
    let svg_options = svg_options(&options.svg, &diagram.ir.meta);
    SvgExporter::new(svg_options).export(&diagram.model)
}

/// An edge of a [`DiagramDefinition`]; the id is generated when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDefinition {
    pub id: Option<Id>,
    pub source: Id,
    pub target: Id,
    pub label: Option<String>,
    pub style: Option<EdgeStyle>,
}

impl EdgeDefinition {
    pub fn new(source: Id, target: Id) -> Self {
        Self {
            id: None,
            source,
            target,
            label: None,
            style: None,
        }
    }
}

/// A diagram assembled in code instead of parsed from source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramDefinition {
    pub meta: DocumentMeta,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<EdgeDefinition>,
    pub groups: Vec<DiagramGroup>,
}

impl From<DiagramDefinition> for DiagramIr {
    fn from(definition: DiagramDefinition) -> Self {
        let edges = definition
            .edges
            .into_iter()
            .enumerate()
            .map(|(i, edge)| DiagramEdge {
                label: edge.label,
                style: edge.style,
                ..DiagramEdge::new(
                    edge.id.unwrap_or_else(|| Id::new(&format!("edge-{i}"))),
                    edge.source,
                    edge.target,
                )
            })
            .collect();

        DiagramIr {
            kind: DocumentKind::Diagram,
            subtype: None,
            meta: definition.meta,
            nodes: definition.nodes,
            edges,
            groups: definition.groups,
        }
    }
}

/// Compiles, then lays out, a programmatic diagram definition.
///
/// # Errors
///
/// Returns [`DiagenError::Validation`] when strict validation fails, or a
/// layout error.
pub fn create_diagram(
    definition: DiagramDefinition,
    options: &PipelineOptions,
) -> Result<CompiledDiagram, DiagenError> {
    finish(definition.into(), options)
}
