//! CLI logic for the Diagen diagram tool.
//!
//! This module contains the core CLI logic for the Diagen diagram tool.

pub mod report;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::{info, warn};

use diagen::{DiagenError, DiagramBuilder};

use report::Report;

/// Run the Diagen CLI application
///
/// This function processes the input file through the Diagen pipeline
/// and writes the resulting SVG to the output file. Compiler warnings are
/// logged as rendered reports and do not fail the run.
///
/// # Errors
///
/// Returns `DiagenError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Strict validation failures
/// - Layout errors
pub fn run(args: &Args) -> Result<(), DiagenError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.strict {
        app_config.compiler_mut().set_strict(true);
    }
    if let Some(theme) = &args.theme {
        app_config.compiler_mut().set_theme(Some(theme.clone()));
    }

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let diagram = builder.build(&source)?;
    for issue in &diagram.warnings {
        warn!(code = issue.code.as_str(); "{}", report::render(&Report::Issue(issue)));
    }
    let svg = builder.render_svg(&diagram)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
