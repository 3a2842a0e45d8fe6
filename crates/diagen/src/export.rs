pub mod svg;

use diagen_core::model::DiagramModel;

use crate::error::DiagenError;

/// Renders a laid out model into a document format.
pub trait Exporter {
    fn export(&self, model: &DiagramModel) -> Result<String, DiagenError>;
}
