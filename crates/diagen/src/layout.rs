//! Layout contract and the built-in layout engine.
//!
//! A [`LayoutEngine`] turns a [`LayoutInput`] tree into [`Placements`]:
//! absolute positions and sizes for every node and group. Placements are
//! written back into the model with [`Placements::apply`].
//!
//! # Example
//!
//! ```
//! use diagen::{
//!     compiler::{CompilerOptions, compile},
//!     layout::{LayoutOptions, layout_model},
//! };
//! use diagen_core::identifier::Id;
//!
//! let ir = diagen_parser::parse("@diagram\na -> b\n").expect("valid source");
//! let mut model = compile(&ir, &CompilerOptions::default()).model.expect("model");
//!
//! layout_model(&mut model, &LayoutOptions::default()).expect("layout");
//!
//! let b = model.get_node(Id::new("b")).and_then(|n| n.position).expect("placed");
//! assert!(b.y > 0.0);
//! ```

mod direction;
mod engine;
mod input;

pub use direction::{infer_all_group_directions, infer_group_direction};
pub use engine::LayeredEngine;
pub use input::{
    LayoutEdge, LayoutElement, LayoutGroup, LayoutInput, LayoutNode, LayoutPort, Padding,
};

use indexmap::IndexMap;
use log::debug;

use diagen_core::{
    identifier::Id,
    ir::{Direction, Position, Size},
    model::DiagramModel,
};

use crate::error::DiagenError;

/// Width of a node without an explicit size.
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;
/// Height of a node without an explicit size.
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;
/// Width of a group that has not been laid out or has no content.
pub const DEFAULT_GROUP_WIDTH: f64 = 200.0;
/// Height of a group that has not been laid out or has no content.
pub const DEFAULT_GROUP_HEIGHT: f64 = 150.0;
/// Space between a group's border and its content.
pub const GROUP_PADDING: f64 = 20.0;
/// Extra space above a group's content for its label.
pub const GROUP_LABEL_HEIGHT: f64 = 20.0;
pub const DEFAULT_NODE_SPACING: f64 = 50.0;
pub const DEFAULT_LAYER_SPACING: f64 = 80.0;

/// Options shared by all layout engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Overrides the model's direction when set.
    pub direction: Option<Direction>,
    /// Space between elements of the same layer.
    pub node_spacing: f64,
    /// Space between consecutive layers.
    pub layer_spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: None,
            node_spacing: DEFAULT_NODE_SPACING,
            layer_spacing: DEFAULT_LAYER_SPACING,
        }
    }
}

/// Computes element placements from a layout tree.
pub trait LayoutEngine {
    fn layout(&self, input: &LayoutInput) -> Result<Placements, DiagenError>;
}

/// Absolute position and size of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub size: Size,
}

/// Placements keyed by element id, in layout order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placements(IndexMap<Id, Placement>);

impl Placements {
    pub fn insert(&mut self, id: Id, placement: Placement) {
        self.0.insert(id, placement);
    }

    pub fn get(&self, id: Id) -> Option<&Placement> {
        self.0.get(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &Placement)> {
        self.0.iter()
    }

    /// Writes positions and sizes into the matching nodes and groups.
    pub fn apply(&self, model: &mut DiagramModel) {
        for (&id, placement) in &self.0 {
            if let Some(node) = model.node_mut(id) {
                node.position = Some(placement.position);
                node.size = Some(placement.size);
            }
            if let Some(group) = model.group_mut(id) {
                group.position = Some(placement.position);
                group.size = Some(placement.size);
            }
        }
        debug!(elements = self.0.len(); "Placements applied to model");
    }
}

/// Lays out `model` in place with `engine`.
pub fn layout_model_with(
    engine: &impl LayoutEngine,
    model: &mut DiagramModel,
    options: &LayoutOptions,
) -> Result<(), DiagenError> {
    let input = LayoutInput::from_model(model, options);
    let placements = engine.layout(&input)?;
    placements.apply(model);
    Ok(())
}

/// Lays out `model` in place with the [`LayeredEngine`].
pub fn layout_model(model: &mut DiagramModel, options: &LayoutOptions) -> Result<(), DiagenError> {
    layout_model_with(&LayeredEngine::new(), model, options)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn laid_out(source: &str) -> DiagramModel {
        let ir = diagen_parser::parse(source).expect("valid source");
        let mut model = DiagramModel::from_ir(&ir);
        layout_model(&mut model, &LayoutOptions::default()).expect("layout");
        model
    }

    #[test]
    fn test_every_element_is_placed() {
        let model = laid_out("@diagram\ngroup G {\n  a\n  b\n}\nc -> G.a\n");

        assert!(model.nodes().all(|n| n.position.is_some() && n.size.is_some()));
        assert!(model.groups().all(|g| g.position.is_some() && g.size.is_some()));
    }

    #[test]
    fn test_group_encloses_children() {
        let model = laid_out("@diagram\ngroup G {\n  a -> b\n}\nc -> a\n");

        let group = model.get_group(Id::new("G")).expect("group");
        let (gp, gs) = (group.position.expect("position"), group.size.expect("size"));
        for id in ["a", "b"] {
            let node = model.get_node(Id::new(id)).expect("node");
            let (np, ns) = (node.position.expect("position"), node.size.expect("size"));
            assert!(np.x >= gp.x + GROUP_PADDING - 1e-9);
            assert!(np.y >= gp.y + GROUP_PADDING + GROUP_LABEL_HEIGHT - 1e-9);
            assert!(np.x + ns.width <= gp.x + gs.width + 1e-9);
            assert!(np.y + ns.height <= gp.y + gs.height + 1e-9);
        }
    }

    #[test]
    fn test_chain_group_is_horizontal() {
        let model = laid_out("@diagram\ngroup G {\n  a -> b\n}\n");

        let a = model.get_node(Id::new("a")).and_then(|n| n.position).expect("a");
        let b = model.get_node(Id::new("b")).and_then(|n| n.position).expect("b");
        assert!(approx_eq!(f64, a.y, b.y));
        assert!(approx_eq!(
            f64,
            b.x - a.x,
            DEFAULT_NODE_WIDTH + DEFAULT_LAYER_SPACING
        ));

        let group = model.get_group(Id::new("G")).and_then(|g| g.size).expect("size");
        assert!(approx_eq!(
            f64,
            group.width,
            2.0 * DEFAULT_NODE_WIDTH + DEFAULT_LAYER_SPACING + 2.0 * GROUP_PADDING
        ));
    }

    #[test]
    fn test_empty_group_gets_default_size() {
        let model = laid_out("@diagram\ngroup empty {\n}\n");

        let size = model.get_group(Id::new("empty")).and_then(|g| g.size).expect("size");
        assert_eq!(size, Size::new(DEFAULT_GROUP_WIDTH, DEFAULT_GROUP_HEIGHT));
    }
}
