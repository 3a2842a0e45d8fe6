//! Implicit node creation.
//!
//! Edge endpoints that name neither a node nor a group get a minimal node
//! with the endpoint's id as label. Dotted references contribute only their
//! first segment, since the IR builder already resolved every `group.node`
//! reference it could.

use indexmap::IndexSet;
use log::debug;

use diagen_core::{
    identifier::Id,
    ir::{DiagramIr, DiagramNode, NodeShape},
};

/// Options of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerOptions {
    /// When `false`, [`normalize`] returns the IR unchanged.
    pub auto_create_nodes: bool,
    /// Shape of synthesized nodes.
    pub default_shape: NodeShape,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            auto_create_nodes: true,
            default_shape: NodeShape::Rect,
        }
    }
}

/// Returns a copy of `ir` with a node for every undefined edge endpoint.
///
/// Synthesized nodes are appended after the existing ones, in the order
/// their ids are first referenced.
pub fn normalize(ir: &DiagramIr, options: &NormalizerOptions) -> DiagramIr {
    let mut normalized = ir.clone();
    if !options.auto_create_nodes {
        return normalized;
    }

    let defined: IndexSet<Id> = ir
        .nodes
        .iter()
        .map(|node| node.id)
        .chain(ir.groups.iter().map(|group| group.id))
        .collect();

    let implicit: IndexSet<Id> = ir
        .edges
        .iter()
        .flat_map(|edge| [edge.source, edge.target])
        .map(base_id)
        .filter(|id| !defined.contains(id))
        .collect();

    if !implicit.is_empty() {
        debug!(count = implicit.len(); "Creating implicit nodes");
    }

    normalized.nodes.extend(implicit.into_iter().map(|id| {
        DiagramNode::new(id, id.as_string()).with_shape(options.default_shape.clone())
    }));
    normalized
}

/// The first dot-separated segment of `id`.
fn base_id(id: Id) -> Id {
    if !id.contains('.') {
        return id;
    }
    let text = id.as_string();
    match text.split('.').next() {
        Some(first) => Id::new(first),
        None => id,
    }
}

/// A dotted reference split into its group path and node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeReference {
    pub group_path: Vec<String>,
    pub node_id: String,
}

/// Splits `Backend.API` into group path `["Backend"]` and node id `API`.
pub fn resolve_node_reference(reference: &str) -> NodeReference {
    let mut parts: Vec<String> = reference.split('.').map(str::to_string).collect();
    let node_id = parts.pop().unwrap_or_default();
    NodeReference {
        group_path: parts,
        node_id,
    }
}

/// A `node:port` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortReference {
    pub node_id: String,
    pub port_id: Option<String>,
}

/// Splits `Node:port` into node id and optional port id.
///
/// Only the first two `:`-separated parts are used.
pub fn parse_port_reference(reference: &str) -> PortReference {
    let mut parts = reference.split(':');
    PortReference {
        node_id: parts.next().unwrap_or_default().to_string(),
        port_id: parts.next().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use diagen_core::ir::{DiagramEdge, DiagramGroup};

    use super::*;

    fn edge(id: &str, source: &str, target: &str) -> DiagramEdge {
        DiagramEdge::new(Id::new(id), Id::new(source), Id::new(target))
    }

    fn sample() -> DiagramIr {
        DiagramIr {
            nodes: vec![DiagramNode::new(Id::new("A"), "Alpha")],
            groups: vec![DiagramGroup::new(Id::new("G"))],
            edges: vec![
                edge("e1", "A", "B"),
                edge("e2", "B", "G"),
                edge("e3", "C", "B"),
                edge("e4", "Ext.api", "A"),
            ],
            ..DiagramIr::default()
        }
    }

    #[test]
    fn test_creates_missing_nodes_in_reference_order() {
        let normalized = normalize(&sample(), &NormalizerOptions::default());

        let ids: Vec<String> = normalized.nodes.iter().map(|n| n.id.as_string()).collect();
        assert_eq!(ids, ["A", "B", "C", "Ext"]);

        let b = normalized.node(Id::new("B")).expect("node B");
        assert_eq!(b.label, "B");
        assert_eq!(b.shape, NodeShape::Rect);
        assert!(b.style.is_none());
    }

    #[test]
    fn test_respects_default_shape() {
        let options = NormalizerOptions {
            default_shape: NodeShape::Circle,
            ..NormalizerOptions::default()
        };

        let normalized = normalize(&sample(), &options);

        assert_eq!(normalized.nodes[0].shape, NodeShape::Rect);
        assert!(normalized.nodes[1..].iter().all(|n| n.shape == NodeShape::Circle));
    }

    #[test]
    fn test_disabled_is_identity() {
        let ir = sample();
        let options = NormalizerOptions {
            auto_create_nodes: false,
            ..NormalizerOptions::default()
        };

        assert_eq!(normalize(&ir, &options), ir);
    }

    #[test]
    fn test_input_is_not_modified() {
        let ir = sample();
        let _ = normalize(&ir, &NormalizerOptions::default());
        assert_eq!(ir.nodes.len(), 1);
    }

    #[test]
    fn test_resolve_node_reference() {
        assert_eq!(
            resolve_node_reference("Backend.API"),
            NodeReference {
                group_path: vec!["Backend".to_string()],
                node_id: "API".to_string(),
            }
        );
        let reference = resolve_node_reference("a.b.c");
        assert_eq!(reference.group_path, ["a", "b"]);
        assert_eq!(reference.node_id, "c");
        assert!(resolve_node_reference("solo").group_path.is_empty());
    }

    #[test]
    fn test_parse_port_reference() {
        assert_eq!(
            parse_port_reference("db:in"),
            PortReference {
                node_id: "db".to_string(),
                port_id: Some("in".to_string()),
            }
        );
        assert_eq!(parse_port_reference("db").port_id, None);
        assert_eq!(parse_port_reference("a:b:c").port_id.as_deref(), Some("b"));
    }
}
