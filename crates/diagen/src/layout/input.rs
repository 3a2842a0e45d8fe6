//! Abstract layout input built from a compiled model.
//!
//! The tree mirrors group nesting. Each container owns the edges whose
//! endpoints meet in it for the first time, i.e. the lowest container that
//! encloses both endpoints.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use diagen_core::{
    identifier::Id,
    ir::{DiagramEdge, DiagramNode, Direction, PortSide, Position, Size},
    model::DiagramModel,
};

use super::{
    DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, GROUP_LABEL_HEIGHT, GROUP_PADDING, LayoutOptions,
    direction::infer_all_group_directions,
};

/// Space between a group's border and its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// Padding of every group: uniform, with room for the label on top.
    pub fn group() -> Self {
        Self {
            top: GROUP_PADDING + GROUP_LABEL_HEIGHT,
            right: GROUP_PADDING,
            bottom: GROUP_PADDING,
            left: GROUP_PADDING,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A port anchored on a node's border.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPort {
    pub id: Id,
    pub side: PortSide,
    /// Anchor relative to the node's top-left corner.
    pub offset: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: Id,
    pub label: String,
    pub size: Size,
    pub ports: Vec<LayoutPort>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGroup {
    pub id: Id,
    pub label: Option<String>,
    /// Explicit or inferred direction of the group's content.
    pub direction: Direction,
    pub padding: Padding,
    pub children: Vec<LayoutElement>,
    pub edges: Vec<LayoutEdge>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Node(LayoutNode),
    Group(LayoutGroup),
}

impl LayoutElement {
    pub fn id(&self) -> Id {
        match self {
            Self::Node(node) => node.id,
            Self::Group(group) => group.id,
        }
    }

    /// Ids of this element and everything nested in it.
    pub fn ids(&self) -> Vec<Id> {
        match self {
            Self::Node(node) => vec![node.id],
            Self::Group(group) => std::iter::once(group.id)
                .chain(group.children.iter().flat_map(LayoutElement::ids))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub id: Id,
    pub source: Id,
    pub target: Id,
    pub source_port: Option<Id>,
    pub target_port: Option<Id>,
    pub label: Option<String>,
}

impl From<&DiagramEdge> for LayoutEdge {
    fn from(edge: &DiagramEdge) -> Self {
        Self {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            source_port: edge.source_port,
            target_port: edge.target_port,
            label: edge.label.clone(),
        }
    }
}

/// Root of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInput {
    pub direction: Direction,
    pub node_spacing: f64,
    pub layer_spacing: f64,
    pub children: Vec<LayoutElement>,
    pub edges: Vec<LayoutEdge>,
}

impl LayoutInput {
    /// Builds the layout tree of `model`.
    ///
    /// The global direction is the options' override or the model's own.
    /// Groups whose parent chain is broken or circular are placed at the
    /// root. Edges with an endpoint missing from the model are left out.
    pub fn from_model(model: &DiagramModel, options: &LayoutOptions) -> Self {
        let direction = options.direction.unwrap_or_else(|| model.direction());
        let tree = TreeBuilder::new(model, direction);
        let mut edges = tree.scope_edges();

        let input = Self {
            direction,
            node_spacing: options.node_spacing,
            layer_spacing: options.layer_spacing,
            children: tree.children(None, &mut edges),
            edges: edges.shift_remove(&None).unwrap_or_default(),
        };
        trace!(input:?; "Layout input");
        input
    }
}

struct TreeBuilder<'a> {
    model: &'a DiagramModel,
    directions: IndexMap<Id, Direction>,
    /// Effective container of every group.
    group_parents: IndexMap<Id, Option<Id>>,
}

impl<'a> TreeBuilder<'a> {
    fn new(model: &'a DiagramModel, global: Direction) -> Self {
        let group_parents = model
            .groups()
            .map(|group| (group.id, Self::effective_parent(model, group.id)))
            .collect();
        Self {
            model,
            directions: infer_all_group_directions(model, global),
            group_parents,
        }
    }

    /// The group's parent, or `None` when the parent is missing or the
    /// chain above it loops.
    fn effective_parent(model: &DiagramModel, id: Id) -> Option<Id> {
        let parent = model.get_group(id)?.parent_id?;
        let mut seen = HashSet::from([id]);
        let mut current = Some(parent);
        while let Some(step) = current {
            if !seen.insert(step) {
                return None;
            }
            current = model.get_group(step)?.parent_id;
        }
        Some(parent)
    }

    fn node_container(&self, node: &DiagramNode) -> Option<Id> {
        node.parent_id
            .filter(|parent| self.group_parents.contains_key(parent))
    }

    /// Containers enclosing `id`, innermost first, ending with the root.
    /// `None` when `id` is not in the model.
    fn containers(&self, id: Id) -> Option<Vec<Option<Id>>> {
        let mut current = if let Some(node) = self.model.get_node(id) {
            self.node_container(node)
        } else if let Some(parent) = self.group_parents.get(&id) {
            *parent
        } else {
            return None;
        };

        let mut chain = Vec::new();
        while let Some(group) = current {
            chain.push(Some(group));
            current = self.group_parents.get(&group).copied().flatten();
        }
        chain.push(None);
        Some(chain)
    }

    fn scope_edges(&self) -> IndexMap<Option<Id>, Vec<LayoutEdge>> {
        let mut scoped: IndexMap<Option<Id>, Vec<LayoutEdge>> = IndexMap::new();
        for edge in self.model.edges() {
            let (Some(source), Some(target)) =
                (self.containers(edge.source), self.containers(edge.target))
            else {
                debug!(edge = edge.id.to_string(); "Edge left out of layout, endpoint missing");
                continue;
            };
            let scope = source
                .iter()
                .find(|container| target.contains(container))
                .copied()
                .flatten();
            scoped.entry(scope).or_default().push(LayoutEdge::from(edge));
        }
        scoped
    }

    fn children(
        &self,
        container: Option<Id>,
        edges: &mut IndexMap<Option<Id>, Vec<LayoutEdge>>,
    ) -> Vec<LayoutElement> {
        let groups: Vec<LayoutElement> = self
            .group_parents
            .iter()
            .filter(|(_, parent)| **parent == container)
            .filter_map(|(id, _)| self.model.get_group(*id))
            .map(|group| {
                LayoutElement::Group(LayoutGroup {
                    id: group.id,
                    label: group.label.clone(),
                    direction: self
                        .directions
                        .get(&group.id)
                        .copied()
                        .unwrap_or_default(),
                    padding: Padding::group(),
                    children: self.children(Some(group.id), edges),
                    edges: edges.shift_remove(&Some(group.id)).unwrap_or_default(),
                })
            })
            .collect();

        let nodes = self
            .model
            .nodes()
            .filter(|node| self.node_container(node) == container)
            .map(|node| LayoutElement::Node(layout_node(node)));

        groups.into_iter().chain(nodes).collect()
    }
}

fn layout_node(node: &DiagramNode) -> LayoutNode {
    let size = node
        .size
        .unwrap_or_else(|| Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT));
    let ports = node
        .ports
        .iter()
        .map(|port| LayoutPort {
            id: port.id,
            side: port.side,
            offset: port_offset(port.side, size),
        })
        .collect();
    LayoutNode {
        id: node.id,
        label: node.label.clone(),
        size,
        ports,
    }
}

fn port_offset(side: PortSide, size: Size) -> Position {
    match side {
        PortSide::Top => Position {
            x: size.width / 2.0,
            y: 0.0,
        },
        PortSide::Bottom => Position {
            x: size.width / 2.0,
            y: size.height,
        },
        PortSide::Left => Position {
            x: 0.0,
            y: size.height / 2.0,
        },
        PortSide::Right => Position {
            x: size.width,
            y: size.height / 2.0,
        },
    }
}
