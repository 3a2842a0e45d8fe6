//! Mutable, indexed diagram model.
//!
//! [`DiagramModel`] is what the compiler hands to layout and export. Lookup by
//! id is constant time and iteration follows insertion order. The model keeps
//! group membership consistent on mutation: removing a node drops its edges
//! and detaches it from its group, and removing a group either deletes its
//! members or moves them to the group's own parent.

use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use thiserror::Error;

use crate::{
    identifier::Id,
    ir::{DiagramEdge, DiagramGroup, DiagramIr, DiagramNode, Direction, DocumentKind, DocumentMeta},
    style::{EdgeStyle, NodeStyle},
    value::Value,
};

/// Failure of a model mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Node with id \"{0}\" already exists")]
    NodeExists(Id),

    #[error("Node with id \"{0}\" not found")]
    NodeNotFound(Id),

    #[error("Edge with id \"{0}\" already exists")]
    EdgeExists(Id),

    #[error("Edge with id \"{0}\" not found")]
    EdgeNotFound(Id),

    #[error("Group with id \"{0}\" already exists")]
    GroupExists(Id),

    #[error("Group with id \"{0}\" not found")]
    GroupNotFound(Id),
}

/// Result of [`DiagramModel::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Indexed store of nodes, edges and groups.
#[derive(Debug, Clone, Default)]
pub struct DiagramModel {
    nodes: IndexMap<Id, DiagramNode>,
    edges: IndexMap<Id, DiagramEdge>,
    groups: IndexMap<Id, DiagramGroup>,
    kind: DocumentKind,
    subtype: Option<String>,
    /// Direction as declared; `None` lays out top to bottom.
    direction: Option<Direction>,
    title: Option<String>,
    theme: Option<String>,
    extra: IndexMap<String, Value>,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model holding a copy of every element of `ir`.
    ///
    /// Elements are loaded as they are, without membership bookkeeping. A
    /// repeated id keeps its first position and the last definition.
    pub fn from_ir(ir: &DiagramIr) -> Self {
        let mut model = Self {
            kind: ir.kind,
            subtype: ir.subtype.clone(),
            direction: ir.meta.direction,
            title: ir.meta.title.clone(),
            theme: ir.meta.theme.clone(),
            extra: ir.meta.extra.clone(),
            ..Self::default()
        };
        for node in &ir.nodes {
            model.nodes.insert(node.id, node.clone());
        }
        for edge in &ir.edges {
            model.edges.insert(edge.id, edge.clone());
        }
        for group in &ir.groups {
            model.groups.insert(group.id, group.clone());
        }
        model
    }

    /// Exports the model back to IR, in insertion order.
    pub fn to_ir(&self) -> DiagramIr {
        DiagramIr {
            kind: self.kind,
            subtype: self.subtype.clone(),
            meta: DocumentMeta {
                title: self.title.clone(),
                theme: self.theme.clone(),
                direction: self.direction,
                extra: self.extra.clone(),
            },
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            groups: self.groups.values().cloned().collect(),
        }
    }

    // Nodes

    /// Adds a node and registers it in its parent group's children.
    pub fn add_node(&mut self, node: DiagramNode) -> Result<(), ModelError> {
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::NodeExists(node.id));
        }
        if let Some(group) = node.parent_id.and_then(|p| self.groups.get_mut(&p)) {
            if !group.children.contains(&node.id) {
                group.children.push(node.id);
            }
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    pub fn get_node(&self, id: Id) -> Option<&DiagramNode> {
        self.nodes.get(&id)
    }

    /// Applies `update` to the node `id`. The node keeps its id.
    pub fn update_node(
        &mut self,
        id: Id,
        update: impl FnOnce(&mut DiagramNode),
    ) -> Result<(), ModelError> {
        let node = self.nodes.get_mut(&id).ok_or(ModelError::NodeNotFound(id))?;
        update(node);
        node.id = id;
        Ok(())
    }

    /// Removes a node, its incident edges and its entry in the parent group.
    pub fn remove_node(&mut self, id: Id) -> Result<DiagramNode, ModelError> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(ModelError::NodeNotFound(id))?;
        self.edges.retain(|_, edge| !edge.touches(id));
        if let Some(group) = node.parent_id.and_then(|p| self.groups.get_mut(&p)) {
            group.children.retain(|child| *child != id);
        }
        Ok(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.values()
    }

    pub fn nodes_in_group(&self, group_id: Id) -> impl Iterator<Item = &DiagramNode> {
        self.nodes
            .values()
            .filter(move |node| node.parent_id == Some(group_id))
    }

    pub fn root_nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.values().filter(|node| node.parent_id.is_none())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Edges

    /// Adds an edge. Missing endpoints are logged, not rejected.
    pub fn add_edge(&mut self, edge: DiagramEdge) -> Result<(), ModelError> {
        if self.edges.contains_key(&edge.id) {
            return Err(ModelError::EdgeExists(edge.id));
        }
        for (end, id) in [("source", edge.source), ("target", edge.target)] {
            if !self.contains_endpoint(id) {
                warn!(edge = edge.id.to_string(), end, id = id.to_string(); "Edge endpoint not found");
            }
        }
        self.edges.insert(edge.id, edge);
        Ok(())
    }

    pub fn get_edge(&self, id: Id) -> Option<&DiagramEdge> {
        self.edges.get(&id)
    }

    /// Applies `update` to the edge `id`. The edge keeps its id.
    pub fn update_edge(
        &mut self,
        id: Id,
        update: impl FnOnce(&mut DiagramEdge),
    ) -> Result<(), ModelError> {
        let edge = self.edges.get_mut(&id).ok_or(ModelError::EdgeNotFound(id))?;
        update(edge);
        edge.id = id;
        Ok(())
    }

    pub fn remove_edge(&mut self, id: Id) -> Result<DiagramEdge, ModelError> {
        self.edges
            .shift_remove(&id)
            .ok_or(ModelError::EdgeNotFound(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &DiagramEdge> {
        self.edges.values()
    }

    /// Edges that start or end at `node_id`.
    pub fn edges_for_node(&self, node_id: Id) -> impl Iterator<Item = &DiagramEdge> {
        self.edges.values().filter(move |edge| edge.touches(node_id))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // Groups

    pub fn add_group(&mut self, group: DiagramGroup) -> Result<(), ModelError> {
        if self.groups.contains_key(&group.id) {
            return Err(ModelError::GroupExists(group.id));
        }
        self.groups.insert(group.id, group);
        Ok(())
    }

    pub fn get_group(&self, id: Id) -> Option<&DiagramGroup> {
        self.groups.get(&id)
    }

    /// Applies `update` to the group `id`. The group keeps its id.
    pub fn update_group(
        &mut self,
        id: Id,
        update: impl FnOnce(&mut DiagramGroup),
    ) -> Result<(), ModelError> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(ModelError::GroupNotFound(id))?;
        update(group);
        group.id = id;
        Ok(())
    }

    /// Removes a group.
    ///
    /// Members are the ids in the group's `children` plus every node or group
    /// whose `parent_id` names it. With `remove_children` they are removed
    /// recursively; otherwise they move to the removed group's parent.
    pub fn remove_group(
        &mut self,
        id: Id,
        remove_children: bool,
    ) -> Result<DiagramGroup, ModelError> {
        let group = self
            .groups
            .shift_remove(&id)
            .ok_or(ModelError::GroupNotFound(id))?;

        let mut members: IndexSet<Id> = group.children.iter().copied().collect();
        members.extend(
            self.nodes
                .values()
                .filter(|node| node.parent_id == Some(id))
                .map(|node| node.id),
        );
        members.extend(
            self.groups
                .values()
                .filter(|g| g.parent_id == Some(id))
                .map(|g| g.id),
        );

        if remove_children {
            for member in members {
                if self.nodes.contains_key(&member) {
                    self.remove_node(member)?;
                } else if self.groups.contains_key(&member) {
                    self.remove_group(member, true)?;
                }
            }
        } else {
            let new_parent = group.parent_id;
            for member in members {
                if let Some(node) = self.nodes.get_mut(&member) {
                    node.parent_id = new_parent;
                    if let Some(parent) = new_parent.and_then(|p| self.groups.get_mut(&p)) {
                        if !parent.children.contains(&member) {
                            parent.children.push(member);
                        }
                    }
                } else if let Some(child) = self.groups.get_mut(&member) {
                    child.parent_id = new_parent;
                }
            }
        }

        if let Some(parent) = group.parent_id.and_then(|p| self.groups.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }
        debug!(group = id.to_string(), remove_children; "Group removed");
        Ok(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &DiagramGroup> {
        self.groups.values()
    }

    pub fn root_groups(&self) -> impl Iterator<Item = &DiagramGroup> {
        self.groups.values().filter(|group| group.parent_id.is_none())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // Styles

    /// Shallow-merges `style` over the node's current style.
    pub fn apply_node_style(&mut self, node_id: Id, style: &NodeStyle) -> Result<(), ModelError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(ModelError::NodeNotFound(node_id))?;
        node.style = Some(merge_node_style(node.style.as_ref(), style));
        Ok(())
    }

    /// Shallow-merges `style` over the edge's current style.
    pub fn apply_edge_style(&mut self, edge_id: Id, style: &EdgeStyle) -> Result<(), ModelError> {
        let edge = self
            .edges
            .get_mut(&edge_id)
            .ok_or(ModelError::EdgeNotFound(edge_id))?;
        edge.style = Some(merge_edge_style(edge.style.as_ref(), style));
        Ok(())
    }

    pub fn apply_global_node_style(&mut self, style: &NodeStyle) {
        for node in self.nodes.values_mut() {
            node.style = Some(merge_node_style(node.style.as_ref(), style));
        }
    }

    pub fn apply_global_edge_style(&mut self, style: &EdgeStyle) {
        for edge in self.edges.values_mut() {
            edge.style = Some(merge_edge_style(edge.style.as_ref(), style));
        }
    }

    // Properties

    /// The layout direction, [`Direction::TB`] unless one was declared.
    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    /// The direction as declared, if any.
    pub fn declared_direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn set_theme(&mut self, theme: Option<String>) {
        self.theme = theme;
    }

    /// Custom metadata carried over from the document.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Mutable access, used by layout to write positions and sizes.
    pub fn node_mut(&mut self, id: Id) -> Option<&mut DiagramNode> {
        self.nodes.get_mut(&id)
    }

    pub fn group_mut(&mut self, id: Id) -> Option<&mut DiagramGroup> {
        self.groups.get_mut(&id)
    }

    // Validation

    /// Checks id uniqueness, edge endpoints and group children.
    pub fn validate(&self) -> ModelValidation {
        let mut errors = Vec::new();

        for group in self.groups.values() {
            if self.nodes.contains_key(&group.id) {
                errors.push(format!("Duplicate ID: \"{}\"", group.id));
            }
        }

        for edge in self.edges.values() {
            if !self.contains_endpoint(edge.source) {
                errors.push(format!(
                    "Edge \"{}\" references non-existent source: \"{}\"",
                    edge.id, edge.source
                ));
            }
            if !self.contains_endpoint(edge.target) {
                errors.push(format!(
                    "Edge \"{}\" references non-existent target: \"{}\"",
                    edge.id, edge.target
                ));
            }
        }

        for group in self.groups.values() {
            for child in &group.children {
                if !self.nodes.contains_key(child) && !self.groups.contains_key(child) {
                    errors.push(format!(
                        "Group \"{}\" references non-existent child: \"{}\"",
                        group.id, child
                    ));
                }
            }
        }

        ModelValidation {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn contains_endpoint(&self, id: Id) -> bool {
        self.nodes.contains_key(&id) || self.groups.contains_key(&id)
    }
}

fn merge_node_style(current: Option<&NodeStyle>, overlay: &NodeStyle) -> NodeStyle {
    current.cloned().unwrap_or_default().merge(overlay)
}

fn merge_edge_style(current: Option<&EdgeStyle>, overlay: &EdgeStyle) -> EdgeStyle {
    current.cloned().unwrap_or_default().merge(overlay)
}
