//! Structural checks over a parsed IR.
//!
//! Every check runs regardless of earlier failures and the input is never
//! modified. Undefined edge endpoints and unreferenced top-level nodes are
//! only warnings since the normalizer synthesizes missing nodes later.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use diagen_core::{
    identifier::Id,
    ir::{DiagramGroup, DiagramIr},
};

use super::issue::{Issue, IssueCode};

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    /// `true` when `errors` is empty.
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

/// Validates `ir` and reports every problem found.
pub fn validate(ir: &DiagramIr) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut node_ids = IndexSet::new();
    for node in &ir.nodes {
        if !node_ids.insert(node.id) {
            errors.push(
                Issue::new(
                    IssueCode::DuplicateId,
                    format!("Duplicate node ID: \"{}\"", node.id),
                )
                .with_element(node.id),
            );
        }
    }

    let mut group_ids = HashSet::new();
    for group in &ir.groups {
        if !group_ids.insert(group.id) {
            errors.push(
                Issue::new(
                    IssueCode::DuplicateId,
                    format!("Duplicate group ID: \"{}\"", group.id),
                )
                .with_element(group.id),
            );
        }
        if node_ids.contains(&group.id) {
            errors.push(
                Issue::new(
                    IssueCode::DuplicateId,
                    format!("Group ID \"{}\" conflicts with node ID", group.id),
                )
                .with_element(group.id),
            );
        }
    }

    let is_defined = |id: &Id| node_ids.contains(id) || group_ids.contains(id);

    let mut referenced = HashSet::new();
    for edge in &ir.edges {
        referenced.insert(edge.source);
        referenced.insert(edge.target);

        for endpoint in [edge.source, edge.target] {
            if !is_defined(&endpoint) {
                warnings.push(
                    Issue::new(
                        IssueCode::UndefinedEndpoint,
                        format!(
                            "Node \"{endpoint}\" is referenced but not defined (will be auto-created)"
                        ),
                    )
                    .with_element(endpoint),
                );
            }
        }
    }

    for &node_id in &node_ids {
        if referenced.contains(&node_id) {
            continue;
        }
        let in_group = ir
            .nodes
            .iter()
            .find(|node| node.id == node_id)
            .is_some_and(|node| node.parent_id.is_some());
        if !in_group {
            warnings.push(
                Issue::new(
                    IssueCode::UnreferencedNode,
                    format!("Node \"{node_id}\" is defined but never referenced in any edge"),
                )
                .with_element(node_id),
            );
        }
    }

    if let Some(cycle) = find_group_cycle(&ir.groups) {
        let path: Vec<String> = cycle.iter().map(Id::to_string).collect();
        errors.push(
            Issue::new(
                IssueCode::CircularGroup,
                format!("Circular group reference detected: {}", path.join(" -> ")),
            )
            .with_element(cycle[0]),
        );
    }

    for group in &ir.groups {
        if let Some(parent) = group.parent_id {
            if !group_ids.contains(&parent) {
                errors.push(
                    Issue::new(
                        IssueCode::UndefinedParent,
                        format!(
                            "Group \"{}\" references undefined parent group \"{parent}\"",
                            group.id
                        ),
                    )
                    .with_element(group.id),
                );
            }
        }
    }

    for node in &ir.nodes {
        if let Some(parent) = node.parent_id {
            if !group_ids.contains(&parent) {
                errors.push(
                    Issue::new(
                        IssueCode::UndefinedParent,
                        format!(
                            "Node \"{}\" references undefined parent group \"{parent}\"",
                            node.id
                        ),
                    )
                    .with_element(node.id),
                );
            }
        }
    }

    debug!(errors = errors.len(), warnings = warnings.len(); "Validation finished");
    trace!(errors:?, warnings:?; "Validation issues");

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Walks each group's parent chain and returns the first cycle found.
///
/// The returned path starts at the first group whose chain repeats and ends
/// with the group where the repetition was detected.
fn find_group_cycle(groups: &[DiagramGroup]) -> Option<Vec<Id>> {
    let parents: IndexMap<Id, Id> = groups
        .iter()
        .filter_map(|group| group.parent_id.map(|parent| (group.id, parent)))
        .collect();

    for group in groups {
        let mut visited = HashSet::new();
        let mut current = Some(group.id);

        while let Some(id) = current {
            if !visited.insert(id) {
                let mut path = Vec::new();
                let mut step = Some(group.id);
                while let Some(id) = step {
                    if path.contains(&id) {
                        break;
                    }
                    path.push(id);
                    step = parents.get(&id).copied();
                }
                if let Some(id) = step {
                    path.push(id);
                }
                return Some(path);
            }
            current = parents.get(&id).copied();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use diagen_core::ir::{DiagramEdge, DiagramNode};

    use super::*;

    fn node(id: &str) -> DiagramNode {
        DiagramNode::new(Id::new(id), id)
    }

    fn edge(id: &str, source: &str, target: &str) -> DiagramEdge {
        DiagramEdge::new(Id::new(id), Id::new(source), Id::new(target))
    }

    fn group(id: &str, parent: Option<&str>) -> DiagramGroup {
        let group = DiagramGroup::new(Id::new(id));
        match parent {
            Some(parent) => group.with_parent(Id::new(parent)),
            None => group,
        }
    }

    fn codes(issues: &[Issue]) -> Vec<IssueCode> {
        issues.iter().map(|issue| issue.code).collect()
    }

    #[test]
    fn test_valid_ir() {
        let ir = DiagramIr {
            nodes: vec![node("A"), node("B")],
            edges: vec![edge("e1", "A", "B")],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_node_ids() {
        let ir = DiagramIr {
            nodes: vec![node("A"), node("A"), node("A")],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert!(!result.valid);
        assert_eq!(codes(&result.errors), [IssueCode::DuplicateId; 2]);
        assert_eq!(result.errors[0].message, "Duplicate node ID: \"A\"");
    }

    #[test]
    fn test_group_conflicts() {
        let ir = DiagramIr {
            nodes: vec![node("X")],
            groups: vec![group("G", None), group("G", None), group("X", None)],
            ..DiagramIr::default()
        };

        let messages: Vec<String> = validate(&ir)
            .errors
            .into_iter()
            .map(|issue| issue.message)
            .collect();

        assert_eq!(
            messages,
            [
                "Duplicate group ID: \"G\"",
                "Group ID \"X\" conflicts with node ID",
            ]
        );
    }

    #[test]
    fn test_undefined_endpoints_are_warnings() {
        let ir = DiagramIr {
            nodes: vec![node("A")],
            edges: vec![edge("e1", "A", "ghost"), edge("e2", "phantom", "ghost")],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert!(result.valid);
        assert_eq!(codes(&result.warnings), [IssueCode::UndefinedEndpoint; 3]);
        assert_eq!(
            result.warnings[0].message,
            "Node \"ghost\" is referenced but not defined (will be auto-created)"
        );
        assert_eq!(result.warnings[1].element_id, Some(Id::new("phantom")));
    }

    #[test]
    fn test_unreferenced_nodes_outside_groups() {
        let ir = DiagramIr {
            nodes: vec![node("lonely"), node("member").with_parent(Id::new("G"))],
            groups: vec![group("G", None)],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert!(result.valid);
        assert_eq!(codes(&result.warnings), [IssueCode::UnreferencedNode]);
        assert_eq!(result.warnings[0].element_id, Some(Id::new("lonely")));
    }

    #[test]
    fn test_circular_groups() {
        let ir = DiagramIr {
            groups: vec![group("a", Some("b")), group("b", Some("a"))],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert!(!result.valid);
        assert_eq!(codes(&result.errors), [IssueCode::CircularGroup]);
        assert_eq!(
            result.errors[0].message,
            "Circular group reference detected: a -> b -> a"
        );
    }

    #[test]
    fn test_self_parented_group() {
        let ir = DiagramIr {
            groups: vec![group("root", None), group("loop", Some("loop"))],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert_eq!(
            result.errors[0].message,
            "Circular group reference detected: loop -> loop"
        );
    }

    #[test]
    fn test_dangling_parents() {
        let ir = DiagramIr {
            nodes: vec![node("n").with_parent(Id::new("missing"))],
            groups: vec![group("g", Some("nowhere"))],
            edges: vec![edge("e1", "n", "n")],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert_eq!(codes(&result.errors), [IssueCode::UndefinedParent; 2]);
        assert_eq!(
            result.errors[0].message,
            "Group \"g\" references undefined parent group \"nowhere\""
        );
        assert_eq!(
            result.errors[1].message,
            "Node \"n\" references undefined parent group \"missing\""
        );
    }

    #[test]
    fn test_checks_accumulate() {
        let ir = DiagramIr {
            nodes: vec![node("A"), node("A")],
            groups: vec![group("a", Some("a")), group("b", Some("void"))],
            edges: vec![edge("e1", "A", "undefined")],
            ..DiagramIr::default()
        };

        let result = validate(&ir);

        assert_eq!(
            codes(&result.errors),
            [
                IssueCode::DuplicateId,
                IssueCode::CircularGroup,
                IssueCode::UndefinedParent,
            ]
        );
        assert_eq!(codes(&result.warnings), [IssueCode::UndefinedEndpoint]);
    }
}
