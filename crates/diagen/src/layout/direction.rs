//! Per-group layout direction inference.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::debug;

use diagen_core::{
    identifier::Id,
    ir::{DiagramGroup, Direction},
    model::DiagramModel,
};

/// Chooses the direction a group lays out its children in.
///
/// An explicit group direction always wins. Otherwise the group's internal
/// edges (both endpoints among its children) decide:
///
/// - no internal edges: `LR`
/// - a simple chain: `LR`
/// - any fan-out or fan-in: `LR`
/// - anything else: `global`
pub fn infer_group_direction(
    group: &DiagramGroup,
    model: &DiagramModel,
    global: Direction,
) -> Direction {
    if let Some(direction) = group.direction {
        return direction;
    }

    let children: HashSet<Id> = group.children.iter().copied().collect();
    let internal: Vec<_> = model
        .edges()
        .filter(|edge| children.contains(&edge.source) && children.contains(&edge.target))
        .collect();

    if internal.is_empty() {
        return Direction::LR;
    }

    let mut out_degree: HashMap<Id, usize> = HashMap::new();
    let mut in_degree: HashMap<Id, usize> = HashMap::new();
    for edge in &internal {
        *out_degree.entry(edge.source).or_default() += 1;
        *in_degree.entry(edge.target).or_default() += 1;
    }

    let fan_out = out_degree.values().any(|&degree| degree > 1);
    let fan_in = in_degree.values().any(|&degree| degree > 1);
    let chain = !fan_out && !fan_in && internal.len() + 1 == children.len();

    if chain || fan_out || fan_in {
        Direction::LR
    } else {
        global
    }
}

/// [`infer_group_direction`] for every group of `model`, in model order.
pub fn infer_all_group_directions(
    model: &DiagramModel,
    global: Direction,
) -> IndexMap<Id, Direction> {
    let directions: IndexMap<Id, Direction> = model
        .groups()
        .map(|group| (group.id, infer_group_direction(group, model, global)))
        .collect();
    debug!(directions:?; "Inferred group directions");
    directions
}
