//! Layered layout engine.
//!
//! Every container is laid out on its own, innermost first, so a group's
//! size is known before its parent arranges it. Within a container:
//!
//! 1. Edges are mapped onto the container's direct children and collected
//!    into a graph. Back edges found by a depth-first search are dropped so
//!    the remainder is acyclic.
//! 2. Children are layered by longest path from the sources.
//! 3. Layers are stacked along the container's direction, separated by the
//!    layer spacing. Children of one layer are spread across it in model
//!    order, separated by the node spacing and centered on the widest layer.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, depth_first_search},
};

use diagen_core::{
    identifier::Id,
    ir::{Direction, Position, Size},
};

use super::{
    DEFAULT_GROUP_HEIGHT, DEFAULT_GROUP_WIDTH, LayoutEngine, Placement, Placements,
    input::{LayoutEdge, LayoutElement, LayoutInput},
};
use crate::error::DiagenError;

/// The built-in layered engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayeredEngine;

impl LayeredEngine {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutEngine for LayeredEngine {
    fn layout(&self, input: &LayoutInput) -> Result<Placements, DiagenError> {
        for (name, value) in [
            ("node spacing", input.node_spacing),
            ("layer spacing", input.layer_spacing),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DiagenError::Layout(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let arranger = Arranger {
            node_spacing: input.node_spacing,
            layer_spacing: input.layer_spacing,
        };
        let (size, blocks) = arranger.arrange(&input.children, &input.edges, input.direction);

        let mut placements = Placements::default();
        for block in &blocks {
            block.place(Position::default(), &mut placements);
        }
        info!(
            width = size.width,
            height = size.height,
            elements = placements.len();
            "Layout calculated"
        );
        Ok(placements)
    }
}

/// A laid out element, positioned relative to its container's content.
#[derive(Debug)]
struct Block {
    id: Id,
    origin: Position,
    size: Size,
    /// Offset of the content area from the block's corner.
    inset: Position,
    children: Vec<Block>,
}

impl Block {
    fn place(&self, container: Position, placements: &mut Placements) {
        let position = Position {
            x: container.x + self.origin.x,
            y: container.y + self.origin.y,
        };
        placements.insert(
            self.id,
            Placement {
                position,
                size: self.size,
            },
        );
        let content = Position {
            x: position.x + self.inset.x,
            y: position.y + self.inset.y,
        };
        for child in &self.children {
            child.place(content, placements);
        }
    }
}

struct Arranger {
    node_spacing: f64,
    layer_spacing: f64,
}

impl Arranger {
    /// Lays out `elements` and returns the size of their bounding box.
    fn arrange(
        &self,
        elements: &[LayoutElement],
        edges: &[LayoutEdge],
        direction: Direction,
    ) -> (Size, Vec<Block>) {
        let mut blocks: Vec<Block> = elements.iter().map(|e| self.block(e)).collect();
        if blocks.is_empty() {
            return (Size::default(), blocks);
        }

        let layers = Self::layers(elements, edges);
        let horizontal = direction.is_horizontal();
        let main = |size: Size| if horizontal { size.width } else { size.height };
        let cross = |size: Size| if horizontal { size.height } else { size.width };

        let breadths: Vec<f64> = layers
            .iter()
            .map(|layer| {
                let sum: f64 = layer.iter().map(|&i| cross(blocks[i].size)).sum();
                sum + self.node_spacing * layer.len().saturating_sub(1) as f64
            })
            .collect();
        let depths: Vec<f64> = layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|&i| main(blocks[i].size))
                    .fold(0.0, f64::max)
            })
            .collect();
        let max_breadth = breadths.iter().copied().fold(0.0, f64::max);
        let total_depth = depths.iter().sum::<f64>()
            + self.layer_spacing * layers.len().saturating_sub(1) as f64;

        let reversed = matches!(direction, Direction::BT | Direction::RL);
        let mut main_offset = 0.0;
        for ((layer, breadth), depth) in layers.iter().zip(&breadths).zip(&depths) {
            let mut cross_offset = (max_breadth - breadth) / 2.0;
            for &i in layer {
                let size = blocks[i].size;
                let mut along = main_offset + (depth - main(size)) / 2.0;
                if reversed {
                    along = total_depth - along - main(size);
                }
                blocks[i].origin = if horizontal {
                    Position {
                        x: along,
                        y: cross_offset,
                    }
                } else {
                    Position {
                        x: cross_offset,
                        y: along,
                    }
                };
                cross_offset += cross(size) + self.node_spacing;
            }
            main_offset += depth + self.layer_spacing;
        }

        let size = if horizontal {
            Size::new(total_depth, max_breadth)
        } else {
            Size::new(max_breadth, total_depth)
        };
        (size, blocks)
    }

    fn block(&self, element: &LayoutElement) -> Block {
        match element {
            LayoutElement::Node(node) => Block {
                id: node.id,
                origin: Position::default(),
                size: node.size,
                inset: Position::default(),
                children: Vec::new(),
            },
            LayoutElement::Group(group) => {
                let (content, children) =
                    self.arrange(&group.children, &group.edges, group.direction);
                let size = if children.is_empty() {
                    Size::new(DEFAULT_GROUP_WIDTH, DEFAULT_GROUP_HEIGHT)
                } else {
                    Size::new(
                        content.width + group.padding.horizontal(),
                        content.height + group.padding.vertical(),
                    )
                };
                debug!(group = group.id.to_string(), width = size.width, height = size.height; "Group sized");
                Block {
                    id: group.id,
                    origin: Position::default(),
                    size,
                    inset: Position {
                        x: group.padding.left,
                        y: group.padding.top,
                    },
                    children,
                }
            }
        }
    }

    /// Longest-path layering of `elements`, each layer in model order.
    fn layers(elements: &[LayoutElement], edges: &[LayoutEdge]) -> Vec<Vec<usize>> {
        let owner: HashMap<Id, usize> = elements
            .iter()
            .enumerate()
            .flat_map(|(i, element)| element.ids().into_iter().map(move |id| (id, i)))
            .collect();

        let mut graph = DiGraph::<usize, ()>::new();
        let indices: Vec<NodeIndex> = (0..elements.len()).map(|i| graph.add_node(i)).collect();
        for edge in edges {
            if let (Some(&source), Some(&target)) = (owner.get(&edge.source), owner.get(&edge.target)) {
                if source != target {
                    graph.add_edge(indices[source], indices[target], ());
                }
            }
        }

        let mut back_edges = HashSet::new();
        depth_first_search(&graph, graph.node_indices(), |event| {
            if let DfsEvent::BackEdge(from, to) = event {
                back_edges.insert((from, to));
            }
        });
        graph.retain_edges(|frozen, edge| {
            frozen
                .edge_endpoints(edge)
                .is_some_and(|endpoints| !back_edges.contains(&endpoints))
        });

        let order = toposort(&graph, None).unwrap_or_else(|_| graph.node_indices().collect());
        let mut rank = vec![0usize; elements.len()];
        for node in order {
            let next = rank[node.index()] + 1;
            for successor in graph.neighbors(node) {
                rank[successor.index()] = rank[successor.index()].max(next);
            }
        }

        let depth = rank.iter().copied().max().unwrap_or_default();
        let mut layers = vec![Vec::new(); depth + 1];
        for (i, layer) in rank.into_iter().enumerate() {
            layers[layer].push(i);
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::layout::{LayoutOptions, input::LayoutNode};

    fn node(id: &str) -> LayoutElement {
        LayoutElement::Node(LayoutNode {
            id: Id::new(id),
            label: id.to_string(),
            size: Size::new(150.0, 50.0),
            ports: Vec::new(),
        })
    }

    fn edge(source: &str, target: &str) -> LayoutEdge {
        LayoutEdge {
            id: Id::new(&format!("{source}-{target}")),
            source: Id::new(source),
            target: Id::new(target),
            source_port: None,
            target_port: None,
            label: None,
        }
    }

    fn input(children: Vec<LayoutElement>, edges: Vec<LayoutEdge>, direction: Direction) -> LayoutInput {
        let options = LayoutOptions::default();
        LayoutInput {
            direction,
            node_spacing: options.node_spacing,
            layer_spacing: options.layer_spacing,
            children,
            edges,
        }
    }

    fn position(placements: &Placements, id: &str) -> Position {
        placements.get(Id::new(id)).expect("placed").position
    }

    #[test]
    fn test_chain_top_to_bottom() {
        let input = input(
            vec![node("a"), node("b"), node("c")],
            vec![edge("a", "b"), edge("b", "c")],
            Direction::TB,
        );

        let placements = LayeredEngine.layout(&input).expect("layout");

        assert!(approx_eq!(f64, position(&placements, "a").y, 0.0));
        assert!(approx_eq!(f64, position(&placements, "b").y, 130.0));
        assert!(approx_eq!(f64, position(&placements, "c").y, 260.0));
        assert!(approx_eq!(f64, position(&placements, "c").x, 0.0));
    }

    #[test]
    fn test_fan_out_is_centered() {
        let input = input(
            vec![node("root"), node("l"), node("r")],
            vec![edge("root", "l"), edge("root", "r")],
            Direction::TB,
        );

        let placements = LayeredEngine.layout(&input).expect("layout");

        assert!(approx_eq!(f64, position(&placements, "l").x, 0.0));
        assert!(approx_eq!(f64, position(&placements, "r").x, 200.0));
        assert!(approx_eq!(f64, position(&placements, "root").x, 100.0));
    }

    #[test]
    fn test_horizontal_and_reversed() {
        let lr = LayeredEngine
            .layout(&input(vec![node("a"), node("b")], vec![edge("a", "b")], Direction::LR))
            .expect("layout");
        assert!(approx_eq!(f64, position(&lr, "b").x, 230.0));
        assert!(approx_eq!(f64, position(&lr, "b").y, 0.0));

        let bt = LayeredEngine
            .layout(&input(vec![node("a"), node("b")], vec![edge("a", "b")], Direction::BT))
            .expect("layout");
        assert!(approx_eq!(f64, position(&bt, "a").y, 130.0));
        assert!(approx_eq!(f64, position(&bt, "b").y, 0.0));
    }

    #[test]
    fn test_cycles_are_layered() {
        let input = input(
            vec![node("a"), node("b")],
            vec![edge("a", "b"), edge("b", "a")],
            Direction::TB,
        );

        let placements = LayeredEngine.layout(&input).expect("layout");

        assert!(position(&placements, "a").y < position(&placements, "b").y);
    }

    #[test]
    fn test_rejects_negative_spacing() {
        let mut input = input(vec![node("a")], Vec::new(), Direction::TB);
        input.layer_spacing = -1.0;

        assert!(matches!(LayeredEngine.layout(&input), Err(DiagenError::Layout(_))));
    }
}
