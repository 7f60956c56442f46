#![forbid(unsafe_code)]

mod chain;

use std::collections::BTreeSet;

use dg_core::{Enclosure, Graph, LayoutSettings, NodeId};
use serde::Serialize;
use tracing::{debug, warn};

pub use chain::{longest_chain, longest_chain_from, longest_chain_within};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    #[must_use]
    pub fn centered(center: LayoutPoint, width: f32, height: f32) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(self) -> LayoutPoint {
        LayoutPoint {
            x: self.x + (self.width / 2.0),
            y: self.y + (self.height / 2.0),
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNodeBox {
    pub node_id: NodeId,
    /// Position in the top-to-bottom column.
    pub order: usize,
    pub enclosure: Enclosure,
    pub bounds: LayoutRect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutEdgePath {
    pub from: NodeId,
    pub to: NodeId,
    /// Center-to-center segment; renderers clip it against the shapes.
    pub points: Vec<LayoutPoint>,
    pub is_self_loop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct LayoutStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Length of the longest chain placed first.
    pub chain_length: usize,
    /// Set when the chain search ran out of steps.
    pub chain_search_skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramLayout {
    /// Indexed by node id.
    pub nodes: Vec<LayoutNodeBox>,
    pub edges: Vec<LayoutEdgePath>,
    pub bounds: LayoutRect,
    /// Node ids from top to bottom.
    pub placement: Vec<NodeId>,
    pub stats: LayoutStats,
}

/// Lay out with default settings.
#[must_use]
pub fn layout_diagram(graph: &Graph) -> DiagramLayout {
    layout_diagram_with_settings(graph, &LayoutSettings::default())
}

/// Stacks every node in one column: the longest chain from node 0 first, then
/// the rest in id order, each followed by its not-yet-placed adjacents.
#[must_use]
pub fn layout_diagram_with_settings(graph: &Graph, settings: &LayoutSettings) -> DiagramLayout {
    let (placement, chain_length, chain_search_skipped) = placement_order(graph, settings);

    let mut slots = vec![0_usize; graph.len()];
    for (order, id) in placement.iter().enumerate() {
        slots[id.0] = order;
    }

    let nodes: Vec<LayoutNodeBox> = graph
        .nodes()
        .iter()
        .map(|node| {
            let order = slots[node.id().0];
            let center = LayoutPoint {
                x: settings.origin_x,
                y: settings.origin_y + settings.row_spacing * order as f32,
            };
            let (width, height) = settings.node_size(node.value(), node.enclosure());
            LayoutNodeBox {
                node_id: node.id(),
                order,
                enclosure: node.enclosure(),
                bounds: LayoutRect::centered(center, width, height),
            }
        })
        .collect();

    let edges: Vec<LayoutEdgePath> = graph
        .edges()
        .map(|(from, to)| LayoutEdgePath {
            from,
            to,
            points: vec![nodes[from.0].bounds.center(), nodes[to.0].bounds.center()],
            is_self_loop: from == to,
        })
        .collect();

    let bounds = nodes
        .iter()
        .map(|node| node.bounds)
        .reduce(LayoutRect::union)
        .unwrap_or(LayoutRect {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        });

    let stats = LayoutStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        chain_length,
        chain_search_skipped,
    };
    debug!(
        nodes = stats.node_count,
        edges = stats.edge_count,
        chain_length,
        "laid out diagram"
    );

    DiagramLayout {
        nodes,
        edges,
        bounds,
        placement,
        stats,
    }
}

/// Returns `(placement, chain_length, chain_search_skipped)`.
fn placement_order(graph: &Graph, settings: &LayoutSettings) -> (Vec<NodeId>, usize, bool) {
    if graph.is_empty() {
        return (Vec::new(), 0, false);
    }

    let (chain, skipped) =
        match longest_chain_within(graph, NodeId(0), settings.chain_search_step_limit) {
            Some(chain) => (chain, false),
            None => {
                warn!(
                    nodes = graph.len(),
                    edges = graph.edge_count(),
                    step_limit = settings.chain_search_step_limit,
                    "chain search exceeded its step budget; placing nodes in walk order"
                );
                (Vec::new(), true)
            }
        };

    let mut placed = BTreeSet::new();
    let mut placement = Vec::with_capacity(graph.len());
    let mut place = |id: NodeId, placement: &mut Vec<NodeId>| {
        if placed.insert(id) {
            placement.push(id);
        }
    };

    for id in chain.iter().copied() {
        place(id, &mut placement);
    }
    for node in graph.nodes() {
        place(node.id(), &mut placement);
        for adjacent in node.adjacents().iter().copied() {
            place(adjacent, &mut placement);
        }
    }

    (placement, chain.len(), skipped)
}

#[cfg(test)]
mod tests {
    use dg_core::{Enclosure, Graph, LayoutSettings, NodeId};

    use super::{LayoutPoint, LayoutRect, layout_diagram, layout_diagram_with_settings};

    fn diamond() -> Graph {
        let mut graph = Graph::new();
        let top = graph.add_node("top", "Top", Enclosure::Rectangle);
        let left = graph.add_node("left", "Left", Enclosure::RoundedRectangle);
        let right = graph.add_node("right", "Right", Enclosure::Parallelogram);
        let bottom = graph.add_node("bottom", "Bottom", Enclosure::Other);
        graph.add_node("lone", "Lone", Enclosure::Rectangle);
        for (from, to) in [(top, left), (top, right), (right, bottom), (left, top)] {
            assert!(graph.link(from, to));
        }
        graph
    }

    #[test]
    fn empty_graph_has_empty_layout() {
        let layout = layout_diagram(&Graph::new());
        assert!(layout.nodes.is_empty());
        assert!(layout.placement.is_empty());
        assert_eq!(layout.bounds.width, 0.0);
    }

    #[test]
    fn chain_is_placed_before_remaining_nodes() {
        let layout = layout_diagram(&diamond());
        assert_eq!(
            layout.placement,
            vec![NodeId(0), NodeId(2), NodeId(3), NodeId(1), NodeId(4)]
        );
        assert_eq!(layout.stats.chain_length, 3);
        assert!(!layout.stats.chain_search_skipped);
    }

    #[test]
    fn nodes_are_stacked_by_row_spacing() {
        let settings = LayoutSettings::default();
        let layout = layout_diagram_with_settings(&diamond(), &settings);
        for node in &layout.nodes {
            let center = node.bounds.center();
            assert!((center.x - settings.origin_x).abs() < 1e-3);
            let expected_y = settings.origin_y + settings.row_spacing * node.order as f32;
            assert!((center.y - expected_y).abs() < 1e-3);
        }
        assert_eq!(layout.nodes[2].order, 1);
    }

    #[test]
    fn edges_run_between_node_centers() {
        let layout = layout_diagram(&diamond());
        assert_eq!(layout.edges.len(), 4);
        let edge = &layout.edges[0];
        assert_eq!((edge.from, edge.to), (NodeId(0), NodeId(1)));
        assert_eq!(edge.points[0], layout.nodes[0].bounds.center());
        assert_eq!(edge.points[1], layout.nodes[1].bounds.center());
        assert!(layout.edges.iter().all(|edge| !edge.is_self_loop));
    }

    #[test]
    fn exhausted_budget_skips_chain_search() {
        let settings = LayoutSettings {
            chain_search_step_limit: 2,
            ..LayoutSettings::default()
        };
        let layout = layout_diagram_with_settings(&diamond(), &settings);
        assert!(layout.stats.chain_search_skipped);
        assert_eq!(layout.stats.chain_length, 0);
        assert_eq!(
            layout.placement,
            vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
    }

    #[test]
    fn dense_graph_lays_out_with_default_settings() {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = (0..28)
            .map(|index| graph.add_node(format!("n{index}"), format!("N{index}"), Enclosure::Rectangle))
            .collect();
        for (position, from) in ids.iter().enumerate() {
            for to in &ids[position + 1..] {
                assert!(graph.link(*from, *to));
            }
        }

        let layout = layout_diagram(&graph);
        assert!(layout.stats.chain_search_skipped);
        assert_eq!(layout.placement, ids);
        assert_eq!(layout.edges.len(), 28 * 27 / 2);
    }

    #[test]
    fn bounds_cover_every_node() {
        let layout = layout_diagram(&diamond());
        for node in &layout.nodes {
            let rect = node.bounds;
            assert!(rect.x >= layout.bounds.x);
            assert!(rect.y >= layout.bounds.y);
            assert!(rect.x + rect.width <= layout.bounds.x + layout.bounds.width + 1e-3);
            assert!(rect.y + rect.height <= layout.bounds.y + layout.bounds.height + 1e-3);
        }
    }

    #[test]
    fn rect_union_and_center() {
        let a = LayoutRect::centered(LayoutPoint { x: 0.0, y: 0.0 }, 2.0, 2.0);
        let b = LayoutRect::centered(LayoutPoint { x: 10.0, y: 4.0 }, 2.0, 2.0);
        let joined = a.union(b);
        assert_eq!(joined.x, -1.0);
        assert_eq!(joined.width, 12.0);
        assert_eq!(joined.height, 6.0);
        assert_eq!(a.center(), LayoutPoint { x: 0.0, y: 0.0 });
    }

    #[test]
    fn self_loops_are_flagged() {
        let mut graph = Graph::new();
        let only = graph.add_node("a", "A", Enclosure::Rectangle);
        assert!(graph.link(only, only));
        let layout = layout_diagram(&graph);
        assert_eq!(layout.placement, vec![only]);
        assert!(layout.edges[0].is_self_loop);
    }
}
