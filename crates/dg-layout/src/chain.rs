//! Longest simple path by plain depth-first search.
//!
//! The search is not memoized and explores every simple path reachable from
//! the start node, so it is exponential on graphs with many diamond-shaped
//! fan-outs. Callers on untrusted input should use [`longest_chain_within`],
//! which gives up after a fixed number of recursive steps.

use std::collections::BTreeSet;

use dg_core::{Graph, NodeId};

/// Longest chain of node ids starting at `start`, never stepping onto a node
/// in `visited_path`.
///
/// Each unvisited adjacent is explored with the path extended by `start` and
/// that adjacent. The first strictly longest child chain in adjacency order
/// wins. Returns an empty chain when `start` is not in `graph`.
#[must_use]
pub fn longest_chain(graph: &Graph, start: NodeId, visited_path: &BTreeSet<NodeId>) -> Vec<NodeId> {
    let Some(node) = graph.get_node(start) else {
        return Vec::new();
    };

    let mut best: Vec<NodeId> = Vec::new();
    for adjacent in node.adjacents().iter().copied() {
        if visited_path.contains(&adjacent) {
            continue;
        }
        let mut path = visited_path.clone();
        path.insert(start);
        path.insert(adjacent);
        let candidate = longest_chain(graph, adjacent, &path);
        if candidate.len() > best.len() {
            best = candidate;
        }
    }

    let mut chain = Vec::with_capacity(best.len() + 1);
    chain.push(start);
    chain.extend(best);
    chain
}

/// [`longest_chain`] from an empty path. A self-loop on `start` is therefore
/// followed once.
#[must_use]
pub fn longest_chain_from(graph: &Graph, start: NodeId) -> Vec<NodeId> {
    longest_chain(graph, start, &BTreeSet::new())
}

/// [`longest_chain_from`] that stops after `step_limit` recursive steps.
///
/// Returns the same chain as the unbounded search when it finishes inside the
/// budget, `None` otherwise.
#[must_use]
pub fn longest_chain_within(graph: &Graph, start: NodeId, step_limit: usize) -> Option<Vec<NodeId>> {
    let mut remaining = step_limit;
    budgeted_chain(graph, start, &BTreeSet::new(), &mut remaining)
}

fn budgeted_chain(
    graph: &Graph,
    start: NodeId,
    visited_path: &BTreeSet<NodeId>,
    remaining: &mut usize,
) -> Option<Vec<NodeId>> {
    *remaining = remaining.checked_sub(1)?;
    let Some(node) = graph.get_node(start) else {
        return Some(Vec::new());
    };

    let mut best: Vec<NodeId> = Vec::new();
    for adjacent in node.adjacents().iter().copied() {
        if visited_path.contains(&adjacent) {
            continue;
        }
        let mut path = visited_path.clone();
        path.insert(start);
        path.insert(adjacent);
        let candidate = budgeted_chain(graph, adjacent, &path, remaining)?;
        if candidate.len() > best.len() {
            best = candidate;
        }
    }

    let mut chain = Vec::with_capacity(best.len() + 1);
    chain.push(start);
    chain.extend(best);
    Some(chain)
}
