use super::LayoutResult;
use crate::config::LayoutConfig;
use crate::dimensions::DimensionTracker;
use crate::ir::{Edge, GraphModel, Point};
use std::collections::{HashMap, HashSet, VecDeque};

/// Every node below `parent_id`, in BFS order, with its depth relative to
/// the parent (direct children are 1).
///
/// The parent is never reported, even when a cycle leads back to it.
pub fn descendants(parent_id: &str, edges: &[Edge]) -> Vec<(String, usize)> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(parent_id);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(parent_id, 0)]);
    let mut out = Vec::new();
    while let Some((current, depth)) = queue.pop_front() {
        for &child in children.get(current).into_iter().flatten() {
            if !visited.insert(child) {
                continue;
            }
            out.push((child.to_string(), depth + 1));
            queue.push_back((child, depth + 1));
        }
    }
    out
}

/// Moves the subtree below `parent_id` so it starts under the parent's
/// current measured height. A node `depth` levels down lands at
/// `parent bottom + spacing + depth * spacing`.
///
/// Only `y` of descendants changes. The parent's own position is read but
/// never written, so running the pass twice gives the same result.
pub fn reflow(
    parent_id: &str,
    positions: &LayoutResult,
    edges: &[Edge],
    tracker: &DimensionTracker,
    config: &LayoutConfig,
) -> LayoutResult {
    let Some(parent) = positions.get(parent_id) else {
        return positions.clone();
    };
    let height = tracker
        .get(parent_id)
        .map(|size| size.height)
        .filter(|height| *height > 0.0)
        .unwrap_or(config.reflow_default_height);
    let parent_bottom = parent.y + height;
    let spacing = config.reflow_spacing;

    let mut result = positions.clone();
    let mut moved = 0usize;
    for (id, depth) in descendants(parent_id, edges) {
        let Some(point) = result.positions.get_mut(&id) else {
            continue;
        };
        let y = parent_bottom + spacing + depth as f32 * spacing;
        *point = Point::new(point.x, y);
        moved += 1;
    }
    tracing::trace!(parent = parent_id, moved, "reflowed subtree");
    result
}

/// Parents whose subtrees get reflowed, ancestors first.
///
/// Only nodes with children and a kind listed in `config.reflow_kinds`
/// qualify. Ties on level are broken by the record id of the node's parent
/// (roots first), then by declaration order.
pub fn reflow_order(graph: &GraphModel, config: &LayoutConfig) -> Vec<String> {
    let levels = graph.levels();
    let mut candidates: Vec<(usize, Option<i64>, usize, &str)> = graph
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| config.reflows_kind(node.kind) && graph.has_children(&node.id))
        .map(|(idx, node)| {
            let parent_record = node
                .parent_id
                .as_deref()
                .and_then(|parent| graph.node(parent))
                .map(|parent| parent.record_id);
            let level = levels.get(&node.id).copied().unwrap_or(0);
            (level, parent_record, idx, node.id.as_str())
        })
        .collect();
    candidates.sort();
    candidates.into_iter().map(|(.., id)| id.to_string()).collect()
}

/// Reflows every candidate from [`reflow_order`], each step starting from
/// the previous step's output.
pub fn reflow_all(
    graph: &GraphModel,
    positions: &LayoutResult,
    tracker: &DimensionTracker,
    config: &LayoutConfig,
) -> LayoutResult {
    let order = reflow_order(graph, config);
    let result = order.iter().fold(positions.clone(), |acc, parent| {
        reflow(parent, &acc, graph.edges(), tracker, config)
    });
    tracing::debug!(parents = order.len(), "reflow pass complete");
    result
}
