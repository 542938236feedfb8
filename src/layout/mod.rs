mod ranking;
pub mod reflow;
pub(crate) mod types;
pub use reflow::*;
pub use types::*;
use ranking::*;

use crate::config::LayoutConfig;
use crate::dimensions::DimensionTracker;
use crate::ir::{GraphModel, Node, NodeKind, Point, Size};
use std::collections::HashMap;

/// Size used for `node` during layout: the tracker's measurement, then the
/// size baked into the model, then the per-kind default.
pub fn node_size(node: &Node, tracker: Option<&DimensionTracker>, config: &LayoutConfig) -> Size {
    tracker
        .and_then(|tracker| tracker.get(&node.id))
        .or(node.measured_size)
        .unwrap_or_else(|| config.default_size(node.kind))
}

/// Layered top-to-bottom layout of a whole forest.
///
/// Ranks are tree depth. Inside a rank, nodes follow a pre-order walk so
/// siblings stay together and edges never cross. Leaves are packed left to
/// right `node_spacing` apart and each parent is centred over its children;
/// a subtree is pushed right when its parent would overlap a neighbour.
/// Nodes without a measured size use `default_size(kind)`.
pub fn layout_initial(
    graph: &GraphModel,
    default_size: impl Fn(NodeKind) -> Size,
    config: &LayoutConfig,
) -> LayoutResult {
    if graph.is_empty() {
        return LayoutResult::new();
    }

    let forest = rank_forest(graph);
    let sizes: HashMap<&str, Size> = graph
        .nodes()
        .iter()
        .map(|node| {
            let size = node.measured_size.unwrap_or_else(|| default_size(node.kind));
            (node.id.as_str(), size)
        })
        .collect();

    let mut placer = Placer {
        forest: &forest,
        sizes: &sizes,
        spacing: config.node_spacing,
        next_free: vec![0.0; forest.ranks.len()],
        center_x: HashMap::with_capacity(sizes.len()),
    };
    for root in &forest.roots {
        placer.place(root);
    }
    let center_x = placer.center_x;

    let mut rank_top = Vec::with_capacity(forest.ranks.len());
    let mut rank_height = Vec::with_capacity(forest.ranks.len());
    let mut cursor = 0.0f32;
    for bucket in &forest.ranks {
        let tallest = bucket
            .iter()
            .map(|id| sizes[id.as_str()].height)
            .fold(0.0f32, f32::max);
        rank_top.push(cursor);
        rank_height.push(tallest);
        cursor += tallest + config.rank_spacing;
    }

    // Centres are converted to top-left corners here.
    let mut result = LayoutResult::new();
    for (level, bucket) in forest.ranks.iter().enumerate() {
        let center_y = rank_top[level] + rank_height[level] / 2.0;
        for id in bucket {
            let size = sizes[id.as_str()];
            let cx = center_x.get(id).copied().unwrap_or(size.width / 2.0);
            result.positions.insert(
                id.clone(),
                Point::new(cx - size.width / 2.0, center_y - size.height / 2.0),
            );
        }
    }

    tracing::debug!(
        nodes = result.len(),
        ranks = forest.ranks.len(),
        crossings = count_crossings(&forest),
        "initial layout"
    );
    result
}

pub fn layout_initial_with_config(graph: &GraphModel, config: &LayoutConfig) -> LayoutResult {
    layout_initial(graph, |kind| config.default_size(kind), config)
}

struct Placer<'a> {
    forest: &'a RankedForest,
    sizes: &'a HashMap<&'a str, Size>,
    spacing: f32,
    next_free: Vec<f32>,
    center_x: HashMap<String, f32>,
}

impl Placer<'_> {
    fn width(&self, id: &str) -> f32 {
        self.sizes.get(id).map(|size| size.width).unwrap_or(0.0)
    }

    fn place(&mut self, id: &str) {
        let forest = self.forest;
        let children = forest.children_of(id);
        for child in children {
            self.place(child);
        }

        let level = forest.level(id);
        let half = self.width(id) / 2.0;
        let leftmost = self.next_free[level] + half;
        let center = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                let desired = (self.center_x[first] + self.center_x[last]) / 2.0;
                if desired < leftmost {
                    for child in children {
                        self.shift(child, leftmost - desired);
                    }
                    leftmost
                } else {
                    desired
                }
            }
            _ => leftmost,
        };
        self.center_x.insert(id.to_string(), center);
        self.next_free[level] = center + half + self.spacing;
    }

    // The subtree was the last thing placed on each of its ranks, so moving
    // it right only ever advances those ranks' free cursors.
    fn shift(&mut self, id: &str, delta: f32) {
        let center = match self.center_x.get_mut(id) {
            Some(center) => {
                *center += delta;
                *center
            }
            None => return,
        };
        let right = center + self.width(id) / 2.0 + self.spacing;
        let forest = self.forest;
        let level = forest.level(id);
        self.next_free[level] = self.next_free[level].max(right);
        for child in forest.children_of(id) {
            self.shift(child, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, Node};

    fn node(id: &str, parent: Option<&str>, kind: NodeKind) -> Node {
        Node {
            id: id.to_string(),
            record_id: 0,
            label: id.to_string(),
            kind,
            parent_id: parent.map(str::to_string),
            measured_size: None,
            members: Vec::new(),
        }
    }

    fn abcd() -> GraphModel {
        GraphModel::new(
            vec![
                node("A", None, NodeKind::Team),
                node("B", Some("A"), NodeKind::Team),
                node("C", Some("A"), NodeKind::Team),
                node("D", Some("B"), NodeKind::Team),
            ],
            vec![Edge::new("A", "B"), Edge::new("A", "C"), Edge::new("B", "D")],
        )
    }

    fn overlaps(a: Point, a_size: Size, b: Point, b_size: Size) -> bool {
        a.x < b.x + b_size.width && b.x < a.x + a_size.width
    }

    #[test]
    fn empty_graph_yields_empty_layout() {
        let result = layout_initial(
            &GraphModel::empty(),
            |_| panic!("size function must not run"),
            &LayoutConfig::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn ranks_are_stacked_top_to_bottom() {
        let config = LayoutConfig::default();
        let result = layout_initial_with_config(&abcd(), &config);
        let a = result.get("A").unwrap();
        let b = result.get("B").unwrap();
        let c = result.get("C").unwrap();
        let d = result.get("D").unwrap();
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 180.0);
        assert_eq!(c.y, 180.0);
        assert_eq!(d.y, 360.0);
        let size = config.default_size(NodeKind::Team);
        assert!(!overlaps(b, size, c, size));
        assert!(b.x < c.x);
    }

    #[test]
    fn parents_are_centred_over_children() {
        let result = layout_initial_with_config(&abcd(), &LayoutConfig::default());
        let a = result.get("A").unwrap();
        let b = result.get("B").unwrap();
        let c = result.get("C").unwrap();
        let d = result.get("D").unwrap();
        assert_eq!(b.x, d.x);
        assert_eq!(a.x, (b.x + c.x) / 2.0);
        assert_eq!(b.x, 0.0);
        assert_eq!(c.x, 205.0);
    }

    #[test]
    fn wide_parent_pushes_children_right() {
        let graph = GraphModel::new(
            vec![
                node("L1", None, NodeKind::Locale),
                node("L2", None, NodeKind::Locale),
                node("t", Some("L2"), NodeKind::Team),
            ],
            vec![Edge::new("L2", "t")],
        );
        let config = LayoutConfig::default();
        let result = layout_initial_with_config(&graph, &config);
        let l1 = result.get("L1").unwrap();
        let l2 = result.get("L2").unwrap();
        let t = result.get("t").unwrap();
        let locale = config.default_size(NodeKind::Locale);
        assert!(!overlaps(l1, locale, l2, locale));
        assert_eq!(l2.x, 550.0 + 25.0);
        let team = config.default_size(NodeKind::Team);
        assert_eq!(t.x + team.width / 2.0, l2.x + locale.width / 2.0);
        assert_eq!(t.y, 230.0);
    }

    #[test]
    fn siblings_never_overlap_on_a_rank() {
        let mut nodes = vec![node("root", None, NodeKind::Locale)];
        let mut edges = Vec::new();
        for i in 0..4 {
            let area = format!("area{i}");
            nodes.push(node(&area, Some("root"), NodeKind::Area));
            edges.push(Edge::new("root", area.as_str()));
            for j in 0..i {
                let team = format!("team{i}{j}");
                nodes.push(node(&team, Some(area.as_str()), NodeKind::Team));
                edges.push(Edge::new(area.as_str(), team.as_str()));
            }
        }
        let graph = GraphModel::new(nodes, edges);
        let config = LayoutConfig::default();
        let result = layout_initial_with_config(&graph, &config);
        let levels = graph.levels();
        for a in graph.nodes() {
            for b in graph.nodes() {
                if a.id >= b.id || levels[&a.id] != levels[&b.id] {
                    continue;
                }
                let (pa, pb) = (result.get(&a.id).unwrap(), result.get(&b.id).unwrap());
                assert!(
                    !overlaps(pa, config.default_size(a.kind), pb, config.default_size(b.kind)),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn measured_sizes_override_defaults() {
        let mut tracker = DimensionTracker::create();
        tracker.update("A", 400.0, 60.0);
        let graph = abcd().with_measurements(&tracker);
        let result = layout_initial_with_config(&graph, &LayoutConfig::default());
        // Rank 0 is only as tall as the measured root.
        assert_eq!(result.get("B").unwrap().y, 90.0);
        assert_eq!(
            node_size(graph.node("A").unwrap(), None, &LayoutConfig::default()),
            Size::new(400.0, 60.0)
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let config = LayoutConfig::default();
        let first = layout_initial_with_config(&abcd(), &config);
        let second = layout_initial_with_config(&abcd(), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn cyclic_graph_still_lays_out_every_node() {
        let graph = GraphModel::new(
            vec![node("P", Some("Q"), NodeKind::Team), node("Q", Some("P"), NodeKind::Team)],
            vec![Edge::new("Q", "P"), Edge::new("P", "Q")],
        );
        let result = layout_initial_with_config(&graph, &LayoutConfig::default());
        assert_eq!(result.len(), 2);
    }
}
