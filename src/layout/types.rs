use crate::config::LayoutConfig;
use crate::dimensions::DimensionTracker;
use crate::ir::{GraphModel, Point, Size};
use serde::Serialize;
use std::collections::BTreeMap;

/// Top-left position of every laid out node.
///
/// Produced by [`super::layout_initial`] and [`super::reflow`]; both return a
/// fresh value and never touch the graph they were given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub positions: BTreeMap<String, Point>,
}

impl LayoutResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<Point> {
        self.positions.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(id, point)| (id.as_str(), *point))
    }

    /// Extent of the laid out chart measured from the origin, for fitting
    /// the view.
    pub fn bounds(
        &self,
        graph: &GraphModel,
        tracker: Option<&DimensionTracker>,
        config: &LayoutConfig,
    ) -> Size {
        let mut bounds = Size::new(0.0, 0.0);
        for node in graph.nodes() {
            let Some(point) = self.get(&node.id) else {
                continue;
            };
            let size = super::node_size(node, tracker, config);
            bounds.width = bounds.width.max(point.x + size.width);
            bounds.height = bounds.height.max(point.y + size.height);
        }
        bounds
    }
}

impl FromIterator<(String, Point)> for LayoutResult {
    fn from_iter<T: IntoIterator<Item = (String, Point)>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}
