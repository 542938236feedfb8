use crate::ir::Size;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub type DimensionCallback = Box<dyn FnMut(&str)>;

/// Last observed rendered size of every mounted node.
///
/// Owned by whoever drives the layout (see [`crate::engine::LayoutEngine`]);
/// writes go through [`DimensionTracker::update`] only. Updates arrive from
/// the host's event loop one at a time, so no locking is involved.
#[derive(Default)]
pub struct DimensionTracker {
    sizes: HashMap<String, Size>,
    on_change: Option<DimensionCallback>,
}

impl fmt::Debug for DimensionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionTracker")
            .field("sizes", &self.sizes)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl DimensionTracker {
    pub fn create() -> Self {
        Self::default()
    }

    /// Drops every recorded size. The subscriber stays registered.
    pub fn reset(&mut self) {
        self.sizes.clear();
    }

    pub fn set_on_change(&mut self, callback: Option<DimensionCallback>) {
        self.on_change = callback;
    }

    /// Records a measured size. Returns `false` (and skips the subscriber)
    /// when the size is unchanged or not finite.
    pub fn update(&mut self, node_id: &str, width: f32, height: f32) -> bool {
        if !width.is_finite() || !height.is_finite() {
            tracing::warn!(node = node_id, width, height, "ignoring non-finite node size");
            return false;
        }
        let size = Size::new(width, height);
        if self.sizes.get(node_id) == Some(&size) {
            return false;
        }
        self.sizes.insert(node_id.to_string(), size);
        if let Some(callback) = self.on_change.as_mut() {
            callback(node_id);
        }
        true
    }

    pub fn get(&self, node_id: &str) -> Option<Size> {
        self.sizes.get(node_id).copied()
    }

    /// Forgets every node that is no longer mounted.
    pub fn prune<'a, I>(&mut self, active_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let active: HashSet<&str> = active_ids.into_iter().collect();
        let before = self.sizes.len();
        self.sizes.retain(|id, _| active.contains(id.as_str()));
        let removed = before - self.sizes.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned stale node dimensions");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
