use crate::analytics::{ServingSummary, summarize};
use crate::builder::build;
use crate::config::LayoutConfig;
use crate::dimensions::DimensionTracker;
use crate::filter::FilterSet;
use crate::ir::{GraphModel, GroupRecord, Size};
use crate::layout::{LayoutResult, layout_initial, reflow_all};
use crate::scheduler::{ReflowAction, ReflowEvent, ReflowScheduler};
use std::time::Duration;

/// Stateful driver for an org chart view.
///
/// The host pushes data, filter changes and measured node sizes in, calls
/// [`LayoutEngine::tick`] from its frame or timer loop, and reads
/// [`LayoutEngine::positions`] back out. All timestamps are monotonic offsets
/// chosen by the host.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    tracker: DimensionTracker,
    scheduler: ReflowScheduler,
    records: Vec<GroupRecord>,
    filters: FilterSet,
    graph: GraphModel,
    positions: LayoutResult,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let scheduler = ReflowScheduler::new(config.reflow_debounce());
        Self {
            config,
            tracker: DimensionTracker::create(),
            scheduler,
            records: Vec::new(),
            filters: FilterSet::default(),
            graph: GraphModel::empty(),
            positions: LayoutResult::new(),
        }
    }

    /// Replaces the record set and the active filters, then rebuilds.
    pub fn set_data(&mut self, records: Vec<GroupRecord>, filters: FilterSet, now: Duration) {
        self.records = records;
        self.filters = filters;
        self.rebuild(now);
    }

    pub fn set_filters(&mut self, filters: FilterSet, now: Duration) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        self.rebuild(now);
    }

    fn rebuild(&mut self, now: Duration) {
        self.graph = build(&self.records, &self.filters);
        self.tracker
            .prune(self.graph.nodes().iter().map(|node| node.id.as_str()));
        let measured = self.graph.with_measurements(&self.tracker);
        let config = &self.config;
        self.positions = layout_initial(&measured, |kind| config.default_size(kind), config);
        tracing::debug!(
            nodes = self.graph.len(),
            filters = ?self.filters.combinations(),
            "graph rebuilt"
        );
        if self.graph.is_empty() {
            self.scheduler.cancel();
        } else {
            self.scheduler.notify_at(ReflowEvent::NodeSetChanged, now);
        }
    }

    /// Records a measured size. Returns whether a reflow was scheduled.
    pub fn update_dimensions(&mut self, node_id: &str, width: f32, height: f32, now: Duration) -> bool {
        if !self.tracker.update(node_id, width, height) {
            return false;
        }
        if !self.graph.contains(node_id) {
            tracing::debug!(node = node_id, "measurement for a node outside the graph");
            return false;
        }
        self.scheduler
            .notify_at(ReflowEvent::DimensionsChanged(node_id.to_string()), now);
        true
    }

    /// Runs the pending reflow once its quiet window has elapsed. Returns
    /// whether any position changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.scheduler.poll_at(now) {
            ReflowAction::Run { reason, coalesced } => {
                tracing::debug!(?reason, coalesced, "debounced reflow");
                self.reflow_now()
            }
            ReflowAction::Wait(_) | ReflowAction::Idle => false,
        }
    }

    /// Reflows immediately, dropping any pending scheduled run.
    pub fn reflow_now(&mut self) -> bool {
        self.scheduler.cancel();
        let next = reflow_all(&self.graph, &self.positions, &self.tracker, &self.config);
        let changed = next != self.positions;
        self.positions = next;
        changed
    }

    pub fn time_until_reflow(&self, now: Duration) -> Option<Duration> {
        self.scheduler.time_until_run(now)
    }

    pub fn positions(&self) -> &LayoutResult {
        &self.positions
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn tracker(&self) -> &DimensionTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DimensionTracker {
        &mut self.tracker
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn bounds(&self) -> Size {
        self.positions
            .bounds(&self.graph, Some(&self.tracker), &self.config)
    }

    /// Serving head counts for the selected node ids, or the whole chart.
    pub fn analytics(&self, selected: Option<&[&str]>) -> ServingSummary {
        summarize(&self.graph, selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Point;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn records() -> Vec<GroupRecord> {
        vec![
            GroupRecord::new(1, "CT MAG", None),
            GroupRecord::new(2, "Worship", Some(1)),
            GroupRecord::new(3, "Media", Some(1)),
            GroupRecord::new(4, "Lighting", Some(2)),
            GroupRecord::new(5, "NS MAG", None),
        ]
    }

    fn engine() -> LayoutEngine {
        let mut engine = LayoutEngine::default();
        engine.set_data(records(), FilterSet::new(["CT MAG"]), ms(0));
        engine
    }

    #[test]
    fn set_data_lays_out_filtered_graph() {
        let engine = engine();
        assert_eq!(engine.graph().len(), 4);
        assert_eq!(engine.positions().len(), 4);
        assert!(engine.positions().get("group-5").is_none());
        assert_eq!(engine.time_until_reflow(ms(0)), Some(ms(200)));
    }

    #[test]
    fn measurement_triggers_debounced_reflow() {
        let mut engine = engine();
        engine.tick(ms(200));
        assert!(engine.update_dimensions("group-1", 200.0, 80.0, ms(300)));
        assert!(!engine.tick(ms(400)));
        assert!(engine.tick(ms(500)));
        let root = engine.positions().get("group-1").unwrap();
        assert_eq!(engine.positions().get("group-2").unwrap().y, root.y + 80.0 + 100.0);
        // Worship has no measurement yet, so its own subtree hangs below the
        // default height.
        let worship = engine.positions().get("group-2").unwrap();
        assert_eq!(engine.positions().get("group-4").unwrap().y, worship.y + 150.0 + 100.0);
    }

    #[test]
    fn identical_measurement_is_suppressed() {
        let mut engine = engine();
        engine.tick(ms(200));
        assert!(engine.update_dimensions("group-2", 180.0, 90.0, ms(300)));
        assert!(engine.tick(ms(500)));
        assert!(!engine.update_dimensions("group-2", 180.0, 90.0, ms(600)));
        assert_eq!(engine.time_until_reflow(ms(600)), None);
    }

    #[test]
    fn nan_measurement_schedules_nothing() {
        let mut engine = engine();
        engine.tick(ms(200));
        assert!(!engine.update_dimensions("group-2", f32::NAN, 90.0, ms(300)));
        assert!(!engine.update_dimensions("group-2", f32::NAN, 90.0, ms(400)));
        assert_eq!(engine.time_until_reflow(ms(400)), None);
        assert!(engine.tracker().get("group-2").is_none());
    }

    #[test]
    fn measurement_outside_graph_is_ignored() {
        let mut engine = engine();
        engine.tick(ms(200));
        assert!(!engine.update_dimensions("group-5", 180.0, 90.0, ms(300)));
        assert!(!engine.tick(ms(1_000)));
    }

    #[test]
    fn filter_change_prunes_stale_dimensions() {
        let mut engine = engine();
        engine.update_dimensions("group-2", 180.0, 90.0, ms(10));
        assert_eq!(engine.tracker().len(), 1);
        engine.set_filters(FilterSet::new(["NS MAG"]), ms(20));
        assert_eq!(engine.graph().len(), 1);
        assert!(engine.tracker().is_empty());
        assert_eq!(engine.positions().get("group-5"), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn clearing_filters_empties_the_chart() {
        let mut engine = engine();
        engine.set_filters(FilterSet::default(), ms(50));
        assert!(engine.graph().is_empty());
        assert!(engine.positions().is_empty());
        assert_eq!(engine.time_until_reflow(ms(50)), None);
    }

    #[test]
    fn reflow_now_is_stable() {
        let mut engine = engine();
        engine.update_dimensions("group-1", 200.0, 80.0, ms(10));
        engine.reflow_now();
        let settled = engine.positions().clone();
        assert!(!engine.reflow_now());
        assert_eq!(engine.positions(), &settled);
        assert!(engine.bounds().width > 0.0);
    }

    #[test]
    fn analytics_follow_the_displayed_graph() {
        let mut records = records();
        records[1].members = vec![crate::ir::Member {
            id: 9,
            role: Some("Member".to_string()),
            full_name: Some("Ada Lovelace".to_string()),
        }];
        records[4].members = records[1].members.clone();
        let mut engine = LayoutEngine::default();
        engine.set_data(records, FilterSet::new(["CT MAG"]), ms(0));
        assert_eq!(engine.analytics(None).total_serving, 1);
        assert_eq!(engine.analytics(None).members, 1);
        assert_eq!(engine.analytics(Some(&["group-3"][..])).total_serving, 0);
        engine.set_filters(FilterSet::default(), ms(10));
        assert_eq!(engine.analytics(None), ServingSummary::default());
    }
}
