use crate::filter::FilterSet;
use crate::ir::{Edge, GraphModel, GroupRecord, Node, node_id_for};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Builds the graph for the records selected by `filters`.
///
/// Every record whose name matches a filter is included together with its
/// whole subtree. An empty filter set, or one that matches nothing, yields an
/// empty graph.
pub fn build(records: &[GroupRecord], filters: &FilterSet) -> GraphModel {
    let records = dedup_records(records);
    if filters.is_empty() {
        return GraphModel::empty();
    }

    let children = child_map(&records);
    let mut included: HashSet<i64> = HashSet::new();
    let mut queue: VecDeque<i64> = VecDeque::new();
    for record in &records {
        if filters.matches(&record.name) && included.insert(record.id) {
            queue.push_back(record.id);
        }
    }
    if included.is_empty() {
        tracing::debug!(
            filters = ?filters.combinations(),
            "no group matched the active filters"
        );
        return GraphModel::empty();
    }
    while let Some(current) = queue.pop_front() {
        for child in children.get(&current).into_iter().flatten() {
            if included.insert(*child) {
                queue.push_back(*child);
            }
        }
    }

    emit(&records, |record| included.contains(&record.id))
}

/// Builds the graph for every record, ignoring filters.
pub fn build_all(records: &[GroupRecord]) -> GraphModel {
    let records = dedup_records(records);
    emit(&records, |_| true)
}

fn dedup_records(records: &[GroupRecord]) -> Vec<&GroupRecord> {
    let mut seen: HashSet<i64> = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.id) {
            unique.push(record);
        } else {
            tracing::warn!(id = record.id, name = %record.name, "duplicate group id, keeping the first");
        }
    }
    unique
}

fn child_map(records: &[&GroupRecord]) -> BTreeMap<i64, Vec<i64>> {
    let mut children: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for record in records {
        if let Some(parent) = record.parent_id {
            if parent != record.id {
                children.entry(parent).or_default().push(record.id);
            }
        }
    }
    children
}

fn emit(records: &[&GroupRecord], include: impl Fn(&GroupRecord) -> bool) -> GraphModel {
    let known: HashSet<i64> = records.iter().map(|r| r.id).collect();
    let selected: Vec<&GroupRecord> = records.iter().copied().filter(|r| include(r)).collect();
    let present: HashSet<i64> = selected.iter().map(|r| r.id).collect();

    let mut nodes = Vec::with_capacity(selected.len());
    let mut edges = Vec::new();
    for record in &selected {
        let parent = record
            .parent_id
            .filter(|parent| *parent != record.id && present.contains(parent));
        if let (Some(missing), None) = (record.parent_id, parent) {
            if missing != record.id && !known.contains(&missing) {
                tracing::warn!(id = record.id, parent = missing, "parent group not found, treating as root");
            }
        }
        nodes.push(Node {
            id: node_id_for(record.id),
            record_id: record.id,
            label: record.name.clone(),
            kind: record.node_kind(),
            parent_id: parent.map(node_id_for),
            measured_size: None,
            members: record.members.clone(),
        });
        if let Some(parent) = parent {
            edges.push(Edge::new(node_id_for(parent), node_id_for(record.id)));
        }
    }

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "built graph model");
    GraphModel::new(nodes, edges)
}
