use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::GraphModel;

/// Spanning forest of a graph model, with each node's rank and the
/// left-to-right order inside every rank.
#[derive(Debug, Clone, Default)]
pub(super) struct RankedForest {
    pub roots: Vec<String>,
    pub children: HashMap<String, Vec<String>>,
    pub levels: HashMap<String, usize>,
    pub ranks: Vec<Vec<String>>,
}

impl RankedForest {
    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn level(&self, id: &str) -> usize {
        self.levels.get(id).copied().unwrap_or(0)
    }
}

pub(super) fn rank_forest(graph: &GraphModel) -> RankedForest {
    let mut forest = RankedForest::default();
    let mut visited: HashSet<String> = HashSet::with_capacity(graph.len());

    let roots: Vec<String> = graph.roots().iter().map(|node| node.id.clone()).collect();
    for root in &roots {
        visited.insert(root.clone());
    }
    grow(graph, &roots, &mut visited, &mut forest);
    forest.roots.extend(roots);

    // Cycle detected: nodes only reachable through a cycle have no root.
    // Pick the earliest such node in declaration order and hang the rest of
    // the cycle from it.
    loop {
        let Some(node) = graph.nodes().iter().find(|node| !visited.contains(&node.id)) else {
            break;
        };
        let start = vec![node.id.clone()];
        visited.insert(node.id.clone());
        grow(graph, &start, &mut visited, &mut forest);
        forest.roots.extend(start);
    }

    forest.ranks = rank_buckets(&forest);
    forest
}

fn grow(
    graph: &GraphModel,
    starts: &[String],
    visited: &mut HashSet<String>,
    forest: &mut RankedForest,
) {
    let mut queue: VecDeque<(String, usize)> = starts
        .iter()
        .map(|id| (id.clone(), 0))
        .collect();
    while let Some((current, level)) = queue.pop_front() {
        forest.levels.insert(current.clone(), level);
        for child in graph.children_of(&current) {
            if !visited.insert(child.clone()) {
                continue;
            }
            forest
                .children
                .entry(current.clone())
                .or_default()
                .push(child.clone());
            queue.push_back((child.clone(), level + 1));
        }
    }
}

/// Orders each rank by a pre-order walk of the forest. Siblings stay
/// contiguous and keep declaration order, so tree edges never cross.
fn rank_buckets(forest: &RankedForest) -> Vec<Vec<String>> {
    let mut ranks: Vec<Vec<String>> = Vec::new();
    let mut stack: Vec<&str> = forest.roots.iter().rev().map(String::as_str).collect();
    while let Some(current) = stack.pop() {
        let level = forest.level(current);
        if ranks.len() <= level {
            ranks.resize_with(level + 1, Vec::new);
        }
        ranks[level].push(current.to_string());
        for child in forest.children_of(current).iter().rev() {
            stack.push(child.as_str());
        }
    }
    ranks
}

/// Number of crossing tree edges between consecutive ranks.
pub(super) fn count_crossings(forest: &RankedForest) -> usize {
    let mut position: HashMap<&str, usize> = HashMap::new();
    for bucket in &forest.ranks {
        for (idx, id) in bucket.iter().enumerate() {
            position.insert(id.as_str(), idx);
        }
    }
    let mut crossings = 0;
    for bucket in &forest.ranks {
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for parent in bucket {
            let from = position[parent.as_str()];
            for child in forest.children_of(parent) {
                segments.push((from, position[child.as_str()]));
            }
        }
        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}
