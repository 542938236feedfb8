use crate::dimensions::DimensionTracker;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

pub const LOCALE_GROUP_TYPE: i64 = 39;
pub const AREA_GROUP_TYPE: i64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Team,
    Area,
    Locale,
    Static,
}

impl NodeKind {
    pub fn from_group_type(group_type_id: i64) -> Self {
        match group_type_id {
            LOCALE_GROUP_TYPE => Self::Locale,
            AREA_GROUP_TYPE => Self::Area,
            _ => Self::Team,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "team" => Some(Self::Team),
            "area" => Some(Self::Area),
            "locale" => Some(Self::Locale),
            "static" => Some(Self::Static),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Area => "area",
            Self::Locale => "locale",
            Self::Static => "static",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub role: Option<String>,
    pub full_name: Option<String>,
}

/// A validated group record, as delivered by the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub group_type_id: Option<i64>,
    /// Explicit kind; takes precedence over `group_type_id`.
    pub kind: Option<NodeKind>,
    pub members: Vec<Member>,
}

impl GroupRecord {
    pub fn new(id: i64, name: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id,
            group_type_id: None,
            kind: Some(NodeKind::Team),
            members: Vec::new(),
        }
    }

    pub fn with_group_type(mut self, group_type_id: i64) -> Self {
        self.group_type_id = Some(group_type_id);
        self.kind = None;
        self
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn node_kind(&self) -> NodeKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        self.group_type_id
            .map(NodeKind::from_group_type)
            .unwrap_or(NodeKind::Team)
    }
}

pub fn node_id_for(record_id: i64) -> String {
    format!("group-{record_id}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub record_id: i64,
    pub label: String,
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub measured_size: Option<Size>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    /// Edge ids are `edge-<source node id>-<target node id>`.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge-{source}-{target}"),
            source,
            target,
        }
    }
}

/// Immutable node/edge graph for one data refresh.
///
/// Children are derived from the edge list once at construction; a node whose
/// `parent_id` is not part of the model is treated as a root.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    children: BTreeMap<String, Vec<String>>,
    index: HashMap<String, usize>,
}

impl GraphModel {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(idx);
        }
        let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for edge in &edges {
            if !index.contains_key(&edge.source) || !index.contains_key(&edge.target) {
                continue;
            }
            children
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
        }
        Self {
            nodes,
            edges,
            children,
            index,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.nodes[*idx])
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, id: &str) -> bool {
        !self.children_of(id).is_empty()
    }

    /// Nodes with no parent, or whose parent is not in this model.
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| {
                node.parent_id
                    .as_deref()
                    .map(|parent| !self.contains(parent))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Depth of every node below its root (roots are level 0).
    pub fn levels(&self) -> HashMap<String, usize> {
        let mut levels: HashMap<String, usize> = HashMap::with_capacity(self.nodes.len());
        let mut queue: VecDeque<&str> = VecDeque::new();
        for root in self.roots() {
            levels.insert(root.id.clone(), 0);
            queue.push_back(root.id.as_str());
        }
        while let Some(current) = queue.pop_front() {
            let level = levels[current];
            for child in self.children_of(current) {
                if levels.contains_key(child) {
                    continue;
                }
                levels.insert(child.clone(), level + 1);
                queue.push_back(child.as_str());
            }
        }
        // Nodes only reachable through a cycle have no root to hang from.
        for node in &self.nodes {
            levels.entry(node.id.clone()).or_insert(0);
        }
        levels
    }

    /// Returns a copy of this model with every node's measured size taken
    /// from `tracker`.
    pub fn with_measurements(&self, tracker: &DimensionTracker) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|node| Node {
                measured_size: tracker.get(&node.id).or(node.measured_size),
                ..node.clone()
            })
            .collect();
        Self {
            nodes,
            edges: self.edges.clone(),
            children: self.children.clone(),
            index: self.index.clone(),
        }
    }
}
