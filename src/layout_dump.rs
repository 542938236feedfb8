use crate::analytics::{ServingSummary, summarize};
use crate::config::LayoutConfig;
use crate::dimensions::DimensionTracker;
use crate::ir::{GraphModel, NodeKind};
use crate::layout::{LayoutResult, node_size};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub analytics: ServingSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub record_id: i64,
    pub kind: NodeKind,
    pub label: String,
    pub level: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub member_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl LayoutDump {
    pub fn from_layout(
        layout: &LayoutResult,
        graph: &GraphModel,
        tracker: Option<&DimensionTracker>,
        config: &LayoutConfig,
    ) -> Self {
        let levels = graph.levels();
        let nodes = graph
            .nodes()
            .iter()
            .filter_map(|node| {
                let point = layout.get(&node.id)?;
                let size = node_size(node, tracker, config);
                Some(NodeDump {
                    id: node.id.clone(),
                    record_id: node.record_id,
                    kind: node.kind,
                    label: node.label.clone(),
                    level: levels.get(&node.id).copied().unwrap_or(0),
                    x: point.x,
                    y: point.y,
                    width: size.width,
                    height: size.height,
                    member_count: node.members.len(),
                })
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();

        let bounds = layout.bounds(graph, tracker, config);
        LayoutDump {
            width: bounds.width,
            height: bounds.height,
            nodes,
            edges,
            analytics: summarize(graph, None),
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
