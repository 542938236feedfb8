use crate::ir::{NodeKind, Size};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeSizeConfig {
    pub team: Size,
    pub area: Size,
    /// Locale boxes are wide: they carry a whole region's leadership.
    pub locale: Size,
    #[serde(rename = "static")]
    pub static_node: Size,
}

impl Default for NodeSizeConfig {
    fn default() -> Self {
        Self {
            team: Size::new(180.0, 150.0),
            area: Size::new(180.0, 150.0),
            locale: Size::new(550.0, 200.0),
            static_node: Size::new(180.0, 150.0),
        }
    }
}

impl NodeSizeConfig {
    pub fn for_kind(&self, kind: NodeKind) -> Size {
        match kind {
            NodeKind::Team => self.team,
            NodeKind::Area => self.area,
            NodeKind::Locale => self.locale,
            NodeKind::Static => self.static_node,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub reflow_spacing: f32,
    pub reflow_default_height: f32,
    pub reflow_debounce_ms: u64,
    pub reflow_kinds: Vec<NodeKind>,
    pub sizes: NodeSizeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 25.0,
            rank_spacing: 30.0,
            reflow_spacing: 50.0,
            reflow_default_height: 150.0,
            reflow_debounce_ms: 200,
            reflow_kinds: vec![NodeKind::Team, NodeKind::Area],
            sizes: NodeSizeConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn default_size(&self, kind: NodeKind) -> Size {
        self.sizes.for_kind(kind)
    }

    pub fn reflow_debounce(&self) -> Duration {
        Duration::from_millis(self.reflow_debounce_ms)
    }

    pub fn reflows_kind(&self, kind: NodeKind) -> bool {
        self.reflow_kinds.contains(&kind)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    match serde_json::from_str::<Config>(contents) {
        Ok(config) => Ok(config),
        // Hand-edited config files often carry comments or trailing commas.
        Err(json_err) => json5::from_str::<Config>(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err} (json5: {json5_err})")
        }),
    }
}
