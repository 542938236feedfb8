use orgchart_layout::config::{Config, parse_config};
use orgchart_layout::filter::{FilterSet, available_combinations};
use orgchart_layout::layout::{layout_initial_with_config, reflow_all};
use orgchart_layout::layout_dump::LayoutDump;
use orgchart_layout::records::prepare_groups;
use orgchart_layout::{DimensionTracker, LayoutEngine, build};
use serde::Deserialize;
use std::time::Duration;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOptions {
    filters: Vec<String>,
    config: Option<serde_json::Value>,
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_options(options_json: Option<String>) -> Result<(FilterSet, Config), JsValue> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<LayoutOptions>(&raw).map_err(js_error)?,
        None => LayoutOptions::default(),
    };
    let config = match options.config {
        Some(value) => parse_config(&value.to_string()).map_err(js_error)?,
        None => Config::default(),
    };
    Ok((FilterSet::new(&options.filters), config))
}

fn millis(now_ms: f64) -> Duration {
    Duration::from_secs_f64(now_ms.max(0.0) / 1000.0)
}

/// One-shot layout: group records in, layout dump JSON out.
#[wasm_bindgen]
pub fn layout_groups(groups_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let (filters, config) = parse_options(options_json)?;
    let records = prepare_groups(groups_json).map_err(js_error)?;
    let graph = build(&records, &filters);
    let tracker = DimensionTracker::create();
    let layout = layout_initial_with_config(&graph, &config.layout);
    let layout = reflow_all(&graph, &layout, &tracker, &config.layout);
    let dump = LayoutDump::from_layout(&layout, &graph, Some(&tracker), &config.layout);
    serde_json::to_string(&dump).map_err(js_error)
}

/// Filter combinations offered by a group payload, as a JSON array.
#[wasm_bindgen]
pub fn filter_combinations(groups_json: &str) -> Result<String, JsValue> {
    let records = prepare_groups(groups_json).map_err(js_error)?;
    let combinations: Vec<String> = available_combinations(&records).into_iter().collect();
    serde_json::to_string(&combinations).map_err(js_error)
}

/// Long-lived engine for an interactive chart. Timestamps are
/// `performance.now()` milliseconds.
#[wasm_bindgen]
pub struct OrgChartEngine {
    engine: LayoutEngine,
}

#[wasm_bindgen]
impl OrgChartEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<OrgChartEngine, JsValue> {
        let config = match config_json {
            Some(raw) => parse_config(&raw).map_err(js_error)?,
            None => Config::default(),
        };
        Ok(OrgChartEngine {
            engine: LayoutEngine::new(config.layout),
        })
    }

    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, groups_json: &str, filters_json: &str, now_ms: f64) -> Result<(), JsValue> {
        let records = prepare_groups(groups_json).map_err(js_error)?;
        let filters: Vec<String> = serde_json::from_str(filters_json).map_err(js_error)?;
        self.engine
            .set_data(records, FilterSet::new(&filters), millis(now_ms));
        Ok(())
    }

    #[wasm_bindgen(js_name = setFilters)]
    pub fn set_filters(&mut self, filters_json: &str, now_ms: f64) -> Result<(), JsValue> {
        let filters: Vec<String> = serde_json::from_str(filters_json).map_err(js_error)?;
        self.engine.set_filters(FilterSet::new(&filters), millis(now_ms));
        Ok(())
    }

    #[wasm_bindgen(js_name = updateDimensions)]
    pub fn update_dimensions(&mut self, node_id: &str, width: f32, height: f32, now_ms: f64) -> bool {
        self.engine
            .update_dimensions(node_id, width, height, millis(now_ms))
    }

    /// Returns true when positions changed and the view should re-read them.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.engine.tick(millis(now_ms))
    }

    #[wasm_bindgen(js_name = reflowNow)]
    pub fn reflow_now(&mut self) -> bool {
        self.engine.reflow_now()
    }

    /// Milliseconds until the pending reflow fires, or -1 when idle.
    #[wasm_bindgen(js_name = msUntilReflow)]
    pub fn ms_until_reflow(&self, now_ms: f64) -> f64 {
        self.engine
            .time_until_reflow(millis(now_ms))
            .map(|remaining| remaining.as_secs_f64() * 1000.0)
            .unwrap_or(-1.0)
    }

    pub fn layout(&self) -> Result<String, JsValue> {
        let dump = LayoutDump::from_layout(
            self.engine.positions(),
            self.engine.graph(),
            Some(self.engine.tracker()),
            self.engine.config(),
        );
        serde_json::to_string(&dump).map_err(js_error)
    }

    /// Serving head counts as JSON. `selected_json` is an optional array of
    /// node ids; when missing or empty the whole chart is counted.
    pub fn analytics(&self, selected_json: Option<String>) -> Result<String, JsValue> {
        let selected: Vec<String> = match selected_json {
            Some(raw) => serde_json::from_str(&raw).map_err(js_error)?,
            None => Vec::new(),
        };
        let ids: Vec<&str> = selected.iter().map(String::as_str).collect();
        serde_json::to_string(&self.engine.analytics(Some(&ids))).map_err(js_error)
    }
}
