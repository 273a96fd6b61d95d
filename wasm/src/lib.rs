use serde::Deserialize;
use timeline_declutter::config::{Config, LayoutMode};
use timeline_declutter::dump::VisibilityDump;
use timeline_declutter::parser::parse_timeline;
use timeline_declutter::{compute_tick_visibility, compute_visibility};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeclutterOptions {
    k_min: Option<f64>,
    k_max: Option<f64>,
    label_padding: Option<f64>,
    font_family: Option<String>,
    font_size: Option<f64>,
    modes: Option<Vec<ModeOptions>>,
    at: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeOptions {
    name: String,
    rows_above: usize,
    rows_below: usize,
}

fn build_config(options: &DeclutterOptions) -> Config {
    let mut config = Config::default();
    let declutter = &mut config.declutter;
    // Browsers have no system font database to measure with.
    declutter.fast_text = true;
    config.ticks.fast_text = true;

    if let Some(k_min) = options.k_min {
        declutter.k_min = k_min;
    }
    if let Some(k_max) = options.k_max {
        declutter.k_max = k_max;
    }
    if let Some(padding) = options.label_padding {
        declutter.label_padding = padding;
    }
    if let Some(font_family) = &options.font_family {
        declutter.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        declutter.font_size = font_size;
    }
    if let Some(modes) = &options.modes
        && !modes.is_empty()
    {
        declutter.modes = modes
            .iter()
            .map(|mode| LayoutMode::new(mode.name.clone(), mode.rows_above, mode.rows_below))
            .collect();
    }
    config
}

fn compute_dump(doc: &str, options: &DeclutterOptions) -> Result<String, String> {
    let config = build_config(options);
    let parsed = parse_timeline(doc).map_err(|error| format!("{error:#}"))?;
    let table = compute_visibility(&parsed.labels, &parsed.scale, &config.declutter)
        .map_err(|error| error.to_string())?;
    let ticks = compute_tick_visibility(
        &parsed.tick_levels,
        &parsed.scale,
        &config.ticks,
        config.declutter.k_min,
    );
    let dump = VisibilityDump::from_table(&table, &ticks, options.at);
    serde_json::to_string(&dump).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn compute_visibility_json(doc: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DeclutterOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DeclutterOptions::default()
    };

    compute_dump(doc, &options).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::{DeclutterOptions, compute_dump};

    #[test]
    fn computes_intervals_for_a_small_document() {
        let doc = r#"{
            "domain": [1900, 2000],
            "range": [0, 1000],
            "labels": [
                { "id": "ww1", "time": "1914..1918", "text": "First World War" },
                { "id": "moon", "time": 1969, "text": "Moon landing", "weight": 3 },
                { "id": "woodstock", "time": 1969.6, "text": "Woodstock" }
            ],
            "ticks": ["10y"]
        }"#;
        let options: DeclutterOptions =
            serde_json::from_str(r#"{ "kMin": 1, "kMax": 16, "at": 1 }"#).unwrap();

        let json = compute_dump(doc, &options).expect("document should compute");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kMax"], 16.0);
        assert_eq!(value["modes"].as_array().unwrap().len(), 2);
        let visible = value["modes"][0]["visible"].as_array().unwrap();
        let ids: Vec<&str> = visible.iter().filter_map(|v| v["id"].as_str()).collect();
        assert!(ids.contains(&"moon"));
        assert!(!ids.contains(&"woodstock"));
        assert_eq!(value["ticks"][0]["name"], "10y");
    }

    #[test]
    fn nested_labels_surface_as_errors() {
        let doc = r#"{
            "domain": [0, 20],
            "labels": [
                { "id": "outer", "time": 10, "children": [{ "id": "inner", "time": 11 }] }
            ]
        }"#;
        let err = compute_dump(doc, &DeclutterOptions::default()).unwrap_err();
        assert!(err.contains("outer"));
    }
}
