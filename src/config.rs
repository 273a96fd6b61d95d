use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::layout::RowPlan;

const DEFAULT_FONT_FAMILY: &str = "\"trebuchet ms\", verdana, arial, sans-serif";

/// One row layout the engine computes intervals for. Several modes can be
/// configured at once (for example a single row for narrow screens and a
/// multi-row layout otherwise); every label takes part in each of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutMode {
    pub name: String,
    pub rows_above: usize,
    pub rows_below: usize,
}

impl LayoutMode {
    pub fn new(name: impl Into<String>, rows_above: usize, rows_below: usize) -> Self {
        Self {
            name: name.into(),
            rows_above,
            rows_below,
        }
    }

    /// One row above the baseline.
    pub fn single() -> Self {
        Self::new("single", 1, 0)
    }

    /// Two rows above and one below the baseline.
    pub fn multi() -> Self {
        Self::new("multi", 2, 1)
    }

    pub fn plan(&self) -> RowPlan {
        RowPlan {
            rows_above: self.rows_above,
            rows_below: self.rows_below,
        }
    }
}

/// Settings for the label decluttering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclutterConfig {
    /// Smallest zoom factor the timeline can be viewed at.
    pub k_min: f64,
    /// Largest zoom factor the timeline can be viewed at.
    pub k_max: f64,
    /// Horizontal space kept free on each side of a label, in pixels.
    pub label_padding: f64,
    /// Height of a label lane, used when a label has no explicit height.
    pub label_height: f64,
    pub font_family: String,
    pub font_size: f64,
    /// Estimate text widths instead of measuring installed fonts.
    pub fast_text: bool,
    /// Largest number of open labels one overlap component may hold for the
    /// exact search. Larger components are resolved heaviest first.
    pub max_component_candidates: usize,
    /// Emit per-step tracing events from the sweep and the row partitioner.
    pub debug: bool,
    pub modes: Vec<LayoutMode>,
}

impl Default for DeclutterConfig {
    fn default() -> Self {
        Self {
            k_min: 1.0,
            k_max: 64.0,
            label_padding: 4.0,
            label_height: 18.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 13.0,
            fast_text: false,
            max_component_candidates: 30,
            debug: false,
            modes: vec![LayoutMode::single(), LayoutMode::multi()],
        }
    }
}

impl DeclutterConfig {
    pub fn with_k_range(mut self, k_min: f64, k_max: f64) -> Self {
        self.k_min = k_min;
        self.k_max = k_max;
        self
    }

    pub fn with_modes(mut self, modes: Vec<LayoutMode>) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_padding(mut self, label_padding: f64) -> Self {
        self.label_padding = label_padding;
        self
    }

    pub fn with_fast_text(mut self, fast_text: bool) -> Self {
        self.fast_text = fast_text;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Geometry of axis tick marks and their text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickStyle {
    pub line_width: f64,
    /// Free space required between two tick lines.
    pub min_line_gap: f64,
    pub line_length: f64,
    /// Vertical gap between the end of a tick line and its text.
    pub text_gap: f64,
    pub text_height: f64,
    /// Horizontal space added around tick text.
    pub text_padding: f64,
    pub font_family: String,
    pub font_size: f64,
    pub fast_text: bool,
}

impl Default for TickStyle {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            min_line_gap: 3.0,
            line_length: 8.0,
            text_gap: 4.0,
            text_height: 12.0,
            text_padding: 6.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: 11.0,
            fast_text: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub declutter: DeclutterConfig,
    pub ticks: TickStyle,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    k_min: Option<f64>,
    k_max: Option<f64>,
    label_padding: Option<f64>,
    label_height: Option<f64>,
    font_family: Option<String>,
    font_size: Option<f64>,
    fast_text: Option<bool>,
    max_component_candidates: Option<usize>,
    debug: Option<bool>,
    modes: Option<Vec<LayoutMode>>,
    ticks: Option<TickStyleFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TickStyleFile {
    line_width: Option<f64>,
    min_line_gap: Option<f64>,
    line_length: Option<f64>,
    text_gap: Option<f64>,
    text_height: Option<f64>,
    text_padding: Option<f64>,
    font_family: Option<String>,
    font_size: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();
    let declutter = &mut config.declutter;

    if let Some(v) = parsed.k_min {
        declutter.k_min = v;
    }
    if let Some(v) = parsed.k_max {
        declutter.k_max = v;
    }
    if let Some(v) = parsed.label_padding {
        declutter.label_padding = v;
    }
    if let Some(v) = parsed.label_height {
        declutter.label_height = v;
    }
    if let Some(v) = parsed.font_family {
        declutter.font_family = v.clone();
        config.ticks.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        declutter.font_size = v;
    }
    if let Some(v) = parsed.fast_text {
        declutter.fast_text = v;
        config.ticks.fast_text = v;
    }
    if let Some(v) = parsed.max_component_candidates {
        declutter.max_component_candidates = v;
    }
    if let Some(v) = parsed.debug {
        declutter.debug = v;
    }
    if let Some(modes) = parsed.modes {
        if modes.is_empty() {
            anyhow::bail!("config must list at least one layout mode");
        }
        declutter.modes = modes;
    }

    if let Some(ticks) = parsed.ticks {
        let style = &mut config.ticks;
        if let Some(v) = ticks.line_width {
            style.line_width = v;
        }
        if let Some(v) = ticks.min_line_gap {
            style.min_line_gap = v;
        }
        if let Some(v) = ticks.line_length {
            style.line_length = v;
        }
        if let Some(v) = ticks.text_gap {
            style.text_gap = v;
        }
        if let Some(v) = ticks.text_height {
            style.text_height = v;
        }
        if let Some(v) = ticks.text_padding {
            style.text_padding = v;
        }
        if let Some(v) = ticks.font_family {
            style.font_family = v;
        }
        if let Some(v) = ticks.font_size {
            style.font_size = v;
        }
    }

    Ok(config)
}
