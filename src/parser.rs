use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ir::{Label, LabelId, TimeAnchor};
use crate::layout::TickLevel;
use crate::scale::LinearTimeScale;

static INSTANT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*$").unwrap());
static SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*(?:\.\.|to|–)\s*(-?\d+(?:\.\d+)?)\s*$").unwrap()
});
static TICK_LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(?:y|yr|years?)\s*$").unwrap());

const DEFAULT_RANGE: (f64, f64) = (0.0, 1200.0);

/// A timeline document: labels, the reference mapping and axis tick levels.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub labels: Vec<Label>,
    pub scale: LinearTimeScale,
    pub tick_levels: Vec<TickLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineDocument {
    domain: Option<(f64, f64)>,
    range: Option<(f64, f64)>,
    #[serde(default)]
    labels: Vec<LabelRecord>,
    #[serde(default)]
    ticks: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelRecord {
    id: String,
    time: TimeValue,
    text: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    weight: Option<f64>,
    min_k: Option<f64>,
    max_k: Option<f64>,
    row: Option<usize>,
    #[serde(default)]
    border: bool,
    #[serde(default)]
    children: Vec<LabelRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Number(f64),
    Pair([f64; 2]),
    Text(String),
}

pub fn parse_timeline(input: &str) -> Result<ParseOutput> {
    let doc: TimelineDocument =
        serde_json::from_str(input).context("timeline document is not valid JSON")?;

    let labels = doc
        .labels
        .into_iter()
        .map(label_from_record)
        .collect::<Result<Vec<_>>>()?;

    let domain = match doc.domain {
        Some(domain) => domain,
        None => infer_domain(&labels)?,
    };
    let scale = LinearTimeScale::new(domain, doc.range.unwrap_or(DEFAULT_RANGE))?;

    let tick_levels = doc
        .ticks
        .iter()
        .map(|name| {
            let step = parse_tick_step(name)?;
            Ok(TickLevel::regular(name.trim(), step, domain))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParseOutput {
        labels,
        scale,
        tick_levels,
    })
}

fn label_from_record(record: LabelRecord) -> Result<Label> {
    let anchor = match record.time {
        TimeValue::Number(t) => TimeAnchor::Instant(t),
        TimeValue::Pair([start, end]) => TimeAnchor::span(start, end),
        TimeValue::Text(text) => parse_time_anchor(&text)
            .with_context(|| format!("label `{}` has an unreadable time", record.id))?,
    };
    let children = record
        .children
        .into_iter()
        .map(label_from_record)
        .collect::<Result<Vec<_>>>()?;
    let mut label = Label::new(LabelId(record.id), anchor);
    label.text = record.text;
    label.width = record.width;
    label.height = record.height;
    label.weight = record.weight.unwrap_or(label.weight);
    label.min_k = record.min_k.unwrap_or(label.min_k);
    label.max_k = record.max_k.unwrap_or(label.max_k);
    label.row = record.row;
    label.border = record.border;
    label.children = children;
    Ok(label)
}

/// Parse `"1969"`, `"-44"`, `"1914..1918"` or `"1914 to 1918"`.
pub fn parse_time_anchor(text: &str) -> Result<TimeAnchor> {
    if let Some(caps) = INSTANT_RE.captures(text) {
        return Ok(TimeAnchor::Instant(caps[1].parse()?));
    }
    if let Some(caps) = SPAN_RE.captures(text) {
        let start: f64 = caps[1].parse()?;
        let end: f64 = caps[2].parse()?;
        return Ok(TimeAnchor::span(start, end));
    }
    Err(anyhow!("unrecognized time `{}`", text))
}

/// Step in years of a tick level name such as `"100y"`.
pub fn parse_tick_step(name: &str) -> Result<f64> {
    let caps = TICK_LEVEL_RE
        .captures(name)
        .ok_or_else(|| anyhow!("unrecognized tick level `{}`", name))?;
    let step: f64 = caps[1].parse()?;
    if step <= 0.0 {
        bail!("tick level `{}` must have a positive step", name);
    }
    Ok(step)
}

fn infer_domain(labels: &[Label]) -> Result<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for label in labels {
        let (start, end) = match label.anchor {
            TimeAnchor::Instant(t) => (t, t),
            TimeAnchor::Span { start, end } => (start, end),
        };
        lo = lo.min(start);
        hi = hi.max(end);
    }
    if lo >= hi {
        bail!("document has no domain and its labels do not span a time range");
    }
    let margin = (hi - lo) * 0.05;
    Ok((lo - margin, hi + margin))
}
