//! Reveal thresholds for nested axis tick levels.
//!
//! Levels go from coarsest to finest. Each level gets a zoom at which its tick
//! lines stop colliding with each other and one at which its text stops
//! colliding with everything already placed by coarser levels. Thresholds
//! never decrease from one level to the next, so a coarser level is always
//! shown at least as early as a finer one.
//!
//! Tick text hangs in its own band below the tick lines (`line_length +
//! text_gap`, gap clamped to be non-negative), so text can never meet a line.
//! Only text boxes are therefore carried over to finer levels.

use serde::Serialize;

use super::geometry::{AxisExtent, AxisScaling, Rectangle, pair_threshold};
use crate::config::TickStyle;
use crate::scale::TimeMapping;
use crate::text_metrics::measure_text_width;

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub time: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickLevel {
    pub name: String,
    pub ticks: Vec<Tick>,
}

impl TickLevel {
    pub fn new(name: impl Into<String>, ticks: Vec<Tick>) -> Self {
        Self {
            name: name.into(),
            ticks,
        }
    }

    /// Ticks at every multiple of `step` inside `domain`.
    pub fn regular(name: impl Into<String>, step: f64, domain: (f64, f64)) -> Self {
        let (lo, hi) = if domain.0 <= domain.1 {
            domain
        } else {
            (domain.1, domain.0)
        };
        let mut ticks = Vec::new();
        if step > 0.0 && step.is_finite() {
            let mut index = (lo / step).ceil() as i64;
            loop {
                let time = index as f64 * step;
                if time > hi {
                    break;
                }
                ticks.push(Tick {
                    time,
                    text: format_tick(time),
                });
                index += 1;
            }
        }
        Self::new(name, ticks)
    }
}

fn format_tick(time: f64) -> String {
    if time.fract() == 0.0 {
        format!("{}", time as i64)
    } else {
        format!("{time}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickVisibility {
    pub name: String,
    pub line_k: f64,
    pub text_k: f64,
}

impl TickVisibility {
    pub fn lines_visible(&self, k: f64) -> bool {
        k >= self.line_k
    }

    pub fn text_visible(&self, k: f64) -> bool {
        k >= self.text_k
    }
}

/// Compute reveal thresholds for `levels`, coarsest first.
///
/// Ticks of a finer level that sit on a position already taken by a coarser
/// level are skipped; the coarser tick stands for both.
pub fn compute_tick_visibility(
    levels: &[TickLevel],
    mapping: &dyn TimeMapping,
    style: &TickStyle,
    k_min: f64,
) -> Vec<TickVisibility> {
    let mut placed_times: Vec<f64> = Vec::new();
    let mut existing: Vec<Rectangle> = Vec::new();
    let mut floor = k_min;
    let mut out = Vec::with_capacity(levels.len());

    for level in levels {
        let mut ticks: Vec<&Tick> = level
            .ticks
            .iter()
            .filter(|tick| !contains_time(&placed_times, tick.time))
            .collect();
        ticks.sort_by(|a, b| a.time.total_cmp(&b.time));
        ticks.dedup_by(|a, b| a.time == b.time);

        let lines: Vec<Rectangle> = ticks
            .iter()
            .map(|tick| line_box(mapping.to_px(tick.time), style))
            .collect();
        let texts: Vec<Rectangle> = ticks
            .iter()
            .map(|tick| text_box(mapping.to_px(tick.time), &tick.text, style))
            .collect();

        let raw_line = lines
            .windows(2)
            .map(|pair| pair_threshold(&pair[0], &pair[1]))
            .fold(0.0, f64::max);
        let line_k = raw_line.max(floor);

        let raw_text = max_threshold_within(&texts).max(max_threshold_between(&texts, &existing));
        let text_k = raw_text.max(line_k);

        tracing::debug!(level = %level.name, ticks = ticks.len(), line_k, text_k, "tick level");
        out.push(TickVisibility {
            name: level.name.clone(),
            line_k,
            text_k,
        });

        floor = text_k;
        existing.extend(texts);
        existing.sort_by(|a, b| a.x.center.total_cmp(&b.x.center));
        placed_times.extend(ticks.iter().map(|tick| tick.time));
        placed_times.sort_by(f64::total_cmp);
    }
    out
}

fn contains_time(sorted: &[f64], time: f64) -> bool {
    sorted.binary_search_by(|probe| probe.total_cmp(&time)).is_ok()
}

fn line_box(x: f64, style: &TickStyle) -> Rectangle {
    Rectangle::new(
        AxisExtent::new(
            x,
            (style.line_width + style.min_line_gap) * 0.5,
            AxisScaling::Fixed,
        ),
        AxisExtent::new(
            style.line_length * 0.5,
            style.line_length * 0.5,
            AxisScaling::Scalable,
        ),
    )
}

fn text_box(x: f64, text: &str, style: &TickStyle) -> Rectangle {
    let width = measure_text_width(text, style.font_size, &style.font_family, style.fast_text);
    let top = style.line_length + style.text_gap.max(0.0);
    Rectangle::new(
        AxisExtent::new(x, (width + style.text_padding) * 0.5, AxisScaling::Fixed),
        AxisExtent::new(
            top + style.text_height * 0.5,
            style.text_height * 0.5,
            AxisScaling::Scalable,
        ),
    )
}

// Both helpers rely on every box being fixed width on x: the threshold of a
// pair is then bounded by (h1 + h2) / d, which lets the scans stop early.

fn max_threshold_within(boxes: &[Rectangle]) -> f64 {
    let mut sorted = boxes.to_vec();
    sorted.sort_by(|a, b| a.x.center.total_cmp(&b.x.center));
    let h_max = sorted.iter().map(|r| r.x.half).fold(0.0, f64::max);
    let mut best = 0.0f64;
    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            let d = sorted[j].x.center - sorted[i].x.center;
            if d > 0.0 && (sorted[i].x.half + h_max) / d <= best {
                break;
            }
            best = best.max(pair_threshold(&sorted[i], &sorted[j]));
        }
    }
    best
}

fn max_threshold_between(subjects: &[Rectangle], field: &[Rectangle]) -> f64 {
    let h_max = field.iter().map(|r| r.x.half).fold(0.0, f64::max);
    let mut best = 0.0f64;
    for subject in subjects {
        let center = subject.x.center;
        let beyond = |other: &Rectangle, best: f64| {
            let d = (other.x.center - center).abs();
            d > 0.0 && (subject.x.half + h_max) / d <= best
        };
        let pos = field.partition_point(|r| r.x.center < center);
        for other in &field[pos..] {
            if beyond(other, best) {
                break;
            }
            best = best.max(pair_threshold(subject, other));
        }
        for other in field[..pos].iter().rev() {
            if beyond(other, best) {
                break;
            }
            best = best.max(pair_threshold(subject, other));
        }
    }
    best
}
