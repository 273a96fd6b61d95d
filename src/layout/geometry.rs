//! Per-axis overlap thresholds between two boxes under zoom.
//!
//! Everything here works at the reference zoom k=1. Zooming by `k` moves box
//! centers away from the mapping origin linearly, so the center distance
//! between two boxes becomes `k * d`. A scalable extent grows with `k`, a
//! fixed one stays constant in screen pixels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisScaling {
    /// Extent grows linearly with k.
    Scalable,
    /// Extent constant in screen units.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisExtent {
    pub center: f64,
    pub half: f64,
    pub scaling: AxisScaling,
}

impl AxisExtent {
    pub fn new(center: f64, half: f64, scaling: AxisScaling) -> Self {
        Self {
            center,
            half: half.max(0.0),
            scaling,
        }
    }
}

/// Axis-aligned box at reference zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: AxisExtent,
    pub y: AxisExtent,
}

impl Rectangle {
    pub fn new(x: AxisExtent, y: AxisExtent) -> Self {
        Self { x, y }
    }

    /// Box whose width stays constant on screen (text at an instant).
    pub fn fixed_width(cx: f64, width: f64, cy: f64, height: f64) -> Self {
        Self {
            x: AxisExtent::new(cx, width * 0.5, AxisScaling::Fixed),
            y: AxisExtent::new(cy, height * 0.5, AxisScaling::Scalable),
        }
    }

    /// Box whose width follows the time axis (a span).
    pub fn scalable_width(cx: f64, width: f64, cy: f64, height: f64) -> Self {
        Self {
            x: AxisExtent::new(cx, width * 0.5, AxisScaling::Scalable),
            y: AxisExtent::new(cy, height * 0.5, AxisScaling::Scalable),
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisExtent {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Screen-space bounds `(x0, y0, x1, y1)` at zoom `k` about `origin`.
    pub fn bounds_at(&self, k: f64, origin: (f64, f64)) -> (f64, f64, f64, f64) {
        let (cx, hx) = zoomed(&self.x, k, origin.0);
        let (cy, hy) = zoomed(&self.y, k, origin.1);
        (cx - hx, cy - hy, cx + hx, cy + hy)
    }
}

fn zoomed(extent: &AxisExtent, k: f64, origin: f64) -> (f64, f64) {
    let center = origin + (extent.center - origin) * k;
    let half = match extent.scaling {
        AxisScaling::Scalable => extent.half * k,
        AxisScaling::Fixed => extent.half,
    };
    (center, half)
}

/// Zoom factor at which `a` and `b` switch between overlapping and disjoint
/// along `axis`.
///
/// 0 means the boxes are already disjoint at k=1 on this axis; +∞ means they
/// never separate.
pub fn overlap_threshold(a: &Rectangle, b: &Rectangle, axis: Axis) -> f64 {
    let a = a.axis(axis);
    let b = b.axis(axis);
    let h1 = a.half;
    let h2 = b.half;
    let d = (a.center - b.center).abs();

    if h1 + h2 <= d {
        return 0.0;
    }
    // Coincident centers never move apart under zoom.
    if d <= 0.0 {
        return f64::INFINITY;
    }

    match (a.scaling, b.scaling) {
        (AxisScaling::Scalable, AxisScaling::Scalable) => {
            if h1 + h2 > d {
                f64::INFINITY
            } else {
                0.0
            }
        }
        (AxisScaling::Scalable, AxisScaling::Fixed) => scalable_fixed(h1, h2, d),
        (AxisScaling::Fixed, AxisScaling::Scalable) => scalable_fixed(h2, h1, d),
        (AxisScaling::Fixed, AxisScaling::Fixed) => (h1 + h2) / d,
    }
}

/// The scalable box's near edge recedes at rate `r·d` per unit of k while the
/// fixed box keeps its full extent `2·h_fixed`; they part once
/// `2·h_fixed / (2·r·d)` is reached.
fn scalable_fixed(h_scalable: f64, h_fixed: f64, d: f64) -> f64 {
    let r = 1.0 - h_scalable / d;
    if r <= 0.0 {
        f64::INFINITY
    } else {
        (2.0 * h_fixed) / (2.0 * r * d)
    }
}

/// Smallest k at or above which the two boxes no longer intersect.
///
/// Boxes intersect only while both axes overlap, so the pair separates as
/// soon as either axis does.
pub fn pair_threshold(a: &Rectangle, b: &Rectangle) -> f64 {
    let tx = overlap_threshold(a, b, Axis::X);
    if tx == 0.0 {
        return 0.0;
    }
    let ty = overlap_threshold(a, b, Axis::Y);
    if ty == 0.0 {
        return 0.0;
    }
    tx.min(ty)
}
