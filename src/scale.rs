use serde::{Deserialize, Serialize};

use crate::error::{DeclutterError, Result};

/// Reference time→pixel mapping that defines the k=1 layout.
///
/// Implementations must be monotonic and invertible. Zooming by `k` scales
/// pixel positions about [`TimeMapping::origin_px`].
pub trait TimeMapping {
    fn to_px(&self, time: f64) -> f64;
    fn to_time(&self, px: f64) -> f64;
    fn origin_px(&self) -> f64;

    /// Pixel position of `time` at zoom `k`.
    fn zoomed_px(&self, time: f64, k: f64) -> f64 {
        let origin = self.origin_px();
        origin + (self.to_px(time) - origin) * k
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTimeScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearTimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        let span = domain.1 - domain.0;
        if !span.is_finite() || span == 0.0 {
            return Err(DeclutterError::InvalidMapping(format!(
                "time domain [{}, {}] is empty",
                domain.0, domain.1
            )));
        }
        if !(range.1 - range.0).is_finite() || range.0 == range.1 {
            return Err(DeclutterError::InvalidMapping(format!(
                "pixel range [{}, {}] is empty",
                range.0, range.1
            )));
        }
        Ok(Self { domain, range })
    }

    /// Pixels per time unit at k=1.
    pub fn px_per_unit(&self) -> f64 {
        (self.range.1 - self.range.0) / (self.domain.1 - self.domain.0)
    }
}

impl TimeMapping for LinearTimeScale {
    fn to_px(&self, time: f64) -> f64 {
        self.range.0 + (time - self.domain.0) * self.px_per_unit()
    }

    fn to_time(&self, px: f64) -> f64 {
        self.domain.0 + (px - self.range.0) / self.px_per_unit()
    }

    fn origin_px(&self) -> f64 {
        self.range.0
    }
}
