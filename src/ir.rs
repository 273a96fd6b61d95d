use serde::{Deserialize, Serialize};

/// Stable identity of a label, used to look results up after a computation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where on the time axis a label sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeAnchor {
    Instant(f64),
    Span { start: f64, end: f64 },
}

impl TimeAnchor {
    pub fn span(start: f64, end: f64) -> Self {
        if start <= end {
            Self::Span { start, end }
        } else {
            Self::Span {
                start: end,
                end: start,
            }
        }
    }

    pub fn midpoint(&self) -> f64 {
        match *self {
            TimeAnchor::Instant(t) => t,
            TimeAnchor::Span { start, end } => (start + end) * 0.5,
        }
    }

    pub fn is_span(&self) -> bool {
        matches!(self, TimeAnchor::Span { .. })
    }
}

/// A time-anchored label as handed to the engine.
///
/// Labels are immutable for the duration of one computation. Every optional
/// field has an explicit default:
///
/// * `width`: `None` derives the footprint from the text (instants) or from
///   the span under the reference mapping (spans).
/// * `height`: `None` uses the configured label height.
/// * `weight`: 1.0. Must be positive and finite.
/// * `min_k` / `max_k`: 0 and +∞, i.e. no clamp.
/// * `row`: `None` lets the row partitioner choose.
/// * `border`: `false`. Border labels are always visible and only constrain
///   the optimization.
/// * `children`: empty. Nested labels are rejected by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: LabelId,
    pub anchor: TimeAnchor,
    pub text: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: f64,
    pub min_k: f64,
    pub max_k: f64,
    pub row: Option<usize>,
    pub border: bool,
    pub children: Vec<Label>,
}

impl Label {
    pub fn new(id: impl Into<LabelId>, anchor: TimeAnchor) -> Self {
        Self {
            id: id.into(),
            anchor,
            text: None,
            width: None,
            height: None,
            weight: 1.0,
            min_k: 0.0,
            max_k: f64::INFINITY,
            row: None,
            border: false,
            children: Vec::new(),
        }
    }

    pub fn instant(id: impl Into<LabelId>, time: f64) -> Self {
        Self::new(id, TimeAnchor::Instant(time))
    }

    pub fn span(id: impl Into<LabelId>, start: f64, end: f64) -> Self {
        Self::new(id, TimeAnchor::span(start, end))
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_k_range(mut self, min_k: f64, max_k: f64) -> Self {
        self.min_k = min_k;
        self.max_k = max_k;
        self
    }

    pub fn pinned_to(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn as_border(mut self) -> Self {
        self.border = true;
        self
    }

    pub fn with_child(mut self, child: Label) -> Self {
        self.children.push(child);
        self
    }

    /// Text used for measuring; falls back to the id.
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or(self.id.as_str())
    }
}

impl From<String> for LabelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_normalizes_reversed_bounds() {
        let anchor = TimeAnchor::span(1918.0, 1914.0);
        assert_eq!(
            anchor,
            TimeAnchor::Span {
                start: 1914.0,
                end: 1918.0
            }
        );
        assert_eq!(anchor.midpoint(), 1916.0);
    }

    #[test]
    fn builder_defaults_are_unclamped() {
        let label = Label::instant("moon", 1969.0);
        assert_eq!(label.weight, 1.0);
        assert_eq!(label.min_k, 0.0);
        assert!(label.max_k.is_infinite());
        assert!(label.row.is_none());
        assert!(!label.border);
        assert_eq!(label.display_text(), "moon");
    }
}
