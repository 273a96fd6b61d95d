use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ConfigWarning;
use crate::ir::LabelId;

/// Row index within one layout mode. Rows `0..rows_below` sit below the
/// baseline, the remaining ones above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Below,
    Above,
}

/// Number of rows on each side of the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPlan {
    pub rows_above: usize,
    pub rows_below: usize,
}

impl RowPlan {
    pub fn total(&self) -> usize {
        self.rows_above + self.rows_below
    }

    pub fn side(&self, row: RowId) -> Side {
        // A single configured row lives on whichever side asked for it.
        if row.0 < self.rows_below {
            Side::Below
        } else {
            Side::Above
        }
    }

    /// Distance of the row from the baseline, 0 being the closest lane.
    pub fn lane(&self, row: RowId) -> usize {
        match self.side(row) {
            Side::Below => row.0,
            Side::Above => row.0 - self.rows_below,
        }
    }
}

/// Zoom interval over which a label may be drawn in `row`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityInterval {
    pub row: RowId,
    pub min_k: f64,
    pub max_k: f64,
}

impl VisibilityInterval {
    #[inline]
    pub fn contains(&self, k: f64) -> bool {
        self.min_k <= k && k <= self.max_k
    }
}

/// Lookup entry for one row of a layout mode. Rows refer to their mode and
/// labels only through ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDescriptor {
    pub id: RowId,
    pub side: Side,
    pub lane: usize,
    pub labels: Vec<LabelId>,
}

/// Results for one configured row layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeLayout {
    pub name: String,
    pub plan: RowPlan,
    pub rows: Vec<RowDescriptor>,
    pub intervals: BTreeMap<LabelId, Vec<VisibilityInterval>>,
}

impl ModeLayout {
    pub fn row(&self, id: RowId) -> Option<&RowDescriptor> {
        self.rows.get(id.0)
    }

    pub fn intervals(&self, label: &LabelId) -> &[VisibilityInterval] {
        self.intervals.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_visible(&self, label: &LabelId, row: RowId, k: f64) -> bool {
        self.intervals(label)
            .iter()
            .any(|interval| interval.row == row && interval.contains(k))
    }

    /// Labels drawable at zoom `k`, with the row each one is drawn in.
    pub fn visible_at(&self, k: f64) -> impl Iterator<Item = (&LabelId, RowId)> + '_ {
        self.intervals.iter().flat_map(move |(id, intervals)| {
            intervals
                .iter()
                .filter(move |interval| interval.contains(k))
                .map(move |interval| (id, interval.row))
        })
    }
}

/// Everything one computation produced. Replaced wholesale on the next
/// structural change.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityTable {
    pub k_min: f64,
    pub k_max: f64,
    pub modes: Vec<ModeLayout>,
    pub warnings: Vec<ConfigWarning>,
}

impl VisibilityTable {
    pub fn mode(&self, name: &str) -> Option<&ModeLayout> {
        self.modes.iter().find(|mode| mode.name == name)
    }

    pub fn intervals(&self, mode: &str, label: &LabelId) -> &[VisibilityInterval] {
        self.mode(mode)
            .map(|layout| layout.intervals(label))
            .unwrap_or(&[])
    }

    pub fn is_visible(&self, mode: &str, label: &LabelId, row: RowId, k: f64) -> bool {
        self.mode(mode)
            .is_some_and(|layout| layout.is_visible(label, row, k))
    }

    /// Labels drawable at zoom `k` in `mode`; empty for an unknown mode.
    pub fn visible_at(&self, mode: &str, k: f64) -> Vec<(&LabelId, RowId)> {
        self.mode(mode)
            .map(|layout| layout.visible_at(k).collect())
            .unwrap_or_default()
    }

    pub fn rows(&self, mode: &str) -> &[RowDescriptor] {
        self.mode(mode)
            .map(|layout| layout.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}
