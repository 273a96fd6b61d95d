mod footprint;
mod frame;
pub mod geometry;
pub mod matrix;
mod rows;
mod ticks;
pub(crate) mod types;
pub mod union_find;
pub mod visibility;
pub use footprint::label_rectangle;
pub use frame::{RowContext, RowRenderer, draw_frame};
pub use rows::partition_rows;
pub use ticks::{Tick, TickLevel, TickVisibility, compute_tick_visibility};
pub use types::*;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::{DeclutterConfig, LayoutMode};
use crate::error::{ConfigWarning, DeclutterError, Result};
use crate::ir::Label;
use crate::scale::TimeMapping;
use geometry::{Rectangle, pair_threshold};
use matrix::ThresholdMatrix;
use visibility::{SweepLabel, SweepSettings, sweep_row};

/// Pairwise overlap thresholds of `rects`.
pub fn overlap_matrix(rects: &[Rectangle]) -> ThresholdMatrix {
    ThresholdMatrix::symmetric_from_fn(rects.len(), |i, j| pair_threshold(&rects[i], &rects[j]))
}

/// Compute visibility intervals for every label in every configured layout
/// mode.
///
/// Runs only on structural change; the returned table answers per-frame
/// queries without further work.
pub fn compute_visibility(
    labels: &[Label],
    mapping: &dyn TimeMapping,
    config: &DeclutterConfig,
) -> Result<VisibilityTable> {
    validate(labels, config)?;

    let rects: Vec<Rectangle> = labels
        .iter()
        .map(|label| label_rectangle(label, mapping, config))
        .collect();
    let matrix = overlap_matrix(&rects);

    let borders: Vec<usize> = (0..labels.len()).filter(|&i| labels[i].border).collect();
    let real: Vec<usize> = (0..labels.len()).filter(|&i| !labels[i].border).collect();
    let real_matrix = matrix.pick(&real, &real);
    debug!(
        labels = labels.len(),
        borders = borders.len(),
        modes = config.modes.len(),
        "computing label visibility"
    );

    let settings = SweepSettings {
        k_min: config.k_min,
        k_max: config.k_max,
        max_component_candidates: config.max_component_candidates,
        debug: config.debug,
    };

    let mut warnings = Vec::new();
    let mut modes = Vec::with_capacity(config.modes.len());
    for mode in &config.modes {
        let layout = compute_mode(
            mode,
            labels,
            &matrix,
            &real_matrix,
            &borders,
            &real,
            &settings,
            &mut warnings,
        )?;
        modes.push(layout);
    }

    Ok(VisibilityTable {
        k_min: config.k_min,
        k_max: config.k_max,
        modes,
        warnings,
    })
}

fn validate(labels: &[Label], config: &DeclutterConfig) -> Result<()> {
    let (k_min, k_max) = (config.k_min, config.k_max);
    if !(k_min.is_finite() && k_max.is_finite() && k_min >= 0.0 && k_min <= k_max) {
        return Err(DeclutterError::InvalidRange { k_min, k_max });
    }
    let mut seen = BTreeSet::new();
    for label in labels {
        if !seen.insert(&label.id) {
            return Err(DeclutterError::DuplicateLabel {
                label: label.id.to_string(),
            });
        }
        if !label.children.is_empty() {
            return Err(DeclutterError::UnsupportedFeature {
                label: label.id.to_string(),
                feature: "nested child labels",
            });
        }
        if !(label.weight.is_finite() && label.weight > 0.0) {
            return Err(DeclutterError::InvalidWeight {
                label: label.id.to_string(),
                weight: label.weight,
            });
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn compute_mode(
    mode: &LayoutMode,
    labels: &[Label],
    matrix: &ThresholdMatrix,
    real_matrix: &ThresholdMatrix,
    borders: &[usize],
    real: &[usize],
    settings: &SweepSettings,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<ModeLayout> {
    let plan = mode.plan();
    let total = plan.total();

    let pins: Vec<Option<usize>> = real
        .iter()
        .map(|&i| {
            let label = &labels[i];
            match label.row {
                Some(pin) if pin >= total => {
                    let warning = ConfigWarning::RowPinOutOfRange {
                        mode: mode.name.clone(),
                        label: label.id.to_string(),
                        pin,
                        rows: total,
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                    None
                }
                pin => pin,
            }
        })
        .collect();

    let groups = partition_rows(&plan, &pins, real_matrix, settings.debug)?;

    let mut rows = Vec::with_capacity(groups.len());
    let mut intervals: BTreeMap<_, Vec<VisibilityInterval>> = BTreeMap::new();
    for (row_index, group) in groups.iter().enumerate() {
        let row = RowId(row_index);
        let members: Vec<usize> = borders
            .iter()
            .copied()
            .chain(group.iter().map(|&local| real[local]))
            .collect();
        let sub = matrix.pick(&members, &members);
        let sweep_labels: Vec<SweepLabel> = members
            .iter()
            .map(|&i| SweepLabel {
                weight: labels[i].weight,
                min_k: labels[i].min_k,
                max_k: labels[i].max_k,
                border: labels[i].border,
            })
            .collect();

        let resolved = sweep_row(&sub, &sweep_labels, settings)?;
        let mut hidden = 0usize;
        for (&i, interval) in members.iter().zip(resolved) {
            match interval {
                Some((min_k, max_k)) => intervals
                    .entry(labels[i].id.clone())
                    .or_default()
                    .push(VisibilityInterval { row, min_k, max_k }),
                None => hidden += 1,
            }
        }
        debug!(
            mode = %mode.name,
            row = row_index,
            labels = group.len(),
            hidden,
            "row resolved"
        );

        rows.push(RowDescriptor {
            id: row,
            side: plan.side(row),
            lane: plan.lane(row),
            labels: group.iter().map(|&local| labels[real[local]].id.clone()).collect(),
        });
    }

    Ok(ModeLayout {
        name: mode.name.clone(),
        plan,
        rows,
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LabelId;
    use crate::scale::LinearTimeScale;

    fn scale() -> LinearTimeScale {
        LinearTimeScale::new((0.0, 1000.0), (0.0, 1000.0)).unwrap()
    }

    fn config() -> DeclutterConfig {
        DeclutterConfig::default()
            .with_padding(0.0)
            .with_fast_text(true)
            .with_k_range(1.0, 10.0)
            .with_modes(vec![LayoutMode::single()])
    }

    #[test]
    fn nested_labels_are_rejected() {
        let labels = vec![Label::instant("a", 1.0).with_child(Label::instant("b", 2.0))];
        let err = compute_visibility(&labels, &scale(), &config()).unwrap_err();
        assert!(matches!(err, DeclutterError::UnsupportedFeature { .. }));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = compute_visibility(&[], &scale(), &config().with_k_range(5.0, 2.0)).unwrap_err();
        assert_eq!(
            err,
            DeclutterError::InvalidRange {
                k_min: 5.0,
                k_max: 2.0
            }
        );
    }

    #[test]
    fn shared_ids_are_rejected() {
        let labels = vec![
            Label::instant("dup", 100.0).with_width(20.0).with_weight(10.0),
            Label::instant("dup", 110.0).with_width(20.0),
        ];
        let err = compute_visibility(&labels, &scale(), &config()).unwrap_err();
        assert_eq!(
            err,
            DeclutterError::DuplicateLabel {
                label: "dup".to_string()
            }
        );
    }

    #[test]
    fn border_ids_share_the_namespace() {
        let labels = vec![
            Label::instant("edge", 0.0).with_width(10.0).as_border(),
            Label::instant("edge", 500.0).with_width(10.0),
        ];
        let err = compute_visibility(&labels, &scale(), &config()).unwrap_err();
        assert!(matches!(err, DeclutterError::DuplicateLabel { .. }));
    }

    #[test]
    fn non_positive_weight_is_rejected() {
        let labels = vec![Label::instant("a", 1.0).with_weight(0.0)];
        let err = compute_visibility(&labels, &scale(), &config()).unwrap_err();
        assert!(matches!(err, DeclutterError::InvalidWeight { .. }));
    }

    #[test]
    fn out_of_range_pin_falls_back_with_warning() {
        let labels = vec![
            Label::instant("a", 100.0).with_width(10.0).pinned_to(5),
            Label::instant("b", 500.0).with_width(10.0),
        ];
        let table = compute_visibility(&labels, &scale(), &config()).unwrap();
        assert_eq!(table.warnings().len(), 1);
        let id = LabelId::from("a");
        assert!(table.is_visible("single", &id, RowId(0), 1.0));
    }

    #[test]
    fn overlap_matrix_is_symmetric() {
        let rects = [
            Rectangle::fixed_width(0.0, 20.0, 0.0, 10.0),
            Rectangle::fixed_width(10.0, 20.0, 0.0, 10.0),
            Rectangle::fixed_width(50.0, 20.0, 0.0, 10.0),
        ];
        let m = overlap_matrix(&rects);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(0, 2), 0.0);
    }
}
