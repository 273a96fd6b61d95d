use crate::layout::{RowDescriptor, TickVisibility, VisibilityTable};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityDump {
    pub k_min: f64,
    pub k_max: f64,
    pub modes: Vec<ModeDump>,
    pub ticks: Vec<TickVisibility>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDump {
    pub name: String,
    pub rows_above: usize,
    pub rows_below: usize,
    pub rows: Vec<RowDescriptor>,
    pub intervals: Vec<IntervalDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<Vec<VisibleDump>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalDump {
    pub id: String,
    pub row: usize,
    pub min_k: f64,
    pub max_k: f64,
}

#[derive(Debug, Serialize)]
pub struct VisibleDump {
    pub id: String,
    pub row: usize,
}

impl VisibilityDump {
    /// Snapshot of `table`. With `at`, every mode also lists the labels
    /// visible at that zoom factor.
    pub fn from_table(table: &VisibilityTable, ticks: &[TickVisibility], at: Option<f64>) -> Self {
        let modes = table
            .modes
            .iter()
            .map(|mode| {
                let intervals = mode
                    .intervals
                    .iter()
                    .flat_map(|(id, intervals)| {
                        intervals.iter().map(move |interval| IntervalDump {
                            id: id.to_string(),
                            row: interval.row.0,
                            min_k: interval.min_k,
                            max_k: interval.max_k,
                        })
                    })
                    .collect();
                let visible = at.map(|k| {
                    mode.visible_at(k)
                        .map(|(id, row)| VisibleDump {
                            id: id.to_string(),
                            row: row.0,
                        })
                        .collect()
                });
                ModeDump {
                    name: mode.name.clone(),
                    rows_above: mode.plan.rows_above,
                    rows_below: mode.plan.rows_below,
                    rows: mode.rows.clone(),
                    intervals,
                    visible,
                }
            })
            .collect();

        VisibilityDump {
            k_min: table.k_min,
            k_max: table.k_max,
            modes,
            ticks: ticks.to_vec(),
            warnings: table.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Write `dump` as pretty JSON to `path`, or stdout when `path` is `None`.
pub fn write_dump(dump: &VisibilityDump, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeclutterConfig, LayoutMode};
    use crate::ir::Label;
    use crate::layout::compute_visibility;
    use crate::scale::LinearTimeScale;

    #[test]
    fn dump_lists_intervals_and_visible_labels() {
        let scale = LinearTimeScale::new((0.0, 100.0), (0.0, 1000.0)).unwrap();
        let labels = vec![
            Label::instant("a", 10.0).with_width(30.0).with_weight(5.0),
            Label::instant("b", 12.0).with_width(30.0),
        ];
        let config = DeclutterConfig::default()
            .with_padding(0.0)
            .with_k_range(1.0, 8.0)
            .with_modes(vec![LayoutMode::single()]);
        let table = compute_visibility(&labels, &scale, &config).unwrap();
        let dump = VisibilityDump::from_table(&table, &[], Some(1.0));

        assert_eq!(dump.modes.len(), 1);
        let mode = &dump.modes[0];
        assert_eq!(mode.intervals.len(), 2);
        let visible = mode.visible.as_ref().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "a");

        let json = serde_json::to_string(&dump).unwrap();
        assert!(json.contains("\"minK\""));
        assert!(json.contains("\"rowsAbove\":1"));
    }
}
