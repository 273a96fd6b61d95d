//! Splitting a label set into a fixed number of parallel rows.
//!
//! Agglomerative: start from one group per pinned row plus a singleton per
//! free label, then keep merging the two groups whose worst pairwise overlap
//! is smallest until the requested number of rows remains.

use std::collections::HashMap;

use tracing::trace;

use super::matrix::ThresholdMatrix;
use super::types::RowPlan;
use crate::error::{DeclutterError, Result};

#[derive(Debug, Clone)]
struct Group {
    id: u64,
    pin: Option<usize>,
    members: Vec<usize>,
}

/// Partition `0..matrix.rows()` into `plan.total()` groups, returned indexed
/// by row id.
///
/// `pins[i]` must already be validated against the plan (out of range pins are
/// dropped by the caller).
pub fn partition_rows(
    plan: &RowPlan,
    pins: &[Option<usize>],
    matrix: &ThresholdMatrix,
    debug: bool,
) -> Result<Vec<Vec<usize>>> {
    let n = matrix.rows();
    let total = plan.total();
    if total == 0 {
        return Err(DeclutterError::invariant(
            "row partitioning",
            "layout mode has no rows",
        ));
    }
    if total == 1 {
        return Ok(vec![(0..n).collect()]);
    }

    let mut next_id = 0u64;
    let mut fresh_id = || {
        next_id += 1;
        next_id
    };

    let mut groups: Vec<Group> = Vec::new();
    for row in 0..total {
        let members: Vec<usize> = (0..n).filter(|&i| pins[i] == Some(row)).collect();
        if !members.is_empty() {
            groups.push(Group {
                id: fresh_id(),
                pin: Some(row),
                members,
            });
        }
    }
    for i in (0..n).filter(|&i| pins[i].is_none()) {
        groups.push(Group {
            id: fresh_id(),
            pin: None,
            members: vec![i],
        });
    }

    if groups.len() < total {
        return Err(DeclutterError::invariant(
            "row partitioning",
            format!(
                "{} labels and pins can fill only {} of {} rows",
                n,
                groups.len(),
                total
            ),
        ));
    }

    let mut costs: HashMap<(u64, u64), f64> = HashMap::new();
    while groups.len() > total {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..groups.len() {
            for b in (a + 1)..groups.len() {
                let (ga, gb) = (&groups[a], &groups[b]);
                if ga.pin.is_some() && gb.pin.is_some() {
                    continue;
                }
                let key = (ga.id.min(gb.id), ga.id.max(gb.id));
                let cost = *costs
                    .entry(key)
                    .or_insert_with(|| merge_cost(matrix, &ga.members, &gb.members));
                if best.is_none_or(|(_, _, best_cost)| cost < best_cost) {
                    best = Some((a, b, cost));
                }
            }
        }

        let Some((a, b, cost)) = best else {
            return Err(DeclutterError::invariant(
                "row partitioning",
                format!(
                    "no mergeable pair left with {} groups for {} rows",
                    groups.len(),
                    total
                ),
            ));
        };

        let absorbed = groups.remove(b);
        let id = fresh_id();
        let target = &mut groups[a];
        if debug {
            trace!(
                cost,
                left = target.members.len(),
                right = absorbed.members.len(),
                pin = ?target.pin.or(absorbed.pin),
                "merge row groups"
            );
        }
        target.id = id;
        target.pin = target.pin.or(absorbed.pin);
        target.members.extend(absorbed.members);
        target.members.sort_unstable();
    }

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); total];
    let mut taken = vec![false; total];
    let mut free_groups: Vec<Group> = Vec::new();
    for group in groups {
        match group.pin {
            Some(row) => {
                taken[row] = true;
                rows[row] = group.members;
            }
            None => free_groups.push(group),
        }
    }
    free_groups.sort_by_key(|group| group.members.first().copied().unwrap_or(usize::MAX));
    let free_rows = (0..total).filter(|&row| !taken[row]);
    for (row, group) in free_rows.zip(free_groups) {
        rows[row] = group.members;
    }
    Ok(rows)
}

/// Worst overlap threshold between any member of `a` and any member of `b`.
fn merge_cost(matrix: &ThresholdMatrix, a: &[usize], b: &[usize]) -> f64 {
    let mut cost = 0.0f64;
    for &i in a {
        for &j in b {
            cost = cost.max(matrix.get(i, j));
        }
    }
    cost
}
