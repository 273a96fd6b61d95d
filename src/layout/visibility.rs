//! Zoom sweep assigning every label of one row the zoom range in which it
//! may be drawn.
//!
//! The sweep walks the distinct overlap thresholds of the row in ascending
//! order. At each value `k` the pairs that still intersect form a graph; each
//! connected component that has open candidates is solved exactly with a
//! maximum weight independent set search, or heaviest first when it is too
//! large to search. Selections are permanent, so visibility only accrues as
//! `k` grows.

use tracing::debug;

use super::matrix::{AdjacencyMatrix, ThresholdMatrix};
use super::union_find::UnionFind;
use crate::error::{DeclutterError, Result};

/// Largest component the bitmask search can represent.
pub const MAX_SEARCH_CANDIDATES: usize = 64;

/// One label as seen by the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepLabel {
    pub weight: f64,
    pub min_k: f64,
    pub max_k: f64,
    pub border: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    pub k_min: f64,
    pub k_max: f64,
    pub max_component_candidates: usize,
    pub debug: bool,
}

impl SweepLabel {
    /// Interval the label would get if selected at `k`, if non-empty.
    fn interval_from(&self, k: f64, k_max: f64) -> Option<(f64, f64)> {
        let lo = k.max(self.min_k);
        let hi = k_max.min(self.max_k);
        (lo <= hi).then_some((lo, hi))
    }
}

/// Run the sweep for one row.
///
/// `matrix` holds the pairwise thresholds of exactly `labels`, in the same
/// order. Returns the `(min_k, max_k)` interval of every label; `None` for
/// labels that never become visible. Border labels always get
/// `(k_min, k_max)`.
pub fn sweep_row(
    matrix: &ThresholdMatrix,
    labels: &[SweepLabel],
    settings: &SweepSettings,
) -> Result<Vec<Option<(f64, f64)>>> {
    let n = labels.len();
    if matrix.rows() != n || matrix.cols() != n {
        return Err(DeclutterError::invariant(
            "visibility sweep",
            format!(
                "matrix is {}x{} for {} labels",
                matrix.rows(),
                matrix.cols(),
                n
            ),
        ));
    }
    let SweepSettings { k_min, k_max, .. } = *settings;
    let cap = settings
        .max_component_candidates
        .min(MAX_SEARCH_CANDIDATES);

    let mut selected: Vec<bool> = labels.iter().map(|label| label.border).collect();
    let mut intervals: Vec<Option<(f64, f64)>> = labels
        .iter()
        .map(|label| label.border.then_some((k_min, k_max)))
        .collect();
    // Largest threshold against any selected label: the label cannot be
    // added before the sweep reaches it.
    let mut blocked_until = vec![0.0f64; n];
    for border in (0..n).filter(|&i| selected[i]) {
        block_neighbors(matrix, border, &mut blocked_until);
    }

    let weights: Vec<f64> = labels.iter().map(|label| label.weight).collect();
    let mut steps = matrix.distinct_values_within(k_min, k_max);
    if steps.first() != Some(&k_min) {
        steps.insert(0, k_min);
    }

    for k in steps {
        let open = (0..n).any(|i| {
            !selected[i] && blocked_until[i] <= k && labels[i].interval_from(k, k_max).is_some()
        });
        if !open {
            if selected.iter().all(|&s| s) {
                break;
            }
            continue;
        }

        let adjacency = matrix.adjacency_above(k);
        let mut uf = UnionFind::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if adjacency.connected(i, j) {
                    uf.union(i, j);
                }
            }
        }

        let mut newly_selected = Vec::new();
        for component in uf.components() {
            let candidates: Vec<usize> = component
                .iter()
                .copied()
                .filter(|&i| {
                    !selected[i]
                        && blocked_until[i] <= k
                        && labels[i].interval_from(k, k_max).is_some()
                })
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let preselected: Vec<usize> =
                component.iter().copied().filter(|&i| selected[i]).collect();
            if candidates.len() > cap {
                debug!(
                    k,
                    candidates = candidates.len(),
                    cap,
                    "component too large for exact search, selecting greedily"
                );
                newly_selected.extend(greedy_independent_set(
                    &candidates,
                    &weights,
                    &adjacency,
                    &preselected,
                ));
            } else {
                newly_selected.extend(max_weight_independent_set(
                    &candidates,
                    &weights,
                    &adjacency,
                    &preselected,
                )?);
            }
        }

        if settings.debug {
            debug!(k, selected = newly_selected.len(), "sweep step");
        }
        for i in newly_selected {
            selected[i] = true;
            intervals[i] = labels[i].interval_from(k, k_max);
            block_neighbors(matrix, i, &mut blocked_until);
        }
    }

    Ok(intervals)
}

fn block_neighbors(matrix: &ThresholdMatrix, selected: usize, blocked_until: &mut [f64]) {
    for (other, value) in matrix.row(selected).iter().enumerate() {
        if other != selected && *value > blocked_until[other] {
            blocked_until[other] = *value;
        }
    }
}

/// Heaviest-first independent subset of `candidates` with no neighbor in
/// `preselected`. Equal weights keep candidate order.
///
/// The result is maximal: every candidate left out touches a chosen or
/// preselected label.
pub fn greedy_independent_set(
    candidates: &[usize],
    weights: &[f64],
    adjacency: &AdjacencyMatrix,
    preselected: &[usize],
) -> Vec<usize> {
    let mut order: Vec<usize> = candidates.to_vec();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

    let mut chosen: Vec<usize> = Vec::new();
    for c in order {
        let blocked = preselected
            .iter()
            .chain(chosen.iter())
            .any(|&other| adjacency.connected(c, other));
        if !blocked {
            chosen.push(c);
        }
    }
    chosen.sort_unstable();
    chosen
}

#[derive(Debug, Clone, Copy)]
struct Best {
    weight: f64,
    mask: u64,
}

/// Maximum weight subset of `candidates` that is independent in `adjacency`
/// and has no neighbor in `preselected`.
///
/// Exhaustive include/exclude search in candidate order. The selection is a
/// bitmask passed by value, so sibling branches never share state. Among
/// equally heavy subsets the first one reached wins.
pub fn max_weight_independent_set(
    candidates: &[usize],
    weights: &[f64],
    adjacency: &AdjacencyMatrix,
    preselected: &[usize],
) -> Result<Vec<usize>> {
    let open: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&c| !preselected.iter().any(|&p| adjacency.connected(c, p)))
        .collect();
    if open.len() > MAX_SEARCH_CANDIDATES {
        return Err(DeclutterError::invariant(
            "independent set search",
            format!("{} candidates exceed the bitmask width", open.len()),
        ));
    }

    let conflicts: Vec<u64> = open
        .iter()
        .map(|&c| {
            open.iter()
                .enumerate()
                .filter(|&(_, &o)| o != c && adjacency.connected(c, o))
                .fold(0u64, |mask, (pos, _)| mask | (1u64 << pos))
        })
        .collect();
    let open_weights: Vec<f64> = open.iter().map(|&c| weights[c]).collect();
    let mut remaining = vec![0.0f64; open.len() + 1];
    for pos in (0..open.len()).rev() {
        remaining[pos] = remaining[pos + 1] + open_weights[pos];
    }

    let mut best = Best {
        weight: f64::NEG_INFINITY,
        mask: 0,
    };
    search(0, 0, 0.0, &open_weights, &conflicts, &remaining, &mut best);

    Ok(open
        .iter()
        .enumerate()
        .filter(|&(pos, _)| best.mask & (1u64 << pos) != 0)
        .map(|(_, &c)| c)
        .collect())
}

fn search(
    pos: usize,
    chosen: u64,
    weight: f64,
    weights: &[f64],
    conflicts: &[u64],
    remaining: &[f64],
    best: &mut Best,
) {
    if pos == weights.len() {
        if weight > best.weight {
            *best = Best {
                weight,
                mask: chosen,
            };
        }
        return;
    }
    // Even taking everything left cannot beat the incumbent.
    if weight + remaining[pos] <= best.weight {
        return;
    }
    if chosen & conflicts[pos] == 0 {
        search(
            pos + 1,
            chosen | (1u64 << pos),
            weight + weights[pos],
            weights,
            conflicts,
            remaining,
            best,
        );
    }
    search(pos + 1, chosen, weight, weights, conflicts, remaining, best);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(weight: f64) -> SweepLabel {
        SweepLabel {
            weight,
            min_k: 0.0,
            max_k: f64::INFINITY,
            border: false,
        }
    }

    fn settings(k_min: f64, k_max: f64) -> SweepSettings {
        SweepSettings {
            k_min,
            k_max,
            max_component_candidates: 30,
            debug: false,
        }
    }

    fn adjacency(n: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
        let mut adj = AdjacencyMatrix::square(n);
        for &(a, b) in edges {
            adj.set_symmetric(a, b, 1);
        }
        adj
    }

    fn is_independent(set: &[usize], adj: &AdjacencyMatrix) -> bool {
        set.iter()
            .all(|&a| set.iter().all(|&b| a == b || !adj.connected(a, b)))
    }

    #[test]
    fn heavy_center_beats_two_light_neighbors() {
        let adj = adjacency(3, &[(0, 1), (1, 2)]);
        let chosen = max_weight_independent_set(&[0, 1, 2], &[1.0, 10.0, 1.0], &adj, &[]).unwrap();
        assert_eq!(chosen, vec![1]);
    }

    #[test]
    fn light_center_loses_to_outer_pair() {
        let adj = adjacency(3, &[(0, 1), (1, 2)]);
        let chosen = max_weight_independent_set(&[0, 1, 2], &[1.0, 1.5, 1.0], &adj, &[]).unwrap();
        assert_eq!(chosen, vec![0, 2]);
    }

    #[test]
    fn preselected_neighbors_forbid_candidates() {
        let adj = adjacency(4, &[(0, 1), (1, 2), (2, 3)]);
        let chosen = max_weight_independent_set(&[1, 2, 3], &[1.0, 5.0, 1.0, 1.0], &adj, &[0]).unwrap();
        assert_eq!(chosen, vec![2]);
    }

    #[test]
    fn ties_keep_first_enumerated_subset() {
        let adj = adjacency(2, &[(0, 1)]);
        let chosen = max_weight_independent_set(&[0, 1], &[1.0, 1.0], &adj, &[]).unwrap();
        assert_eq!(chosen, vec![0]);
    }

    #[test]
    fn search_matches_brute_force_on_small_graphs() {
        // Deterministic pseudo-random graphs of up to six nodes.
        let mut seed = 0x2545_f491_4f6c_dd1du64;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };
        for n in 1..=6usize {
            for _ in 0..40 {
                let mut edges = Vec::new();
                for a in 0..n {
                    for b in (a + 1)..n {
                        if next() % 2 == 0 {
                            edges.push((a, b));
                        }
                    }
                }
                let weights: Vec<f64> = (0..n).map(|_| 1.0 + (next() % 9) as f64).collect();
                let adj = adjacency(n, &edges);
                let candidates: Vec<usize> = (0..n).collect();
                let chosen = max_weight_independent_set(&candidates, &weights, &adj, &[]).unwrap();
                assert!(is_independent(&chosen, &adj));
                let chosen_weight: f64 = chosen.iter().map(|&i| weights[i]).sum();

                for mask in 0u32..(1 << n) {
                    let subset: Vec<usize> = (0..n).filter(|&i| mask & (1 << i) != 0).collect();
                    if is_independent(&subset, &adj) {
                        let weight: f64 = subset.iter().map(|&i| weights[i]).sum();
                        assert!(chosen_weight >= weight, "n={n} mask={mask:b}");
                    }
                }
            }
        }
    }

    #[test]
    fn sweep_reveals_neighbors_at_their_threshold() {
        // A is heavy and overlaps B until 2.5 and C until 4.
        let mut m = ThresholdMatrix::square(3);
        m.set_symmetric(0, 1, 2.5);
        m.set_symmetric(0, 2, 4.0);
        let labels = [label(10.0), label(1.0), label(1.0)];
        let out = sweep_row(&m, &labels, &settings(1.0, 10.0)).unwrap();
        assert_eq!(out[0], Some((1.0, 10.0)));
        assert_eq!(out[1], Some((2.5, 10.0)));
        assert_eq!(out[2], Some((4.0, 10.0)));
    }

    #[test]
    fn borders_block_but_never_compete() {
        let mut m = ThresholdMatrix::square(2);
        m.set_symmetric(0, 1, 3.0);
        let border = SweepLabel {
            border: true,
            weight: 0.1,
            ..label(1.0)
        };
        let out = sweep_row(&m, &[border, label(100.0)], &settings(1.0, 8.0)).unwrap();
        assert_eq!(out[0], Some((1.0, 8.0)));
        assert_eq!(out[1], Some((3.0, 8.0)));
    }

    #[test]
    fn clamps_shape_the_interval() {
        let m = ThresholdMatrix::square(2);
        let labels = [
            SweepLabel {
                min_k: 3.0,
                max_k: 5.0,
                ..label(1.0)
            },
            SweepLabel {
                min_k: 20.0,
                ..label(1.0)
            },
        ];
        let out = sweep_row(&m, &labels, &settings(1.0, 10.0)).unwrap();
        assert_eq!(out[0], Some((3.0, 5.0)));
        assert_eq!(out[1], None);
    }

    #[test]
    fn never_separating_pair_shows_only_the_heavier() {
        let mut m = ThresholdMatrix::square(2);
        m.set_symmetric(0, 1, f64::INFINITY);
        let out = sweep_row(&m, &[label(1.0), label(2.0)], &settings(1.0, 10.0)).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some((1.0, 10.0)));
    }

    #[test]
    fn oversized_component_falls_back_to_heaviest_first() {
        let n = 5;
        let m = ThresholdMatrix::symmetric_from_fn(n, |_, _| 2.0);
        let labels: Vec<SweepLabel> = [1.0, 3.0, 2.0, 3.0, 1.0].map(label).to_vec();
        let mut s = settings(1.0, 10.0);
        s.max_component_candidates = 4;
        let out = sweep_row(&m, &labels, &s).unwrap();
        // The first of the two heaviest wins at k_min, the rest once apart.
        assert_eq!(out[1], Some((1.0, 10.0)));
        for i in [0, 2, 3, 4] {
            assert_eq!(out[i], Some((2.0, 10.0)), "label {i}");
        }
    }

    #[test]
    fn greedy_selection_is_independent_and_maximal() {
        let adj = adjacency(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (0, 4)]);
        let weights = [2.0, 5.0, 1.0, 4.0, 3.0];
        let chosen = greedy_independent_set(&[0, 1, 2, 3, 4], &weights, &adj, &[]);
        assert_eq!(chosen, vec![1, 3]);
        assert!(is_independent(&chosen, &adj));
        for c in 0..5 {
            assert!(chosen.contains(&c) || chosen.iter().any(|&o| adj.connected(c, o)));
        }
    }

    #[test]
    fn greedy_selection_respects_preselected() {
        let adj = adjacency(3, &[(0, 1), (1, 2)]);
        let chosen = greedy_independent_set(&[1, 2], &[1.0, 9.0, 1.0], &adj, &[0]);
        assert_eq!(chosen, vec![2]);
    }

    #[test]
    fn long_overlap_chain_resolves_without_error() {
        // 200 labels, each overlapping its neighbors until k = 4.
        let n = 200;
        let m = ThresholdMatrix::symmetric_from_fn(n, |i, j| {
            let d = (j - i) as f64 * 10.0;
            if d < 40.0 { 40.0 / d } else { 0.0 }
        });
        let labels = vec![label(1.0); n];
        let out = sweep_row(&m, &labels, &settings(1.0, 16.0)).unwrap();
        assert!(out.iter().all(Option::is_some));
        assert!(out.iter().flatten().all(|&(lo, _)| lo <= 4.0));
        let at_start: Vec<usize> = (0..n).filter(|&i| out[i] == Some((1.0, 16.0))).collect();
        for pair in at_start.windows(2) {
            assert!(m.get(pair[0], pair[1]) <= 1.0);
        }
    }
}
