//! Dense row-major matrices used by the sweep.

use std::ops::Range;

/// Dense `rows x cols` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

/// Pairwise overlap thresholds, see [`super::geometry::pair_threshold`].
pub type ThresholdMatrix = Matrix<f64>;

/// 0/1 overlap graph at one sweep threshold.
pub type AdjacencyMatrix = Matrix<u8>;

impl<T: Copy + Default> Matrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::default(); rows * cols],
        }
    }

    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Square matrix filled from a symmetric pair function. `f` is called once
    /// per unordered pair; the diagonal keeps `T::default()`.
    pub fn symmetric_from_fn(n: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut matrix = Self::square(n);
        for i in 0..n {
            for j in (i + 1)..n {
                matrix.set_symmetric(i, j, f(i, j));
            }
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn set_symmetric(&mut self, i: usize, j: usize, value: T) {
        self.set(i, j, value);
        self.set(j, i, value);
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Contiguous sub-block.
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        let mut out = Self::new(rows.len(), cols.len());
        for (out_row, row) in rows.enumerate() {
            let src = &self.row(row)[cols.clone()];
            let start = out_row * out.cols;
            out.data[start..start + src.len()].copy_from_slice(src);
        }
        out
    }

    /// Sub-matrix made of arbitrary row and column indices, in the given order.
    pub fn pick(&self, rows: &[usize], cols: &[usize]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for &row in rows {
            let src = self.row(row);
            data.extend(cols.iter().map(|&col| src[col]));
        }
        Self {
            rows: rows.len(),
            cols: cols.len(),
            data,
        }
    }
}

impl ThresholdMatrix {
    /// Sorted distinct off-diagonal values inside `[lo, hi]`.
    pub fn distinct_values_within(&self, lo: f64, hi: f64) -> Vec<f64> {
        let mut values = Vec::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                if i == j {
                    continue;
                }
                let value = self.get(i, j);
                if value >= lo && value <= hi {
                    values.push(value);
                }
            }
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
    }

    /// Overlap graph at zoom `k`: pairs whose threshold lies above `k` still
    /// intersect.
    pub fn adjacency_above(&self, k: f64) -> AdjacencyMatrix {
        let mut adjacency = AdjacencyMatrix::new(self.rows, self.cols);
        for (idx, value) in self.data.iter().enumerate() {
            let (row, col) = (idx / self.cols, idx % self.cols);
            if row != col && *value > k {
                adjacency.data[idx] = 1;
            }
        }
        adjacency
    }
}

impl AdjacencyMatrix {
    #[inline]
    pub fn connected(&self, i: usize, j: usize) -> bool {
        self.get(i, j) != 0
    }
}
