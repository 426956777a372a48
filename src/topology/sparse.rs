//! Sparse GF(2) Matrices with Logical Permutations
//!
//! Storage is column-sparse: each physical column keeps the set of physical
//! rows holding a one, and columns with no ones are not stored at all. Two
//! permutations translate logical indices (what callers see) into physical
//! ones, so swapping two logical rows or columns never moves data.
//!
//! ## Low Cache
//!
//! The reduction and the vineyard update constantly ask two questions:
//! which row holds the lowest one of column j, and which column has its
//! lowest one in row i. Both are answered from a cache:
//!
//! - `low_by_col[p]`: physical row of the lowest one in physical column `p`
//! - `low_by_row[q]`: physical columns whose lowest one is physical row `q`
//!
//! Column additions and `set` recompute the low of the touched column. A
//! swap of adjacent logical rows `i, i+1` only changes the low of columns
//! that had their low in row `i+1` and also hold a one in row `i`. Any other
//! row swap rescans every column.

use ndarray::Array2;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{Axis, Result, VineyardError};

/// Logical ↔ physical index map, both directions kept in lockstep. Callers
/// bounds-check before indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Permutation {
    /// logical → physical
    forward: Vec<usize>,
    /// physical → logical
    inverse: Vec<usize>,
}

impl Permutation {
    fn identity(n: usize) -> Self {
        Self { forward: (0..n).collect(), inverse: (0..n).collect() }
    }

    fn to_physical(&self, logical: usize) -> usize {
        self.forward[logical]
    }

    fn to_logical(&self, physical: usize) -> usize {
        self.inverse[physical]
    }

    /// Exchange the physical slots behind logical indices `a` and `b`.
    fn swap(&mut self, a: usize, b: usize) {
        self.forward.swap(a, b);
        self.inverse[self.forward[a]] = a;
        self.inverse[self.forward[b]] = b;
    }

    fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &p)| i == p)
    }
}

/// Sparse column representation (physical row indices)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SparseColumn {
    /// Non-zero row indices (stored in BTreeSet for efficient operations)
    rows: BTreeSet<usize>,
}

impl SparseColumn {
    fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self { rows: indices.into_iter().collect() }
    }

    fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Flip a single entry
    fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }

    /// XOR (symmetric difference) with another column - addition in Z/2Z
    fn add_assign(&mut self, other: &SparseColumn) {
        for &row in &other.rows {
            self.toggle(row);
        }
    }
}

/// Column-sparse boolean matrix over GF(2)
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    nrows: usize,
    ncols: usize,
    /// physical column → ones in that column (physical rows)
    columns: HashMap<usize, SparseColumn>,
    row_perm: Permutation,
    col_perm: Permutation,
    /// physical column → physical row of its lowest one
    low_by_col: Vec<Option<usize>>,
    /// physical row → physical columns whose lowest one sits there
    low_by_row: Vec<Vec<usize>>,
}

impl SparseMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            columns: HashMap::new(),
            row_perm: Permutation::identity(nrows),
            col_perm: Permutation::identity(ncols),
            low_by_col: vec![None; ncols],
            low_by_row: vec![Vec::new(); nrows],
        }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_columns(n, n, (0..n).map(|j| vec![j]))
    }

    /// Build from logical columns, each given as its list of logical rows.
    /// Repeated rows cancel.
    pub(crate) fn from_columns<I, C>(nrows: usize, ncols: usize, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = usize>,
    {
        let mut matrix = Self::zeros(nrows, ncols);
        for (j, rows) in columns.into_iter().enumerate().take(ncols) {
            let mut column = SparseColumn::default();
            for r in rows.into_iter().filter(|&r| r < nrows) {
                column.toggle(r);
            }
            if !column.is_zero() {
                matrix.columns.insert(j, column);
            }
        }
        matrix.rebuild_low_cache();
        matrix
    }

    /// Import a dense 0/1 matrix; entries are read modulo 2.
    pub fn from_dense(dense: &Array2<u8>) -> Self {
        let (nrows, ncols) = dense.dim();
        let columns = (0..ncols).map(|j| {
            (0..nrows)
                .filter(|&i| dense[[i, j]] & 1 == 1)
                .collect::<Vec<_>>()
        });
        Self::from_columns(nrows, ncols, columns)
    }

    pub fn to_dense(&self) -> Array2<u8> {
        let mut dense = Array2::zeros((self.nrows, self.ncols));
        for (&pc, column) in &self.columns {
            let j = self.col_perm.to_logical(pc);
            for &pr in &column.rows {
                dense[[self.row_perm.to_logical(pr), j]] = 1;
            }
        }
        dense
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.nrows {
            return Err(VineyardError::IndexOutOfBounds {
                index: row,
                extent: self.nrows,
                axis: Axis::Row,
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.ncols {
            return Err(VineyardError::IndexOutOfBounds {
                index: col,
                extent: self.ncols,
                axis: Axis::Column,
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool> {
        self.check_row(row)?;
        self.check_col(col)?;
        let pr = self.row_perm.to_physical(row);
        let pc = self.col_perm.to_physical(col);
        Ok(self.columns.get(&pc).is_some_and(|c| c.contains(pr)))
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        if self.get(row, col)? == value {
            return Ok(());
        }
        let pr = self.row_perm.to_physical(row);
        let pc = self.col_perm.to_physical(col);
        let mut column = self.columns.remove(&pc).unwrap_or_default();
        column.toggle(pr);
        if !column.is_zero() {
            self.columns.insert(pc, column);
        }
        self.refresh_low(pc);
        Ok(())
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_row(a)?;
        self.check_row(b)?;
        if a == b {
            return Ok(());
        }

        let (lo, hi) = (a.min(b), a.max(b));
        if hi - lo == 1 {
            let p_lo = self.row_perm.to_physical(lo);
            let p_hi = self.row_perm.to_physical(hi);
            let moving: Vec<usize> = self.low_by_row[p_hi]
                .iter()
                .copied()
                .filter(|pc| self.columns.get(pc).is_some_and(|c| c.contains(p_lo)))
                .collect();
            self.row_perm.swap(lo, hi);
            for pc in moving {
                self.set_low(pc, Some(p_lo));
            }
        } else {
            self.row_perm.swap(lo, hi);
            self.rebuild_low_cache();
        }
        Ok(())
    }

    pub fn swap_cols(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_col(a)?;
        self.check_col(b)?;
        self.col_perm.swap(a, b);
        Ok(())
    }

    /// Conjugate by the transposition (a b): swap both rows and columns.
    pub fn swap_rows_and_cols(&mut self, a: usize, b: usize) -> Result<()> {
        self.swap_rows(a, b)?;
        self.swap_cols(a, b)
    }

    /// Column `target` += column `source` over GF(2). Adding a column to
    /// itself clears it.
    pub fn add_col(&mut self, target: usize, source: usize) -> Result<()> {
        self.check_col(target)?;
        self.check_col(source)?;
        let pt = self.col_perm.to_physical(target);
        let ps = self.col_perm.to_physical(source);

        if pt == ps {
            self.columns.remove(&pt);
        } else {
            let mut column = self.columns.remove(&pt).unwrap_or_default();
            if let Some(src) = self.columns.get(&ps) {
                column.add_assign(src);
            }
            if !column.is_zero() {
                self.columns.insert(pt, column);
            }
        }
        self.refresh_low(pt);
        Ok(())
    }

    /// Logical row of the lowest one in `col`
    pub fn col_lowest_one(&self, col: usize) -> Result<Option<usize>> {
        self.check_col(col)?;
        let pc = self.col_perm.to_physical(col);
        Ok(self.low_by_col[pc].map(|pr| self.row_perm.to_logical(pr)))
    }

    /// Leftmost logical column whose lowest one is in `row`
    pub fn col_with_lowest_one(&self, row: usize) -> Result<Option<usize>> {
        self.check_row(row)?;
        let pr = self.row_perm.to_physical(row);
        Ok(self.low_by_row[pr]
            .iter()
            .map(|&pc| self.col_perm.to_logical(pc))
            .min())
    }

    pub fn col_is_empty(&self, col: usize) -> Result<bool> {
        self.check_col(col)?;
        Ok(!self.columns.contains_key(&self.col_perm.to_physical(col)))
    }

    /// Logical rows of the ones in `col`, ascending
    pub fn col_entries(&self, col: usize) -> Result<Vec<usize>> {
        self.check_col(col)?;
        Ok(self.logical_rows(self.col_perm.to_physical(col)))
    }

    fn logical_rows(&self, pc: usize) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .columns
            .get(&pc)
            .map(|c| c.rows.iter().map(|&pr| self.row_perm.to_logical(pr)).collect())
            .unwrap_or_default();
        rows.sort_unstable();
        rows
    }

    fn logical_columns(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.ncols).map(|j| self.logical_rows(self.col_perm.to_physical(j)))
    }

    pub fn transpose(&self) -> SparseMatrix {
        let mut rows_of: Vec<Vec<usize>> = vec![Vec::new(); self.nrows];
        for (j, rows) in self.logical_columns().enumerate() {
            for i in rows {
                rows_of[i].push(j);
            }
        }
        Self::from_columns(self.ncols, self.nrows, rows_of)
    }

    /// GF(2) product `self · other`
    pub fn mul(&self, other: &SparseMatrix) -> Result<SparseMatrix> {
        if self.ncols != other.nrows {
            return Err(VineyardError::invariant(format!(
                "cannot multiply {}x{} by {}x{}",
                self.nrows, self.ncols, other.nrows, other.ncols
            )));
        }
        let left: Vec<Vec<usize>> = self.logical_columns().collect();
        let product = other.logical_columns().map(|ks| {
            let mut acc = SparseColumn::default();
            for k in ks {
                for &i in &left[k] {
                    acc.toggle(i);
                }
            }
            acc.rows
        });
        Ok(Self::from_columns(self.nrows, other.ncols, product))
    }

    /// Rewrite storage so that both permutations are the identity. The
    /// logical content is unchanged.
    pub fn bake_permutations(&mut self) {
        if self.row_perm.is_identity() && self.col_perm.is_identity() {
            return;
        }
        let mut columns = HashMap::with_capacity(self.columns.len());
        for (&pc, column) in &self.columns {
            let rows = column.rows.iter().map(|&pr| self.row_perm.to_logical(pr));
            columns.insert(self.col_perm.to_logical(pc), SparseColumn::from_indices(rows));
        }
        self.columns = columns;
        self.row_perm = Permutation::identity(self.nrows);
        self.col_perm = Permutation::identity(self.ncols);
        self.rebuild_low_cache();
    }

    /// Number of ones
    pub fn nnz(&self) -> usize {
        self.columns.values().map(|c| c.rows.len()).sum()
    }

    /// Approximate heap footprint in bytes
    pub fn mem_usage(&self) -> usize {
        use std::mem::size_of;
        let word = size_of::<usize>();
        let permutations = 2 * (self.nrows + self.ncols) * word;
        let cache = self.ncols * size_of::<Option<usize>>()
            + self.nrows * size_of::<Vec<usize>>()
            + self.low_by_row.iter().map(|v| v.capacity() * word).sum::<usize>();
        // map slot (key + set header) plus one B-tree entry per one
        let storage = self.columns.capacity() * (word + size_of::<SparseColumn>())
            + self.nnz() * word;
        size_of::<Self>() + permutations + cache + storage
    }

    /// Every non-empty column has a distinct lowest one.
    pub fn is_reduced(&self) -> bool {
        self.low_by_row.iter().all(|cols| cols.len() <= 1)
    }

    /// Square with ones on the diagonal and zeros below it.
    pub fn is_upper_unitriangular(&self) -> bool {
        if self.nrows != self.ncols {
            return false;
        }
        (0..self.ncols).all(|j| {
            let pc = self.col_perm.to_physical(j);
            self.low_by_col[pc].map(|pr| self.row_perm.to_logical(pr)) == Some(j)
        })
    }

    /// The cache agrees with a fresh scan of the storage.
    pub(crate) fn low_cache_is_consistent(&self) -> bool {
        let by_col = (0..self.ncols).all(|pc| self.low_by_col[pc] == self.physical_low(pc));
        let by_row = self.low_by_row.iter().enumerate().all(|(pr, cols)| {
            cols.iter().all(|&pc| self.low_by_col[pc] == Some(pr))
        });
        let counted: usize = self.low_by_row.iter().map(Vec::len).sum();
        let expected = self.low_by_col.iter().filter(|l| l.is_some()).count();
        by_col && by_row && counted == expected
    }

    /// Physical row of the one with the largest logical row index
    fn physical_low(&self, pc: usize) -> Option<usize> {
        self.columns
            .get(&pc)?
            .rows
            .iter()
            .copied()
            .max_by_key(|&pr| self.row_perm.to_logical(pr))
    }

    fn refresh_low(&mut self, pc: usize) {
        let low = self.physical_low(pc);
        self.set_low(pc, low);
    }

    fn set_low(&mut self, pc: usize, low: Option<usize>) {
        let old = self.low_by_col[pc];
        if old == low {
            return;
        }
        if let Some(pr) = old {
            let bucket = &mut self.low_by_row[pr];
            if let Some(pos) = bucket.iter().position(|&c| c == pc) {
                bucket.swap_remove(pos);
            }
        }
        if let Some(pr) = low {
            self.low_by_row[pr].push(pc);
        }
        self.low_by_col[pc] = low;
    }

    fn rebuild_low_cache(&mut self) {
        self.low_by_col = vec![None; self.ncols];
        self.low_by_row = vec![Vec::new(); self.nrows];
        let lows: Vec<(usize, usize)> = self
            .columns
            .keys()
            .filter_map(|&pc| self.physical_low(pc).map(|pr| (pc, pr)))
            .collect();
        for (pc, pr) in lows {
            self.low_by_col[pc] = Some(pr);
            self.low_by_row[pr].push(pc);
        }
    }
}

/// Logical equality; the permutation state is ignored.
impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.logical_columns().eq(other.logical_columns())
    }
}

impl Eq for SparseMatrix {}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dense = self.to_dense();
        for row in dense.rows() {
            let line: String = row
                .iter()
                .map(|&v| if v == 1 { '×' } else { '·' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
