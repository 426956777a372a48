//! Boundary Matrix Reduction over GF(2)
//!
//! ## Algorithm Overview
//!
//! 1. Lay out the boundary matrix D in filtration order, with column and
//!    row 0 standing for the empty simplex
//! 2. Reduce left to right: while an earlier column shares the lowest one
//!    of column j, add it into j
//! 3. Keep the sequence of column additions, which is all that is needed to
//!    rebuild V (R = D·V) and U = V⁻¹ (R·U = D)
//!
//! ## Reference
//!
//! Edelsbrunner, Letscher, Zomorodian (2002). "Topological Persistence
//! and Simplification". Discrete & Computational Geometry.

use serde::{Deserialize, Serialize};

use super::complex::{Complex, SimplexId};
use super::ordering::Ordering;
use super::sparse::SparseMatrix;
use crate::error::{Result, VineyardError};

/// `column[target] += column[source]`, recorded during reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAdd {
    pub target: usize,
    pub source: usize,
}

/// Outcome of the standard reduction
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Reduced matrix R
    pub reduced: SparseMatrix,
    /// Every column addition, in the order it was applied
    pub column_adds: Vec<ColumnAdd>,
}

impl Reduction {
    /// Replay the column additions on the identity: R = D·V.
    pub fn change_of_basis(&self) -> Result<SparseMatrix> {
        let mut v = SparseMatrix::identity(self.reduced.ncols());
        for add in &self.column_adds {
            v.add_col(add.target, add.source)?;
        }
        Ok(v)
    }
}

/// Boundary matrix of `complex` with rows and columns in `ordering`'s order.
///
/// Vertices have a single one in row 0, the empty simplex, so the matrix
/// computes reduced homology.
pub fn boundary_matrix(complex: &Complex, ordering: &Ordering) -> Result<SparseMatrix> {
    let n = ordering.len();
    if n != complex.len() + 1 {
        return Err(VineyardError::invariant(format!(
            "ordering has {} columns but the complex has {} simplices",
            n,
            complex.len()
        )));
    }

    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (position, &id) in ordering.iter().enumerate() {
        let rows = &mut columns[position + 1];
        if id.dim == 0 {
            rows.push(0);
            continue;
        }
        let simplex = complex
            .simplex(id)
            .ok_or_else(|| VineyardError::invariant(format!("{} is not in the complex", id)))?;
        for &face in &simplex.boundary {
            let face_id = SimplexId::new(id.dim - 1, face);
            let row = ordering
                .column(face_id)
                .ok_or_else(|| VineyardError::invariant(format!("{} has no column", face_id)))?;
            rows.push(row);
        }
    }

    Ok(SparseMatrix::from_columns(n, n, columns))
}

/// Standard left-to-right reduction of `boundary`.
pub fn reduce_matrix(boundary: &SparseMatrix) -> Result<Reduction> {
    let mut reduced = boundary.clone();
    let mut column_adds = Vec::new();

    for j in 0..reduced.ncols() {
        while let Some(low) = reduced.col_lowest_one(j)? {
            match reduced.col_with_lowest_one(low)? {
                Some(pivot) if pivot < j => {
                    reduced.add_col(j, pivot)?;
                    column_adds.push(ColumnAdd { target: j, source: pivot });
                }
                _ => break,
            }
        }
    }

    Ok(Reduction { reduced, column_adds })
}

/// Inverse over GF(2) by Gauss–Jordan elimination on columns.
///
/// The same column operations that turn `matrix` into the identity are
/// applied to the identity, which then holds the inverse.
pub fn gf2_inverse(matrix: &SparseMatrix) -> Result<SparseMatrix> {
    let n = matrix.ncols();
    if matrix.nrows() != n {
        return Err(VineyardError::invariant(format!(
            "cannot invert a {}x{} matrix",
            matrix.nrows(),
            n
        )));
    }

    let mut work = matrix.clone();
    let mut inverse = SparseMatrix::identity(n);

    for i in 0..n {
        let mut pivot = None;
        for c in i..n {
            if work.get(i, c)? {
                pivot = Some(c);
                break;
            }
        }
        let pivot = pivot
            .ok_or_else(|| VineyardError::invariant(format!("singular matrix: no pivot in row {}", i)))?;
        if pivot != i {
            work.swap_cols(i, pivot)?;
            inverse.swap_cols(i, pivot)?;
        }
        for k in 0..n {
            if k != i && work.get(i, k)? {
                work.add_col(k, i)?;
                inverse.add_col(k, i)?;
            }
        }
    }

    inverse.bake_permutations();
    Ok(inverse)
}
