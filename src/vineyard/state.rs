//! Reduced decompositions pinned to a query point.

use ndarray::{Array1, ArrayView1};
use tracing::info;

use crate::error::{Result, VineyardError};
use crate::topology::{
    boundary_matrix, extract_pairs, gf2_inverse, reduce_matrix, BettiNumbers, BirthDeathPair,
    Complex, Ordering, PersistenceDiagram, SimplexId, SparseMatrix,
};

/// A valid decomposition R·U = D for the filtration centered at `point`.
///
/// R is reduced and U is upper unitriangular. U is kept transposed so that
/// the row operations the vineyard update performs on U become column
/// operations on `u_t`.
#[derive(Debug, Clone)]
pub struct VineyardState {
    /// Query point the filtration is centered at
    pub(crate) point: Array1<f64>,
    /// Column of every simplex
    pub(crate) ordering: Ordering,
    /// Boundary matrix D
    pub(crate) boundary: SparseMatrix,
    /// Reduced matrix R
    pub(crate) reduced: SparseMatrix,
    /// Uᵀ
    pub(crate) u_t: SparseMatrix,
}

/// Reduce the boundary matrix of `complex` from scratch for a filtration
/// centered at `point`.
pub fn reduce(complex: &Complex, point: ArrayView1<f64>) -> Result<VineyardState> {
    let ordering = Ordering::by_distance(complex, point)?;
    let boundary = boundary_matrix(complex, &ordering)?;
    let reduction = reduce_matrix(&boundary)?;
    let v = reduction.change_of_basis()?;
    let u = gf2_inverse(&v)?;

    info!(
        simplices = complex.len(),
        column_adds = reduction.column_adds.len(),
        nnz = reduction.reduced.nnz(),
        "reduced boundary matrix from scratch"
    );

    Ok(VineyardState {
        point: point.to_owned(),
        ordering,
        boundary,
        reduced: reduction.reduced,
        u_t: u.transpose(),
    })
}

impl VineyardState {
    pub fn point(&self) -> ArrayView1<'_, f64> {
        self.point.view()
    }

    pub fn ordering(&self) -> &Ordering {
        &self.ordering
    }

    /// D
    pub fn boundary(&self) -> &SparseMatrix {
        &self.boundary
    }

    /// R
    pub fn reduced(&self) -> &SparseMatrix {
        &self.reduced
    }

    /// Uᵀ as stored
    pub fn u_transposed(&self) -> &SparseMatrix {
        &self.u_t
    }

    /// U, materialized
    pub fn u(&self) -> SparseMatrix {
        self.u_t.transpose()
    }

    /// Does `id` kill a class (non-zero column in R)?
    pub fn gives_death(&self, id: SimplexId) -> Option<bool> {
        let column = self.ordering.column(id)?;
        self.reduced.col_is_empty(column).ok().map(|empty| !empty)
    }

    /// Simplex whose column has its lowest one in the row of `id`, i.e. the
    /// simplex killing the class `id` created.
    pub fn killer_of(&self, id: SimplexId) -> Option<SimplexId> {
        let column = self.ordering.column(id)?;
        let killer = self.reduced.col_with_lowest_one(column).ok()??;
        self.ordering.simplex_at(killer)
    }

    /// Simplex whose class `id` kills. `None` when `id` gives birth, and for
    /// the vertex that kills the class of the empty simplex.
    pub fn victim_of(&self, id: SimplexId) -> Option<SimplexId> {
        let column = self.ordering.column(id)?;
        let low = self.reduced.col_lowest_one(column).ok()??;
        self.ordering.simplex_at(low)
    }

    /// Lifetime of the class `id` takes part in, as creator or as killer.
    /// Essential classes live forever. `None` for the vertex that kills the
    /// class of the empty simplex, which has no finite birth.
    pub fn persistence_of(&self, id: SimplexId) -> Option<f64> {
        let column = self.ordering.column(id)?;
        let value = self.ordering.column_value(column);
        match self.reduced.col_lowest_one(column).ok()? {
            Some(0) => None,
            Some(low) => Some(value - self.ordering.column_value(low)),
            None => Some(match self.reduced.col_with_lowest_one(column).ok()? {
                Some(killer) => self.ordering.column_value(killer) - value,
                None => f64::INFINITY,
            }),
        }
    }

    /// Lifetime of the class created by `id`, if some simplex kills it
    pub fn killed_persistence(&self, id: SimplexId) -> Option<f64> {
        let killer = self.killer_of(id)?;
        Some(self.ordering.entrance_value(killer)? - self.ordering.entrance_value(id)?)
    }

    pub fn birth_death_pairs(&self) -> Result<Vec<BirthDeathPair>> {
        extract_pairs(&self.reduced, &self.ordering)
    }

    pub fn persistence_diagram(&self) -> Result<PersistenceDiagram> {
        Ok(PersistenceDiagram::from_pairs(self.birth_death_pairs()?))
    }

    pub fn betti_numbers(&self) -> Result<BettiNumbers> {
        Ok(BettiNumbers::from_pairs(&self.birth_death_pairs()?))
    }

    /// R reduced, U upper unitriangular, R·U = D.
    pub fn check_invariants(&self) -> Result<()> {
        check_decomposition(&self.boundary, &self.reduced, &self.u_t)
    }

    /// Approximate heap footprint of the three matrices, in bytes
    pub fn mem_usage(&self) -> usize {
        self.boundary.mem_usage() + self.reduced.mem_usage() + self.u_t.mem_usage()
    }
}

pub(crate) fn check_decomposition(
    boundary: &SparseMatrix,
    reduced: &SparseMatrix,
    u_t: &SparseMatrix,
) -> Result<()> {
    if !reduced.low_cache_is_consistent() || !u_t.low_cache_is_consistent() {
        return Err(VineyardError::invariant("lowest-one cache out of sync"));
    }
    if !reduced.is_reduced() {
        return Err(VineyardError::invariant("R is not reduced"));
    }
    let u = u_t.transpose();
    if !u.is_upper_unitriangular() {
        return Err(VineyardError::invariant("U is not upper unitriangular"));
    }
    if reduced.mul(&u)? != *boundary {
        return Err(VineyardError::invariant("R·U differs from D"));
    }
    Ok(())
}
