//! Topology Module: Complexes, Boundary Matrices and Persistent Homology
//!
//! Implements the mathematical structures the vineyard engine works on:
//! - Simplicial complexes of dimension ≤ 2 with a coboundary index
//! - Filtration orderings by distance to a query point
//! - Sparse GF(2) matrices with O(1) logical row/column swaps
//! - Boundary-matrix reduction and birth/death pairing
//! - Betti numbers
//!
//! ## Mathematical Background
//!
//! For a query point x, every vertex enters the filtration at its squared
//! distance to x and every higher simplex together with its last face. The
//! boundary matrix D of this filtration, over GF(2), factors as R = D·V
//! with R reduced (no two non-zero columns share their lowest one) and V
//! upper unitriangular. The lowest ones of R pair each simplex that kills a
//! homology class with the simplex that created it.
//!
//! ## Reduced Homology
//!
//! Row and column 0 of every matrix stand for the empty simplex and each
//! vertex has a one in row 0. The first vertex of a filtration therefore
//! kills the (−1)-dimensional class of the empty simplex.

mod betti;
mod complex;
mod ordering;
mod persistence;
mod reduction;
mod sparse;

pub use betti::BettiNumbers;
pub use complex::{Complex, Simplex, SimplexId, MAX_DIM};
pub use ordering::{Ordering, Transposition};
pub use persistence::{extract_pairs, BirthDeathPair, PersistenceDiagram};
pub use reduction::{boundary_matrix, gf2_inverse, reduce_matrix, ColumnAdd, Reduction};
pub use sparse::SparseMatrix;
