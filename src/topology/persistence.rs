//! Birth/Death Pairs and Persistence Diagrams
//!
//! A column of the reduced matrix R either is zero, and its simplex gives
//! birth to a homology class, or has its lowest one in row i, and its
//! simplex kills the class born by the simplex in column i. Each birth
//! column therefore yields exactly one pair; classes nobody kills are
//! essential and die at +∞.
//!
//! Row and column 0 stand for the empty simplex. Its class has dimension −1
//! and is killed by the first vertex of the filtration.

use serde::{Deserialize, Serialize};

use super::betti::BettiNumbers;
use super::complex::SimplexId;
use super::ordering::Ordering;
use super::sparse::SparseMatrix;
use crate::error::{Result, VineyardError};

/// One persistent homology class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirthDeathPair {
    /// Homology dimension of the class; −1 for the empty simplex
    pub dim: isize,
    /// Simplex creating the class (`None` for the empty simplex)
    pub birth: Option<SimplexId>,
    /// Simplex killing the class (`None` when essential)
    pub death: Option<SimplexId>,
    /// Entrance value of the birth simplex (−∞ for the empty simplex)
    pub birth_value: f64,
    /// Entrance value of the death simplex (+∞ when essential)
    pub death_value: f64,
}

impl BirthDeathPair {
    pub fn persistence(&self) -> f64 {
        self.death_value - self.birth_value
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }
}

/// Read the pairing off a reduced matrix laid out in `ordering`'s order.
///
/// Pairs come out sorted by the column of their birth simplex.
pub fn extract_pairs(reduced: &SparseMatrix, ordering: &Ordering) -> Result<Vec<BirthDeathPair>> {
    let n = reduced.ncols();
    if n != ordering.len() {
        return Err(VineyardError::invariant(format!(
            "reduced matrix has {} columns, ordering has {}",
            n,
            ordering.len()
        )));
    }

    let mut pairs = Vec::new();
    for column in 0..n {
        if !reduced.col_is_empty(column)? {
            continue;
        }
        let birth = ordering.simplex_at(column);
        let killer = reduced.col_with_lowest_one(column)?;
        pairs.push(BirthDeathPair {
            dim: birth.map_or(-1, |id| id.dim as isize),
            birth,
            death: killer.and_then(|k| ordering.simplex_at(k)),
            birth_value: ordering.column_value(column),
            death_value: killer.map_or(f64::INFINITY, |k| ordering.column_value(k)),
        });
    }
    Ok(pairs)
}

/// Collection of birth/death pairs with summary statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceDiagram {
    pub pairs: Vec<BirthDeathPair>,
}

impl PersistenceDiagram {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Keep every essential pair and every finite pair of positive
    /// persistence.
    pub fn from_pairs(pairs: impl IntoIterator<Item = BirthDeathPair>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .filter(|p| p.is_essential() || p.persistence() > 0.0)
                .collect(),
        }
    }

    /// Get pairs for dimension d
    pub fn dim(&self, d: isize) -> Vec<&BirthDeathPair> {
        self.pairs.iter().filter(|p| p.dim == d).collect()
    }

    /// Get finite pairs for dimension d
    pub fn finite_intervals(&self, d: isize) -> Vec<&BirthDeathPair> {
        self.pairs
            .iter()
            .filter(|p| p.dim == d && !p.is_essential())
            .collect()
    }

    pub fn essential(&self, d: isize) -> Vec<&BirthDeathPair> {
        self.pairs
            .iter()
            .filter(|p| p.dim == d && p.is_essential())
            .collect()
    }

    /// Persistence entropy of the finite pairs in dimension d
    pub fn persistence_entropy(&self, d: isize) -> f64 {
        let lifetimes: Vec<f64> = self
            .finite_intervals(d)
            .into_iter()
            .map(BirthDeathPair::persistence)
            .filter(|&p| p > 0.0 && p.is_finite())
            .collect();

        let total: f64 = lifetimes.iter().sum();
        if lifetimes.is_empty() || total <= 0.0 {
            return 0.0;
        }

        let mut entropy = 0.0;
        for p in lifetimes {
            let prob = p / total;
            entropy -= prob * prob.ln();
        }
        entropy
    }

    /// Total persistence for dimension d
    pub fn total_persistence(&self, d: isize) -> f64 {
        self.finite_intervals(d)
            .into_iter()
            .map(BirthDeathPair::persistence)
            .filter(|p| p.is_finite())
            .sum()
    }

    /// Number of finite pairs in dimension d
    pub fn count(&self, d: isize) -> usize {
        self.finite_intervals(d).len()
    }

    pub fn betti_numbers(&self) -> BettiNumbers {
        BettiNumbers::from_pairs(&self.pairs)
    }
}

impl Default for PersistenceDiagram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::complex::Complex;
    use crate::topology::reduction::{boundary_matrix, reduce_matrix};
    use ndarray::array;

    fn pairs_at(complex: &Complex, x: f64, y: f64) -> (Ordering, Vec<BirthDeathPair>) {
        let ordering = Ordering::by_distance(complex, array![x, y].view()).unwrap();
        let d = boundary_matrix(complex, &ordering).unwrap();
        let r = reduce_matrix(&d).unwrap().reduced;
        let pairs = extract_pairs(&r, &ordering).unwrap();
        (ordering, pairs)
    }

    #[test]
    fn test_empty_simplex_killed_by_first_vertex() {
        let points = array![[0.0, 0.0], [1.0, 0.0]];
        let complex = Complex::new(points, &[[0, 1]], &[]).unwrap();
        let (_, pairs) = pairs_at(&complex, 0.0, 0.0);

        // the empty simplex and v1 are births; v0 and e0 kill them
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].dim, -1);
        assert_eq!(pairs[0].birth, None);
        assert_eq!(pairs[0].death, Some(SimplexId::vertex(0)));
        assert_eq!(pairs[0].birth_value, f64::NEG_INFINITY);
        assert!(!pairs[0].is_essential());

        assert_eq!(pairs[1].dim, 0);
        assert_eq!(pairs[1].birth, Some(SimplexId::vertex(1)));
        assert_eq!(pairs[1].death, Some(SimplexId::edge(0)));
        assert_eq!(pairs[1].persistence(), 0.0);
        assert_eq!(BettiNumbers::from_pairs(&pairs), BettiNumbers::new(1, 0, 0));
    }

    #[test]
    fn test_square_loop_diagram() {
        let points = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let complex = Complex::cycle(points).unwrap();
        let (_, pairs) = pairs_at(&complex, 0.2, 0.1);
        let diagram = PersistenceDiagram::from_pairs(pairs.iter().copied());

        let loops = diagram.essential(1);
        assert_eq!(loops.len(), 1);
        assert!(diagram.finite_intervals(1).is_empty());

        // each vertex is joined to the component of v0 the moment it enters
        assert!(diagram.essential(0).is_empty());
        assert_eq!(diagram.count(0), 0);
        assert_eq!(diagram.total_persistence(0), 0.0);
        assert_eq!(diagram.persistence_entropy(0), 0.0);
        assert_eq!(diagram.dim(-1).len(), 1);

        let betti = diagram.betti_numbers();
        assert_eq!(betti.beta_0, 1);
        assert_eq!(betti.beta_1, 1);
    }

    #[test]
    fn test_entropy_of_equal_lifetimes() {
        let pair = |b: f64, d: f64| BirthDeathPair {
            dim: 0,
            birth: Some(SimplexId::vertex(0)),
            death: Some(SimplexId::edge(0)),
            birth_value: b,
            death_value: d,
        };
        let diagram = PersistenceDiagram::from_pairs(vec![pair(0.0, 1.0), pair(1.0, 2.0), pair(3.0, 3.0)]);
        // zero-length pair dropped, two equal lifetimes left
        assert_eq!(diagram.count(0), 2);
        assert!((diagram.persistence_entropy(0) - 2.0_f64.ln()).abs() < 1e-12);
        assert!((diagram.total_persistence(0) - 2.0).abs() < 1e-12);
    }
}
