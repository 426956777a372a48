//! Filtration Orderings Centered at a Query Point
//!
//! The filtration value ("entrance value") of a vertex is its squared
//! distance to the query point; an edge or triangle enters with the largest
//! value among its faces. Sorting by `(entrance, dim, index)` gives a total
//! order in which every simplex follows its faces.
//!
//! Column 0 of every boundary matrix is reserved for the empty simplex, so
//! the simplex at sorted position `p` owns column `p + 1`.
//!
//! ## Moving the Query Point
//!
//! Two orderings of the same complex differ by a permutation. The vineyard
//! update consumes that permutation as a sequence of adjacent swaps, which
//! `transpositions` produces by bubble-sorting one order into the other.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::complex::{Complex, SimplexId, MAX_DIM};
use crate::error::{Result, VineyardError};

/// One adjacent swap: the simplices in columns `column` and `column + 1`
/// trade places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transposition {
    /// Left column of the swap (never 0, the empty simplex does not move)
    pub column: usize,
    /// Simplex in `column` before the swap
    pub first: SimplexId,
    /// Simplex in `column + 1` before the swap
    pub second: SimplexId,
}

/// Bijection between simplices and boundary-matrix columns
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    /// `order[p]` owns column `p + 1`
    order: Vec<SimplexId>,
    /// `columns[dim][index]`: column of simplex `(dim, index)`
    columns: [Vec<usize>; MAX_DIM + 1],
    /// `entrance[dim][index]`: filtration value of simplex `(dim, index)`
    entrance: [Vec<f64>; MAX_DIM + 1],
}

impl Ordering {
    /// Order the simplices of `complex` by their distance to `point`.
    pub fn by_distance(complex: &Complex, point: ArrayView1<f64>) -> Result<Self> {
        let entrance = complex.entrance_values(point)?;
        Self::from_entrance_values(complex, entrance)
    }

    /// Order the simplices of `complex` by precomputed entrance values,
    /// one vector per dimension.
    pub fn from_entrance_values(
        complex: &Complex,
        entrance: [Vec<f64>; MAX_DIM + 1],
    ) -> Result<Self> {
        for (dim, values) in entrance.iter().enumerate() {
            let expected = complex.simplices(dim).len();
            if values.len() != expected {
                return Err(VineyardError::invariant(format!(
                    "{} entrance values for {} simplices of dimension {}",
                    values.len(),
                    expected,
                    dim
                )));
            }
        }

        let mut order: Vec<SimplexId> = complex.ids().collect();
        order.sort_by(|a, b| {
            entrance[a.dim][a.index]
                .total_cmp(&entrance[b.dim][b.index])
                .then(a.cmp(b))
        });

        let mut columns = [
            vec![0; complex.n_vertices()],
            vec![0; complex.n_edges()],
            vec![0; complex.n_triangles()],
        ];
        for (position, id) in order.iter().enumerate() {
            columns[id.dim][id.index] = position + 1;
        }

        let ordering = Self { order, columns, entrance };
        ordering.validate(complex)?;
        Ok(ordering)
    }

    /// Every simplex must sit in a later column than each of its faces.
    fn validate(&self, complex: &Complex) -> Result<()> {
        for dim in 1..=MAX_DIM {
            for simplex in complex.simplices(dim) {
                let column = self.columns[dim][simplex.index];
                for &face in &simplex.boundary {
                    if self.columns[dim - 1][face] >= column {
                        return Err(VineyardError::OrderingInconsistent {
                            simplex: simplex.id(),
                            face: SimplexId::new(dim - 1, face),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of matrix columns, the empty simplex included
    pub fn len(&self) -> usize {
        self.order.len() + 1
    }

    /// True when there are no simplices besides the empty one
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Column owned by `id`
    pub fn column(&self, id: SimplexId) -> Option<usize> {
        self.columns.get(id.dim).and_then(|c| c.get(id.index)).copied()
    }

    /// Simplex owning `column`; `None` for column 0 (the empty simplex)
    pub fn simplex_at(&self, column: usize) -> Option<SimplexId> {
        column.checked_sub(1).and_then(|p| self.order.get(p)).copied()
    }

    pub fn entrance_value(&self, id: SimplexId) -> Option<f64> {
        self.entrance.get(id.dim).and_then(|e| e.get(id.index)).copied()
    }

    /// Entrance value of the simplex in `column`; the empty simplex enters
    /// at −∞.
    pub fn column_value(&self, column: usize) -> f64 {
        self.simplex_at(column)
            .and_then(|id| self.entrance_value(id))
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Simplices in filtration order
    pub fn iter(&self) -> impl Iterator<Item = &SimplexId> {
        self.order.iter()
    }

    /// Adjacent swaps turning this order into `other`.
    ///
    /// This is a bubble sort keyed on the columns in `other`. Only the span
    /// between the first and the last disagreeing position is visited, and
    /// each pass stops at the last swap of the previous one; neither shortcut
    /// changes the produced sequence, whose length is the number of
    /// inversions between the two orders.
    pub fn transpositions(&self, other: &Ordering) -> Result<Vec<Transposition>> {
        let same_shape = self.order.len() == other.order.len()
            && self.columns.iter().zip(&other.columns).all(|(a, b)| a.len() == b.len());
        if !same_shape {
            return Err(VineyardError::invariant(
                "cannot transpose between orderings of different complexes",
            ));
        }

        // target[p]: sorted position, in `other`, of the simplex at position p here
        let mut target: Vec<usize> = self
            .order
            .iter()
            .map(|&id| other.columns[id.dim][id.index] - 1)
            .collect();
        let n = target.len();

        let Some(lo) = (0..n).find(|&p| target[p] != p) else {
            return Ok(Vec::new());
        };
        let hi = (0..n).rev().find(|&p| target[p] != p).unwrap_or(lo);

        let mut current: Vec<SimplexId> = self.order.clone();
        let mut swaps = Vec::new();
        let mut end = hi;
        while end > lo {
            let mut last_swap = lo;
            for j in lo..end {
                if target[j] > target[j + 1] {
                    swaps.push(Transposition {
                        column: j + 1,
                        first: current[j],
                        second: current[j + 1],
                    });
                    target.swap(j, j + 1);
                    current.swap(j, j + 1);
                    last_swap = j;
                }
            }
            end = last_swap;
        }

        Ok(swaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line() -> Complex {
        // v0 -- v1 -- v2 on the x axis
        let points = array![[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
        Complex::new(points, &[[0, 1], [1, 2]], &[]).unwrap()
    }

    #[test]
    fn test_faces_before_cofaces() {
        let c = line();
        let o = Ordering::by_distance(&c, array![0.0, 0.0].view()).unwrap();

        assert_eq!(o.len(), 6);
        assert_eq!(o.simplex_at(0), None);
        assert_eq!(o.simplex_at(1), Some(SimplexId::vertex(0)));
        // e0 enters at 1.0 together with v1; the vertex wins the tie
        assert_eq!(o.simplex_at(2), Some(SimplexId::vertex(1)));
        assert_eq!(o.simplex_at(3), Some(SimplexId::edge(0)));
        assert_eq!(o.simplex_at(4), Some(SimplexId::vertex(2)));
        assert_eq!(o.simplex_at(5), Some(SimplexId::edge(1)));
        assert_eq!(o.column_value(0), f64::NEG_INFINITY);
        assert_eq!(o.entrance_value(SimplexId::edge(1)), Some(4.0));
    }

    #[test]
    fn test_inconsistent_entrance_values() {
        let c = line();
        // edge 0 claims to enter before both of its vertices
        let values = [vec![1.0, 2.0, 3.0], vec![0.5, 3.0], vec![]];
        let err = Ordering::from_entrance_values(&c, values).unwrap_err();
        assert!(matches!(
            err,
            VineyardError::OrderingInconsistent { simplex, .. } if simplex == SimplexId::edge(0)
        ));
    }

    #[test]
    fn test_transpositions_identity() {
        let c = line();
        let a = Ordering::by_distance(&c, array![0.0, 0.0].view()).unwrap();
        let b = Ordering::by_distance(&c, array![0.1, 0.3].view()).unwrap();
        assert!(a.transpositions(&b).unwrap().is_empty());
    }

    #[test]
    fn test_transpositions_reverse_line() {
        let c = line();
        let a = Ordering::by_distance(&c, array![0.0, 0.0].view()).unwrap();
        let b = Ordering::by_distance(&c, array![2.0, 0.0].view()).unwrap();
        // a: v0 v1 e0 v2 e1    b: v2 v1 e1 v0 e0
        let swaps = a.transpositions(&b).unwrap();

        let mut order: Vec<SimplexId> = a.iter().copied().collect();
        for t in &swaps {
            assert_eq!(order[t.column - 1], t.first);
            assert_eq!(order[t.column], t.second);
            order.swap(t.column - 1, t.column);
        }
        let expected: Vec<SimplexId> = b.iter().copied().collect();
        assert_eq!(order, expected);

        let pos_b = |id: &SimplexId| b.column(*id).unwrap();
        let a_order: Vec<SimplexId> = a.iter().copied().collect();
        let mut inversions = 0;
        for i in 0..a_order.len() {
            for j in i + 1..a_order.len() {
                if pos_b(&a_order[i]) > pos_b(&a_order[j]) {
                    inversions += 1;
                }
            }
        }
        assert_eq!(swaps.len(), inversions);
    }
}
