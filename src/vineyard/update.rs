//! The vine update: one adjacent transposition at a time.
//!
//! Swapping simplices σᵢ and σᵢ₊₁ conjugates D by the transposition matrix
//! P. The products P·R·P and P·U·P stay a valid decomposition of P·D·P
//! except where R loses its reduced form or U its upper triangularity, and
//! each of the four cases below repairs that with at most two additions.
//!
//! | σᵢ    | σᵢ₊₁  | repair                                    | pairing     |
//! |-------|-------|-------------------------------------------|-------------|
//! | birth | birth | add the earlier of k, l into the later    | may switch  |
//! | death | death | add i into i+1 when U[i, i+1] = 1         | may switch  |
//! | death | birth | add, swap, add when U[i, i+1] = 1         | Faustian    |
//! | birth | death | clear U[i, i+1]                           | unchanged   |
//!
//! where k and l are the columns with their lowest one in rows i and i+1.
//!
//! ## Reference
//!
//! Cohen-Steiner, Edelsbrunner, Morozov (2006). "Vines and Vineyards by
//! Updating Persistence in Linear Time". SoCG.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::{debug, trace};

use super::state::{check_decomposition, VineyardState};
use crate::error::{Result, VineyardError};
use crate::topology::{Complex, Ordering, SimplexId, SparseMatrix, Transposition};

/// Which simplices of a transposed pair give birth or death
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapCase {
    BirthBirth,
    DeathDeath,
    DeathBirth,
    BirthDeath,
}

impl SwapCase {
    fn index(self) -> usize {
        match self {
            SwapCase::BirthBirth => 0,
            SwapCase::DeathDeath => 1,
            SwapCase::DeathBirth => 2,
            SwapCase::BirthDeath => 3,
        }
    }
}

/// Effect of one transposition on the birth/death pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingChange {
    /// Pairs keep their partners
    Unchanged,
    /// Two pairs exchange partners without a jump in persistence
    Switch,
    /// The pairing jumps: a Faustian swap
    Faustian,
}

/// A Faustian swap between two simplices of the same dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlaggedPair {
    /// Simplex in column i before the swap
    pub first: SimplexId,
    /// Simplex in column i+1 before the swap
    pub second: SimplexId,
    pub dim: usize,
}

/// Counters for one or more vine updates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VineStats {
    pub transpositions: usize,
    /// Indexed birth-birth, death-death, death-birth, birth-death
    pub case_counts: [usize; 4],
    pub faustian: usize,
    pub switches: usize,
    pub pruned: usize,
}

impl VineStats {
    pub fn record(&mut self, case: SwapCase, change: PairingChange) {
        self.transpositions += 1;
        self.case_counts[case.index()] += 1;
        match change {
            PairingChange::Unchanged => {}
            PairingChange::Switch => self.switches += 1,
            PairingChange::Faustian => self.faustian += 1,
        }
    }

    pub fn count(&self, case: SwapCase) -> usize {
        self.case_counts[case.index()]
    }
}

impl AddAssign for VineStats {
    fn add_assign(&mut self, other: Self) {
        self.transpositions += other.transpositions;
        for (mine, theirs) in self.case_counts.iter_mut().zip(other.case_counts) {
            *mine += theirs;
        }
        self.faustian += other.faustian;
        self.switches += other.switches;
        self.pruned += other.pruned;
    }
}

impl Add for VineStats {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for VineStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// D, R and Uᵀ while they are being updated
struct Decomposition {
    boundary: SparseMatrix,
    reduced: SparseMatrix,
    u_t: SparseMatrix,
}

impl Decomposition {
    /// U[i, i+1]
    fn u_above_diagonal(&self, i: usize) -> Result<bool> {
        self.u_t.get(i + 1, i)
    }

    fn swap_plain(&mut self, i: usize) -> Result<()> {
        self.reduced.swap_rows_and_cols(i, i + 1)?;
        self.u_t.swap_rows_and_cols(i, i + 1)
    }

    fn birth_birth(&mut self, i: usize) -> Result<PairingChange> {
        self.u_t.set(i + 1, i, false)?;
        let k = self.reduced.col_with_lowest_one(i)?;
        let l = self.reduced.col_with_lowest_one(i + 1)?;

        if let (Some(k), Some(l)) = (k, l) {
            if self.reduced.get(i, l)? {
                // k and l lie right of i + 1, the swap leaves them in place
                self.swap_plain(i)?;
                return if k < l {
                    self.reduced.add_col(l, k)?;
                    self.u_t.add_col(k, l)?;
                    Ok(PairingChange::Unchanged)
                } else if l < k {
                    self.reduced.add_col(k, l)?;
                    self.u_t.add_col(l, k)?;
                    Ok(PairingChange::Switch)
                } else {
                    Err(VineyardError::invariant(format!(
                        "rows {} and {} share their lowest-one column {}",
                        i,
                        i + 1,
                        k
                    )))
                };
            }
        }

        self.swap_plain(i)?;
        Ok(PairingChange::Unchanged)
    }

    fn death_death(&mut self, i: usize) -> Result<PairingChange> {
        if !self.u_above_diagonal(i)? {
            self.swap_plain(i)?;
            return Ok(PairingChange::Unchanged);
        }

        let low_i = self.reduced.col_lowest_one(i)?;
        let low_next = self.reduced.col_lowest_one(i + 1)?;
        self.u_t.add_col(i, i + 1)?;
        self.reduced.add_col(i + 1, i)?;
        self.swap_plain(i)?;

        if low_i < low_next {
            Ok(PairingChange::Unchanged)
        } else {
            self.reduced.add_col(i + 1, i)?;
            self.u_t.add_col(i, i + 1)?;
            Ok(PairingChange::Switch)
        }
    }

    fn death_birth(&mut self, i: usize) -> Result<PairingChange> {
        if !self.u_above_diagonal(i)? {
            self.swap_plain(i)?;
            return Ok(PairingChange::Unchanged);
        }

        self.u_t.add_col(i, i + 1)?;
        self.reduced.add_col(i + 1, i)?;
        self.reduced.swap_rows_and_cols(i, i + 1)?;
        self.reduced.add_col(i + 1, i)?;
        self.u_t.swap_rows_and_cols(i, i + 1)?;
        self.u_t.add_col(i, i + 1)?;
        Ok(PairingChange::Faustian)
    }

    fn birth_death(&mut self, i: usize) -> Result<PairingChange> {
        self.u_t.set(i + 1, i, false)?;
        self.swap_plain(i)?;
        Ok(PairingChange::Unchanged)
    }

    /// Exchange columns `i` and `i + 1` and repair the decomposition.
    fn transpose(&mut self, i: usize) -> Result<(SwapCase, PairingChange)> {
        let death_i = !self.reduced.col_is_empty(i)?;
        let death_next = !self.reduced.col_is_empty(i + 1)?;

        let (case, change) = match (death_i, death_next) {
            (false, false) => (SwapCase::BirthBirth, self.birth_birth(i)?),
            (true, true) => (SwapCase::DeathDeath, self.death_death(i)?),
            (true, false) => (SwapCase::DeathBirth, self.death_birth(i)?),
            (false, true) => (SwapCase::BirthDeath, self.birth_death(i)?),
        };

        self.boundary.swap_rows_and_cols(i, i + 1)?;
        Ok((case, change))
    }
}

/// Walk `state` over to `point` on private copies of its matrices. With
/// `check`, the decomposition is re-verified after every transposition.
pub(crate) fn update_with_stats(
    complex: &Complex,
    state: &VineyardState,
    point: ArrayView1<f64>,
    check: bool,
) -> Result<(VineyardState, Vec<FlaggedPair>, VineStats)> {
    let ordering = Ordering::by_distance(complex, point)?;
    let transpositions = state.ordering.transpositions(&ordering)?;

    let mut work = Decomposition {
        boundary: state.boundary.clone(),
        reduced: state.reduced.clone(),
        u_t: state.u_t.clone(),
    };
    let mut flagged = Vec::new();
    let mut stats = VineStats::default();

    for &Transposition { column, first, second } in &transpositions {
        let (case, change) = work.transpose(column)?;
        stats.record(case, change);

        if change == PairingChange::Faustian {
            if first.dim != second.dim {
                return Err(VineyardError::invariant(format!(
                    "Faustian swap between {} and {} crosses dimensions",
                    first, second
                )));
            }
            trace!(%first, %second, column, "Faustian swap");
            flagged.push(FlaggedPair { first, second, dim: first.dim });
        }

        if check {
            check_decomposition(&work.boundary, &work.reduced, &work.u_t).map_err(|e| {
                VineyardError::invariant(format!(
                    "after swapping {} and {} ({:?}): {}",
                    first, second, case, e
                ))
            })?;
        }
    }

    debug!(
        transpositions = stats.transpositions,
        faustian = stats.faustian,
        switches = stats.switches,
        "vine update"
    );

    let next = VineyardState {
        point: point.to_owned(),
        ordering,
        boundary: work.boundary,
        reduced: work.reduced,
        u_t: work.u_t,
    };
    Ok((next, flagged, stats))
}

/// Move the filtration center of `state` to `point` through adjacent
/// transpositions, reporting every Faustian swap on the way.
///
/// The decomposition is re-verified after every transposition in debug
/// builds.
pub fn vine_update(
    complex: &Complex,
    state: &VineyardState,
    point: ArrayView1<f64>,
) -> Result<(VineyardState, Vec<FlaggedPair>)> {
    let (next, flagged, _) = update_with_stats(complex, state, point, cfg!(debug_assertions))?;
    Ok((next, flagged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vineyard::state::reduce;
    use ndarray::array;

    fn pairing(state: &VineyardState) -> Vec<(Option<SimplexId>, Option<SimplexId>)> {
        state
            .birth_death_pairs()
            .unwrap()
            .into_iter()
            .map(|p| (p.birth, p.death))
            .collect()
    }

    #[test]
    fn test_update_matches_cold_reduction() {
        let points = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let complex = Complex::cycle(points).unwrap();
        let start = reduce(&complex, array![0.1, 0.2].view()).unwrap();
        let target = array![0.9, 0.7];

        let (next, _, stats) = update_with_stats(&complex, &start, target.view(), true).unwrap();
        let cold = reduce(&complex, target.view()).unwrap();

        assert!(stats.transpositions > 0);
        assert_eq!(next.ordering(), cold.ordering());
        assert_eq!(*next.boundary(), *cold.boundary());
        assert_eq!(pairing(&next), pairing(&cold));
        next.check_invariants().unwrap();
    }

    #[test]
    fn test_same_point_is_a_no_op() {
        let points = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let complex = Complex::from_triangles(points, &[[0, 1, 2]]).unwrap();
        let start = reduce(&complex, array![0.2, 0.2].view()).unwrap();
        let (next, flagged, stats) =
            update_with_stats(&complex, &start, array![0.2, 0.2].view(), true).unwrap();
        assert!(flagged.is_empty());
        assert_eq!(stats, VineStats::default());
        assert_eq!(*next.reduced(), *start.reduced());
    }

    #[test]
    fn test_faustian_swap_between_two_vertices() {
        // two vertices joined by one edge: crossing the bisector swaps which
        // vertex kills the empty class and which one the edge kills
        let points = array![[0.0, 0.0], [2.0, 0.0]];
        let complex = Complex::new(points, &[[0, 1]], &[]).unwrap();
        let start = reduce(&complex, array![0.5, 0.0].view()).unwrap();

        let (next, flagged, stats) =
            update_with_stats(&complex, &start, array![1.5, 0.0].view(), true).unwrap();

        assert_eq!(stats.transpositions, 1);
        assert_eq!(stats.count(SwapCase::DeathBirth), 1);
        assert_eq!(stats.faustian, 1);
        assert_eq!(
            flagged,
            vec![FlaggedPair {
                first: SimplexId::vertex(0),
                second: SimplexId::vertex(1),
                dim: 0,
            }]
        );
        assert_eq!(next.killer_of(SimplexId::vertex(0)), Some(SimplexId::edge(0)));
    }

    #[test]
    fn test_stats_sum() {
        let mut a = VineStats::default();
        a.record(SwapCase::BirthBirth, PairingChange::Switch);
        let mut b = VineStats::default();
        b.record(SwapCase::DeathBirth, PairingChange::Faustian);
        b.pruned = 1;

        let total: VineStats = vec![a, b].into_iter().sum();
        assert_eq!(total.transpositions, 2);
        assert_eq!(total.switches, 1);
        assert_eq!(total.faustian, 1);
        assert_eq!(total.pruned, 1);
        assert_eq!(total.case_counts, [1, 0, 1, 0]);
    }
}
