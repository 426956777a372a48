//! Betti Numbers: Topological Invariants
//!
//! The k-th Betti number βₖ counts the number of k-dimensional
//! "holes" in a topological space:
//!
//! - β₀: Number of connected components
//! - β₁: Number of 1-dimensional loops/cycles
//! - β₂: Number of 2-dimensional voids/cavities
//!
//! Here they count the essential classes of the full filtration. The
//! boundary matrix computes reduced homology, so β₀ is the number of
//! essential 0-classes plus one whenever a vertex killed the class of the
//! empty simplex.

use serde::{Deserialize, Serialize};

use super::persistence::BirthDeathPair;

/// Betti numbers of the complete complex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettiNumbers {
    pub beta_0: usize, // Connected components
    pub beta_1: usize, // Loops
    pub beta_2: usize, // Voids
}

impl BettiNumbers {
    pub fn new(beta_0: usize, beta_1: usize, beta_2: usize) -> Self {
        Self { beta_0, beta_1, beta_2 }
    }

    /// Count essential classes per dimension.
    pub fn from_pairs(pairs: &[BirthDeathPair]) -> Self {
        let mut betti = Self::default();
        for pair in pairs {
            match (pair.dim, pair.is_essential()) {
                (-1, false) => betti.beta_0 += 1,
                (0, true) => betti.beta_0 += 1,
                (1, true) => betti.beta_1 += 1,
                (2, true) => betti.beta_2 += 1,
                _ => {}
            }
        }
        betti
    }

    /// Betti number of dimension `dim`; zero above 2
    pub fn get(&self, dim: usize) -> usize {
        match dim {
            0 => self.beta_0,
            1 => self.beta_1,
            2 => self.beta_2,
            _ => 0,
        }
    }

    /// Total topological complexity
    pub fn total(&self) -> usize {
        self.beta_0 + self.beta_1 + self.beta_2
    }

    /// Euler characteristic χ = β₀ - β₁ + β₂
    pub fn euler_characteristic(&self) -> i64 {
        self.beta_0 as i64 - self.beta_1 as i64 + self.beta_2 as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::SimplexId;

    fn pair(dim: isize, death: Option<SimplexId>) -> BirthDeathPair {
        BirthDeathPair {
            dim,
            birth: None,
            death,
            birth_value: 0.0,
            death_value: if death.is_some() { 1.0 } else { f64::INFINITY },
        }
    }

    #[test]
    fn test_reduced_to_unreduced() {
        let killed = Some(SimplexId::edge(0));
        let pairs = vec![
            pair(-1, Some(SimplexId::vertex(0))),
            pair(0, killed),
            pair(0, None),
            pair(1, None),
            pair(1, killed),
        ];
        let betti = BettiNumbers::from_pairs(&pairs);
        assert_eq!(betti, BettiNumbers::new(2, 1, 0));
        assert_eq!(betti.total(), 3);
        assert_eq!(betti.euler_characteristic(), 1);
        assert_eq!(betti.get(1), 1);
        assert_eq!(betti.get(5), 0);
    }

    #[test]
    fn test_empty_complex() {
        // nothing kills the empty simplex
        let betti = BettiNumbers::from_pairs(&[pair(-1, None)]);
        assert_eq!(betti.total(), 0);
    }
}
