//! Lifetime-based pruning.

use super::{PruneContext, Pruner};
use crate::vineyard::FlaggedPair;

/// Drops pairs whose classes are both short-lived: the first simplex's
/// class in the state before the update and the second simplex's class in
/// the state after it.
///
/// A pair is kept whenever either class is never killed. Mostly useful for
/// swaps between edges.
#[derive(Debug, Clone, Copy)]
pub struct PersistencePruner {
    pub threshold: f64,
}

impl PersistencePruner {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Pruner for PersistencePruner {
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool {
        let before = ctx.from.killed_persistence(pair.first);
        let after = ctx.to.killed_persistence(pair.second);
        match (before, after) {
            (Some(p), Some(q)) => p < self.threshold && q < self.threshold,
            _ => false,
        }
    }

    fn name(&self) -> &str {
        "persistence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{Complex, SimplexId};
    use crate::vineyard::reduce;
    use ndarray::array;

    #[test]
    fn test_short_lived_pairs_pruned() {
        // v1's component lives from 1 until v2 arrives at 25
        let points = array![[0.0, 0.0], [1.0, 0.0], [5.0, 0.0]];
        let complex = Complex::new(points, &[[0, 2], [2, 1]], &[]).unwrap();
        let state = reduce(&complex, array![0.0, 0.0].view()).unwrap();
        let ctx = PruneContext::new(&complex, &state, &state);

        // v2 is killed by edge 0 the moment it enters
        let short = FlaggedPair {
            first: SimplexId::vertex(2),
            second: SimplexId::vertex(2),
            dim: 0,
        };
        let long = FlaggedPair {
            first: SimplexId::vertex(1),
            second: SimplexId::vertex(2),
            dim: 0,
        };
        // v0 kills the empty class, nothing kills a class of v0
        let unkilled = FlaggedPair {
            first: SimplexId::vertex(0),
            second: SimplexId::vertex(2),
            dim: 0,
        };

        let pruner = PersistencePruner::new(1.0);
        assert!(pruner.should_prune(&ctx, &short));
        assert!(!pruner.should_prune(&ctx, &long));
        assert!(!pruner.should_prune(&ctx, &unkilled));
        assert!(PersistencePruner::new(30.0).should_prune(&ctx, &long));
    }
}
