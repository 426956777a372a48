//! The `Vineyard` engine: a complex, its pruners, and a cache of reduced
//! states keyed by query point.

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::state::{self, VineyardState};
use super::update::{update_with_stats, FlaggedPair, VineStats};
use crate::config::VineyardConfig;
use crate::error::{Result, VineyardError};
use crate::pruning::{apply_pruners, PruneContext, Pruner};
use crate::topology::{boundary_matrix, Complex};

/// Exact bit pattern of a query point, with −0.0 folded into 0.0
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PointKey(Vec<u64>);

impl PointKey {
    fn new(point: ArrayView1<f64>) -> Self {
        Self(
            point
                .iter()
                .map(|&x| if x == 0.0 { 0.0f64.to_bits() } else { x.to_bits() })
                .collect(),
        )
    }
}

/// Result of one vine update through the engine
#[derive(Debug, Clone)]
pub struct VineUpdate {
    /// State at the target point
    pub state: Arc<VineyardState>,
    /// Faustian swaps that survived pruning
    pub flagged: Vec<FlaggedPair>,
    /// Faustian swaps some pruner dropped
    pub pruned: Vec<FlaggedPair>,
    pub stats: VineStats,
}

impl VineUpdate {
    /// Surviving flagged pairs of one dimension
    pub fn flagged_in_dim(&self, dim: usize) -> Vec<FlaggedPair> {
        self.flagged.iter().filter(|p| p.dim == dim).copied().collect()
    }
}

/// Vine updates over one fixed complex
pub struct Vineyard {
    complex: Arc<Complex>,
    config: VineyardConfig,
    pruners: Vec<Box<dyn Pruner>>,
    states: HashMap<PointKey, Arc<VineyardState>>,
}

impl std::fmt::Debug for Vineyard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pruners: Vec<&str> = self.pruners.iter().map(|p| p.name()).collect();
        f.debug_struct("Vineyard")
            .field("simplices", &self.complex.len())
            .field("config", &self.config)
            .field("pruners", &pruners)
            .field("cached_states", &self.states.len())
            .finish()
    }
}

impl Vineyard {
    /// Engine with the pruners `config` enables.
    pub fn new(complex: Arc<Complex>, config: VineyardConfig) -> Self {
        let pruners = config.pruning.pruners();
        Self { complex, config, pruners, states: HashMap::new() }
    }

    /// Add a pruner after the configured ones.
    pub fn with_pruner(mut self, pruner: impl Pruner + 'static) -> Self {
        self.pruners.push(Box::new(pruner));
        self
    }

    pub fn complex(&self) -> &Arc<Complex> {
        &self.complex
    }

    pub fn config(&self) -> &VineyardConfig {
        &self.config
    }

    /// Cold reduction at `point`; reuses a cached state when there is one.
    pub fn reduce(&mut self, point: ArrayView1<f64>) -> Result<Arc<VineyardState>> {
        let key = PointKey::new(point);
        if let Some(cached) = self.states.get(&key) {
            return Ok(Arc::clone(cached));
        }

        let reduced = Arc::new(state::reduce(&self.complex, point)?);
        if self.config.check_invariants {
            reduced.check_invariants()?;
        }
        self.states.insert(key, Arc::clone(&reduced));
        Ok(reduced)
    }

    /// Vine update from `from` to `point`, pruned and cached.
    pub fn vine_update(&mut self, from: &VineyardState, point: ArrayView1<f64>) -> Result<VineUpdate> {
        let update = self.compute_update(from, point)?;
        self.remember(point, &update);
        Ok(update)
    }

    /// Previously computed state at exactly `point`
    pub fn state_at(&self, point: ArrayView1<f64>) -> Option<Arc<VineyardState>> {
        self.states.get(&PointKey::new(point)).cloned()
    }

    pub fn cached_states(&self) -> usize {
        self.states.len()
    }

    pub fn clear_cache(&mut self) {
        self.states.clear();
    }

    /// Reduce at the first row of `path` and vine-update along the rest,
    /// one `VineUpdate` per step.
    pub fn walk(&mut self, path: ArrayView2<f64>) -> Result<Vec<VineUpdate>> {
        let mut rows = path.outer_iter();
        let Some(first) = rows.next() else {
            return Ok(Vec::new());
        };

        let mut current = self.reduce(first)?;
        let mut updates = Vec::with_capacity(path.nrows().saturating_sub(1));
        for point in rows {
            let update = self.vine_update(&current, point)?;
            current = Arc::clone(&update.state);
            updates.push(update);
        }

        let total: VineStats = updates.iter().map(|u| u.stats).sum();
        info!(
            steps = updates.len(),
            transpositions = total.transpositions,
            faustian = total.faustian,
            pruned = total.pruned,
            "walk finished"
        );
        Ok(updates)
    }

    /// Independent vine updates from `from` to every row of `targets`, run on
    /// the rayon pool. Results come back in row order.
    pub fn vine_update_many(
        &mut self,
        from: &VineyardState,
        targets: ArrayView2<f64>,
    ) -> Result<Vec<VineUpdate>> {
        let rows: Vec<ArrayView1<f64>> = targets.outer_iter().collect();
        let updates = {
            let engine = &*self;
            rows.par_iter()
                .map(|point| engine.compute_update(from, point.view()))
                .collect::<Result<Vec<_>>>()?
        };

        for (point, update) in rows.iter().zip(&updates) {
            self.remember(point.view(), update);
        }

        let total: VineStats = updates.iter().map(|u| u.stats).sum();
        info!(
            targets = updates.len(),
            transpositions = total.transpositions,
            faustian = total.faustian,
            "batch vine update finished"
        );
        Ok(updates)
    }

    /// `from` must carry this complex's boundary matrix under its own
    /// ordering; anything else is rejected before a single transposition.
    fn compute_update(&self, from: &VineyardState, point: ArrayView1<f64>) -> Result<VineUpdate> {
        if boundary_matrix(&self.complex, from.ordering())? != *from.boundary() {
            return Err(VineyardError::invariant("state was not reduced over this complex"));
        }

        let (next, flagged, mut stats) =
            update_with_stats(&self.complex, from, point, self.config.check_invariants)?;

        let ctx = PruneContext::new(&self.complex, from, &next);
        let (flagged, pruned) = apply_pruners(&self.pruners, &ctx, flagged);
        stats.pruned = pruned.len();
        if !pruned.is_empty() {
            debug!(kept = flagged.len(), pruned = pruned.len(), "pruned flagged pairs");
        }

        Ok(VineUpdate { state: Arc::new(next), flagged, pruned, stats })
    }

    fn remember(&mut self, point: ArrayView1<f64>, update: &VineUpdate) {
        self.states
            .entry(PointKey::new(point))
            .or_insert_with(|| Arc::clone(&update.state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PruningConfig;
    use ndarray::array;

    fn engine(pruning: PruningConfig) -> Vineyard {
        let points = array![[0.0, 0.0], [2.0, 0.0]];
        let complex = Complex::new(points, &[[0, 1]], &[]).unwrap();
        let config = VineyardConfig { check_invariants: true, pruning };
        Vineyard::new(Arc::new(complex), config)
    }

    #[test]
    fn test_point_key_folds_negative_zero() {
        assert_eq!(
            PointKey::new(array![-0.0, 1.0].view()),
            PointKey::new(array![0.0, 1.0].view())
        );
        assert_ne!(
            PointKey::new(array![0.0, 1.0].view()),
            PointKey::new(array![1.0, 0.0].view())
        );
    }

    #[test]
    fn test_reduce_is_cached() {
        let mut vineyard = engine(PruningConfig::default());
        let a = vineyard.reduce(array![0.5, 0.0].view()).unwrap();
        let b = vineyard.reduce(array![0.5, -0.0].view()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(vineyard.cached_states(), 1);
        assert!(vineyard.state_at(array![0.5, 0.0].view()).is_some());
        vineyard.clear_cache();
        assert!(vineyard.state_at(array![0.5, 0.0].view()).is_none());
    }

    #[test]
    fn test_walk_across_bisector() {
        let mut vineyard = engine(PruningConfig::default());
        let path = array![[0.5, 0.0], [0.9, 0.0], [1.5, 0.0], [1.7, 0.3]];
        let updates = vineyard.walk(path.view()).unwrap();

        assert_eq!(updates.len(), 3);
        let faustian: Vec<usize> = updates.iter().map(|u| u.flagged.len()).collect();
        assert_eq!(faustian, vec![0, 1, 0]);
        assert_eq!(updates[1].flagged_in_dim(0).len(), 1);
        assert!(updates[1].flagged_in_dim(1).is_empty());
        assert_eq!(vineyard.cached_states(), 4);
        assert!(Arc::ptr_eq(
            &updates[1].state,
            &vineyard.state_at(array![1.5, 0.0].view()).unwrap()
        ));
        assert!(Arc::ptr_eq(
            &updates[2].state,
            &vineyard.state_at(array![1.7, 0.3].view()).unwrap()
        ));
    }

    #[test]
    fn test_pruned_pairs_are_kept_aside() {
        // the two vertices span an edge, so the coface pruner drops the swap
        let pruning = PruningConfig { coface: true, ..PruningConfig::default() };
        let mut vineyard = engine(pruning);
        let start = vineyard.reduce(array![0.5, 0.0].view()).unwrap();
        let update = vineyard.vine_update(&start, array![1.5, 0.0].view()).unwrap();

        assert!(update.flagged.is_empty());
        assert_eq!(update.pruned.len(), 1);
        assert_eq!(update.stats.faustian, 1);
        assert_eq!(update.stats.pruned, 1);
    }

    #[test]
    fn test_vine_update_many_matches_sequential() {
        let mut vineyard = engine(PruningConfig::default())
            .with_pruner(|_: &PruneContext<'_>, pair: &FlaggedPair| pair.dim > 0);
        let start = vineyard.reduce(array![0.5, 0.0].view()).unwrap();
        let targets = array![[1.5, 0.0], [0.2, 0.1], [1.9, -0.4]];

        let batch = vineyard.vine_update_many(&start, targets.view()).unwrap();
        assert_eq!(batch.len(), 3);
        for (row, update) in targets.outer_iter().zip(&batch) {
            let (expected, flagged) = super::super::vine_update(vineyard.complex(), &start, row).unwrap();
            assert_eq!(update.flagged, flagged);
            assert_eq!(*update.state.reduced(), *expected.reduced());
        }
        assert_eq!(vineyard.cached_states(), 4);
    }

    #[test]
    fn test_rejects_state_of_other_complex() {
        let mut vineyard = engine(PruningConfig::default());
        let points = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let other = Complex::cycle(points).unwrap();
        let foreign = state::reduce(&other, array![0.0, 0.0].view()).unwrap();
        let err = vineyard.vine_update(&foreign, array![1.0, 0.0].view()).unwrap_err();
        assert!(matches!(err, VineyardError::InvariantViolation(_)));
    }

    #[test]
    fn test_rejects_state_of_same_sized_complex() {
        // both paths have three vertices and two edges, wired differently
        let points = array![[0.0, 0.0], [1.0, 0.0], [3.0, 0.0]];
        let chain = Complex::new(points.clone(), &[[0, 1], [1, 2]], &[]).unwrap();
        let star = Complex::new(points, &[[0, 1], [0, 2]], &[]).unwrap();
        assert_eq!(chain.len(), star.len());

        let config = VineyardConfig { check_invariants: true, ..VineyardConfig::default() };
        let mut vineyard = Vineyard::new(Arc::new(chain), config);
        let foreign = state::reduce(&star, array![0.0, 0.0].view()).unwrap();
        let err = vineyard.vine_update(&foreign, array![3.0, 0.0].view()).unwrap_err();
        assert!(matches!(err, VineyardError::InvariantViolation(_)));
        assert_eq!(vineyard.cached_states(), 0);

        let own = vineyard.reduce(array![0.0, 0.0].view()).unwrap();
        assert!(vineyard.vine_update(&own, array![3.0, 0.0].view()).is_ok());
    }
}
