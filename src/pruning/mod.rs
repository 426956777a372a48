//! Pruning: Suppressing Uninteresting Faustian Swaps
//!
//! Not every Faustian swap marks a medial-axis crossing. Two edges meeting
//! in a triangle, or two vertices a hair apart, trade partners for reasons
//! of local geometry only. A `Pruner` looks at one flagged pair together
//! with the states before and after the update and decides whether to drop
//! it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Pruner Trait                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  CofacePruner      - pair shares an edge/triangle above it    │
//! │  CommonFacePruner  - edges/triangles sharing a vertex         │
//! │  EuclideanPruner   - centers closer than k × step length      │
//! │  PersistencePruner - both lifetimes below a threshold         │
//! │  Fn(&ctx, &pair)   - anything else                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pruners only read; they never touch a decomposition.

mod geometric;
mod persistence;

pub use geometric::{CofacePruner, CommonFacePruner, EuclideanPruner};
pub use persistence::PersistencePruner;

use ndarray::ArrayView1;

use crate::topology::Complex;
use crate::vineyard::{FlaggedPair, VineyardState};

/// Everything a pruner may consult about one vine update
#[derive(Debug, Clone, Copy)]
pub struct PruneContext<'a> {
    pub complex: &'a Complex,
    /// State before the update
    pub from: &'a VineyardState,
    /// State after the update
    pub to: &'a VineyardState,
}

impl<'a> PruneContext<'a> {
    pub fn new(complex: &'a Complex, from: &'a VineyardState, to: &'a VineyardState) -> Self {
        Self { complex, from, to }
    }

    pub fn from_point(&self) -> ArrayView1<'a, f64> {
        self.from.point()
    }

    pub fn to_point(&self) -> ArrayView1<'a, f64> {
        self.to.point()
    }

    /// Euclidean distance the query point moved
    pub fn step_length(&self) -> f64 {
        let from = self.from.point();
        let to = self.to.point();
        from.iter()
            .zip(to.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Predicate deciding whether a flagged pair is dropped
pub trait Pruner: Send + Sync {
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool;

    /// Short name for logs
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Pruner for F
where
    F: Fn(&PruneContext<'_>, &FlaggedPair) -> bool + Send + Sync,
{
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool {
        self(ctx, pair)
    }
}

/// Split `flagged` into (kept, pruned). A pair is pruned as soon as one
/// pruner asks for it.
pub fn apply_pruners(
    pruners: &[Box<dyn Pruner>],
    ctx: &PruneContext<'_>,
    flagged: Vec<FlaggedPair>,
) -> (Vec<FlaggedPair>, Vec<FlaggedPair>) {
    flagged
        .into_iter()
        .partition(|pair| !pruners.iter().any(|p| p.should_prune(ctx, pair)))
}
