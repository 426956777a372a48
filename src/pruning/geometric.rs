//! Pruners looking only at the complex and the query points.

use std::collections::BTreeSet;

use super::{PruneContext, Pruner};
use crate::topology::{SimplexId, MAX_DIM};
use crate::vineyard::FlaggedPair;

/// Drops pairs that are faces of a common simplex one dimension up.
///
/// Pairs of triangles have no coface and are always kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct CofacePruner;

impl Pruner for CofacePruner {
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool {
        if pair.dim >= MAX_DIM {
            return false;
        }
        let first = ctx.complex.coboundary(pair.first);
        let second = ctx.complex.coboundary(pair.second);
        first.iter().any(|c| second.contains(c))
    }

    fn name(&self) -> &str {
        "coface"
    }
}

/// Drops pairs of edges or triangles that share a vertex.
///
/// Vertex pairs are always kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonFacePruner;

impl Pruner for CommonFacePruner {
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool {
        if pair.dim == 0 {
            return false;
        }
        let first: BTreeSet<usize> = ctx.complex.vertices_of(pair.first).into_iter().collect();
        ctx.complex
            .vertices_of(pair.second)
            .iter()
            .any(|v| first.contains(v))
    }

    fn name(&self) -> &str {
        "common-face"
    }
}

/// Drops pairs whose centers are closer than `multiplier` times the
/// distance the query point moved.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanPruner {
    pub multiplier: f64,
}

impl EuclideanPruner {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    fn center_distance(ctx: &PruneContext<'_>, a: SimplexId, b: SimplexId) -> f64 {
        let diff = ctx.complex.center(a) - ctx.complex.center(b);
        diff.dot(&diff).sqrt()
    }
}

impl Pruner for EuclideanPruner {
    fn should_prune(&self, ctx: &PruneContext<'_>, pair: &FlaggedPair) -> bool {
        Self::center_distance(ctx, pair.first, pair.second) < self.multiplier * ctx.step_length()
    }

    fn name(&self) -> &str {
        "euclidean"
    }
}
