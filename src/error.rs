//! Error taxonomy for reductions and vineyard updates.
//!
//! Apart from configuration and input-shape errors, every variant here is a
//! defect: it signals a broken complex, a broken ordering, or a bug in the
//! update rules. Nothing in the crate retries on any of them.

use thiserror::Error;

use crate::topology::SimplexId;

/// Which side of a matrix an out-of-range index was used on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VineyardError {
    /// A simplex was placed before one of its faces.
    #[error("ordering inconsistent: {simplex} precedes its face {face}")]
    OrderingInconsistent { simplex: SimplexId, face: SimplexId },

    /// R not reduced, U not unitriangular, R·U ≠ D, or a flagged pair
    /// across two dimensions.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Matrix access outside the declared extent.
    #[error("{axis} index {index} out of bounds (extent {extent})")]
    IndexOutOfBounds { index: usize, extent: usize, axis: Axis },

    /// The complex handed to the core failed validation.
    #[error("malformed complex: {0}")]
    MalformedComplex(String),

    /// A query point does not live in the complex's ambient space.
    #[error("query point has {found} coordinates, complex is {expected}-dimensional")]
    PointDimension { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl VineyardError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        VineyardError::InvariantViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, VineyardError>;
