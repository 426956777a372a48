//! # TDA-Vineyards
//!
//! Persistent Homology over GF(2) with Vineyard Updates for a Moving
//! Filtration Center
//!
//! ## Theoretical Framework
//!
//! A simplicial complex of dimension ≤ 2 is filtered by distance to a query
//! point: vertices enter at their squared distance, edges and triangles
//! with their last face. Reducing the boundary matrix of that filtration
//! pairs every simplex that kills a homology class with the simplex that
//! created it.
//!
//! ### Methodology
//!
//! 1. **Reduction**: The standard algorithm gives R = D·V over GF(2); the
//!    inverse U = V⁻¹ completes the decomposition R·U = D
//!
//! 2. **Vineyards**: As the query point moves, the filtration order changes
//!    one adjacent transposition at a time and R, U are repaired in place
//!    instead of being recomputed
//!
//! 3. **Faustian Swaps**: Transpositions where the pairing jumps are
//!    flagged; pruners discard the ones explained by local geometry
//!
//! ## Key Result
//!
//! Query points where Faustian swaps occur lie on the medial axis of the
//! shape the complex samples.
//!
//! ## References
//!
//! - Edelsbrunner & Harer, "Computational Topology" (2010)
//! - Cohen-Steiner, Edelsbrunner, Morozov, "Vines and Vineyards by Updating
//!   Persistence in Linear Time", SoCG (2006)

pub mod config;
pub mod error;
pub mod pruning;
pub mod topology;
pub mod vineyard;

pub use config::{PruningConfig, VineyardConfig};
pub use error::{Result, VineyardError};

// Re-exports from topology
pub use topology::{
    BettiNumbers,
    BirthDeathPair,
    Complex,
    Ordering,
    PersistenceDiagram,
    Simplex,
    SimplexId,
    SparseMatrix,
    Transposition,
};

// Re-exports from vineyard
pub use vineyard::{
    reduce,
    vine_update,
    FlaggedPair,
    VineStats,
    VineUpdate,
    Vineyard,
    VineyardState,
};

// Re-exports from pruning
pub use pruning::{
    CofacePruner,
    CommonFacePruner,
    EuclideanPruner,
    PersistencePruner,
    PruneContext,
    Pruner,
};
