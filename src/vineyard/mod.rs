//! Vineyards: Persistence Along a Moving Query Point
//!
//! A vineyard state is a reduced decomposition R·U = D of the boundary
//! matrix for the filtration centered at one query point. Moving the point
//! reorders the filtration; instead of reducing again, the update walks the
//! old order into the new one by adjacent transpositions and repairs R and
//! U after each of them.
//!
//! ## Algorithm Overview
//!
//! 1. Cold start: order by distance, build D, reduce, invert V
//! 2. For a new point, compute the new order and the bubble-sort
//!    transpositions from the old one
//! 3. Apply the four-case rule to each transposition, collecting every
//!    Faustian swap
//! 4. Hand the flagged pairs to the pruners
//!
//! Faustian swaps are discontinuities of the pairing. Collected over a grid
//! of query points they trace the medial axis of the sampled shape.

mod engine;
mod state;
mod update;

pub use engine::{VineUpdate, Vineyard};
pub use state::{reduce, VineyardState};
pub use update::{vine_update, FlaggedPair, PairingChange, SwapCase, VineStats};
