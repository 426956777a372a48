//! Engine configuration.
//!
//! ```json
//! {
//!   "check_invariants": false,
//!   "pruning": { "coface": true, "euclidean": true, "euclidean_multiplier": 2.0 }
//! }
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::pruning::{CofacePruner, CommonFacePruner, EuclideanPruner, PersistencePruner, Pruner};

/// Configuration for a `Vineyard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VineyardConfig {
    /// Verify R reduced, U unitriangular and R·U = D after every
    /// transposition
    pub check_invariants: bool,
    pub pruning: PruningConfig,
}

impl Default for VineyardConfig {
    fn default() -> Self {
        Self {
            check_invariants: cfg!(debug_assertions),
            pruning: PruningConfig::default(),
        }
    }
}

impl VineyardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Which built-in pruners to run on flagged pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruningConfig {
    /// Drop pairs closer than `euclidean_multiplier` × step length
    pub euclidean: bool,
    pub euclidean_multiplier: Option<f64>,
    /// Drop pairs with a common coface
    pub coface: bool,
    /// Drop edge/triangle pairs sharing a vertex
    pub face: bool,
    /// Drop pairs whose lifetimes are both below `persistence_threshold`
    pub persistence: bool,
    pub persistence_threshold: Option<f64>,
}

impl PruningConfig {
    /// Instantiate the enabled pruners. A flag whose parameter is missing is
    /// skipped with a warning.
    pub fn pruners(&self) -> Vec<Box<dyn Pruner>> {
        let mut pruners: Vec<Box<dyn Pruner>> = Vec::new();

        if self.euclidean {
            match self.euclidean_multiplier {
                Some(multiplier) => pruners.push(Box::new(EuclideanPruner::new(multiplier))),
                None => warn!("euclidean pruning enabled without euclidean_multiplier; skipped"),
            }
        }
        if self.coface {
            pruners.push(Box::new(CofacePruner));
        }
        if self.face {
            pruners.push(Box::new(CommonFacePruner));
        }
        if self.persistence {
            match self.persistence_threshold {
                Some(threshold) => pruners.push(Box::new(PersistencePruner::new(threshold))),
                None => warn!("persistence pruning enabled without persistence_threshold; skipped"),
            }
        }

        pruners
    }
}
