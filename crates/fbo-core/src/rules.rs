//! Planning parameters shared by every network analysis.

use serde::{Deserialize, Serialize};

/// Fraction of the optimal distance a connection may deviate by and still count as optimal.
pub const OPTIMAL_TOLERANCE: f64 = 0.2;

/// Configuration for network analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRules {
    /// Ideal spacing between FBOs in nautical miles
    pub optimal_distance_nm: f64,
    /// Longest acceptable spacing in nautical miles (reported, not scored)
    pub max_distance_nm: f64,
    /// Only consider lit airports as candidates
    pub require_lights: bool,
    /// Preferred airport size class (0-5)
    pub preferred_size: Option<u8>,
    /// Redundancy score a node must exceed to be proposed for removal (0-100)
    pub redundancy_threshold: f64,
    /// Nodes closer than this are treated as co-located
    pub colocation_radius_nm: f64,
    /// Radius around a seed FBO when grouping proximity clusters
    pub cluster_radius_nm: f64,
}

impl Default for NetworkRules {
    fn default() -> Self {
        Self {
            optimal_distance_nm: 800.0,
            max_distance_nm: 1200.0,
            require_lights: true,
            preferred_size: None,
            redundancy_threshold: 100.0,
            colocation_radius_nm: 10.0,
            cluster_radius_nm: 300.0,
        }
    }
}

impl NetworkRules {
    /// Rules with the given optimal distance and defaults elsewhere.
    pub fn with_optimal_distance(optimal_distance_nm: f64) -> Self {
        Self {
            optimal_distance_nm,
            ..Self::default()
        }
    }
}
