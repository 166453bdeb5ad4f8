//! Network quality metrics over a set of positioned nodes.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::geo::{pairwise_distances, Located};
use crate::rules::OPTIMAL_TOLERANCE;

/// Whether a connection falls within tolerance of the optimal distance.
pub fn is_optimal_connection(distance_nm: f64, optimal_distance_nm: f64) -> bool {
    (distance_nm - optimal_distance_nm).abs() <= OPTIMAL_TOLERANCE * optimal_distance_nm
}

/// Closeness to the optimal distance as a 0-100 score (100 = exactly optimal).
pub fn closeness_score(distance_nm: f64, optimal_distance_nm: f64) -> f64 {
    let deviation_pct = (distance_nm - optimal_distance_nm).abs() / optimal_distance_nm * 100.0;
    100.0 - deviation_pct.min(100.0)
}

/// Summary statistics for one node set at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub average_distance_nm: f64,
    /// 0-100, higher is better
    pub efficiency_score: f64,
    pub optimal_connections: usize,
    pub total_connections: usize,
}

impl NetworkMetrics {
    /// Calculate metrics for every pair of positioned nodes.
    ///
    /// Nodes without coordinates are ignored, but at least two nodes must be
    /// supplied and at least two of them must be positioned.
    pub fn calculate<N: Located>(
        nodes: &[N],
        optimal_distance_nm: f64,
    ) -> Result<Self, AnalysisError> {
        if nodes.len() < 2 {
            return Err(AnalysisError::InsufficientNodes { found: nodes.len() });
        }

        let positioned = nodes.iter().filter(|n| n.position().is_some()).count();
        if positioned < 2 {
            return Err(AnalysisError::InsufficientPositionedNodes {
                total: nodes.len(),
                positioned,
            });
        }

        let mut total_distance = 0.0;
        let mut total_connections = 0usize;
        let mut optimal_connections = 0usize;

        for (_, _, distance) in pairwise_distances(nodes) {
            total_distance += distance;
            total_connections += 1;
            if is_optimal_connection(distance, optimal_distance_nm) {
                optimal_connections += 1;
            }
        }

        if total_connections == 0 {
            return Err(AnalysisError::NoConnections { positioned });
        }

        let average_distance_nm = total_distance / total_connections as f64;
        let optimal_ratio = optimal_connections as f64 / total_connections as f64;
        let distance_score = closeness_score(average_distance_nm, optimal_distance_nm);

        Ok(Self {
            average_distance_nm,
            efficiency_score: optimal_ratio * 50.0 + distance_score * 0.5,
            optimal_connections,
            total_connections,
        })
    }

    /// Share of connections in the optimal range.
    pub fn optimal_ratio(&self) -> f64 {
        if self.total_connections == 0 {
            return 0.0;
        }
        self.optimal_connections as f64 / self.total_connections as f64
    }
}

/// Before/after view of a network change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsComparison {
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub before: NetworkMetrics,
    pub after: NetworkMetrics,
}

impl MetricsComparison {
    pub fn node_change_pct(&self) -> f64 {
        percent_change(self.nodes_before as f64, self.nodes_after as f64)
    }

    pub fn average_distance_change_pct(&self) -> f64 {
        percent_change(
            self.before.average_distance_nm,
            self.after.average_distance_nm,
        )
    }

    pub fn efficiency_change_pct(&self) -> f64 {
        percent_change(self.before.efficiency_score, self.after.efficiency_score)
    }
}

/// Signed percentage change from `before` to `after`; zero when `before` is zero.
pub(crate) fn percent_change(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        return 0.0;
    }
    (after - before) / before * 100.0
}
