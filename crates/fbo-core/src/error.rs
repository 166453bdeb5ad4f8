//! Analysis errors and the advisory outcome used on undersized networks.

use serde::Serialize;
use std::fmt;

/// Conditions under which a network analysis cannot run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("need at least 2 nodes to calculate network metrics, found {found}")]
    InsufficientNodes { found: usize },

    #[error(
        "need at least 2 nodes with valid coordinates to calculate network metrics, \
         found {positioned} of {total}"
    )]
    InsufficientPositionedNodes { total: usize, positioned: usize },

    #[error("need at least 2 FBOs with coordinates to calculate distances, found {found}")]
    InsufficientFbos { found: usize },

    #[error("found {positioned} nodes with valid coordinates but no connections between them")]
    NoConnections { positioned: usize },
}

impl AnalysisError {
    /// True when the network is simply too small to analyze.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientNodes { .. }
                | AnalysisError::InsufficientPositionedNodes { .. }
                | AnalysisError::InsufficientFbos { .. }
        )
    }
}

/// Friendly explanation returned instead of a result when there is not enough data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// FBOs in the network
    pub total: usize,
    /// FBOs with usable coordinates
    pub positioned: usize,
    pub message: String,
}

impl Advisory {
    /// Fewer than two FBOs exist at all.
    pub fn too_few_fbos(total: usize, positioned: usize, purpose: &str) -> Self {
        Self {
            total,
            positioned,
            message: format!(
                "There are fewer than 2 FBOs in the network. No {purpose} analysis possible."
            ),
        }
    }

    /// Enough FBOs exist but too few of them have coordinates.
    pub fn too_few_positioned(total: usize, positioned: usize, purpose: &str) -> Self {
        Self {
            total,
            positioned,
            message: format!(
                "Found {total} FBOs in total, but only {positioned} have valid latitude/longitude \
                 information. At least 2 FBOs with coordinates are needed for {purpose} analysis."
            ),
        }
    }

    /// Check FBO counts, returning the matching advisory when analysis cannot proceed.
    pub fn check(total: usize, positioned: usize, purpose: &str) -> Option<Self> {
        if total < 2 {
            Some(Self::too_few_fbos(total, positioned, purpose))
        } else if positioned < 2 {
            Some(Self::too_few_positioned(total, positioned, purpose))
        } else {
            None
        }
    }

    pub(crate) fn from_error(error: &AnalysisError, total: usize, positioned: usize) -> Self {
        Self {
            total,
            positioned,
            message: format!("Error calculating network metrics: {error}"),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of an analysis that degrades gracefully on small networks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Analysis<T> {
    Complete(T),
    Insufficient(Advisory),
}

impl<T> Analysis<T> {
    pub fn complete(self) -> Option<T> {
        match self {
            Analysis::Complete(value) => Some(value),
            Analysis::Insufficient(_) => None,
        }
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        match self {
            Analysis::Complete(_) => None,
            Analysis::Insufficient(advisory) => Some(advisory),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Analysis<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Analysis::Complete(value) => value.fmt(f),
            Analysis::Insufficient(advisory) => advisory.fmt(f),
        }
    }
}
