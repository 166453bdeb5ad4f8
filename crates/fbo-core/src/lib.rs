//! FBO network analysis engine.
//!
//! Answers planning questions about a network of FBOs hosted at airports:
//! how spread out the network is, where a new FBO would help most, and which
//! existing FBOs contribute least. Every analysis is a pure, synchronous
//! computation over a snapshot supplied by the caller.

pub mod candidates;
pub mod distances;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod redundancy;
pub mod report;
pub mod rules;

pub use candidates::{CandidateReport, CandidateScore, CandidateScorer, Connection};
pub use distances::{analyze_distances, proximity_clusters, Cluster, DistancePair, DistanceReport};
pub use error::{Advisory, Analysis, AnalysisError};
pub use geo::{haversine_nm, GeoPoint, Located, EARTH_RADIUS_NM};
pub use metrics::{MetricsComparison, NetworkMetrics};
pub use models::{Airport, AirportType, Fbo, NewFbo, MAX_AIRPORT_SIZE};
pub use redundancy::{
    redundancy_score, Alternative, RedundancyAnalyzer, RedundancyOutcome, RedundancyReport,
    Removal,
};
pub use rules::NetworkRules;
