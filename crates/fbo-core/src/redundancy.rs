//! Redundant FBO detection.
//!
//! Each round removes every remaining FBO in turn, measures the network
//! without it, and scores that network against the original one. The most
//! redundant FBO above the threshold is accepted and the round repeats on
//! the reduced set. Scores pass through `log1p` and a logistic squash so the
//! outcome changes smoothly as the threshold moves.

use serde::Serialize;
use tracing::debug;

use crate::error::{Advisory, Analysis};
use crate::geo::{GeoPoint, Located};
use crate::metrics::{MetricsComparison, NetworkMetrics};
use crate::models::Airport;
use crate::rules::NetworkRules;

const EFFICIENCY_WEIGHT: f64 = 20.0;
const RATIO_WEIGHT: f64 = 15.0;
const DISTANCE_WEIGHT: f64 = 10.0;
const NEAR_SIZE_PENALTY: f64 = 5.0;
const FAR_SIZE_PENALTY: f64 = 10.0;
const LIT_PROTECTION: f64 = 10.0;
/// Remaining FBOs listed next to each removal.
pub const MAX_ALTERNATIVES: usize = 3;

/// Score how little the network loses when going from `before` to `after`.
///
/// Returns a value in (0, 100); 50 means no change, higher means the removed
/// node was more redundant.
pub fn redundancy_score(before: &NetworkMetrics, after: &NetworkMetrics) -> f64 {
    let avg_distance_change = relative_change(before.average_distance_nm, after.average_distance_nm);
    let efficiency_change = relative_change(before.efficiency_score, after.efficiency_score);
    let ratio_change = after.optimal_ratio() - before.optimal_ratio();

    let efficiency_component = signed_log1p(efficiency_change) * EFFICIENCY_WEIGHT;
    let ratio_component = signed_log1p(ratio_change) * RATIO_WEIGHT;
    // Longer average spacing after removal counts against redundancy.
    let distance_component = -signed_log1p(avg_distance_change) * DISTANCE_WEIGHT;

    let raw = efficiency_component + ratio_component + distance_component;
    100.0 / (1.0 + (-raw / 10.0).exp())
}

fn signed_log1p(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    x.signum() * x.abs().ln_1p()
}

/// Fractional change, zero when the baseline is zero.
fn relative_change(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        return 0.0;
    }
    (after - before) / before
}

/// One FBO's redundancy in a scoring round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredFbo<'a> {
    pub airport: &'a Airport,
    pub score: f64,
}

/// A nearby FBO that stays in the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub icao: String,
    pub name: String,
    pub distance_nm: f64,
}

/// An FBO accepted for removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub airport: Airport,
    pub score: f64,
    /// Closest remaining FBOs, nearest first
    pub nearest_alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedundancyOutcome {
    /// Nothing scored above the threshold.
    AlreadyOptimal,
    Removals {
        removals: Vec<Removal>,
        comparison: MetricsComparison,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedundancyReport {
    pub rules: NetworkRules,
    /// Positioned FBOs analyzed
    pub existing_fbos: usize,
    pub outcome: RedundancyOutcome,
}

impl RedundancyReport {
    pub fn removals(&self) -> &[Removal] {
        match &self.outcome {
            RedundancyOutcome::AlreadyOptimal => &[],
            RedundancyOutcome::Removals { removals, .. } => removals,
        }
    }
}

/// Finds FBOs whose removal would not meaningfully hurt the network.
#[derive(Debug, Clone)]
pub struct RedundancyAnalyzer {
    rules: NetworkRules,
}

impl RedundancyAnalyzer {
    pub fn new(rules: NetworkRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NetworkRules {
        &self.rules
    }

    /// Run the greedy removal loop over the current FBO airports.
    pub fn analyze(&self, fbos: &[Airport]) -> Analysis<RedundancyReport> {
        let positioned: Vec<&Airport> = fbos.iter().filter(|f| f.position().is_some()).collect();
        if let Some(advisory) = Advisory::check(fbos.len(), positioned.len(), "redundancy") {
            return Analysis::Insufficient(advisory);
        }

        let optimal = self.rules.optimal_distance_nm;
        let baseline = match NetworkMetrics::calculate(&positioned, optimal) {
            Ok(metrics) => metrics,
            Err(e) => {
                return Analysis::Insufficient(Advisory::from_error(&e, fbos.len(), positioned.len()))
            }
        };

        let mut working = positioned.clone();
        let mut accepted: Vec<ScoredFbo> = Vec::new();

        // Removing from a pair would leave a single node with no metrics.
        while working.len() > 2 {
            let ranked = self.rank_round(&working, &baseline);
            let Some(choice) = ranked
                .iter()
                .take_while(|c| c.score > self.rules.redundancy_threshold)
                .find(|c| {
                    !accepted.iter().any(|a| a.airport.id == c.airport.id)
                        && !self.is_colocated(c.airport, &accepted)
                })
                .copied()
            else {
                break;
            };

            debug!(
                icao = %choice.airport.icao,
                score = choice.score,
                remaining = working.len() - 1,
                "Accepted redundant FBO"
            );
            working.retain(|f| f.id != choice.airport.id);
            accepted.push(choice);
        }

        if accepted.is_empty() {
            return Analysis::Complete(RedundancyReport {
                rules: self.rules.clone(),
                existing_fbos: positioned.len(),
                outcome: RedundancyOutcome::AlreadyOptimal,
            });
        }

        let optimized: Vec<&Airport> = positioned
            .iter()
            .copied()
            .filter(|f| !accepted.iter().any(|a| a.airport.id == f.id))
            .collect();
        let after = match NetworkMetrics::calculate(&optimized, optimal) {
            Ok(metrics) => metrics,
            Err(e) => {
                return Analysis::Insufficient(Advisory::from_error(&e, fbos.len(), positioned.len()))
            }
        };

        let removals = accepted
            .iter()
            .map(|scored| Removal {
                airport: scored.airport.clone(),
                score: scored.score,
                nearest_alternatives: nearest_alternatives(scored.airport, &optimized),
            })
            .collect();

        Analysis::Complete(RedundancyReport {
            rules: self.rules.clone(),
            existing_fbos: positioned.len(),
            outcome: RedundancyOutcome::Removals {
                removals,
                comparison: MetricsComparison {
                    nodes_before: positioned.len(),
                    nodes_after: optimized.len(),
                    before: baseline,
                    after,
                },
            },
        })
    }

    /// Score every member of `working` against the original network, most redundant first.
    ///
    /// Members whose removal leaves no computable network are left out.
    pub fn rank_round<'a>(
        &self,
        working: &[&'a Airport],
        baseline: &NetworkMetrics,
    ) -> Vec<ScoredFbo<'a>> {
        let mut scored: Vec<ScoredFbo<'a>> = working
            .iter()
            .enumerate()
            .filter_map(|(i, fbo)| {
                let remaining: Vec<&Airport> = working
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, f)| *f)
                    .collect();
                let after =
                    NetworkMetrics::calculate(&remaining, self.rules.optimal_distance_nm).ok()?;
                Some(ScoredFbo {
                    airport: *fbo,
                    score: redundancy_score(baseline, &after) + self.preference_adjustment(fbo),
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    fn preference_adjustment(&self, fbo: &Airport) -> f64 {
        let mut adjustment = 0.0;
        if let (Some(preferred), Some(size)) = (self.rules.preferred_size, fbo.size) {
            adjustment += match size.abs_diff(preferred) {
                0 => 0.0,
                1 => NEAR_SIZE_PENALTY,
                _ => FAR_SIZE_PENALTY,
            };
        }
        if self.rules.require_lights && fbo.has_lights {
            adjustment -= LIT_PROTECTION;
        }
        adjustment
    }

    fn is_colocated(&self, fbo: &Airport, accepted: &[ScoredFbo]) -> bool {
        let Some(position) = fbo.position() else {
            return false;
        };
        accepted.iter().any(|a| {
            a.airport
                .position()
                .is_some_and(|p| p.distance_nm(&position) < self.rules.colocation_radius_nm)
        })
    }
}

fn nearest_alternatives(removed: &Airport, remaining: &[&Airport]) -> Vec<Alternative> {
    let Some(origin) = removed.position() else {
        return Vec::new();
    };

    let mut alternatives: Vec<Alternative> = remaining
        .iter()
        .filter_map(|f| {
            let position: GeoPoint = f.position()?;
            Some(Alternative {
                icao: f.icao.clone(),
                name: f.name.clone(),
                distance_nm: origin.distance_nm(&position),
            })
        })
        .collect();

    alternatives.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));
    alternatives.truncate(MAX_ALTERNATIVES);
    alternatives
}
