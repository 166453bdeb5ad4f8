//! Scoring airports as sites for a new FBO.
//!
//! A candidate scores well when many existing FBOs sit near the optimal
//! distance from it. Preferences for size and runway lights then nudge the
//! score before it is clamped to 0-100 and floored.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{Advisory, Analysis};
use crate::geo::{GeoPoint, Located};
use crate::metrics::{closeness_score, is_optimal_connection};
use crate::models::Airport;
use crate::rules::NetworkRules;

/// Bonus for a candidate whose connections are all in the optimal range.
const OPTIMAL_RATIO_BONUS: f64 = 20.0;
const EXACT_SIZE_BONUS: f64 = 15.0;
const NEAR_SIZE_BONUS: f64 = 7.5;
const UNLIT_PENALTY: f64 = 10.0;
/// Supporting connections kept per candidate.
pub const MAX_LISTED_CONNECTIONS: usize = 5;

/// An optimal-range link from a candidate to an existing FBO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub airport_id: String,
    pub icao: String,
    pub distance_nm: f64,
    /// Closeness score this link contributes (0-100)
    pub contribution: f64,
}

/// A scored candidate airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub airport: Airport,
    /// Final score after preferences, 1-100
    pub score: u32,
    /// Distance-based score before size and lights preferences
    pub base_score: f64,
    pub eligible_connections: usize,
    pub total_connections: usize,
    /// Best eligible connections, highest contribution first
    pub connections: Vec<Connection>,
}

/// Ranked candidates plus the counts behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport {
    pub rules: NetworkRules,
    /// Airports with coordinates
    pub airports_considered: usize,
    pub existing_fbos: usize,
    /// Airports left after removing FBO hosts and applying the lights filter
    pub candidates_considered: usize,
    /// Highest score first; zero scores are dropped
    pub ranked: Vec<CandidateScore>,
}

impl CandidateReport {
    pub fn top(&self, n: usize) -> &[CandidateScore] {
        &self.ranked[..n.min(self.ranked.len())]
    }
}

/// Finds the best airports for a new FBO.
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    rules: NetworkRules,
}

impl CandidateScorer {
    pub fn new(rules: NetworkRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NetworkRules {
        &self.rules
    }

    /// Rank every eligible airport against the existing FBO network.
    ///
    /// `fbos` is the set of airports currently hosting an FBO. Returns an
    /// advisory instead of a report when fewer than two of them exist or
    /// fewer than two are positioned.
    pub fn analyze(&self, airports: &[Airport], fbos: &[Airport]) -> Analysis<CandidateReport> {
        let existing: Vec<(&Airport, GeoPoint)> = fbos
            .iter()
            .filter_map(|fbo| fbo.position().map(|p| (fbo, p)))
            .collect();

        if let Some(advisory) = Advisory::check(fbos.len(), existing.len(), "optimization") {
            return Analysis::Insufficient(advisory);
        }

        let fbo_ids: HashSet<&str> = fbos.iter().map(|fbo| fbo.id.as_str()).collect();
        let positioned: Vec<(&Airport, GeoPoint)> = airports
            .iter()
            .filter_map(|a| a.position().map(|p| (a, p)))
            .collect();

        let candidates: Vec<(&Airport, GeoPoint)> = positioned
            .iter()
            .filter(|(a, _)| !fbo_ids.contains(a.id.as_str()))
            .filter(|(a, _)| !self.rules.require_lights || a.has_lights)
            .copied()
            .collect();

        let mut ranked: Vec<CandidateScore> = candidates
            .iter()
            .filter_map(|(airport, position)| self.score_candidate(airport, *position, &existing))
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            airports = positioned.len(),
            candidates = candidates.len(),
            scored = ranked.len(),
            "Scored FBO candidates"
        );

        Analysis::Complete(CandidateReport {
            rules: self.rules.clone(),
            airports_considered: positioned.len(),
            existing_fbos: fbos.len(),
            candidates_considered: candidates.len(),
            ranked,
        })
    }

    /// Score one candidate against positioned FBOs; `None` when it scores zero.
    fn score_candidate(
        &self,
        candidate: &Airport,
        position: GeoPoint,
        existing: &[(&Airport, GeoPoint)],
    ) -> Option<CandidateScore> {
        if existing.is_empty() {
            return None;
        }

        let optimal = self.rules.optimal_distance_nm;
        let mut closeness_total = 0.0;
        let mut eligible = Vec::new();

        for (fbo, fbo_position) in existing {
            let distance_nm = position.distance_nm(fbo_position);
            let contribution = closeness_score(distance_nm, optimal);
            closeness_total += contribution;

            if is_optimal_connection(distance_nm, optimal) {
                eligible.push(Connection {
                    airport_id: fbo.id.clone(),
                    icao: fbo.icao.clone(),
                    distance_nm,
                    contribution,
                });
            }
        }

        let total_connections = existing.len();
        let base_score = if eligible.is_empty() {
            0.0
        } else {
            let ratio = eligible.len() as f64 / total_connections as f64;
            (closeness_total / total_connections as f64 + ratio * OPTIMAL_RATIO_BONUS).min(100.0)
        };

        let mut score = base_score + self.size_bonus(candidate);
        if !self.rules.require_lights && !candidate.has_lights {
            score -= UNLIT_PENALTY;
        }
        let score = score.clamp(0.0, 100.0).floor() as u32;
        if score == 0 {
            return None;
        }

        eligible.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
        let eligible_connections = eligible.len();
        eligible.truncate(MAX_LISTED_CONNECTIONS);

        Some(CandidateScore {
            airport: candidate.clone(),
            score,
            base_score,
            eligible_connections,
            total_connections,
            connections: eligible,
        })
    }

    fn size_bonus(&self, candidate: &Airport) -> f64 {
        match (self.rules.preferred_size, candidate.size) {
            (Some(preferred), Some(size)) => match size.abs_diff(preferred) {
                0 => EXACT_SIZE_BONUS,
                1 => NEAR_SIZE_BONUS,
                _ => 0.0,
            },
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_nm;

    fn fbo(id: &str, lat: f64, lon: f64) -> Airport {
        Airport::new(id, id.to_uppercase(), format!("{id} field"))
            .at(lat, lon)
            .with_lights(true)
            .with_fbo(true)
    }

    fn rules(optimal: f64) -> NetworkRules {
        NetworkRules {
            require_lights: false,
            ..NetworkRules::with_optimal_distance(optimal)
        }
    }

    fn one_degree() -> f64 {
        haversine_nm(0.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn advisory_when_network_is_too_small() {
        let scorer = CandidateScorer::new(rules(60.0));
        let airports = vec![Airport::new("c", "CCCC", "c").at(0.0, 1.0)];

        let analysis = scorer.analyze(&airports, &[fbo("a", 0.0, 0.0)]);
        assert!(analysis.advisory().unwrap().message.contains("fewer than 2 FBOs"));

        let unpositioned = Airport::new("b", "BBBB", "b").with_fbo(true);
        let analysis = scorer.analyze(&airports, &[fbo("a", 0.0, 0.0), unpositioned]);
        assert!(analysis.advisory().unwrap().message.contains("only 1 have valid"));
    }

    #[test]
    fn exact_optimal_candidate_has_base_score_100() {
        // Candidate on the equator between two FBOs one degree either side.
        let optimal = one_degree();
        let fbos = vec![fbo("a", 0.0, 0.0), fbo("b", 0.0, 2.0)];
        let candidate = Airport::new("c", "CCCC", "Centre").at(0.0, 1.0).with_lights(true);

        let report = CandidateScorer::new(rules(optimal))
            .analyze(&[candidate], &fbos)
            .complete()
            .unwrap();

        let best = &report.ranked[0];
        assert!((best.base_score - 100.0).abs() < 1e-9);
        assert_eq!(best.score, 100);
        assert_eq!(best.eligible_connections, 2);
        assert_eq!(best.total_connections, 2);
    }

    #[test]
    fn filters_hosts_unpositioned_and_unlit_airports() {
        let fbos = vec![fbo("a", 0.0, 0.0), fbo("b", 0.0, 2.0)];
        let mut airports = fbos.clone();
        airports.push(Airport::new("dark", "DARK", "Dark").at(0.0, 1.0));
        airports.push(Airport::new("lit", "LITE", "Lit").at(0.0, 1.0).with_lights(true));
        airports.push(Airport::new("nowhere", "NOPE", "Nowhere").with_lights(true));

        let scorer = CandidateScorer::new(NetworkRules {
            require_lights: true,
            ..NetworkRules::with_optimal_distance(one_degree())
        });
        let report = scorer.analyze(&airports, &fbos).complete().unwrap();

        assert_eq!(report.airports_considered, 4);
        assert_eq!(report.existing_fbos, 2);
        assert_eq!(report.candidates_considered, 1);
        assert_eq!(report.ranked.len(), 1);
        assert_eq!(report.ranked[0].airport.icao, "LITE");
    }

    #[test]
    fn unlit_penalty_and_size_preference_adjust_score() {
        let fbos = vec![fbo("a", 0.0, 0.0), fbo("b", 0.0, 2.0)];
        let airports = vec![
            Airport::new("exact", "EXAC", "Exact").at(0.0, 1.0).with_size(3),
            Airport::new("near", "NEAR", "Near").at(0.0, 1.0).with_size(4).with_lights(true),
            Airport::new("far", "FARR", "Far").at(0.0, 1.0).with_size(0).with_lights(true),
        ];

        let scorer = CandidateScorer::new(NetworkRules {
            preferred_size: Some(3),
            ..rules(one_degree())
        });
        let report = scorer.analyze(&airports, &fbos).complete().unwrap();
        let score_of = |icao: &str| {
            report
                .ranked
                .iter()
                .find(|c| c.airport.icao == icao)
                .map(|c| c.score)
                .unwrap()
        };

        // 100 + 15 - 10 capped at 100; 100 + 7.5 capped; 100 untouched.
        assert_eq!(score_of("EXAC"), 100);
        assert_eq!(score_of("NEAR"), 100);
        assert_eq!(score_of("FARR"), 100);

        let off_optimal = vec![
            Airport::new("dark", "DARK", "Dark").at(0.0, 1.1),
            Airport::new("lit", "LITE", "Lit").at(0.0, 1.1).with_lights(true),
        ];
        let report = CandidateScorer::new(rules(one_degree()))
            .analyze(&off_optimal, &fbos)
            .complete()
            .unwrap();
        let dark = report.ranked.iter().find(|c| c.airport.icao == "DARK").unwrap();
        let lit = report.ranked.iter().find(|c| c.airport.icao == "LITE").unwrap();
        assert_eq!(lit.score - dark.score, 10);
    }

    #[test]
    fn candidates_without_optimal_connections_are_dropped() {
        let fbos = vec![fbo("a", 0.0, 0.0), fbo("b", 0.0, 2.0)];
        let airports = vec![Airport::new("x", "XXXX", "Remote").at(40.0, 100.0).with_lights(true)];

        let report = CandidateScorer::new(rules(one_degree()))
            .analyze(&airports, &fbos)
            .complete()
            .unwrap();
        assert_eq!(report.candidates_considered, 1);
        assert!(report.ranked.is_empty());
    }

    #[test]
    fn ranking_is_descending_with_enumeration_order_on_ties() {
        let fbos = vec![fbo("a", 0.0, 0.0), fbo("b", 0.0, 2.0)];
        let airports = vec![
            Airport::new("t1", "TIE1", "Tie one").at(0.0, 1.0).with_lights(true),
            Airport::new("off", "OFFF", "Off").at(0.0, 2.9).with_lights(true),
            Airport::new("t2", "TIE2", "Tie two").at(0.0, 1.0).with_lights(true),
        ];
        let report = CandidateScorer::new(rules(one_degree()))
            .analyze(&airports, &fbos)
            .complete()
            .unwrap();

        let order: Vec<&str> = report.ranked.iter().map(|c| c.airport.icao.as_str()).collect();
        assert_eq!(order, vec!["TIE1", "TIE2", "OFFF"]);
        assert!(report.ranked.iter().all(|c| c.score > 0));
    }

    #[test]
    fn supporting_connections_are_capped_and_sorted() {
        let fbos: Vec<Airport> = (0..7)
            .map(|i| fbo(&format!("f{i}"), 0.0, 1.0 + i as f64 * 0.01))
            .collect();
        let airports = vec![Airport::new("c", "CCCC", "c").at(0.0, 0.0).with_lights(true)];

        let report = CandidateScorer::new(rules(one_degree()))
            .analyze(&airports, &fbos)
            .complete()
            .unwrap();
        let best = &report.ranked[0];
        assert_eq!(best.eligible_connections, 7);
        assert_eq!(best.connections.len(), MAX_LISTED_CONNECTIONS);
        assert_eq!(best.connections[0].icao, "F0");
        assert!(best
            .connections
            .windows(2)
            .all(|w| w[0].contribution >= w[1].contribution));
    }
}
