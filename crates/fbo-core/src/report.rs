//! Plain-text rendering of analysis results.

use std::fmt;

use crate::candidates::CandidateReport;
use crate::distances::DistanceReport;
use crate::metrics::NetworkMetrics;
use crate::redundancy::{RedundancyOutcome, RedundancyReport};
use crate::rules::NetworkRules;

/// Candidates shown in the recommendation list.
pub const TOP_CANDIDATES: usize = 10;

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn write_distances(f: &mut fmt::Formatter<'_>, rules: &NetworkRules) -> fmt::Result {
    writeln!(
        f,
        "Using: optimal distance: {:.2} nm, maximum distance: {:.2} nm",
        rules.optimal_distance_nm, rules.max_distance_nm
    )
}

impl fmt::Display for NetworkMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network Metrics:")?;
        writeln!(f, "  • Average distance: {:.2} nm", self.average_distance_nm)?;
        writeln!(f, "  • Efficiency score: {:.2}", self.efficiency_score)?;
        write!(
            f,
            "  • Optimal connections: {}/{}",
            self.optimal_connections, self.total_connections
        )
    }
}

impl fmt::Display for CandidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_distances(f, &self.rules)?;
        if self.rules.require_lights {
            writeln!(f, "Requiring airports with lights: Yes")?;
        } else {
            writeln!(
                f,
                "Requiring airports with lights: No (airports without lights receive a score penalty)"
            )?;
        }
        if let Some(size) = self.rules.preferred_size {
            writeln!(
                f,
                "Preferred airport size: {size} (exact match receives bonus points, \
                 sizes within ±1 receive smaller bonus)"
            )?;
        }
        writeln!(
            f,
            "Found: {} airports, {} existing FBOs, and {} candidate airports.",
            self.airports_considered, self.existing_fbos, self.candidates_considered
        )?;

        writeln!(f)?;
        writeln!(f, "Top recommended airports for new FBOs:")?;
        if self.ranked.is_empty() {
            writeln!(f, "  No candidate airports scored above zero.")?;
        }

        for (i, candidate) in self.top(TOP_CANDIDATES).iter().enumerate() {
            let label = format!("{} ({})", candidate.airport.label(), candidate.airport.icao);
            let score = format!("Score: {}", candidate.score);
            let connections = format!(
                "Connections: {}/{}",
                candidate.eligible_connections, candidate.total_connections
            );
            writeln!(f, "{:<3} {:<40}  {:<15}  {:<20}", i + 1, label, score, connections)?;

            if !candidate.connections.is_empty() {
                let details: Vec<String> = candidate
                    .connections
                    .iter()
                    .map(|c| format!("{} ({} nm)", c.icao, c.distance_nm.round() as i64))
                    .collect();
                writeln!(f, "   {}", details.join(", "))?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for RedundancyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = &self.rules;
        writeln!(f, "FBO Redundancy Analysis:")?;
        writeln!(f)?;
        write_distances(f, rules)?;
        writeln!(f, "Requiring airports with lights: {}", yes_no(rules.require_lights))?;
        if let Some(size) = rules.preferred_size {
            writeln!(f, "Preferred airport size: {size}")?;
        }
        writeln!(
            f,
            "Redundancy threshold: {:.1} (scores range from 0-100, higher threshold = less aggressive)",
            rules.redundancy_threshold
        )?;
        writeln!(f, "Found: {} existing FBOs in the network.", self.existing_fbos)?;
        writeln!(f)?;

        let (removals, comparison) = match &self.outcome {
            RedundancyOutcome::AlreadyOptimal => {
                writeln!(
                    f,
                    "Scenario Assessment: Based on the analysis with a redundancy threshold of {:.1}, \
                     no FBOs are considered redundant in the current network. The existing FBO \
                     distribution provides optimal coverage given the specified criteria.",
                    rules.redundancy_threshold
                )?;
                writeln!(f)?;
                writeln!(
                    f,
                    "No changes are recommended at this time. Lower the redundancy threshold \
                     (FBO_REDUNDANCY_THRESHOLD) to identify more FBOs for potential removal. \
                     A threshold of 100 is very strict, 50 is moderate, and 0 would consider \
                     every FBO for removal."
                )?;
                return Ok(());
            }
            RedundancyOutcome::Removals {
                removals,
                comparison,
            } => (removals, comparison),
        };

        writeln!(
            f,
            "Scenario Assessment: The analysis identified {} FBOs that could be considered \
             redundant without significantly impacting network coverage. Only FBOs scoring above \
             the threshold of {:.1} are considered for removal.",
            removals.len(),
            rules.redundancy_threshold
        )?;
        writeln!(f)?;

        writeln!(f, "Network Metrics Comparison:")?;
        writeln!(
            f,
            "  • Total FBOs: {} → {} ({:+.0}%)",
            comparison.nodes_before,
            comparison.nodes_after,
            comparison.node_change_pct()
        )?;
        writeln!(
            f,
            "  • Average distance between FBOs: {:.2} nm → {:.2} nm ({:+.2}%)",
            comparison.before.average_distance_nm,
            comparison.after.average_distance_nm,
            comparison.average_distance_change_pct()
        )?;
        writeln!(
            f,
            "  • Network efficiency score: {:.2} → {:.2} ({:+.2}%)",
            comparison.before.efficiency_score,
            comparison.after.efficiency_score,
            comparison.efficiency_change_pct()
        )?;
        writeln!(f)?;

        writeln!(f, "Recommended FBOs for removal:")?;
        for (i, removal) in removals.iter().enumerate() {
            writeln!(
                f,
                "{}. {} ({}) - Redundancy Score: {:.1}",
                i + 1,
                removal.airport.label(),
                removal.airport.icao,
                removal.score
            )?;
            if !removal.nearest_alternatives.is_empty() {
                let nearest: Vec<String> = removal
                    .nearest_alternatives
                    .iter()
                    .map(|a| format!("{} ({:.0} nm)", a.icao, a.distance_nm))
                    .collect();
                writeln!(f, "   Nearest alternative FBOs: {}", nearest.join(", "))?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for DistanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FBO Network Analysis:")?;
        writeln!(f)?;
        writeln!(f, "Summary Statistics:")?;
        writeln!(f, "  • Total FBOs: {}", self.fbo_count)?;
        writeln!(f, "  • Total connections: {}", self.pairs.len())?;
        writeln!(f, "  • Average distance: {:.2} nm", self.average_distance_nm)?;
        writeln!(
            f,
            "  • Shortest connection: {:.2} nm ({} to {})",
            self.shortest.distance_nm, self.shortest.from, self.shortest.to
        )?;
        writeln!(
            f,
            "  • Longest connection: {:.2} nm ({} to {})",
            self.longest.distance_nm, self.longest.from, self.longest.to
        )?;
        writeln!(f)?;

        writeln!(f, "Closest Connections:")?;
        for (i, pair) in self.closest().iter().enumerate() {
            writeln!(f, "  {}. {} to {}: {:.2} nm", i + 1, pair.from, pair.to, pair.distance_nm)?;
        }
        writeln!(f)?;

        writeln!(f, "Furthest Connections:")?;
        for (i, pair) in self.furthest().enumerate() {
            writeln!(f, "  {}. {} to {}: {:.2} nm", i + 1, pair.from, pair.to, pair.distance_nm)?;
        }
        writeln!(f)?;

        writeln!(f, "FBO Clusters:")?;
        if self.clusters.is_empty() {
            writeln!(f, "  No clusters found within {:.0} nm", self.cluster_radius_nm)?;
        }
        for (i, cluster) in self.clusters.iter().enumerate() {
            writeln!(
                f,
                "  Cluster {}: {} (within {:.0} nm)",
                i + 1,
                cluster.members.join(", "),
                self.cluster_radius_nm
            )?;
        }

        if self.is_abridged() {
            writeln!(f)?;
            writeln!(
                f,
                "Note: {} total connections exist. Only the most significant are shown above.",
                self.pairs.len()
            )?;
        }

        Ok(())
    }
}
