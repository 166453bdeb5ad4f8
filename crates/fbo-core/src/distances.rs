//! Pairwise distance report for the FBO network.

use serde::Serialize;

use crate::error::AnalysisError;
use crate::geo::{pairwise_distances, GeoPoint};
use crate::models::Fbo;

/// Connections listed in each of the closest / furthest sections.
pub const HIGHLIGHT_COUNT: usize = 5;
/// Above this many pairs the report notes that only highlights are shown.
pub const FULL_LISTING_LIMIT: usize = 10;

/// Distance between two FBOs, identified by ICAO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistancePair {
    pub from: String,
    pub to: String,
    pub distance_nm: f64,
}

/// FBOs within the cluster radius of a seed FBO (the first member).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceReport {
    pub fbo_count: usize,
    pub average_distance_nm: f64,
    pub shortest: DistancePair,
    pub longest: DistancePair,
    /// Every pair, shortest first
    pub pairs: Vec<DistancePair>,
    pub cluster_radius_nm: f64,
    /// Clusters with at least two members
    pub clusters: Vec<Cluster>,
}

impl DistanceReport {
    pub fn closest(&self) -> &[DistancePair] {
        &self.pairs[..HIGHLIGHT_COUNT.min(self.pairs.len())]
    }

    /// Longest connections, longest first.
    pub fn furthest(&self) -> impl Iterator<Item = &DistancePair> {
        self.pairs.iter().rev().take(HIGHLIGHT_COUNT)
    }

    pub fn is_abridged(&self) -> bool {
        self.pairs.len() > FULL_LISTING_LIMIT
    }
}

/// Build the distance report for positioned FBOs.
pub fn analyze_distances(fbos: &[Fbo], cluster_radius_nm: f64) -> Result<DistanceReport, AnalysisError> {
    if fbos.len() < 2 {
        return Err(AnalysisError::InsufficientFbos { found: fbos.len() });
    }

    let mut pairs = Vec::new();
    let mut total_distance = 0.0;
    let mut shortest: Option<DistancePair> = None;
    let mut longest: Option<DistancePair> = None;

    for (i, j, distance_nm) in pairwise_distances(fbos) {
        let pair = DistancePair {
            from: fbos[i].icao.clone(),
            to: fbos[j].icao.clone(),
            distance_nm,
        };
        total_distance += distance_nm;

        if shortest.as_ref().map_or(true, |s| distance_nm < s.distance_nm) {
            shortest = Some(pair.clone());
        }
        if longest.as_ref().map_or(true, |l| distance_nm > l.distance_nm) {
            longest = Some(pair.clone());
        }
        pairs.push(pair);
    }

    let (Some(shortest), Some(longest)) = (shortest, longest) else {
        return Err(AnalysisError::NoConnections { positioned: fbos.len() });
    };

    let average_distance_nm = total_distance / pairs.len() as f64;
    // Stable sort keeps input order between equal distances.
    pairs.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));

    Ok(DistanceReport {
        fbo_count: fbos.len(),
        average_distance_nm,
        shortest,
        longest,
        pairs,
        cluster_radius_nm,
        clusters: proximity_clusters(fbos, cluster_radius_nm),
    })
}

/// Group FBOs around seeds visited in input order.
///
/// Each unvisited FBO seeds a cluster and absorbs every other unvisited FBO
/// within `radius_nm` of the seed itself. Absorbed members do not extend the
/// cluster further.
pub fn proximity_clusters(fbos: &[Fbo], radius_nm: f64) -> Vec<Cluster> {
    let mut visited = vec![false; fbos.len()];
    let mut clusters = Vec::new();

    for (i, seed) in fbos.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let seed_position = GeoPoint::new(seed.latitude, seed.longitude);
        let mut members = vec![seed.icao.clone()];
        for (j, other) in fbos.iter().enumerate() {
            if visited[j] {
                continue;
            }
            let distance =
                seed_position.distance_nm(&GeoPoint::new(other.latitude, other.longitude));
            if distance <= radius_nm {
                visited[j] = true;
                members.push(other.icao.clone());
            }
        }

        if members.len() >= 2 {
            clusters.push(Cluster { members });
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fbo(id: i64, icao: &str, lat: f64, lon: f64) -> Fbo {
        Fbo {
            id,
            airport_id: format!("apt-{id}"),
            icao: icao.to_string(),
            name: format!("{icao} FBO"),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn rejects_fewer_than_two_fbos() {
        let result = analyze_distances(&[fbo(1, "AAAA", 0.0, 0.0)], 300.0);
        assert_eq!(result, Err(AnalysisError::InsufficientFbos { found: 1 }));
    }

    #[test]
    fn pairs_are_sorted_and_extremes_match() {
        let fbos = vec![
            fbo(1, "AAAA", 0.0, 0.0),
            fbo(2, "BBBB", 10.0, 3.0),
            fbo(3, "CCCC", -4.0, 7.0),
            fbo(4, "DDDD", 0.5, 0.5),
        ];
        let report = analyze_distances(&fbos, 300.0).unwrap();

        assert_eq!(report.pairs.len(), 6);
        assert!(report
            .pairs
            .windows(2)
            .all(|w| w[0].distance_nm <= w[1].distance_nm));

        let min = report.pairs.iter().map(|p| p.distance_nm).fold(f64::MAX, f64::min);
        let max = report.pairs.iter().map(|p| p.distance_nm).fold(0.0, f64::max);
        assert_eq!(report.shortest.distance_nm, min);
        assert_eq!(report.longest.distance_nm, max);
        assert_eq!((report.shortest.from.as_str(), report.shortest.to.as_str()), ("AAAA", "DDDD"));

        let furthest: Vec<&DistancePair> = report.furthest().collect();
        assert_eq!(furthest.len(), 5);
        assert_eq!(furthest[0], &report.longest);
        assert!(!report.is_abridged());
    }

    #[test]
    fn first_seen_pair_wins_ties() {
        let fbos = vec![
            fbo(1, "AAAA", 0.0, 0.0),
            fbo(2, "BBBB", 0.0, 1.0),
            fbo(3, "CCCC", 0.0, 2.0),
        ];
        let report = analyze_distances(&fbos, 300.0).unwrap();
        assert_eq!(report.shortest.from, "AAAA");
        assert_eq!(report.shortest.to, "BBBB");
        assert_eq!(report.pairs[0].to, "BBBB");
        assert_eq!(report.pairs[1].from, "BBBB");
        assert_eq!(report.closest().len(), 3);
    }

    #[test]
    fn clusters_absorb_only_around_the_seed() {
        // B is within 300 nm of A; C is within 300 nm of B but not of A.
        let fbos = vec![
            fbo(1, "AAAA", 0.0, 0.0),
            fbo(2, "BBBB", 0.0, 4.0),
            fbo(3, "CCCC", 0.0, 8.0),
            fbo(4, "DDDD", 40.0, 40.0),
        ];
        let clusters = proximity_clusters(&fbos, 300.0);
        assert_eq!(
            clusters,
            vec![Cluster {
                members: vec!["AAAA".to_string(), "BBBB".to_string()]
            }]
        );
    }

    #[test]
    fn large_networks_are_abridged() {
        let fbos: Vec<Fbo> = (0..5)
            .map(|i| fbo(i, &format!("F00{i}"), i as f64 * 3.0, 0.0))
            .collect();
        let report = analyze_distances(&fbos, 300.0).unwrap();
        assert_eq!(report.pairs.len(), 10);
        assert!(!report.is_abridged());

        let fbos: Vec<Fbo> = (0..6)
            .map(|i| fbo(i, &format!("F00{i}"), i as f64 * 3.0, 0.0))
            .collect();
        assert!(analyze_distances(&fbos, 300.0).unwrap().is_abridged());
    }
}
