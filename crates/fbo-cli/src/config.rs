//! CLI configuration from environment.

use fbo_core::{NetworkRules, MAX_AIRPORT_SIZE};
use fbo_onair::DEFAULT_BASE_URL;
use std::env;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub rules: NetworkRules,
    pub onair_api_key: Option<String>,
    pub onair_company_id: Option<String>,
    pub onair_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = NetworkRules::default();
        let number = |key: &str, default: f64| -> f64 {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        };

        let rules = NetworkRules {
            optimal_distance_nm: positive_distance(
                "FBO_NM_OPTIMAL",
                number("FBO_NM_OPTIMAL", defaults.optimal_distance_nm),
                defaults.optimal_distance_nm,
            ),
            max_distance_nm: positive_distance(
                "FBO_NM_MAX",
                number("FBO_NM_MAX", defaults.max_distance_nm),
                defaults.max_distance_nm,
            ),
            require_lights: lookup("FBO_REQ_LIGHTS")
                .map(|s| s == "true")
                .unwrap_or(defaults.require_lights),
            preferred_size: lookup("FBO_PREFERRED_SIZE").and_then(|s| parse_preferred_size(&s)),
            redundancy_threshold: number(
                "FBO_REDUNDANCY_THRESHOLD",
                defaults.redundancy_threshold,
            ),
            colocation_radius_nm: number("FBO_COLOCATION_NM", defaults.colocation_radius_nm),
            cluster_radius_nm: number("FBO_CLUSTER_NM", defaults.cluster_radius_nm),
        };

        let db_path = lookup("FBO_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = lookup("HOME").unwrap_or_else(|| ".".to_string());
                PathBuf::from(home).join(".offair").join("offair.db")
            });

        Self {
            db_path,
            rules,
            onair_api_key: lookup("ONAIR_API_KEY").filter(|s| !s.trim().is_empty()),
            onair_company_id: lookup("ONAIR_COMPANY_ID").filter(|s| !s.trim().is_empty()),
            onair_base_url: lookup("ONAIR_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

fn positive_distance(key: &str, value: f64, default: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        return value;
    }
    warn!(
        key = %key,
        value,
        default,
        "Ignoring non-positive distance, using default"
    );
    default
}

fn parse_preferred_size(value: &str) -> Option<u8> {
    match value.trim().parse::<u8>() {
        Ok(size) if size <= MAX_AIRPORT_SIZE => Some(size),
        _ => {
            warn!(
                value = %value,
                "Ignoring FBO_PREFERRED_SIZE: expected an airport size between 0 and {}",
                MAX_AIRPORT_SIZE
            );
            None
        }
    }
}
