use serde::{Deserialize, Serialize};

/// Tunable thresholds for the session analytics pipeline
///
/// Every value here is configuration rather than a hardcoded invariant; the
/// defaults match the documented behavior of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// A gap longer than this between consecutive plays starts a new session
    pub gap_threshold_minutes: i64,
    /// Sessions with fewer plays than this are dropped, not zero-padded
    pub min_track_count: usize,
    /// Below this many sessions, clustering falls back to a single cluster
    pub min_sessions_for_clustering: usize,
    /// Smallest candidate cluster count
    pub k_min: usize,
    /// Largest candidate cluster count, before the per-session-count bound
    pub k_max_cap: usize,
    /// K-means restarts per candidate k; best inertia wins
    pub restarts: usize,
    /// Iteration cap for a single k-means run
    pub max_iterations: usize,
    /// Seed for reproducible k-means initialization
    pub seed: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            gap_threshold_minutes: 30,
            min_track_count: 3,
            min_sessions_for_clustering: 10,
            k_min: 2,
            k_max_cap: 8,
            restarts: 10,
            max_iterations: 300,
            seed: 42,
        }
    }
}

impl AnalyticsConfig {
    /// Load an analytics configuration from a JSON file
    pub fn load_from_file(path: &str) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyticsConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
