use log::debug;

use crate::analytics::config::AnalyticsConfig;
use crate::analytics::kmeans;
use crate::analytics::silhouette;
use crate::error::InsufficientDataError;

/// The fitted artifact of one clustering run. Immutable once built;
/// recomputed on every query.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    pub k: usize,
    /// Cluster label per retained session, in `[0, k)`
    pub labels: Vec<usize>,
    /// Centroids in normalized feature space
    pub centroids: Vec<Vec<f64>>,
    /// Quality of the chosen labeling; `None` for the degenerate fallback
    pub silhouette_score: Option<f64>,
}

impl ClusterModel {
    /// Single-cluster fallback used when too few sessions exist for
    /// clustering to be meaningful: every session lands in cluster 0 and the
    /// centroid list stays empty.
    pub fn degenerate(session_count: usize) -> ClusterModel {
        ClusterModel {
            k: 1,
            labels: vec![0; session_count],
            centroids: Vec::new(),
            silhouette_score: None,
        }
    }
}

/// Choose the cluster count by silhouette score over the candidate range,
/// then keep the winning fit's labels and centroids.
///
/// The candidate range is `[k_min, min(k_max_cap, n / 10)]`, floored at
/// `k_min`: one candidate cluster per ten sessions, capped. Ties prefer the
/// smaller k.
pub fn select_and_cluster(
    scaled: &[Vec<f64>],
    config: &AnalyticsConfig,
) -> Result<ClusterModel, InsufficientDataError> {
    let n = scaled.len();
    if n < config.min_sessions_for_clustering {
        return Err(InsufficientDataError {
            available: n,
            required: config.min_sessions_for_clustering,
        });
    }

    let k_max = (n / 10).min(config.k_max_cap).max(config.k_min);

    let mut best_fit = kmeans::fit(
        scaled,
        config.k_min,
        config.restarts,
        config.max_iterations,
        config.seed,
    );
    let mut best_score = silhouette::score(scaled, &best_fit.labels, config.k_min);
    let mut best_k = config.k_min;
    debug!("k={}: silhouette {:.4}", config.k_min, best_score);

    for k in (config.k_min + 1)..=k_max {
        let fit = kmeans::fit(scaled, k, config.restarts, config.max_iterations, config.seed);
        let score = silhouette::score(scaled, &fit.labels, k);
        debug!("k={k}: silhouette {score:.4}");
        // Strict comparison keeps the smaller k on ties
        if score > best_score {
            best_score = score;
            best_fit = fit;
            best_k = k;
        }
    }

    debug!("selected k={best_k} with silhouette {best_score:.4}");
    Ok(ClusterModel {
        k: best_k,
        labels: best_fit.labels,
        centroids: best_fit.centroids,
        silhouette_score: Some(best_score),
    })
}
