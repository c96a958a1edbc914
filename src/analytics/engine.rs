use log::debug;
use serde::Serialize;

use crate::analytics::cluster::{self, ClusterModel};
use crate::analytics::config::AnalyticsConfig;
use crate::analytics::features::{FeatureExtractor, SessionFeatures};
use crate::analytics::normalize::FeatureScaler;
use crate::analytics::report::{
    ClusterCentroid, ClusterReportBuilder, ClusterSummary, SessionAssignment, round2,
};
use crate::analytics::sessions::{Session, SessionBuilder};
use crate::store::EventStore;

/// The per-cluster aggregate report returned by [`SessionAnalyzer::session_clusters`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClustersReport {
    pub total_sessions: usize,
    pub cluster_count: usize,
    /// `null` when the degenerate single-cluster fallback is in effect
    pub silhouette_score: Option<f64>,
    pub clusters: Vec<ClusterSummary>,
}

struct PipelineRun {
    sessions: Vec<Session>,
    features: Vec<SessionFeatures>,
    scaler: FeatureScaler,
    model: ClusterModel,
}

/// Runs the full session-clustering pipeline against an event snapshot.
///
/// Each entry point recomputes sessions, features, scaling, and the cluster
/// model from the passed store; nothing is cached between calls. Clustering
/// is best-effort enrichment: when too few sessions exist, the entry points
/// fall back to a well-formed single-cluster result instead of erroring.
pub struct SessionAnalyzer {
    config: AnalyticsConfig,
}

impl SessionAnalyzer {
    pub fn new(config: AnalyticsConfig) -> SessionAnalyzer {
        SessionAnalyzer { config }
    }

    pub fn with_defaults() -> SessionAnalyzer {
        SessionAnalyzer::new(AnalyticsConfig::default())
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn run_pipeline(&self, store: &EventStore) -> PipelineRun {
        let sessions = SessionBuilder::build(store.events(), &self.config);
        let features = FeatureExtractor::extract_all(&sessions);
        let rows: Vec<Vec<f64>> = features.iter().map(|f| f.to_vector()).collect();
        let (scaled, scaler) = FeatureScaler::fit(&rows);

        let model = match cluster::select_and_cluster(&scaled, &self.config) {
            Ok(model) => model,
            Err(err) => {
                debug!("falling back to single-cluster result: {err}");
                ClusterModel::degenerate(sessions.len())
            }
        };

        PipelineRun {
            sessions,
            features,
            scaler,
            model,
        }
    }

    /// Per-cluster aggregate statistics for the whole history.
    pub fn session_clusters(&self, store: &EventStore) -> SessionClustersReport {
        let run = self.run_pipeline(store);
        SessionClustersReport {
            total_sessions: run.sessions.len(),
            cluster_count: run.model.k,
            silhouette_score: run.model.silhouette_score.map(round2),
            clusters: ClusterReportBuilder::build_report(&run.model, &run.features),
        }
    }

    /// Cluster centroids in original feature units. Empty in the degenerate
    /// single-cluster fallback.
    pub fn session_centroids(&self, store: &EventStore) -> Vec<ClusterCentroid> {
        let run = self.run_pipeline(store);
        ClusterReportBuilder::centroids_in_original_units(&run.model, &run.scaler)
    }

    /// The most recent sessions with their cluster labels, newest first.
    pub fn session_assignments(&self, store: &EventStore, limit: usize) -> Vec<SessionAssignment> {
        let run = self.run_pipeline(store);
        ClusterReportBuilder::recent_assignments(&run.model, &run.sessions, &run.features, limit)
    }
}
