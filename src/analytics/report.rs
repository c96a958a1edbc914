use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::cluster::ClusterModel;
use crate::analytics::features::{FEATURE_NAMES, SessionFeatures};
use crate::analytics::normalize::FeatureScaler;
use crate::analytics::sessions::Session;

/// Round a continuous aggregate to the 2 decimal places used on the wire.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate statistics for one behavioral cluster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub session_count: usize,
    pub avg_duration_minutes: f64,
    pub avg_track_count: f64,
    pub avg_skip_ratio_percent: f64,
    pub avg_diversity_score: f64,
    /// Mean session start hour, rounded to the nearest integer hour
    pub dominant_hour: u32,
    pub weekend_percent: f64,
}

/// One cluster centroid mapped back to human-readable feature units.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCentroid {
    pub cluster_id: usize,
    pub features: BTreeMap<String, f64>,
}

/// A recent session tagged with its cluster label. Raw event payloads are
/// deliberately not part of the response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAssignment {
    pub session_id: usize,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: f64,
    pub track_count: usize,
    pub unique_artist_count: usize,
    pub skip_ratio_percent: f64,
    pub diversity_score: f64,
    pub hour_of_day: u32,
    pub is_weekend: bool,
    pub cluster_label: usize,
}

/// Maps a fitted cluster model back to human-readable aggregates.
pub struct ClusterReportBuilder;

impl ClusterReportBuilder {
    /// Per-cluster aggregate statistics over the retained sessions.
    pub fn build_report(
        model: &ClusterModel,
        features: &[SessionFeatures],
    ) -> Vec<ClusterSummary> {
        (0..model.k.max(1))
            .map(|cluster_id| {
                let members: Vec<&SessionFeatures> = features
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| model.labels[*i] == cluster_id)
                    .map(|(_, f)| f)
                    .collect();
                Self::summarize(cluster_id, &members)
            })
            .collect()
    }

    fn summarize(cluster_id: usize, members: &[&SessionFeatures]) -> ClusterSummary {
        if members.is_empty() {
            return ClusterSummary {
                cluster_id,
                session_count: 0,
                avg_duration_minutes: 0.0,
                avg_track_count: 0.0,
                avg_skip_ratio_percent: 0.0,
                avg_diversity_score: 0.0,
                dominant_hour: 0,
                weekend_percent: 0.0,
            };
        }

        let n = members.len() as f64;
        let mean = |get: fn(&SessionFeatures) -> f64| -> f64 {
            members.iter().map(|f| get(f)).sum::<f64>() / n
        };

        ClusterSummary {
            cluster_id,
            session_count: members.len(),
            avg_duration_minutes: round2(mean(|f| f.duration_minutes)),
            avg_track_count: round2(mean(|f| f.track_count)),
            avg_skip_ratio_percent: round2(mean(|f| f.skip_ratio_percent)),
            avg_diversity_score: round2(mean(|f| f.diversity_score)),
            dominant_hour: mean(|f| f.hour_of_day).round() as u32,
            weekend_percent: round2(mean(|f| f.is_weekend) * 100.0),
        }
    }

    /// De-normalize the model's centroids into `{feature name: value}` maps.
    pub fn centroids_in_original_units(
        model: &ClusterModel,
        scaler: &FeatureScaler,
    ) -> Vec<ClusterCentroid> {
        model
            .centroids
            .iter()
            .enumerate()
            .map(|(cluster_id, centroid)| {
                let original = scaler.inverse_transform(centroid);
                let features = FEATURE_NAMES
                    .iter()
                    .zip(&original)
                    .map(|(name, value)| (name.to_string(), round2(*value)))
                    .collect();
                ClusterCentroid {
                    cluster_id,
                    features,
                }
            })
            .collect()
    }

    /// The most recent sessions (by start time, descending), each tagged with
    /// its cluster label, truncated to `limit`.
    pub fn recent_assignments(
        model: &ClusterModel,
        sessions: &[Session],
        features: &[SessionFeatures],
        limit: usize,
    ) -> Vec<SessionAssignment> {
        let mut order: Vec<usize> = (0..sessions.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(sessions[i].start_time));
        order.truncate(limit);

        order
            .into_iter()
            .map(|i| {
                let session = &sessions[i];
                let f = &features[i];
                SessionAssignment {
                    session_id: session.id,
                    start_time: session.start_time.to_rfc3339(),
                    end_time: session.end_time.to_rfc3339(),
                    duration_minutes: round2(f.duration_minutes),
                    track_count: session.track_count(),
                    unique_artist_count: session.unique_artist_count(),
                    skip_ratio_percent: round2(f.skip_ratio_percent),
                    diversity_score: round2(f.diversity_score),
                    hour_of_day: f.hour_of_day as u32,
                    is_weekend: f.is_weekend > 0.0,
                    cluster_label: model.labels.get(i).copied().unwrap_or(0),
                }
            })
            .collect()
    }
}
