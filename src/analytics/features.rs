use chrono::{Datelike, Timelike, Weekday};

use crate::analytics::sessions::Session;

/// Canonical dimension order shared by the scaler and the centroid report.
pub const FEATURE_NAMES: [&str; 8] = [
    "durationMinutes",
    "trackCount",
    "uniqueArtistCount",
    "skipRatioPercent",
    "avgTrackDurationMinutes",
    "hourOfDay",
    "isWeekend",
    "diversityScore",
];

/// Fixed-schema behavioral descriptors for one listening session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFeatures {
    pub duration_minutes: f64,
    pub track_count: f64,
    pub unique_artist_count: f64,
    pub skip_ratio_percent: f64,
    pub avg_track_duration_minutes: f64,
    /// Hour of day (0-23) of the session start, in the timestamp's own offset
    pub hour_of_day: f64,
    /// 1.0 for Saturday/Sunday session starts, 0.0 otherwise
    pub is_weekend: f64,
    /// Unique artists divided by track count, range (0, 1]
    pub diversity_score: f64,
}

impl SessionFeatures {
    /// Numeric row in [`FEATURE_NAMES`] order.
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.duration_minutes,
            self.track_count,
            self.unique_artist_count,
            self.skip_ratio_percent,
            self.avg_track_duration_minutes,
            self.hour_of_day,
            self.is_weekend,
            self.diversity_score,
        ]
    }
}

/// Derives behavioral feature vectors from sessions.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Compute the feature vector for one session.
    ///
    /// Pure: identical input produces identical output. Ratio features fall
    /// back to 0 for empty sessions, which the session builder's minimum
    /// track count already excludes in practice.
    pub fn extract(session: &Session) -> SessionFeatures {
        let track_count = session.track_count();

        let (skip_ratio_percent, avg_track_duration_minutes, diversity_score) =
            if track_count == 0 {
                (0.0, 0.0, 0.0)
            } else {
                let n = track_count as f64;
                (
                    100.0 * session.skipped_count() as f64 / n,
                    session.total_minutes_played() / n,
                    session.unique_artist_count() as f64 / n,
                )
            };

        let start = session.start_time;
        let is_weekend = matches!(start.weekday(), Weekday::Sat | Weekday::Sun);

        SessionFeatures {
            duration_minutes: session.duration_minutes(),
            track_count: track_count as f64,
            unique_artist_count: session.unique_artist_count() as f64,
            skip_ratio_percent,
            avg_track_duration_minutes,
            hour_of_day: start.hour() as f64,
            is_weekend: if is_weekend { 1.0 } else { 0.0 },
            diversity_score,
        }
    }

    pub fn extract_all(sessions: &[Session]) -> Vec<SessionFeatures> {
        sessions.iter().map(Self::extract).collect()
    }
}
