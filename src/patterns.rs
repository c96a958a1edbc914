use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::Serialize;

use crate::analytics::config::AnalyticsConfig;
use crate::analytics::sessions::{Session, SessionBuilder};
use crate::models::PlayEvent;
use crate::store::EventStore;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Session duration histogram bucket edges, in minutes.
const DURATION_BUCKETS: [(f64, f64, &str); 6] = [
    (0.0, 15.0, "0-15"),
    (15.0, 30.0, "15-30"),
    (30.0, 60.0, "30-60"),
    (60.0, 120.0, "60-120"),
    (120.0, 240.0, "120-240"),
    (240.0, f64::INFINITY, "240+"),
];

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatistics {
    pub total_sessions: usize,
    pub avg_duration_minutes: f64,
    pub avg_tracks_per_session: f64,
    pub longest_session_hours: f64,
    pub max_tracks_in_session: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BingeSession {
    pub start_time: String,
    pub end_time: String,
    pub stream_count: usize,
    pub total_minutes_played: f64,
    pub unique_tracks: usize,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationBucket {
    pub label: String,
    pub sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTypeStats {
    pub day_type: String,
    pub total_streams: usize,
    pub total_hours: f64,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub active_days: usize,
    pub avg_streams_per_day: f64,
    pub avg_hours_per_day: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRow {
    pub day: String,
    /// Stream counts indexed by hour of day, 0-23
    pub streams: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningStreak {
    pub start_date: String,
    pub end_date: String,
    pub days: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedTrack {
    pub track: String,
    pub artist: Option<String>,
    /// Length of the back-to-back run, including the first play
    pub repeat_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDiversity {
    pub month: String,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub unique_albums: usize,
    pub total_streams: usize,
    /// Unique artists per hundred streams
    pub diversity_score: f64,
}

/// Listening-behavior analyses over the raw history, sharing the session
/// definition (and its thresholds) with the clustering pipeline.
pub struct ListeningPatterns {
    config: AnalyticsConfig,
}

impl ListeningPatterns {
    pub fn new(config: AnalyticsConfig) -> ListeningPatterns {
        ListeningPatterns { config }
    }

    fn sessions(&self, store: &EventStore) -> Vec<Session> {
        SessionBuilder::build(store.events(), &self.config)
    }

    /// Aggregate statistics over all retained sessions.
    pub fn session_statistics(&self, store: &EventStore) -> SessionStatistics {
        let sessions = self.sessions(store);
        if sessions.is_empty() {
            return SessionStatistics {
                total_sessions: 0,
                avg_duration_minutes: 0.0,
                avg_tracks_per_session: 0.0,
                longest_session_hours: 0.0,
                max_tracks_in_session: 0,
            };
        }

        let n = sessions.len() as f64;
        let total_duration: f64 = sessions.iter().map(|s| s.duration_minutes()).sum();
        let total_tracks: usize = sessions.iter().map(|s| s.track_count()).sum();
        let longest = sessions
            .iter()
            .map(|s| s.duration_minutes())
            .fold(0.0, f64::max);
        let max_tracks = sessions.iter().map(|s| s.track_count()).max().unwrap_or(0);

        SessionStatistics {
            total_sessions: sessions.len(),
            avg_duration_minutes: round2(total_duration / n),
            avg_tracks_per_session: round2(total_tracks as f64 / n),
            longest_session_hours: round2(longest / 60.0),
            max_tracks_in_session: max_tracks,
        }
    }

    /// The longest listening sessions by wall-clock duration.
    pub fn binge_sessions(&self, store: &EventStore, limit: usize) -> Vec<BingeSession> {
        let mut sessions = self.sessions(store);
        sessions.sort_by(|a, b| {
            b.duration_minutes()
                .partial_cmp(&a.duration_minutes())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        sessions
            .into_iter()
            .take(limit)
            .map(|s| BingeSession {
                start_time: s.start_time.to_rfc3339(),
                end_time: s.end_time.to_rfc3339(),
                stream_count: s.track_count(),
                total_minutes_played: round2(s.total_minutes_played()),
                unique_tracks: s.unique_track_count(),
                duration_minutes: round2(s.duration_minutes()),
            })
            .collect()
    }

    /// Histogram of session durations over fixed bucket edges.
    pub fn session_durations(&self, store: &EventStore) -> Vec<DurationBucket> {
        let sessions = self.sessions(store);
        DURATION_BUCKETS
            .iter()
            .map(|(lower, upper, label)| DurationBucket {
                label: label.to_string(),
                sessions: sessions
                    .iter()
                    .filter(|s| {
                        let d = s.duration_minutes();
                        d >= *lower && d < *upper
                    })
                    .count(),
            })
            .collect()
    }

    /// Weekday vs weekend listening, with per-day averages over the distinct
    /// active dates in each group.
    pub fn weekend_weekday(&self, store: &EventStore) -> Vec<DayTypeStats> {
        let mut groups = [DayTypeAccumulator::default(), DayTypeAccumulator::default()];
        for event in store.events() {
            let Some(ts) = event.timestamp else { continue };
            let weekend = matches!(ts.weekday(), Weekday::Sat | Weekday::Sun);
            groups[weekend as usize].add(event, ts.date_naive());
        }

        ["Weekday", "Weekend"]
            .into_iter()
            .zip(groups)
            .map(|(day_type, acc)| acc.finish(day_type))
            .collect()
    }

    /// Day-of-week by hour-of-day stream counts, Monday first.
    pub fn heatmap(&self, store: &EventStore) -> Vec<HeatmapRow> {
        let mut counts = [[0usize; 24]; 7];
        for event in store.events() {
            if let Some(ts) = event.timestamp {
                let day = ts.weekday().num_days_from_monday() as usize;
                counts[day][ts.hour() as usize] += 1;
            }
        }

        DAY_NAMES
            .into_iter()
            .zip(counts)
            .map(|(day, row)| HeatmapRow {
                day: day.to_string(),
                streams: row.to_vec(),
            })
            .collect()
    }

    /// Runs of 3 or more consecutive active days, longest first.
    pub fn listening_streaks(&self, store: &EventStore, limit: usize) -> Vec<ListeningStreak> {
        let dates: BTreeSet<NaiveDate> = store
            .events()
            .iter()
            .filter_map(|e| e.timestamp.map(|ts| ts.date_naive()))
            .collect();

        let mut streaks: Vec<ListeningStreak> = Vec::new();
        let mut run: Vec<NaiveDate> = Vec::new();
        for date in dates {
            match run.last() {
                Some(&prev) if (date - prev).num_days() == 1 => run.push(date),
                _ => {
                    Self::flush_streak(&run, &mut streaks);
                    run = vec![date];
                }
            }
        }
        Self::flush_streak(&run, &mut streaks);

        streaks.sort_by(|a, b| b.days.cmp(&a.days));
        streaks.truncate(limit);
        streaks
    }

    fn flush_streak(run: &[NaiveDate], streaks: &mut Vec<ListeningStreak>) {
        // Only runs of 3+ days count as a streak
        if run.len() >= 3 {
            streaks.push(ListeningStreak {
                start_date: run[0].to_string(),
                end_date: run[run.len() - 1].to_string(),
                days: run.len(),
            });
        }
    }

    /// Maximal runs of the same track played back-to-back, longest first.
    pub fn repeated_tracks(&self, store: &EventStore, limit: usize) -> Vec<RepeatedTrack> {
        let mut timed: Vec<&PlayEvent> = store
            .events()
            .iter()
            .filter(|e| e.timestamp.is_some())
            .collect();
        timed.sort_by_key(|e| e.timestamp);

        let mut runs: Vec<RepeatedTrack> = Vec::new();
        let mut current: Option<RepeatedTrack> = None;
        for event in timed {
            let Some(track) = event.track_name.as_deref() else {
                Self::flush_repeat(&mut current, &mut runs);
                continue;
            };
            match &mut current {
                Some(run) if run.track == track => {
                    run.repeat_count += 1;
                }
                _ => {
                    Self::flush_repeat(&mut current, &mut runs);
                    current = Some(RepeatedTrack {
                        track: track.to_string(),
                        artist: event.artist_name.clone(),
                        repeat_count: 1,
                    });
                }
            }
        }
        Self::flush_repeat(&mut current, &mut runs);

        runs.sort_by(|a, b| b.repeat_count.cmp(&a.repeat_count));
        runs.truncate(limit);
        runs
    }

    fn flush_repeat(current: &mut Option<RepeatedTrack>, runs: &mut Vec<RepeatedTrack>) {
        if let Some(run) = current.take() {
            // A single play is not a repeat
            if run.repeat_count >= 2 {
                runs.push(run);
            }
        }
    }

    /// Per-month distinct track/artist/album counts and the diversity score
    /// (unique artists per hundred streams).
    pub fn monthly_diversity(&self, store: &EventStore) -> Vec<MonthlyDiversity> {
        let mut months: BTreeMap<String, DiversityAccumulator> = BTreeMap::new();
        for event in store.events() {
            let Some(ts) = event.timestamp else { continue };
            months
                .entry(ts.format("%Y-%m").to_string())
                .or_default()
                .add(event);
        }

        months
            .into_iter()
            .map(|(month, acc)| acc.finish(month))
            .collect()
    }
}

#[derive(Default)]
struct DayTypeAccumulator {
    streams: usize,
    hours: f64,
    tracks: HashSet<String>,
    artists: HashSet<String>,
    dates: HashSet<NaiveDate>,
}

impl DayTypeAccumulator {
    fn add(&mut self, event: &PlayEvent, date: NaiveDate) {
        self.streams += 1;
        self.hours += event.hours_played();
        if let Some(track) = &event.track_name {
            self.tracks.insert(track.clone());
        }
        if let Some(artist) = &event.artist_name {
            self.artists.insert(artist.clone());
        }
        self.dates.insert(date);
    }

    fn finish(self, day_type: &str) -> DayTypeStats {
        let days = self.dates.len();
        let (avg_streams, avg_hours) = if days > 0 {
            (self.streams as f64 / days as f64, self.hours / days as f64)
        } else {
            (0.0, 0.0)
        };

        DayTypeStats {
            day_type: day_type.to_string(),
            total_streams: self.streams,
            total_hours: round2(self.hours),
            unique_tracks: self.tracks.len(),
            unique_artists: self.artists.len(),
            active_days: days,
            avg_streams_per_day: round2(avg_streams),
            avg_hours_per_day: round2(avg_hours),
        }
    }
}

#[derive(Default)]
struct DiversityAccumulator {
    tracks: HashSet<String>,
    artists: HashSet<String>,
    albums: HashSet<String>,
    streams: usize,
}

impl DiversityAccumulator {
    fn add(&mut self, event: &PlayEvent) {
        self.streams += 1;
        if let Some(track) = &event.track_name {
            self.tracks.insert(track.clone());
        }
        if let Some(artist) = &event.artist_name {
            self.artists.insert(artist.clone());
        }
        if let Some(album) = &event.album_name {
            self.albums.insert(album.clone());
        }
    }

    fn finish(self, month: String) -> MonthlyDiversity {
        let diversity = if self.streams > 0 {
            self.artists.len() as f64 / self.streams as f64 * 100.0
        } else {
            0.0
        };

        MonthlyDiversity {
            month,
            unique_tracks: self.tracks.len(),
            unique_artists: self.artists.len(),
            unique_albums: self.albums.len(),
            total_streams: self.streams,
            diversity_score: round2(diversity),
        }
    }
}
