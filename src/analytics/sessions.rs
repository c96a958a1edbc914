use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};

use crate::analytics::config::AnalyticsConfig;
use crate::models::PlayEvent;

/// A maximal run of plays with no gap longer than the session break threshold.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: usize,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub events: Vec<PlayEvent>,
}

impl Session {
    /// Wall-clock span from first to last play, in minutes.
    pub fn duration_minutes(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 60.0
    }

    pub fn track_count(&self) -> usize {
        self.events.len()
    }

    pub fn unique_artist_count(&self) -> usize {
        self.events
            .iter()
            .filter_map(|e| e.artist_name.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn unique_track_count(&self) -> usize {
        self.events
            .iter()
            .filter_map(|e| e.track_name.as_deref())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn skipped_count(&self) -> usize {
        self.events.iter().filter(|e| e.was_skipped()).count()
    }

    /// Sum of playback time across the session's plays, in minutes.
    pub fn total_minutes_played(&self) -> f64 {
        self.events.iter().map(|e| e.minutes_played()).sum()
    }
}

/// Groups the time-ordered event stream into discrete listening sessions.
pub struct SessionBuilder;

impl SessionBuilder {
    /// Build sessions from the raw event stream.
    ///
    /// Events without a valid timestamp are ignored. The remaining events are
    /// stable-sorted by timestamp, then scanned: a gap longer than
    /// `gap_threshold_minutes` since the previous play starts a new session.
    /// Sessions with fewer than `min_track_count` plays are dropped.
    pub fn build(events: &[PlayEvent], config: &AnalyticsConfig) -> Vec<Session> {
        let mut timed: Vec<&PlayEvent> =
            events.iter().filter(|e| e.timestamp.is_some()).collect();
        // Vec::sort_by_key is stable, so same-timestamp events keep their
        // original relative order across source files
        timed.sort_by_key(|e| e.timestamp);

        let gap_secs = config.gap_threshold_minutes * 60;
        let mut sessions: Vec<Session> = Vec::new();
        let mut current: Option<Session> = None;

        for event in timed {
            let Some(ts) = event.timestamp else { continue };
            match &mut current {
                Some(session) if (ts - session.end_time).num_seconds() <= gap_secs => {
                    session.end_time = ts;
                    session.events.push(event.clone());
                }
                _ => {
                    if let Some(finished) = current.take() {
                        sessions.push(finished);
                    }
                    current = Some(Session {
                        id: 0,
                        start_time: ts,
                        end_time: ts,
                        events: vec![event.clone()],
                    });
                }
            }
        }

        // Flush the trailing open session
        if let Some(finished) = current {
            sessions.push(finished);
        }

        sessions.retain(|s| s.events.len() >= config.min_track_count);
        for (id, session) in sessions.iter_mut().enumerate() {
            session.id = id;
        }
        sessions
    }
}
