use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::store::EventStore;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_streams: usize,
    pub total_hours: f64,
    pub unique_tracks: usize,
    pub unique_artists: usize,
    pub unique_albums: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistStreams {
    pub artist: String,
    pub streams: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackStreams {
    pub track: String,
    pub artist: String,
    pub streams: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    pub month: String,
    pub streams: usize,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStreams {
    pub platform: String,
    pub streams: usize,
}

/// Aggregate statistics over the full streaming history.
pub struct HistoryStats;

impl HistoryStats {
    /// Totals and distinct counts across the whole export. Events without a
    /// track/artist/album name (ads, podcasts) are excluded from the distinct
    /// counts but still count as streams.
    pub fn overview(store: &EventStore) -> OverviewStats {
        let total_ms: u64 = store.events().iter().map(|e| e.ms_played).sum();

        let unique_tracks = store
            .events()
            .iter()
            .filter_map(|e| e.track_name.as_deref())
            .collect::<HashSet<_>>()
            .len();
        let unique_artists = store
            .events()
            .iter()
            .filter_map(|e| e.artist_name.as_deref())
            .collect::<HashSet<_>>()
            .len();
        let unique_albums = store
            .events()
            .iter()
            .filter_map(|e| e.album_name.as_deref())
            .collect::<HashSet<_>>()
            .len();

        OverviewStats {
            total_streams: store.len(),
            total_hours: round2(total_ms as f64 / 3_600_000.0),
            unique_tracks,
            unique_artists,
            unique_albums,
        }
    }

    /// Top artists by stream count.
    pub fn top_artists(store: &EventStore, limit: usize) -> Vec<ArtistStreams> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for event in store.events() {
            if let Some(artist) = event.artist_name.as_deref() {
                *counts.entry(artist).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(limit)
            .map(|(artist, streams)| ArtistStreams {
                artist: artist.to_string(),
                streams,
            })
            .collect()
    }

    /// Top tracks by stream count, keyed by (track, artist); records missing
    /// either name are skipped.
    pub fn top_tracks(store: &EventStore, limit: usize) -> Vec<TrackStreams> {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        for event in store.events() {
            if let (Some(track), Some(artist)) =
                (event.track_name.as_deref(), event.artist_name.as_deref())
            {
                *counts.entry((track, artist)).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<((&str, &str), usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(limit)
            .map(|((track, artist), streams)| TrackStreams {
                track: track.to_string(),
                artist: artist.to_string(),
                streams,
            })
            .collect()
    }

    /// Stream counts and listening hours per calendar month, in month order.
    /// Events without a timestamp are skipped.
    pub fn monthly(store: &EventStore) -> Vec<MonthlyStats> {
        let mut months: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        for event in store.events() {
            if let Some(ts) = event.timestamp {
                let entry = months.entry(ts.format("%Y-%m").to_string()).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += event.hours_played();
            }
        }

        months
            .into_iter()
            .map(|(month, (streams, hours))| MonthlyStats {
                month,
                streams,
                hours: round2(hours),
            })
            .collect()
    }

    /// Stream counts per platform: the top 10 platforms, with everything else
    /// folded into an `"Other"` row.
    pub fn platforms(store: &EventStore) -> Vec<PlatformStreams> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for event in store.events() {
            if let Some(platform) = event.platform.as_deref() {
                *counts.entry(platform).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let other_streams: usize = ranked.iter().skip(10).map(|(_, count)| count).sum();
        let mut result: Vec<PlatformStreams> = ranked
            .into_iter()
            .take(10)
            .map(|(platform, streams)| PlatformStreams {
                platform: platform.to_string(),
                streams,
            })
            .collect();

        if other_streams > 0 {
            result.push(PlatformStreams {
                platform: "Other".to_string(),
                streams: other_streams,
            });
        }
        result
    }
}
