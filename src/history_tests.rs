#[cfg(test)]
mod tests {
    use std::fs;

    use approx::assert_relative_eq;

    use crate::analytics::config::AnalyticsConfig;
    use crate::error::DataLoadError;
    use crate::models::{PlayEvent, parse_timestamp};
    use crate::patterns::ListeningPatterns;
    use crate::stats::HistoryStats;
    use crate::store::EventStore;

    fn event(ts: &str, track: &str, artist: &str, album: &str, platform: &str) -> PlayEvent {
        PlayEvent {
            timestamp: parse_timestamp(ts),
            ms_played: 180_000,
            track_name: Some(track.to_string()),
            artist_name: Some(artist.to_string()),
            album_name: Some(album.to_string()),
            platform: Some(platform.to_string()),
            ..PlayEvent::default()
        }
    }

    fn fixture_store() -> EventStore {
        let events = vec![
            event("2023-01-05T08:00:00Z", "Song A", "Artist 1", "Album X", "ios"),
            event("2023-01-05T08:03:00Z", "Song A", "Artist 1", "Album X", "ios"),
            event("2023-01-05T08:06:00Z", "Song B", "Artist 1", "Album X", "ios"),
            event("2023-01-06T09:00:00Z", "Song C", "Artist 2", "Album Y", "android"),
            event("2023-02-01T10:00:00Z", "Song D", "Artist 2", "Album Y", "android"),
            event("2023-02-01T10:04:00Z", "Song D", "Artist 3", "Album Z", "web"),
        ];
        EventStore::from_events(events)
    }

    #[test]
    fn test_overview_counts() {
        let overview = HistoryStats::overview(&fixture_store());
        assert_eq!(overview.total_streams, 6);
        assert_eq!(overview.unique_tracks, 4);
        assert_eq!(overview.unique_artists, 3);
        assert_eq!(overview.unique_albums, 3);
        // 6 plays at 3 minutes each
        assert_relative_eq!(overview.total_hours, 0.3);
    }

    #[test]
    fn test_overview_skips_nameless_events_in_distinct_counts() {
        let mut events = vec![event("2023-01-05T08:00:00Z", "Song A", "Artist 1", "X", "ios")];
        events.push(PlayEvent {
            timestamp: parse_timestamp("2023-01-05T09:00:00Z"),
            ms_played: 60_000,
            ..PlayEvent::default() // a podcast/ad record with no metadata
        });
        let overview = HistoryStats::overview(&EventStore::from_events(events));
        assert_eq!(overview.total_streams, 2);
        assert_eq!(overview.unique_tracks, 1);
        assert_eq!(overview.unique_artists, 1);
    }

    #[test]
    fn test_top_artists_ranking_and_limit() {
        let top = HistoryStats::top_artists(&fixture_store(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].artist, "Artist 1");
        assert_eq!(top[0].streams, 3);
        assert_eq!(top[1].artist, "Artist 2");
        assert_eq!(top[1].streams, 2);
    }

    #[test]
    fn test_top_tracks_keyed_by_track_and_artist() {
        let top = HistoryStats::top_tracks(&fixture_store(), 10);
        assert_eq!(top[0].track, "Song A");
        assert_eq!(top[0].streams, 2);
        // Same title under a different artist is a different track
        let song_d: Vec<_> = top.iter().filter(|t| t.track == "Song D").collect();
        assert_eq!(song_d.len(), 2);
        assert!(song_d.iter().all(|t| t.streams == 1));
    }

    #[test]
    fn test_monthly_grouping_is_sorted() {
        let monthly = HistoryStats::monthly(&fixture_store());
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, "2023-01");
        assert_eq!(monthly[0].streams, 4);
        assert_eq!(monthly[1].month, "2023-02");
        assert_eq!(monthly[1].streams, 2);
        assert_relative_eq!(monthly[0].hours, 0.2);
    }

    #[test]
    fn test_platforms_fold_the_tail_into_other() {
        let mut events = Vec::new();
        for p in 0..12 {
            // platform p gets p+1 streams so the ranking is unambiguous
            for i in 0..=p {
                events.push(event(
                    &format!("2023-03-{:02}T10:{:02}:00Z", p + 1, i),
                    "T",
                    "A",
                    "X",
                    &format!("platform-{p}"),
                ));
            }
        }
        let platforms = HistoryStats::platforms(&EventStore::from_events(events));

        assert_eq!(platforms.len(), 11, "top 10 plus the Other row");
        assert_eq!(platforms[0].platform, "platform-11");
        assert_eq!(platforms[0].streams, 12);
        let other = platforms.last().unwrap();
        assert_eq!(other.platform, "Other");
        // The two smallest platforms (1 + 2 streams) fold into Other
        assert_eq!(other.streams, 3);
    }

    fn patterns() -> ListeningPatterns {
        ListeningPatterns::new(AnalyticsConfig::default())
    }

    /// Two sessions on consecutive days plus one too-short run.
    fn session_fixture() -> EventStore {
        let mut events = Vec::new();
        // Monday session: 4 plays, 10 minutes apart
        for i in 0..4 {
            events.push(event(
                &format!("2023-05-01T20:{:02}:00Z", i * 10),
                &format!("T{i}"),
                "Artist 1",
                "X",
                "ios",
            ));
        }
        // Tuesday session: 6 plays, 5 minutes apart
        for i in 0..6 {
            events.push(event(
                &format!("2023-05-02T07:{:02}:00Z", i * 5),
                &format!("U{}", i % 2),
                "Artist 2",
                "Y",
                "ios",
            ));
        }
        // Wednesday: 2 plays only, dropped by the session minimum
        events.push(event("2023-05-03T12:00:00Z", "V0", "Artist 3", "Z", "web"));
        events.push(event("2023-05-03T12:05:00Z", "V1", "Artist 3", "Z", "web"));
        EventStore::from_events(events)
    }

    #[test]
    fn test_session_statistics() {
        let stats = patterns().session_statistics(&session_fixture());
        assert_eq!(stats.total_sessions, 2);
        // Sessions span 30 and 25 minutes
        assert_relative_eq!(stats.avg_duration_minutes, 27.5);
        assert_relative_eq!(stats.avg_tracks_per_session, 5.0);
        assert_eq!(stats.max_tracks_in_session, 6);
    }

    #[test]
    fn test_binge_sessions_longest_first() {
        let binges = patterns().binge_sessions(&session_fixture(), 10);
        assert_eq!(binges.len(), 2);
        assert!(binges[0].duration_minutes >= binges[1].duration_minutes);
        assert_relative_eq!(binges[0].duration_minutes, 30.0);
        assert_eq!(binges[0].stream_count, 4);
        // The Tuesday session plays only two distinct titles
        assert_eq!(binges[1].unique_tracks, 2);
    }

    #[test]
    fn test_session_duration_histogram() {
        let buckets = patterns().session_durations(&session_fixture());
        let total: usize = buckets.iter().map(|b| b.sessions).sum();
        assert_eq!(total, 2);
        let bucket_15_30 = buckets.iter().find(|b| b.label == "15-30").unwrap();
        // 25m falls in 15-30; the 30m session rolls into the next bucket
        assert_eq!(bucket_15_30.sessions, 1);
        let bucket_30_60 = buckets.iter().find(|b| b.label == "30-60").unwrap();
        assert_eq!(bucket_30_60.sessions, 1);
    }

    #[test]
    fn test_weekend_weekday_split() {
        let events = vec![
            event("2023-05-06T10:00:00Z", "A", "X", "L", "ios"), // Saturday
            event("2023-05-06T10:05:00Z", "B", "X", "L", "ios"),
            event("2023-05-07T11:00:00Z", "C", "Y", "L", "ios"), // Sunday
            event("2023-05-08T09:00:00Z", "D", "Y", "L", "ios"), // Monday
        ];
        let split = patterns().weekend_weekday(&EventStore::from_events(events));

        assert_eq!(split.len(), 2);
        let weekday = &split[0];
        let weekend = &split[1];
        assert_eq!(weekday.day_type, "Weekday");
        assert_eq!(weekday.total_streams, 1);
        assert_eq!(weekday.active_days, 1);
        assert_eq!(weekend.day_type, "Weekend");
        assert_eq!(weekend.total_streams, 3);
        assert_eq!(weekend.active_days, 2);
        assert_relative_eq!(weekend.avg_streams_per_day, 1.5);
        assert_eq!(weekend.unique_tracks, 3);
        assert_eq!(weekend.unique_artists, 2);
    }

    #[test]
    fn test_heatmap_counts_by_day_and_hour() {
        let events = vec![
            event("2023-05-01T08:00:00Z", "A", "X", "L", "ios"), // Monday 08
            event("2023-05-01T08:30:00Z", "B", "X", "L", "ios"), // Monday 08
            event("2023-05-07T22:00:00Z", "C", "X", "L", "ios"), // Sunday 22
        ];
        let heatmap = patterns().heatmap(&EventStore::from_events(events));

        assert_eq!(heatmap.len(), 7);
        assert_eq!(heatmap[0].day, "Monday");
        assert_eq!(heatmap[0].streams[8], 2);
        assert_eq!(heatmap[6].day, "Sunday");
        assert_eq!(heatmap[6].streams[22], 1);
        let total: usize = heatmap.iter().flat_map(|row| &row.streams).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_listening_streaks_need_three_days() {
        let events = vec![
            event("2023-06-01T10:00:00Z", "A", "X", "L", "ios"),
            event("2023-06-02T10:00:00Z", "B", "X", "L", "ios"),
            event("2023-06-03T10:00:00Z", "C", "X", "L", "ios"),
            // gap
            event("2023-06-05T10:00:00Z", "D", "X", "L", "ios"),
            event("2023-06-06T10:00:00Z", "E", "X", "L", "ios"),
        ];
        let streaks = patterns().listening_streaks(&EventStore::from_events(events), 10);

        assert_eq!(streaks.len(), 1, "a 2-day run is not a streak");
        assert_eq!(streaks[0].days, 3);
        assert_eq!(streaks[0].start_date, "2023-06-01");
        assert_eq!(streaks[0].end_date, "2023-06-03");
    }

    #[test]
    fn test_repeated_tracks_count_the_full_run() {
        let events = vec![
            event("2023-06-01T10:00:00Z", "Loop", "X", "L", "ios"),
            event("2023-06-01T10:03:00Z", "Loop", "X", "L", "ios"),
            event("2023-06-01T10:06:00Z", "Loop", "X", "L", "ios"),
            event("2023-06-01T10:09:00Z", "Break", "X", "L", "ios"),
            event("2023-06-01T10:12:00Z", "Loop", "X", "L", "ios"),
        ];
        let repeats = patterns().repeated_tracks(&EventStore::from_events(events), 10);

        assert_eq!(repeats.len(), 1, "the later single play is not a run");
        assert_eq!(repeats[0].track, "Loop");
        assert_eq!(repeats[0].repeat_count, 3);
    }

    #[test]
    fn test_monthly_diversity_score() {
        let events = vec![
            event("2023-07-01T10:00:00Z", "A", "Artist 1", "L", "ios"),
            event("2023-07-02T10:00:00Z", "B", "Artist 1", "L", "ios"),
            event("2023-07-03T10:00:00Z", "C", "Artist 2", "M", "ios"),
            event("2023-07-04T10:00:00Z", "D", "Artist 3", "N", "ios"),
        ];
        let diversity = patterns().monthly_diversity(&EventStore::from_events(events));

        assert_eq!(diversity.len(), 1);
        assert_eq!(diversity[0].month, "2023-07");
        assert_eq!(diversity[0].unique_artists, 3);
        assert_eq!(diversity[0].total_streams, 4);
        // 3 artists over 4 streams
        assert_relative_eq!(diversity[0].diversity_score, 75.0);
    }

    const EXPORT_RECORD: &str = r#"{
        "ts": "2023-01-15T20:30:00Z",
        "platform": "ios",
        "ms_played": 215000,
        "conn_country": "CA",
        "master_metadata_track_name": "Song Title",
        "master_metadata_album_artist_name": "Some Artist",
        "master_metadata_album_album_name": "Some Album",
        "reason_start": "trackdone",
        "reason_end": "trackdone",
        "shuffle": false,
        "skipped": false,
        "offline": false
    }"#;

    #[test]
    fn test_play_event_parses_export_wire_format() {
        let event: PlayEvent = serde_json::from_str(EXPORT_RECORD).expect("export record parses");
        assert_eq!(
            event.timestamp.unwrap().to_rfc3339(),
            "2023-01-15T20:30:00+00:00"
        );
        assert_eq!(event.ms_played, 215_000);
        assert_eq!(event.track_name.as_deref(), Some("Song Title"));
        assert_eq!(event.artist_name.as_deref(), Some("Some Artist"));
        assert_eq!(event.skipped, Some(false));
    }

    #[test]
    fn test_play_event_tolerates_bad_timestamps_and_missing_fields() {
        let event: PlayEvent =
            serde_json::from_str(r#"{"ts": "garbage", "ms_played": 1000}"#).unwrap();
        assert!(event.timestamp.is_none());
        assert_eq!(event.ms_played, 1000);
        assert!(event.track_name.is_none());

        let event: PlayEvent = serde_json::from_str("{}").unwrap();
        assert!(event.timestamp.is_none());
        assert_eq!(event.ms_played, 0);
    }

    #[test]
    fn test_store_load_merges_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("streaming_2023_1.json"),
            format!("[{EXPORT_RECORD}]"),
        )
        .unwrap();
        fs::write(
            dir.path().join("streaming_2023_2.json"),
            format!("[{EXPORT_RECORD}, {EXPORT_RECORD}]"),
        )
        .unwrap();
        // Ignored: not a streaming history file
        fs::write(dir.path().join("readme.json"), "[]").unwrap();

        let store = EventStore::load(dir.path()).expect("valid export loads");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_store_load_excludes_video_history() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Streaming_History_Video_2023.json"),
            format!("[{EXPORT_RECORD}]"),
        )
        .unwrap();

        let err = EventStore::load(dir.path()).expect_err("video-only export has no audio files");
        assert!(matches!(err, DataLoadError::NoFiles(_)));
    }

    #[test]
    fn test_store_load_is_atomic_on_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("streaming_2023_1.json"),
            format!("[{EXPORT_RECORD}]"),
        )
        .unwrap();
        fs::write(dir.path().join("streaming_2023_2.json"), "{ not json").unwrap();

        let err = EventStore::load(dir.path()).expect_err("one corrupt file fails the load");
        assert!(matches!(err, DataLoadError::Malformed { .. }));
    }

    #[test]
    fn test_store_load_missing_directory() {
        let err = EventStore::load(std::path::Path::new("/nonexistent/export/dir"))
            .expect_err("missing directory is a load error");
        assert!(matches!(err, DataLoadError::DirectoryMissing(_)));
    }

    #[test]
    fn test_store_load_rejects_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("streaming_2023_1.json"), "[]").unwrap();

        let err = EventStore::load(dir.path()).expect_err("an empty history is unusable");
        assert!(matches!(err, DataLoadError::Empty(1)));
    }
}
