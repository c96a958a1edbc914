use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// One play event from the Spotify extended streaming history export.
///
/// Field names follow the export's JSON keys. Metadata fields are optional
/// because podcast and ad records omit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEvent {
    #[serde(
        rename = "ts",
        default,
        deserialize_with = "deserialize_timestamp"
    )]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(rename = "ms_played", default)]
    pub ms_played: u64,
    #[serde(rename = "master_metadata_track_name")]
    pub track_name: Option<String>,
    #[serde(rename = "master_metadata_album_artist_name")]
    pub artist_name: Option<String>,
    #[serde(rename = "master_metadata_album_album_name")]
    pub album_name: Option<String>,
    pub platform: Option<String>,
    pub skipped: Option<bool>,
    pub shuffle: Option<bool>,
    pub reason_start: Option<String>,
    pub reason_end: Option<String>,
}

impl PlayEvent {
    pub fn minutes_played(&self) -> f64 {
        self.ms_played as f64 / 60_000.0
    }

    pub fn hours_played(&self) -> f64 {
        self.ms_played as f64 / 3_600_000.0
    }

    /// Whether the listener skipped this play.
    pub fn was_skipped(&self) -> bool {
        self.skipped == Some(true)
    }
}

impl Default for PlayEvent {
    fn default() -> Self {
        PlayEvent {
            timestamp: None,
            ms_played: 0,
            track_name: None,
            artist_name: None,
            album_name: None,
            platform: None,
            skipped: None,
            shuffle: None,
            reason_start: None,
            reason_end: None,
        }
    }
}

/// Parse an export timestamp, keeping the offset embedded in the source string.
///
/// Naive timestamps (no offset) are interpreted as UTC. Returns `None` on
/// anything unparseable so that a single bad record does not fail the load.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    // Older exports write a space-separated naive timestamp
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().fixed_offset());
    }
    None
}

fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
