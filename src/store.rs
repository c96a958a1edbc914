use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::DataLoadError;
use crate::models::PlayEvent;

/// Immutable in-memory snapshot of the streaming history export.
///
/// Built once at startup and passed by reference into every pipeline call, so
/// there is no hidden loaded-once flag and no first-load race to guard.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<PlayEvent>,
}

impl EventStore {
    /// Load every streaming history file under `dir` into one snapshot.
    ///
    /// The load is all-or-nothing: if any matching file fails to read or
    /// parse, the whole load fails rather than silently skipping the file.
    pub fn load(dir: &Path) -> Result<Self, DataLoadError> {
        if !dir.is_dir() {
            return Err(DataLoadError::DirectoryMissing(dir.to_path_buf()));
        }

        let entries = fs::read_dir(dir).map_err(|source| DataLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_streaming_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(DataLoadError::NoFiles(dir.to_path_buf()));
        }

        let mut events = Vec::new();
        for path in &files {
            let content = fs::read_to_string(path).map_err(|source| DataLoadError::Io {
                path: path.clone(),
                source,
            })?;
            let batch: Vec<PlayEvent> =
                serde_json::from_str(&content).map_err(|source| DataLoadError::Malformed {
                    path: path.clone(),
                    source,
                })?;
            debug!("{}: {} records", path.display(), batch.len());
            events.extend(batch);
        }

        if events.is_empty() {
            return Err(DataLoadError::Empty(files.len()));
        }

        info!(
            "loaded {} streaming records from {} files",
            events.len(),
            files.len()
        );
        Ok(EventStore { events })
    }

    /// Build a store from an already-materialized event list.
    pub fn from_events(events: Vec<PlayEvent>) -> Self {
        EventStore { events }
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Audio streaming export files are named `streaming_*.json` (the video
/// history ships separately and is excluded).
fn is_streaming_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    name.starts_with("streaming") && name.ends_with(".json") && !name.contains("video")
}
