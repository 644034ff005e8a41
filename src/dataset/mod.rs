//! Gameplay dataset model and loading
//!
//! A dataset root holds one folder per episode; each folder holds one PNG per
//! sampled frame. Folder and file names carry the episode context, the PNG
//! text chunks carry per-frame metadata.

pub mod loader;
pub mod metadata;
pub mod parser;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use loader::{FrameFileInfo, LoadDiagnostics, count_frame_files, file_inventory, load};
pub use metadata::{extract_frame_metadata, read_frame_metadata};
pub use parser::{parse_episode_folder_name, parse_frame_file_name};

/// One recorded attempt at a level, parsed from an episode folder name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Player identifier
    pub user: String,
    /// Recording session identifier
    pub session_id: String,
    /// Episode number within the session
    pub episode: u32,
    /// World number (1-based)
    pub world: u32,
    /// Level number within the world (1-based)
    pub level: u32,
    /// Outcome label ("win" / "fail" in practice)
    pub outcome: String,
}

impl EpisodeRecord {
    /// Key identifying the episode within a session
    pub fn key(&self) -> (&str, u32) {
        (&self.session_id, self.episode)
    }
}

/// Metadata embedded in a frame image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Opaque auxiliary payload, carried but not interpreted
    #[serde(default)]
    pub raw_payload: Vec<u8>,
    /// Secondary encoding of the control state
    #[serde(default)]
    pub player_input: i64,
    /// Numeric outcome code written by the recorder
    #[serde(default)]
    pub outcome_code: i64,
}

/// One sampled frame within an episode, parsed from a frame file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub user: String,
    pub session_id: String,
    pub episode: u32,
    pub world: u32,
    pub level: u32,
    /// Frame ordinal within the episode
    pub frame: u32,
    /// Held-button bitmask. Absent in dumps written without it.
    #[serde(default)]
    pub control_code: Option<u8>,
    /// Timestamp token exactly as it appears in the file name
    pub timestamp: String,
    /// Timestamp token decoded, when it follows the recorder's format
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
    pub outcome: String,
    #[serde(flatten)]
    pub metadata: FrameMetadata,
}

/// Raw tables produced by the loader.
///
/// `None` means the table was never loaded, which is distinct from a loaded
/// but empty table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadedDataset {
    #[serde(default)]
    pub episodes: Option<Vec<EpisodeRecord>>,
    #[serde(default)]
    pub frames: Option<Vec<FrameRecord>>,
    #[serde(default)]
    pub diagnostics: LoadDiagnostics,
}

impl LoadedDataset {
    /// Dataset with only an episode table
    pub fn from_episodes(episodes: Vec<EpisodeRecord>) -> Self {
        Self {
            episodes: Some(episodes),
            ..Default::default()
        }
    }

    /// Number of loaded episodes (0 if the table is absent)
    pub fn episode_count(&self) -> usize {
        self.episodes.as_ref().map_or(0, Vec::len)
    }

    /// Number of loaded frames (0 if the table is absent)
    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(0, Vec::len)
    }

    /// Write the dataset as pretty JSON so it can be analyzed again without images
    pub fn write_json(&self, path: &std::path::Path) -> Result<(), crate::AnalysisError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| crate::AnalysisError::io(path, e))
    }

    /// Read a dataset previously written with [`LoadedDataset::write_json`]
    pub fn read_json(path: &std::path::Path) -> Result<Self, crate::AnalysisError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::AnalysisError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}
