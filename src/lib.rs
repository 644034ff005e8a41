//! Gameplay metrics - difficulty and behavior analysis of recorded platformer sessions
//!
//! Loads a dataset of episode folders and frame images, normalizes the
//! records and derives per-level difficulty and action statistics.

pub mod analytics;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod settings;

// Re-export commonly used types for convenience
pub use analytics::{
    ActionMetrics, Buttons, CleanedDataset, DifficultyCategory, EpisodeStats, LevelMetrics,
    NormalizedEpisode, NormalizedFrame, action_metrics, categorize, clean, episode_stats,
    level_metrics,
};
pub use dataset::{
    EpisodeRecord, FrameMetadata, FrameRecord, LoadDiagnostics, LoadedDataset, load,
    parse_episode_folder_name, parse_frame_file_name,
};
pub use error::{AnalysisError, MetadataError};
pub use pipeline::{PipelineOutput, analyze, run};
pub use settings::AnalysisSettings;
