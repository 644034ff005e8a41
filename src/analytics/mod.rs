//! Analytics over the gameplay dataset
//!
//! Normalizes the loaded tables, computes level, action and episode metrics,
//! categorizes level difficulty and formats summary reports.

pub mod difficulty;
pub mod metrics;
pub mod normalize;
pub mod report;

pub use difficulty::{Binning, BinningStrategy, DifficultyCategory, bin_scores, categorize};
pub use metrics::{
    ActionMetrics, EpisodeStats, LevelMetrics, action_metrics, episode_stats, level_metrics,
};
pub use normalize::{Button, Buttons, CleanedDataset, NormalizedEpisode, NormalizedFrame, clean};
pub use report::{
    CategoryShare, DifficultyGrid, StatSummary, SummaryReport, difficulty_distribution,
    format_action_table, format_distribution, format_episode_overview, format_level_table,
};
