//! End-to-end analysis run
//!
//! load -> clean -> episode stats -> level metrics -> categorize -> action metrics

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::{
    ActionMetrics, CategoryShare, DifficultyGrid, EpisodeStats, LevelMetrics, NormalizedEpisode,
    NormalizedFrame, SummaryReport, action_metrics, categorize, clean, difficulty_distribution,
    episode_stats, format_action_table, format_distribution, format_episode_overview,
    format_level_table, level_metrics,
};
use crate::dataset::{LoadDiagnostics, LoadedDataset, load};
use crate::error::AnalysisError;
use crate::settings::AnalysisSettings;

/// Every table produced by one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub diagnostics: LoadDiagnostics,
    pub episodes: Vec<NormalizedEpisode>,
    pub frames: Vec<NormalizedFrame>,
    /// Level metrics with `difficulty_category` filled in
    pub level_metrics: Vec<LevelMetrics>,
    pub action_metrics: Vec<ActionMetrics>,
    pub episode_stats: Vec<EpisodeStats>,
    pub distribution: Vec<CategoryShare>,
    pub grid: DifficultyGrid,
    pub summary: SummaryReport,
}

impl PipelineOutput {
    /// Full text report
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("============================================================\n");
        report.push_str(&format!(
            "GAMEPLAY ANALYSIS ({} episodes, {} frames, {} levels)\n",
            self.episodes.len(),
            self.frames.len(),
            self.level_metrics.len()
        ));
        report.push_str("============================================================\n");
        report.push_str(&format!("Load: {}\n", self.diagnostics.format_summary()));
        report.push_str(&format_episode_overview(&self.episode_stats));
        report.push_str(&format_level_table(&self.level_metrics));
        report.push_str(&format_distribution(&self.distribution));
        report.push_str(&self.grid.format());
        report.push_str(&format_action_table(&self.action_metrics));
        report.push_str(&self.summary.format());
        report
    }

    /// Write all tables as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<(), AnalysisError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
    }
}

/// Load a dataset root and analyze it
pub fn run(root: &Path, settings: &AnalysisSettings) -> Result<PipelineOutput, AnalysisError> {
    let dataset = load(root, settings)?;
    analyze(&dataset, settings)
}

/// Analyze an already loaded dataset
pub fn analyze(
    dataset: &LoadedDataset,
    settings: &AnalysisSettings,
) -> Result<PipelineOutput, AnalysisError> {
    let cleaned = clean(dataset, &settings.outcomes);

    let stats = episode_stats(cleaned.frames.as_deref());
    let levels = categorize(&level_metrics(cleaned.episodes.as_deref())?);
    let actions = match action_metrics(cleaned.frames.as_deref()) {
        Ok(actions) => actions,
        Err(AnalysisError::MissingColumn { table, column }) => {
            warn!("No {} in the {} table, skipping action metrics", column, table);
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    info!(
        "Computed metrics for {} levels, {} action rows, {} episodes",
        levels.len(),
        actions.len(),
        stats.len()
    );

    Ok(PipelineOutput {
        diagnostics: dataset.diagnostics.clone(),
        distribution: difficulty_distribution(&levels),
        grid: DifficultyGrid::from_levels(&levels),
        summary: SummaryReport::from_tables(&levels, &actions),
        episodes: cleaned.episodes.unwrap_or_default(),
        frames: cleaned.frames.unwrap_or_default(),
        level_metrics: levels,
        action_metrics: actions,
        episode_stats: stats,
    })
}
