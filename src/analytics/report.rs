//! Summary statistics and text reports over the metric tables

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyCategory;
use super::metrics::{ActionMetrics, EpisodeStats, LevelMetrics};

/// Descriptive statistics of one column (missing values excluded)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; None with fewer than two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StatSummary {
    pub fn from_values(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let values: Vec<f64> = values.into_iter().flatten().collect();
        let count = values.len();
        if count == 0 {
            return Self::default();
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std,
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
        }
    }

    fn format_row(&self, name: &str) -> String {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v));
        format!(
            "  {:<18} {:>5}  {:>7}  {:>7}  {:>7}  {:>7}\n",
            name,
            self.count,
            cell(self.mean),
            cell(self.std),
            cell(self.min),
            cell(self.max),
        )
    }
}

/// Dataset-wide summary of the level and action tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub difficulty: StatSummary,
    pub success_rate: StatSummary,
    pub jump_freq: StatSummary,
    pub run_freq: StatSummary,
}

impl SummaryReport {
    pub fn from_tables(levels: &[LevelMetrics], actions: &[ActionMetrics]) -> Self {
        Self {
            difficulty: StatSummary::from_values(levels.iter().map(|l| l.difficulty_score)),
            success_rate: StatSummary::from_values(levels.iter().map(|l| l.success_rate)),
            jump_freq: StatSummary::from_values(actions.iter().map(|a| a.jump_freq)),
            run_freq: StatSummary::from_values(actions.iter().map(|a| a.run_freq)),
        }
    }

    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str("\nSUMMARY:\n");
        output.push_str("  Metric             Count     Mean      Std      Min      Max\n");
        output.push_str("  ──────────────────────────────────────────────────────────────\n");
        output.push_str(&self.difficulty.format_row("difficulty_score"));
        output.push_str(&self.success_rate.format_row("success_rate"));
        output.push_str(&self.jump_freq.format_row("jump_freq"));
        output.push_str(&self.run_freq.format_row("run_freq"));
        output
    }
}

/// Number and share of levels in one difficulty category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: DifficultyCategory,
    pub count: usize,
    /// Percentage of all level rows (0-100)
    pub percentage: f64,
}

/// Populated categories in scale order
pub fn difficulty_distribution(levels: &[LevelMetrics]) -> Vec<CategoryShare> {
    if levels.is_empty() {
        return Vec::new();
    }

    let mut counts: BTreeMap<DifficultyCategory, usize> = BTreeMap::new();
    for category in levels.iter().filter_map(|l| l.difficulty_category) {
        *counts.entry(category).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: count as f64 / levels.len() as f64 * 100.0,
        })
        .collect()
}

/// Format the distribution as a list
pub fn format_distribution(shares: &[CategoryShare]) -> String {
    let mut output = String::new();
    output.push_str("\nDIFFICULTY DISTRIBUTION:\n");
    if shares.is_empty() {
        output.push_str("  No categorized levels\n");
    }
    for share in shares {
        output.push_str(&format!(
            "  - {:<10} {:>3} levels ({:.1}%)\n",
            share.category.label(),
            share.count,
            share.percentage
        ));
    }
    output
}

/// World x level pivot of difficulty scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyGrid {
    pub worlds: Vec<u32>,
    pub levels: Vec<u32>,
    /// `cells[w][l]` is the score for `worlds[w]`, `levels[l]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl DifficultyGrid {
    pub fn from_levels(metrics: &[LevelMetrics]) -> Self {
        let worlds: Vec<u32> = metrics
            .iter()
            .map(|m| m.world)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let levels: Vec<u32> = metrics
            .iter()
            .map(|m| m.level)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![None; levels.len()]; worlds.len()];
        for m in metrics {
            // Both lookups succeed: the axes were built from these rows
            if let (Ok(w), Ok(l)) = (
                worlds.binary_search(&m.world),
                levels.binary_search(&m.level),
            ) {
                cells[w][l] = m.difficulty_score;
            }
        }

        Self {
            worlds,
            levels,
            cells,
        }
    }

    pub fn get(&self, world: u32, level: u32) -> Option<f64> {
        let w = self.worlds.binary_search(&world).ok()?;
        let l = self.levels.binary_search(&level).ok()?;
        self.cells[w][l]
    }

    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str("\nDIFFICULTY BY WORLD / LEVEL:\n");
        output.push_str("  World");
        for level in &self.levels {
            output.push_str(&format!("  {:>5}", format!("L{}", level)));
        }
        output.push('\n');
        for &world in &self.worlds {
            output.push_str(&format!("  {:>5}", world));
            for &level in &self.levels {
                match self.get(world, level) {
                    Some(score) => output.push_str(&format!("  {:>5.2}", score)),
                    None => output.push_str(&format!("  {:>5}", "-")),
                }
            }
            output.push('\n');
        }
        output
    }
}

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

/// Format level metrics as an ASCII table
pub fn format_level_table(levels: &[LevelMetrics]) -> String {
    let mut output = String::new();
    output.push_str("\nLEVEL DIFFICULTY:\n");
    output.push_str("  Level   Attempts  Plays  Success  Difficulty  Category\n");
    output.push_str("  ────────────────────────────────────────────────────────\n");

    for m in levels {
        output.push_str(&format!(
            "  {:<6}  {:>8}  {:>5}  {:>7}  {:>10}  {}\n",
            format!("{}-{}", m.world, m.level),
            m.total_attempts,
            m.total_plays,
            pct(m.success_rate),
            m.difficulty_score
                .map_or_else(|| "-".to_string(), |d| format!("{:.3}", d)),
            m.difficulty_category.map_or("-", |c| c.label()),
        ));
    }

    output
}

/// Format action metrics as an ASCII table
pub fn format_action_table(actions: &[ActionMetrics]) -> String {
    let mut output = String::new();
    output.push_str("\nPLAYER ACTIONS:\n");
    output.push_str("  Level   Frames    Jump     Run   Right    Left\n");
    output.push_str("  ───────────────────────────────────────────────\n");

    for a in actions {
        output.push_str(&format!(
            "  {:<6}  {:>6}  {:>6}  {:>6}  {:>6}  {:>6}\n",
            format!("{}-{}", a.world, a.level),
            a.total_frames,
            pct(a.jump_freq),
            pct(a.run_freq),
            pct(a.right_freq),
            pct(a.left_freq),
        ));
    }

    output
}

/// Compact one-line description of the episode statistics
pub fn format_episode_overview(stats: &[EpisodeStats]) -> String {
    if stats.is_empty() {
        return "No episode statistics\n".to_string();
    }
    let frames: u32 = stats.iter().map(|s| s.frame_count).sum();
    format!(
        "Episode statistics for {} episodes ({:.1} frames/episode on average)\n",
        stats.len(),
        frames as f64 / stats.len() as f64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(
        world: u32,
        level: u32,
        score: Option<f64>,
        cat: Option<DifficultyCategory>,
    ) -> LevelMetrics {
        LevelMetrics {
            world,
            level,
            total_attempts: 4,
            success_rate: score.map(|s| 1.0 - s),
            total_plays: 4,
            difficulty_score: score,
            difficulty_category: cat,
        }
    }

    #[test]
    fn test_stat_summary() {
        let s = StatSummary::from_values([Some(1.0), None, Some(3.0), Some(2.0)]);
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, Some(2.0));
        assert!((s.std.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));

        let single = StatSummary::from_values([Some(0.5)]);
        assert_eq!(single.std, None);
        assert_eq!(StatSummary::from_values([None]), StatSummary::default());
    }

    #[test]
    fn test_distribution() {
        let levels = vec![
            level(1, 1, Some(0.9), Some(DifficultyCategory::Hard)),
            level(1, 2, Some(0.1), Some(DifficultyCategory::Easy)),
            level(1, 3, Some(0.8), Some(DifficultyCategory::Hard)),
            level(1, 4, None, None),
        ];
        let dist = difficulty_distribution(&levels);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].category, DifficultyCategory::Easy);
        assert_eq!(dist[0].count, 1);
        assert_eq!(dist[1].count, 2);
        assert!((dist[1].percentage - 50.0).abs() < 1e-9);

        let text = format_distribution(&dist);
        assert!(text.contains("Hard"));
    }

    #[test]
    fn test_grid() {
        let levels = vec![
            level(1, 1, Some(0.2), None),
            level(2, 3, Some(0.7), None),
            level(1, 3, None, None),
        ];
        let grid = DifficultyGrid::from_levels(&levels);
        assert_eq!(grid.worlds, vec![1, 2]);
        assert_eq!(grid.levels, vec![1, 3]);
        assert_eq!(grid.get(1, 1), Some(0.2));
        assert_eq!(grid.get(2, 3), Some(0.7));
        assert_eq!(grid.get(2, 1), None);
        assert_eq!(grid.get(1, 3), None);
        assert_eq!(grid.get(9, 9), None);

        let text = grid.format();
        assert!(text.contains("L3"));
        assert!(text.contains("      1   0.20      -\n"));
        assert!(text.contains("      2      -   0.70\n"));
    }

    #[test]
    fn test_tables_render_rows() {
        let levels = vec![level(4, 2, Some(0.25), Some(DifficultyCategory::Easy))];
        let table = format_level_table(&levels);
        assert!(table.contains("4-2"));
        assert!(table.contains("75.0%"));
        assert!(table.contains("Easy"));

        let actions = vec![ActionMetrics {
            world: 4,
            level: 2,
            jump_freq: Some(0.5),
            run_freq: None,
            right_freq: Some(1.0),
            left_freq: Some(0.0),
            total_frames: 8,
        }];
        let table = format_action_table(&actions);
        assert!(table.contains("50.0%"));
        assert!(table.contains("100.0%"));
    }
}
