//! Difficulty categorization
//!
//! Levels are binned by difficulty score into a five-step scale using
//! empirical quantiles. When the scores are too concentrated for five
//! distinct quantile edges the classifier degrades in a fixed order:
//!
//! 1. five quantile bins
//! 2. fewer than five distinct scores: quantile bins equal to the number of
//!    distinct scores, two bins labeled Easy/Hard, three labeled
//!    Easy/Medium/Hard
//! 3. anything else: fixed-width bins over [0, 1] with the full scale
//!
//! Bins are right-closed, with the lowest edge included in the first bin.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::LevelMetrics;
use crate::constants::{DIFFICULTY_BINS, FIXED_DIFFICULTY_EDGES};

/// Ordered difficulty scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyCategory {
    #[serde(rename = "Very Easy")]
    VeryEasy,
    Easy,
    Medium,
    Hard,
    #[serde(rename = "Very Hard")]
    VeryHard,
}

impl DifficultyCategory {
    pub const ALL: [DifficultyCategory; 5] = [
        DifficultyCategory::VeryEasy,
        DifficultyCategory::Easy,
        DifficultyCategory::Medium,
        DifficultyCategory::Hard,
        DifficultyCategory::VeryHard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyCategory::VeryEasy => "Very Easy",
            DifficultyCategory::Easy => "Easy",
            DifficultyCategory::Medium => "Medium",
            DifficultyCategory::Hard => "Hard",
            DifficultyCategory::VeryHard => "Very Hard",
        }
    }
}

impl fmt::Display for DifficultyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const TWO_BIN_LABELS: [DifficultyCategory; 2] =
    [DifficultyCategory::Easy, DifficultyCategory::Hard];
const THREE_BIN_LABELS: [DifficultyCategory; 3] = [
    DifficultyCategory::Easy,
    DifficultyCategory::Medium,
    DifficultyCategory::Hard,
];

/// How categories were assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinningStrategy {
    /// Nothing to bin (no finite scores)
    Empty,
    /// Quantile bins; the value is the number of bins
    Quantile(usize),
    /// Fixed-width bins over [0, 1]
    FixedWidth,
}

/// Categories for a list of scores, index-aligned with the input
#[derive(Debug, Clone, PartialEq)]
pub struct Binning {
    pub strategy: BinningStrategy,
    pub categories: Vec<Option<DifficultyCategory>>,
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Quantile edges for `bins` bins, with duplicate edges collapsed
fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| quantile(sorted, i as f64 / bins as f64))
        .collect();
    edges.dedup();
    edges
}

/// Bin index of `value`: right-closed bins, lowest edge inclusive
fn bin_index(edges: &[f64], value: f64) -> Option<usize> {
    if edges.len() < 2 || value < edges[0] || value > edges[edges.len() - 1] {
        return None;
    }
    edges[1..].iter().position(|&upper| value <= upper)
}

fn assign(
    scores: &[Option<f64>],
    edges: &[f64],
    labels: &[DifficultyCategory],
) -> Vec<Option<DifficultyCategory>> {
    scores
        .iter()
        .map(|score| {
            let score = score.filter(|s| s.is_finite())?;
            bin_index(edges, score).map(|i| labels[i])
        })
        .collect()
}

/// Assign a category to each score. Never panics; missing or non-finite
/// scores get no category.
pub fn bin_scores(scores: &[Option<f64>]) -> Binning {
    let mut sorted: Vec<f64> = scores
        .iter()
        .flatten()
        .copied()
        .filter(|s| s.is_finite())
        .collect();
    if sorted.is_empty() {
        return Binning {
            strategy: BinningStrategy::Empty,
            categories: vec![None; scores.len()],
        };
    }
    sorted.sort_by(f64::total_cmp);

    let mut distinct = sorted.clone();
    distinct.dedup();
    let unique = distinct.len();

    let edges = quantile_edges(&sorted, DIFFICULTY_BINS);
    if edges.len() == DIFFICULTY_BINS + 1 {
        return Binning {
            strategy: BinningStrategy::Quantile(DIFFICULTY_BINS),
            categories: assign(scores, &edges, &DifficultyCategory::ALL),
        };
    }

    if unique < DIFFICULTY_BINS && unique >= 2 {
        let edges = quantile_edges(&sorted, unique);
        let labels: Option<&[DifficultyCategory]> = match edges.len() - 1 {
            2 => Some(&TWO_BIN_LABELS[..]),
            3 => Some(&THREE_BIN_LABELS[..]),
            _ => None,
        };
        if let Some(labels) = labels {
            return Binning {
                strategy: BinningStrategy::Quantile(labels.len()),
                categories: assign(scores, &edges, labels),
            };
        }
    }

    Binning {
        strategy: BinningStrategy::FixedWidth,
        categories: assign(scores, &FIXED_DIFFICULTY_EDGES, &DifficultyCategory::ALL),
    }
}

/// Return the level metrics with `difficulty_category` filled in
pub fn categorize(levels: &[LevelMetrics]) -> Vec<LevelMetrics> {
    let scores: Vec<Option<f64>> = levels.iter().map(|l| l.difficulty_score).collect();
    let binning = bin_scores(&scores);
    debug!(
        "Categorized {} levels using {:?} binning",
        levels.len(),
        binning.strategy
    );

    levels
        .iter()
        .zip(binning.categories)
        .map(|(level, category)| LevelMetrics {
            difficulty_category: category,
            ..level.clone()
        })
        .collect()
}
