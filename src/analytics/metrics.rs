//! Level, action and episode metrics
//!
//! All tables are grouped through ordered maps, so rows come out sorted by
//! their grouping key regardless of input order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyCategory;
use super::normalize::{NormalizedEpisode, NormalizedFrame};
use crate::error::AnalysisError;

/// Difficulty statistics for one (world, level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMetrics {
    pub world: u32,
    pub level: u32,
    /// Episodes recorded for the level
    pub total_attempts: u32,
    /// Mean numeric outcome; None when no episode has a recognized outcome
    pub success_rate: Option<f64>,
    /// Episodes with a recognized outcome
    pub total_plays: u32,
    /// 1 - success_rate
    pub difficulty_score: Option<f64>,
    /// Filled in by [`super::difficulty::categorize`]
    pub difficulty_category: Option<DifficultyCategory>,
}

/// Button usage for one (world, level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMetrics {
    pub world: u32,
    pub level: u32,
    /// Fraction of frames with A held
    pub jump_freq: Option<f64>,
    /// Fraction of frames with B held
    pub run_freq: Option<f64>,
    pub right_freq: Option<f64>,
    pub left_freq: Option<f64>,
    /// Frames recorded for the level
    pub total_frames: u32,
}

/// Frame statistics for one (session_id, episode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub session_id: String,
    pub episode: u32,
    pub frame_count: u32,
    /// Distinct control codes seen in the episode
    pub unique_actions: u32,
    /// Mean of the raw control codes.
    ///
    /// A control code is a bitmask, so this average is only a weak proxy for
    /// input activity; it is reported as-is.
    pub avg_action_value: Option<f64>,
    /// First recognized numeric outcome among the episode's frames
    pub outcome: Option<u8>,
    /// Seconds between the first and last decodable frame timestamps;
    /// None with fewer than two
    pub duration_secs: Option<i64>,
}

fn mean(sum: f64, count: u32) -> Option<f64> {
    if count == 0 { None } else { Some(sum / count as f64) }
}

#[derive(Default)]
struct LevelAccumulator {
    attempts: u32,
    plays: u32,
    wins: u32,
}

/// Compute per-level difficulty from normalized episodes.
///
/// Errors when the episode table was never loaded; a loaded but empty table
/// yields no rows.
pub fn level_metrics(
    episodes: Option<&[NormalizedEpisode]>,
) -> Result<Vec<LevelMetrics>, AnalysisError> {
    let episodes = episodes.ok_or(AnalysisError::MissingTable("episodes"))?;

    let mut groups: BTreeMap<(u32, u32), LevelAccumulator> = BTreeMap::new();
    for ep in episodes {
        let acc = groups
            .entry((ep.record.world, ep.record.level))
            .or_default();
        acc.attempts += 1;
        if let Some(outcome) = ep.outcome_numeric {
            acc.plays += 1;
            acc.wins += outcome as u32;
        }
    }

    Ok(groups
        .into_iter()
        .map(|((world, level), acc)| {
            let success_rate = mean(acc.wins as f64, acc.plays);
            LevelMetrics {
                world,
                level,
                total_attempts: acc.attempts,
                success_rate,
                total_plays: acc.plays,
                difficulty_score: success_rate.map(|rate| 1.0 - rate),
                difficulty_category: None,
            }
        })
        .collect())
}

#[derive(Default)]
struct ActionAccumulator {
    frames: u32,
    decoded: u32,
    jump: u32,
    run: u32,
    right: u32,
    left: u32,
}

/// Compute per-level button frequencies from normalized frames.
///
/// A missing frame table yields no rows. Frames without decoded buttons count
/// toward `total_frames` but not toward the frequencies; a non-empty table
/// where no frame has buttons is an error.
pub fn action_metrics(
    frames: Option<&[NormalizedFrame]>,
) -> Result<Vec<ActionMetrics>, AnalysisError> {
    let Some(frames) = frames else {
        return Ok(Vec::new());
    };
    if !frames.is_empty() && frames.iter().all(|f| f.buttons.is_none()) {
        return Err(AnalysisError::MissingColumn {
            table: "frames",
            column: "buttons",
        });
    }

    let mut groups: BTreeMap<(u32, u32), ActionAccumulator> = BTreeMap::new();
    for frame in frames {
        let acc = groups
            .entry((frame.record.world, frame.record.level))
            .or_default();
        acc.frames += 1;
        if let Some(buttons) = frame.buttons {
            acc.decoded += 1;
            acc.jump += buttons.a as u32;
            acc.run += buttons.b as u32;
            acc.right += buttons.right as u32;
            acc.left += buttons.left as u32;
        }
    }

    Ok(groups
        .into_iter()
        .map(|((world, level), acc)| ActionMetrics {
            world,
            level,
            jump_freq: mean(acc.jump as f64, acc.decoded),
            run_freq: mean(acc.run as f64, acc.decoded),
            right_freq: mean(acc.right as f64, acc.decoded),
            left_freq: mean(acc.left as f64, acc.decoded),
            total_frames: acc.frames,
        })
        .collect())
}

#[derive(Default)]
struct EpisodeAccumulator {
    frames: u32,
    codes: BTreeSet<u8>,
    code_sum: f64,
    code_count: u32,
    outcome: Option<u8>,
    timestamps: u32,
    first_seen: Option<chrono::NaiveDateTime>,
    last_seen: Option<chrono::NaiveDateTime>,
}

/// Compute per-episode frame statistics.
///
/// Returns no rows when the frame table was never loaded.
pub fn episode_stats(frames: Option<&[NormalizedFrame]>) -> Vec<EpisodeStats> {
    let Some(frames) = frames else {
        return Vec::new();
    };

    let mut groups: BTreeMap<(String, u32), EpisodeAccumulator> = BTreeMap::new();
    for frame in frames {
        let acc = groups
            .entry((frame.record.session_id.clone(), frame.record.episode))
            .or_default();
        acc.frames += 1;
        if let Some(code) = frame.record.control_code {
            acc.codes.insert(code);
            acc.code_sum += code as f64;
            acc.code_count += 1;
        }
        if acc.outcome.is_none() {
            acc.outcome = frame.outcome_numeric;
        }
        if let Some(at) = frame.record.recorded_at {
            acc.timestamps += 1;
            acc.first_seen = Some(acc.first_seen.map_or(at, |t| t.min(at)));
            acc.last_seen = Some(acc.last_seen.map_or(at, |t| t.max(at)));
        }
    }

    groups
        .into_iter()
        .map(|((session_id, episode), acc)| EpisodeStats {
            session_id,
            episode,
            frame_count: acc.frames,
            unique_actions: acc.codes.len() as u32,
            avg_action_value: mean(acc.code_sum, acc.code_count),
            outcome: acc.outcome,
            duration_secs: match (acc.first_seen, acc.last_seen) {
                (Some(first), Some(last)) if acc.timestamps >= 2 => {
                    Some((last - first).num_seconds())
                }
                _ => None,
            },
        })
        .collect()
}
