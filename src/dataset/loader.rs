//! Dataset loader
//!
//! Walks the immediate subfolders of a dataset root, keeps the ones whose
//! names parse as episodes, and parses every frame image inside them.
//! Frame parsing and metadata extraction run on a rayon pool.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::metadata::extract_frame_metadata;
use super::parser::{parse_episode_folder_name, parse_frame_file_name};
use super::{EpisodeRecord, FrameRecord, LoadedDataset};
use crate::constants::FRAME_EXTENSION;
use crate::error::AnalysisError;
use crate::settings::AnalysisSettings;

/// Counters describing what the loader saw and skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadDiagnostics {
    /// Subdirectories of the root that were examined
    pub folders_scanned: usize,
    /// Subdirectories whose names did not parse as episodes or that could
    /// not be listed
    pub folders_skipped: usize,
    /// Frame images found inside episode folders
    pub files_scanned: usize,
    /// Frame images whose names did not parse
    pub files_skipped: usize,
    /// Frames kept with default metadata because it could not be read
    pub metadata_failures: usize,
    /// Episode folders repeating an already seen (session_id, episode)
    pub duplicate_episodes: usize,
}

impl LoadDiagnostics {
    /// One-line summary for logs and reports
    pub fn format_summary(&self) -> String {
        format!(
            "{} folders ({} skipped), {} frame files ({} skipped, {} without metadata), \
             {} duplicate episodes",
            self.folders_scanned,
            self.folders_skipped,
            self.files_scanned,
            self.files_skipped,
            self.metadata_failures,
            self.duplicate_episodes,
        )
    }
}

/// A frame image found on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameFileInfo {
    pub name: String,
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == FRAME_EXTENSION)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut paths = fs::read_dir(dir)
        .map_err(|e| AnalysisError::io(dir, e))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

fn collect_frame_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AnalysisError> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_frame_files(&path, out)?;
        } else if is_frame_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Count frame images anywhere below `root`
pub fn count_frame_files(root: &Path) -> Result<usize, AnalysisError> {
    if !root.exists() {
        return Err(AnalysisError::PathNotFound(root.to_path_buf()));
    }
    let mut files = Vec::new();
    collect_frame_files(root, &mut files)?;
    Ok(files.len())
}

/// List every frame image below `root` with its size and modification time
pub fn file_inventory(root: &Path) -> Result<Vec<FrameFileInfo>, AnalysisError> {
    if !root.exists() {
        return Err(AnalysisError::PathNotFound(root.to_path_buf()));
    }
    let mut files = Vec::new();
    collect_frame_files(root, &mut files)?;

    files
        .into_iter()
        .map(|path| {
            let meta = fs::metadata(&path).map_err(|e| AnalysisError::io(&path, e))?;
            Ok(FrameFileInfo {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
                path,
            })
        })
        .collect()
}

/// Frame images directly inside an episode folder, or None if the folder
/// cannot be listed
fn episode_frame_paths(folder: &Path) -> Option<Vec<PathBuf>> {
    match read_dir_sorted(folder) {
        Ok(paths) => Some(paths.into_iter().filter(|p| is_frame_file(p)).collect()),
        Err(e) => {
            warn!("Skipping unreadable episode folder: {}", e);
            None
        }
    }
}

/// Outcome of parsing one frame file
enum FrameOutcome {
    Parsed(FrameRecord, bool),
    Skipped,
}

/// Load episodes and frames from a dataset root.
///
/// Fails only when the root is missing or unreadable. Malformed names are
/// skipped and counted; unreadable metadata is replaced by defaults.
pub fn load(root: &Path, settings: &AnalysisSettings) -> Result<LoadedDataset, AnalysisError> {
    if !root.exists() {
        return Err(AnalysisError::PathNotFound(root.to_path_buf()));
    }

    let mut diagnostics = LoadDiagnostics::default();
    let mut episodes: Vec<EpisodeRecord> = Vec::new();
    let mut seen_keys: HashSet<(String, u32)> = HashSet::new();
    let mut frame_paths: Vec<PathBuf> = Vec::new();

    for folder in read_dir_sorted(root)? {
        if !folder.is_dir() {
            continue;
        }
        diagnostics.folders_scanned += 1;

        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let Some(episode) = parse_episode_folder_name(&name) else {
            debug!("Skipping folder with unrecognized name: {}", name);
            diagnostics.folders_skipped += 1;
            continue;
        };

        let Some(paths) = episode_frame_paths(&folder) else {
            diagnostics.folders_skipped += 1;
            continue;
        };

        let (session_id, number) = episode.key();
        if !seen_keys.insert((session_id.to_string(), number)) {
            warn!("Duplicate episode {} in session {} ({})", number, session_id, name);
            diagnostics.duplicate_episodes += 1;
        }
        episodes.push(episode);
        frame_paths.extend(paths);
    }
    diagnostics.files_scanned = frame_paths.len();

    let outcomes = parse_frames(&frame_paths, settings)?;

    let mut frames = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            FrameOutcome::Parsed(frame, metadata_failed) => {
                if metadata_failed {
                    diagnostics.metadata_failures += 1;
                }
                frames.push(frame);
            }
            FrameOutcome::Skipped => diagnostics.files_skipped += 1,
        }
    }
    frames.sort_by(|a, b| {
        (&a.session_id, a.episode, a.frame).cmp(&(&b.session_id, b.episode, b.frame))
    });

    info!(
        "Loaded {} episodes and {} frames from {}",
        episodes.len(),
        frames.len(),
        root.display()
    );
    info!("Load diagnostics: {}", diagnostics.format_summary());
    if episodes.is_empty() {
        warn!("No episodes loaded from {}", root.display());
    }
    if frames.is_empty() {
        warn!("No frames loaded from {}", root.display());
    }

    Ok(LoadedDataset {
        episodes: Some(episodes),
        frames: Some(frames),
        diagnostics,
    })
}

fn parse_frames(
    paths: &[PathBuf],
    settings: &AnalysisSettings,
) -> Result<Vec<FrameOutcome>, AnalysisError> {
    let total = paths.len();
    let processed = AtomicUsize::new(0);
    let interval = settings.loader.progress_interval;

    let work = || {
        paths
            .par_iter()
            .map(|path| {
                let outcome = parse_frame(path, settings);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if interval > 0 && (done % interval == 0 || done == total) {
                    debug!("Processed {}/{} frame files", done, total);
                }
                outcome
            })
            .collect::<Vec<_>>()
    };

    if settings.loader.threads == 0 {
        return Ok(work());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.loader.threads)
        .build()
        .map_err(|e| AnalysisError::ThreadPool(e.to_string()))?;
    Ok(pool.install(work))
}

fn parse_frame(path: &Path, settings: &AnalysisSettings) -> FrameOutcome {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let Some(mut frame) = parse_frame_file_name(&name) else {
        debug!("Skipping frame file with unrecognized name: {}", name);
        return FrameOutcome::Skipped;
    };

    let (metadata, failed) = extract_frame_metadata(path, &settings.metadata);
    frame.metadata = metadata;
    FrameOutcome::Parsed(frame, failed)
}
