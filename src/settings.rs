//! Analysis settings
//!
//! Loaded from an optional TOML file and passed explicitly to every pipeline
//! stage. Missing sections and keys fall back to the defaults in `constants`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::constants::*;
use crate::error::AnalysisError;

/// Default settings file looked up by the `analyze` binary
pub const SETTINGS_FILE: &str = "config/analysis.toml";

/// Keys of the text chunks embedded in each frame image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataKeys {
    /// Opaque payload blob (kept, unused downstream)
    pub payload_key: String,
    /// Integer control-state value
    pub control_key: String,
    /// Integer outcome code
    pub outcome_key: String,
}

impl Default for MetadataKeys {
    fn default() -> Self {
        Self {
            payload_key: DEFAULT_PAYLOAD_KEY.to_string(),
            control_key: DEFAULT_CONTROL_KEY.to_string(),
            outcome_key: DEFAULT_OUTCOME_KEY.to_string(),
        }
    }
}

/// Outcome labels mapped to a numeric outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeLabels {
    /// Label mapped to 1
    pub win: String,
    /// Label mapped to 0
    pub fail: String,
}

impl Default for OutcomeLabels {
    fn default() -> Self {
        Self {
            win: DEFAULT_WIN_LABEL.to_string(),
            fail: DEFAULT_FAIL_LABEL.to_string(),
        }
    }
}

impl OutcomeLabels {
    /// Numeric outcome for a label; unknown labels are missing, not errors
    pub fn numeric(&self, label: &str) -> Option<u8> {
        if label == self.win {
            Some(OUTCOME_WIN)
        } else if label == self.fail {
            Some(OUTCOME_FAIL)
        } else {
            None
        }
    }
}

/// Loader tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Worker threads for frame parsing (0 = rayon default)
    pub threads: usize,
    /// Log progress every N frame files (0 = never)
    pub progress_interval: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            threads: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// All settings for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub metadata: MetadataKeys,
    pub outcomes: OutcomeLabels,
    pub loader: LoaderSettings,
}

impl AnalysisSettings {
    /// Load settings from a TOML file. The file must exist and parse.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let content = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let settings = Self::from_toml(&content).map_err(|message| AnalysisError::Settings {
            path: path.to_path_buf(),
            message,
        })?;
        info!("Loaded analysis settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from file, or return defaults if it is absent or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No {} found, using default settings", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{}, using default settings", e);
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = AnalysisSettings::from_toml("").unwrap();
        assert_eq!(settings, AnalysisSettings::default());
        assert_eq!(settings.metadata.control_key, "BP1");
        assert_eq!(settings.loader.progress_interval, 1000);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let settings = AnalysisSettings::from_toml(
            r#"
[metadata]
control_key = "INPUT"

[outcomes]
win = "clear"

[loader]
threads = 4
"#,
        )
        .unwrap();

        assert_eq!(settings.metadata.control_key, "INPUT");
        assert_eq!(settings.metadata.payload_key, "RAM");
        assert_eq!(settings.outcomes.win, "clear");
        assert_eq!(settings.outcomes.fail, "fail");
        assert_eq!(settings.loader.threads, 4);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AnalysisSettings::from_toml("[loader]\nthreads = \"many\"").is_err());
    }

    #[test]
    fn test_outcome_mapping() {
        let labels = OutcomeLabels::default();
        assert_eq!(labels.numeric("win"), Some(1));
        assert_eq!(labels.numeric("fail"), Some(0));
        assert_eq!(labels.numeric("timeout"), None);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let settings = AnalysisSettings::load_or_default(Path::new("does/not/exist.toml"));
        assert_eq!(settings, AnalysisSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        fs::write(&path, "[loader]\nprogress_interval = 10\n").unwrap();

        let settings = AnalysisSettings::load(&path).unwrap();
        assert_eq!(settings.loader.progress_interval, 10);

        fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            AnalysisSettings::load(&path),
            Err(AnalysisError::Settings { .. })
        ));
    }
}
