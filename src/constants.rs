//! Fixed values for the gameplay dataset
//!
//! Naming conventions, button layout and difficulty binning live here so the
//! parser, normalizer and classifier agree on them.

// =============================================================================
// DATASET LAYOUT
// =============================================================================

/// Extension of frame image files inside an episode folder
pub const FRAME_EXTENSION: &str = "png";

/// Format of the timestamp token embedded in frame file names
pub const FRAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// =============================================================================
// EMBEDDED PNG METADATA KEYS (defaults, overridable in settings)
// =============================================================================

pub const DEFAULT_PAYLOAD_KEY: &str = "RAM";
pub const DEFAULT_CONTROL_KEY: &str = "BP1";
pub const DEFAULT_OUTCOME_KEY: &str = "OUTCOME";

// =============================================================================
// OUTCOMES
// =============================================================================

pub const DEFAULT_WIN_LABEL: &str = "win";
pub const DEFAULT_FAIL_LABEL: &str = "fail";

pub const OUTCOME_WIN: u8 = 1;
pub const OUTCOME_FAIL: u8 = 0;

// =============================================================================
// CONTROLLER BUTTON BITS (control code bitmask)
// =============================================================================

pub const BUTTON_A: u8 = 128;
pub const BUTTON_UP: u8 = 64;
pub const BUTTON_LEFT: u8 = 32;
pub const BUTTON_B: u8 = 16;
pub const BUTTON_START: u8 = 8;
pub const BUTTON_RIGHT: u8 = 4;
pub const BUTTON_DOWN: u8 = 2;
pub const BUTTON_SELECT: u8 = 1;

// =============================================================================
// DIFFICULTY BINNING
// =============================================================================

/// Number of categories on the full difficulty scale
pub const DIFFICULTY_BINS: usize = 5;

/// Fixed-width edges used when quantile binning cannot produce usable bins
pub const FIXED_DIFFICULTY_EDGES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

// =============================================================================
// LOADER
// =============================================================================

/// Log a progress line every this many frame files
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;
