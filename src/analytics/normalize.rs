//! Normalization of raw tables
//!
//! Expands control codes into named button states and maps outcome labels to
//! a numeric outcome. Input tables are left untouched; new tables are built.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dataset::{EpisodeRecord, FrameRecord, LoadedDataset};
use crate::settings::OutcomeLabels;

/// A controller button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    Up,
    Left,
    B,
    Start,
    Right,
    Down,
    Select,
}

impl Button {
    /// All buttons, highest bit first
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::Up,
        Button::Left,
        Button::B,
        Button::Start,
        Button::Right,
        Button::Down,
        Button::Select,
    ];

    /// Bit value of this button in a control code
    pub fn bit(self) -> u8 {
        match self {
            Button::A => BUTTON_A,
            Button::Up => BUTTON_UP,
            Button::Left => BUTTON_LEFT,
            Button::B => BUTTON_B,
            Button::Start => BUTTON_START,
            Button::Right => BUTTON_RIGHT,
            Button::Down => BUTTON_DOWN,
            Button::Select => BUTTON_SELECT,
        }
    }
}

/// Held state of the eight buttons in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    #[serde(rename = "A")]
    pub a: bool,
    pub up: bool,
    pub left: bool,
    #[serde(rename = "B")]
    pub b: bool,
    pub start: bool,
    pub right: bool,
    pub down: bool,
    pub select: bool,
}

impl Buttons {
    /// Decode a control code; several buttons may be held at once
    pub fn from_code(code: u8) -> Self {
        Self {
            a: code & BUTTON_A != 0,
            up: code & BUTTON_UP != 0,
            left: code & BUTTON_LEFT != 0,
            b: code & BUTTON_B != 0,
            start: code & BUTTON_START != 0,
            right: code & BUTTON_RIGHT != 0,
            down: code & BUTTON_DOWN != 0,
            select: code & BUTTON_SELECT != 0,
        }
    }

    /// Re-encode as a control code
    pub fn to_code(self) -> u8 {
        Button::ALL
            .iter()
            .filter(|b| self.is_held(**b))
            .map(|b| b.bit())
            .sum()
    }

    pub fn is_held(self, button: Button) -> bool {
        match button {
            Button::A => self.a,
            Button::Up => self.up,
            Button::Left => self.left,
            Button::B => self.b,
            Button::Start => self.start,
            Button::Right => self.right,
            Button::Down => self.down,
            Button::Select => self.select,
        }
    }
}

/// Episode with its numeric outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEpisode {
    #[serde(flatten)]
    pub record: EpisodeRecord,
    /// 1 = win, 0 = fail, None = unrecognized label
    pub outcome_numeric: Option<u8>,
}

/// Frame with decoded buttons and numeric outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFrame {
    #[serde(flatten)]
    pub record: FrameRecord,
    /// None when the frame carries no control code
    pub buttons: Option<Buttons>,
    pub outcome_numeric: Option<u8>,
}

/// Normalized tables. Absent input tables stay absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanedDataset {
    pub episodes: Option<Vec<NormalizedEpisode>>,
    pub frames: Option<Vec<NormalizedFrame>>,
}

pub fn normalize_episode(record: &EpisodeRecord, labels: &OutcomeLabels) -> NormalizedEpisode {
    NormalizedEpisode {
        outcome_numeric: labels.numeric(&record.outcome),
        record: record.clone(),
    }
}

pub fn normalize_frame(record: &FrameRecord, labels: &OutcomeLabels) -> NormalizedFrame {
    NormalizedFrame {
        buttons: record.control_code.map(Buttons::from_code),
        outcome_numeric: labels.numeric(&record.outcome),
        record: record.clone(),
    }
}

/// Build normalized tables from the loaded ones
pub fn clean(loaded: &LoadedDataset, labels: &OutcomeLabels) -> CleanedDataset {
    CleanedDataset {
        episodes: loaded
            .episodes
            .as_ref()
            .map(|eps| eps.iter().map(|e| normalize_episode(e, labels)).collect()),
        frames: loaded
            .frames
            .as_ref()
            .map(|frames| frames.iter().map(|f| normalize_frame(f, labels)).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FrameMetadata;

    fn frame(world: u32, level: u32, code: Option<u8>, outcome: &str) -> FrameRecord {
        FrameRecord {
            user: "alice".to_string(),
            session_id: "s1".to_string(),
            episode: 0,
            world,
            level,
            frame: 0,
            control_code: code,
            timestamp: "t".to_string(),
            recorded_at: None,
            outcome: outcome.to_string(),
            metadata: FrameMetadata::default(),
        }
    }

    #[test]
    fn test_code_roundtrip_all_values() {
        for code in 0..=255u8 {
            assert_eq!(Buttons::from_code(code).to_code(), code);
        }
    }

    #[test]
    fn test_decode_held_buttons() {
        let buttons = Buttons::from_code(BUTTON_A | BUTTON_B | BUTTON_RIGHT);
        assert!(buttons.a && buttons.b && buttons.right);
        assert!(!buttons.left && !buttons.up && !buttons.start);
        assert!(buttons.is_held(Button::A) && !buttons.is_held(Button::Down));
        assert_eq!(Buttons::from_code(0), Buttons::default());
    }

    #[test]
    fn test_clean_maps_outcomes() {
        let loaded = LoadedDataset {
            episodes: Some(vec![EpisodeRecord {
                user: "a".to_string(),
                session_id: "s".to_string(),
                episode: 1,
                world: 1,
                level: 1,
                outcome: "timeout".to_string(),
            }]),
            frames: Some(vec![
                frame(1, 1, Some(132), "win"),
                frame(1, 1, Some(0), "fail"),
                frame(1, 1, None, "win"),
            ]),
            ..Default::default()
        };

        let cleaned = clean(&loaded, &OutcomeLabels::default());

        let episodes = cleaned.episodes.unwrap();
        assert_eq!(episodes[0].outcome_numeric, None);

        let frames = cleaned.frames.unwrap();
        assert_eq!(frames[0].outcome_numeric, Some(1));
        assert_eq!(frames[1].outcome_numeric, Some(0));
        assert!(frames[0].buttons.unwrap().a);
        assert!(frames[0].buttons.unwrap().right);
        assert_eq!(frames[2].buttons, None);

        // Input untouched
        assert_eq!(loaded.frames.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_clean_keeps_absent_tables_absent() {
        let cleaned = clean(&LoadedDataset::default(), &OutcomeLabels::default());
        assert!(cleaned.episodes.is_none());
        assert!(cleaned.frames.is_none());
    }
}
