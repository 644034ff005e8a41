//! Episode folder and frame file name parsing
//!
//! Folder: `<user>_<session>_e<episode>_<world>-<level>_<outcome>`
//! Frame:  `<user>_<session>_e<episode>_<world>-<level>_f<frame>_a<code>_<timestamp>.<outcome>.png`
//!
//! The structured suffix is the anchor. Whatever precedes it is split at its
//! last underscore into user and session id, so user names may themselves
//! contain underscores. Names that do not match return `None`.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use super::{EpisodeRecord, FrameMetadata, FrameRecord};
use crate::constants::FRAME_TIMESTAMP_FORMAT;

static EPISODE_FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>.+)_e(?P<episode>\d+)_(?P<world>\d+)-(?P<level>\d+)_(?P<outcome>\w+)$",
    )
    .expect("episode folder pattern is valid")
});

static FRAME_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>.+)_e(?P<episode>\d+)_(?P<world>\d+)-(?P<level>\d+)_f(?P<frame>\d+)_a(?P<code>\d+)_(?P<timestamp>.+)\.(?P<outcome>\w+)\.png$",
    )
    .expect("frame file pattern is valid")
});

/// Split `<user>_<session>` at the last underscore
fn split_user_session(prefix: &str) -> Option<(String, String)> {
    let (user, session) = prefix.rsplit_once('_')?;
    if user.is_empty() || session.is_empty() {
        return None;
    }
    Some((user.to_string(), session.to_string()))
}

/// Parse an episode folder name
pub fn parse_episode_folder_name(name: &str) -> Option<EpisodeRecord> {
    let caps = EPISODE_FOLDER_RE.captures(name)?;
    let (user, session_id) = split_user_session(&caps["prefix"])?;

    Some(EpisodeRecord {
        user,
        session_id,
        episode: caps["episode"].parse().ok()?,
        world: caps["world"].parse().ok()?,
        level: caps["level"].parse().ok()?,
        outcome: caps["outcome"].to_string(),
    })
}

/// Parse a frame file name. Metadata is left at its defaults.
pub fn parse_frame_file_name(name: &str) -> Option<FrameRecord> {
    let caps = FRAME_FILE_RE.captures(name)?;
    let (user, session_id) = split_user_session(&caps["prefix"])?;
    let timestamp = caps["timestamp"].to_string();

    Some(FrameRecord {
        user,
        session_id,
        episode: caps["episode"].parse().ok()?,
        world: caps["world"].parse().ok()?,
        level: caps["level"].parse().ok()?,
        frame: caps["frame"].parse().ok()?,
        // Codes above 255 are not a valid 8-button mask
        control_code: Some(caps["code"].parse().ok()?),
        recorded_at: NaiveDateTime::parse_from_str(&timestamp, FRAME_TIMESTAMP_FORMAT).ok(),
        timestamp,
        outcome: caps["outcome"].to_string(),
        metadata: FrameMetadata::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_episode_folder() {
        let ep = parse_episode_folder_name("alice_sess01_e3_1-2_win").unwrap();
        assert_eq!(ep.user, "alice");
        assert_eq!(ep.session_id, "sess01");
        assert_eq!(ep.episode, 3);
        assert_eq!(ep.world, 1);
        assert_eq!(ep.level, 2);
        assert_eq!(ep.outcome, "win");
    }

    #[test]
    fn test_parse_episode_folder_user_with_underscores() {
        let ep = parse_episode_folder_name("jean_luc_dp2a9j4i_e12_8-4_fail").unwrap();
        assert_eq!(ep.user, "jean_luc");
        assert_eq!(ep.session_id, "dp2a9j4i");
        assert_eq!(ep.episode, 12);
        assert_eq!(ep.world, 8);
        assert_eq!(ep.level, 4);
        assert_eq!(ep.outcome, "fail");
    }

    #[test]
    fn test_parse_episode_folder_rejects() {
        assert!(parse_episode_folder_name("randomfolder").is_none());
        assert!(parse_episode_folder_name("sess01_e3_1-2_win").is_none());
        assert!(parse_episode_folder_name("alice_sess01_e3_1-2").is_none());
        assert!(parse_episode_folder_name("alice_sess01_ex_1-2_win").is_none());
        assert!(parse_episode_folder_name("alice_sess01_e3_1-2_win.zip").is_none());
        assert!(parse_episode_folder_name("alice_sess01_e99999999999_1-2_win").is_none());
    }

    #[test]
    fn test_parse_frame_file() {
        let frame =
            parse_frame_file_name("Rafael_dp2a9j4i_e6_1-1_f1000_a20_2019-04-13_20-13-16.win.png")
                .unwrap();
        assert_eq!(frame.user, "Rafael");
        assert_eq!(frame.session_id, "dp2a9j4i");
        assert_eq!(frame.episode, 6);
        assert_eq!(frame.world, 1);
        assert_eq!(frame.level, 1);
        assert_eq!(frame.frame, 1000);
        assert_eq!(frame.control_code, Some(20));
        assert_eq!(frame.timestamp, "2019-04-13_20-13-16");
        assert_eq!(frame.outcome, "win");

        let recorded = frame.recorded_at.unwrap();
        assert_eq!(recorded.to_string(), "2019-04-13 20:13:16");
    }

    #[test]
    fn test_parse_frame_file_free_form_timestamp() {
        let frame = parse_frame_file_name("bob_s1_e0_2-3_f5_a0_later.fail.png").unwrap();
        assert_eq!(frame.timestamp, "later");
        assert!(frame.recorded_at.is_none());
        assert_eq!(frame.control_code, Some(0));
    }

    #[test]
    fn test_parse_frame_file_rejects() {
        assert!(parse_frame_file_name("bob_s1_e0_2-3_f5_a0_ts.fail.jpg").is_none());
        assert!(parse_frame_file_name("bob_s1_e0_2-3_f5_ts.fail.png").is_none());
        assert!(parse_frame_file_name("notes.png").is_none());
        // 256 does not fit the 8-button mask
        assert!(parse_frame_file_name("bob_s1_e0_2-3_f5_a256_ts.fail.png").is_none());
    }
}
