//! Per-frame metadata stored in PNG text chunks
//!
//! The recorder writes three keys into each frame image: an opaque payload,
//! the control state and an outcome code. Plain, compressed and
//! international text chunks are all accepted.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::warn;

use super::FrameMetadata;
use crate::error::MetadataError;
use crate::settings::MetadataKeys;

/// Read metadata from a frame image.
///
/// Missing keys yield zero / empty values; an unreadable file or a
/// non-integer value for an integer key is an error.
pub fn read_frame_metadata(
    path: &Path,
    keys: &MetadataKeys,
) -> Result<FrameMetadata, MetadataError> {
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let reader = decoder.read_info()?;
    let info = reader.info();

    let mut text: Vec<(String, String)> = Vec::new();
    for chunk in &info.uncompressed_latin1_text {
        text.push((chunk.keyword.clone(), chunk.text.clone()));
    }
    for chunk in &info.compressed_latin1_text {
        text.push((chunk.keyword.clone(), chunk.get_text()?));
    }
    for chunk in &info.utf8_text {
        text.push((chunk.keyword.clone(), chunk.get_text()?));
    }

    let lookup = |key: &str| {
        text.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    Ok(FrameMetadata {
        raw_payload: lookup(&keys.payload_key)
            .map(|v| v.as_bytes().to_vec())
            .unwrap_or_default(),
        player_input: parse_integer(&keys.control_key, lookup(&keys.control_key))?,
        outcome_code: parse_integer(&keys.outcome_key, lookup(&keys.outcome_key))?,
    })
}

fn parse_integer(key: &str, value: Option<&str>) -> Result<i64, MetadataError> {
    match value {
        None => Ok(0),
        Some(v) => v.trim().parse().map_err(|_| MetadataError::NotAnInteger {
            key: key.to_string(),
            value: v.to_string(),
        }),
    }
}

/// Read metadata from a frame image, substituting defaults on any failure.
///
/// Returns the metadata and whether the read failed. One corrupt frame must
/// not abort a dataset load.
pub fn extract_frame_metadata(path: &Path, keys: &MetadataKeys) -> (FrameMetadata, bool) {
    match read_frame_metadata(path, keys) {
        Ok(metadata) => (metadata, false),
        Err(e) => {
            warn!("Could not read metadata from {}: {}", path.display(), e);
            (FrameMetadata::default(), true)
        }
    }
}

/// Write a 1x1 grayscale PNG carrying the given text chunks
#[cfg(test)]
pub(crate) fn write_test_png(path: &Path, chunks: &[(&str, &str)]) {
    use std::io::BufWriter;

    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), 1, 1);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    for (key, value) in chunks {
        encoder
            .add_text_chunk(key.to_string(), value.to_string())
            .unwrap();
    }
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[0]).unwrap();
    writer.finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_test_png(&path, &[("RAM", "abc"), ("BP1", "132"), ("OUTCOME", "1")]);

        let meta = read_frame_metadata(&path, &MetadataKeys::default()).unwrap();
        assert_eq!(meta.raw_payload, b"abc".to_vec());
        assert_eq!(meta.player_input, 132);
        assert_eq!(meta.outcome_code, 1);
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_test_png(&path, &[("Software", "recorder")]);

        let meta = read_frame_metadata(&path, &MetadataKeys::default()).unwrap();
        assert_eq!(meta, FrameMetadata::default());
    }

    #[test]
    fn test_custom_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_test_png(&path, &[("INPUT", "5")]);

        let keys = MetadataKeys {
            control_key: "INPUT".to_string(),
            ..Default::default()
        };
        let meta = read_frame_metadata(&path, &keys).unwrap();
        assert_eq!(meta.player_input, 5);
    }

    #[test]
    fn test_non_integer_value_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        write_test_png(&path, &[("BP1", "left")]);

        let err = read_frame_metadata(&path, &MetadataKeys::default()).unwrap_err();
        assert!(matches!(err, MetadataError::NotAnInteger { .. }));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let (meta, failed) = extract_frame_metadata(&path, &MetadataKeys::default());
        assert!(failed);
        assert_eq!(meta, FrameMetadata::default());

        let (meta, failed) =
            extract_frame_metadata(&dir.path().join("missing.png"), &MetadataKeys::default());
        assert!(failed);
        assert_eq!(meta, FrameMetadata::default());
    }
}
