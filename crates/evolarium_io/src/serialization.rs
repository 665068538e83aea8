//! Serialization utilities with robust error handling.
//!
//! JSON is the only document format. Files whose name ends in `.gz` are
//! gzip-compressed JSON.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::io::{Read, Write};
use std::path::Path;

/// Serializes data to JSON with error handling.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string.
///
/// # Returns
/// `IoError::Validation` for blank input and for well-formed JSON of the
/// wrong shape (missing fields, wrong types), `IoError::Serialization` for
/// text that is not JSON at all.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json).map_err(|e| match e.classify() {
        Category::Data => IoError::validation(format!("Malformed document: {}", e)),
        _ => IoError::serialization(format!("JSON deserialization failed: {}", e)),
    })
}

/// Compact JSON, gzip-compressed.
pub fn to_gzip_json<T>(data: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    let json = to_json(data)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(json.as_bytes())
        .map_err(|e| IoError::compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| IoError::compression(e.to_string()))
}

pub fn from_gzip_json<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let mut json = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut json)
        .map_err(|e| IoError::compression(format!("gzip decode failed: {}", e)))?;
    from_json(&json)
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Writes pretty JSON, or gzip JSON when the path ends in `.gz`.
pub fn write_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = if is_gzip_path(path) {
        to_gzip_json(data)?
    } else {
        to_json_pretty(data)?.into_bytes()
    };
    std::fs::write(path, bytes)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("writing {:?}", path)))?;
    Ok(())
}

/// Reads a file written by [`write_file`].
pub fn read_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {:?}", path)))?;
    let parsed = if is_gzip_path(path) {
        from_gzip_json(&bytes)
    } else {
        let json = String::from_utf8(bytes)
            .map_err(|e| IoError::validation(format!("Invalid UTF-8: {}", e)))?;
        from_json(&json)
    };
    parsed.map_err(|e| e.with_context(format!("loading {:?}", path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SnapshotDocument;

    #[test]
    fn test_empty_json_fails() {
        let result: Result<SnapshotDocument> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<SnapshotDocument> = from_json("{ invalid json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }

    #[test]
    fn test_wrong_shape_is_validation() {
        let result: Result<SnapshotDocument> = from_json("{}");
        assert!(result.unwrap_err().is_validation());
        let result: Result<SnapshotDocument> = from_json(r#"{"meta": 3}"#);
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_gzip_is_smaller_for_repetitive_documents() {
        let mut doc = SnapshotDocument::default();
        doc.entities.food = vec![vec![1.0, 2.0]; 500];
        let plain = to_json(&doc).unwrap();
        let packed = to_gzip_json(&doc).unwrap();
        assert!(packed.len() < plain.len());
        let back: SnapshotDocument = from_gzip_json(&packed).unwrap();
        assert_eq!(back.entities.food.len(), 500);
    }

    #[test]
    fn test_corrupt_gzip_reports_compression() {
        let result: Result<SnapshotDocument> = from_gzip_json(b"definitely not gzip");
        assert!(matches!(result, Err(IoError::Compression(_))));
    }

    #[test]
    fn test_file_extension_selects_format() {
        let dir = std::env::temp_dir().join(format!("evolarium_io_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let plain = dir.join("snap.json");
        let packed = dir.join("snap.json.gz");

        let mut doc = SnapshotDocument::default();
        doc.world.size = 1234.0;
        write_file(&doc, &plain).unwrap();
        write_file(&doc, &packed).unwrap();

        assert!(std::fs::read_to_string(&plain).unwrap().contains("1234"));
        assert_eq!(&std::fs::read(&packed).unwrap()[..2], &[0x1f, 0x8b]);

        let a: SnapshotDocument = read_file(&plain).unwrap();
        let b: SnapshotDocument = read_file(&packed).unwrap();
        assert_eq!(a.world.size, 1234.0);
        assert_eq!(b.world.size, 1234.0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_has_context() {
        let result: Result<SnapshotDocument> = read_file("/nonexistent/evolarium.json");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
