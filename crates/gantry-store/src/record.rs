//! Image metadata records.
//!
//! A record is the operator-supplied metadata document plus the identity
//! the store filed it under. The document itself is opaque to the store:
//! it only has to be valid JSON.

use std::io::Read;
use std::io::Write;

use chrono::NaiveDate;
use gantry_core::render::{CliRender, RenderResult};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// One stored metadata record for an image version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub version: String,
    /// Calendar day the record was stored under.
    pub day: NaiveDate,
    /// Opaque operator-supplied metadata document.
    pub meta: serde_json::Value,
}

/// All records stored under one image name, ordered by `(version, day)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRecordList {
    pub images: Vec<ImageRecord>,
}

/// Parse a metadata document from a reader. The format is the record's own
/// concern, not the store's; a malformed document is a validation error.
pub fn parse_metadata(reader: &mut dyn Read) -> StoreResult<serde_json::Value> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| StoreError::Validation(format!("could not read metadata: {e}")))?;
    serde_json::from_str(&raw)
        .map_err(|e| StoreError::Validation(format!("metadata is not valid JSON: {e}")))
}

impl CliRender for ImageRecord {
    fn render_cli(&self, out: &mut dyn Write) -> RenderResult<()> {
        writeln!(out, "-------------------------")?;
        writeln!(out, "Image: {}:{}", self.name, self.version)?;
        writeln!(out, "  - stored: {}", self.day)?;
        writeln!(out, "  - metadata: {}", serde_json::to_string(&self.meta)?)?;
        Ok(())
    }
}

impl CliRender for ImageRecordList {
    fn render_cli(&self, out: &mut dyn Write) -> RenderResult<()> {
        if self.images.is_empty() {
            writeln!(out, "No images stored")?;
            return Ok(());
        }
        for record in &self.images {
            record.render_cli(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> ImageRecord {
        ImageRecord {
            name: "my-api".to_string(),
            version: "v1".to_string(),
            day: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            meta: serde_json::json!({"built-by": "ci"}),
        }
    }

    #[test]
    fn parse_metadata_accepts_json() {
        let mut input = std::io::Cursor::new(r#"{"commit": "abc123"}"#);
        let meta = parse_metadata(&mut input).unwrap();
        assert_eq!(meta["commit"], "abc123");
    }

    #[test]
    fn parse_metadata_rejects_garbage() {
        let mut input = std::io::Cursor::new("not json at all {");
        let err = parse_metadata(&mut input).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn record_cli_rendering() {
        let mut buf = Vec::new();
        test_record().render_cli(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Image: my-api:v1"));
        assert!(text.contains("2026-08-29"));
        assert!(text.contains("built-by"));
    }

    #[test]
    fn empty_list_cli_rendering() {
        let mut buf = Vec::new();
        ImageRecordList::default().render_cli(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("No images stored"));
    }

    #[test]
    fn record_wire_rendering_is_field_complete() {
        use gantry_core::WireRender;
        let bytes = test_record().render_wire().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["name"], "my-api");
        assert_eq!(value["version"], "v1");
        assert_eq!(value["day"], "2026-08-29");
        assert_eq!(value["meta"]["built-by"], "ci");
    }
}
