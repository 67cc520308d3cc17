//! Record file loading (JSON array or TOML `[[records]]` tables).

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::entry::Entry;
use crate::application::error::{ApplicationError, ApplicationResult};

/// Supported record file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Toml,
}

impl RecordFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(RecordFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(RecordFormat::Toml),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlRecords {
    #[serde(default)]
    records: Vec<Entry>,
}

/// Parse record file content. Errors are returned as plain messages so the
/// caller can attach the path.
pub fn parse_records(content: &str, format: RecordFormat) -> Result<Vec<Entry>, String> {
    match format {
        RecordFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        RecordFormat::Toml => toml::from_str::<TomlRecords>(content)
            .map(|file| file.records)
            .map_err(|e| e.to_string()),
    }
}

/// Load all records from `path`, in file order.
#[instrument(level = "debug")]
pub fn load_records(path: &Path) -> ApplicationResult<Vec<Entry>> {
    let format = RecordFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .map_err(|e| ApplicationError::io(format!("read {}", path.display()), e))?;
    let records = parse_records(&content, format).map_err(|message| ApplicationError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(count = records.len(), ?format, "parsed records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::entry::Key;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case("records.json", Some(RecordFormat::Json))]
    #[case("records.TOML", Some(RecordFormat::Toml))]
    #[case("records.yaml", None)]
    #[case("records", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<RecordFormat>) {
        let result = RecordFormat::from_path(&PathBuf::from(path));
        assert_eq!(result.ok(), expected);
    }

    #[test]
    fn test_parse_toml_tables() {
        let content = r#"
[[records]]
id = 1
title = "A"

[[records]]
id = 2
parent = 1
title = "A.1"
"#;
        let records = parse_records(content, RecordFormat::Toml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent, Some(Key::Int(1)));
    }

    #[test]
    fn test_parse_json_with_null_parent_and_string_ids() {
        let content = r#"[{"id": "root", "parent": null}, {"id": "leaf", "parent": "root"}]"#;
        let records = parse_records(content, RecordFormat::Json).unwrap();
        assert_eq!(records[0].parent, None);
        assert_eq!(records[1].parent, Some(Key::Text("root".into())));
    }

    #[test]
    fn test_parse_malformed_json_reports_message() {
        assert!(parse_records("[{", RecordFormat::Json).is_err());
    }
}
