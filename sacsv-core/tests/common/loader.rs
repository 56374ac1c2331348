//! Fixture loading from YAML files

use serde::de::DeserializeOwned;
use serde::Deserialize;

use std::path::Path;

/// A well-formed document and the events it must produce.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionCase {
    pub id: String,
    pub desc: String,
    pub csv: String,
    /// Rendered events: `{` start_row, `[..]` field, `}` end_row.
    pub events: String,
}

/// A malformed document and how it must be rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorCase {
    pub id: String,
    pub desc: String,
    pub csv: String,
    /// `ErrorCode` variant name.
    pub code: String,
    /// Events delivered before the error, rendered like
    /// [`ConversionCase::events`].
    pub events: String,
    /// Resume position reported by `parse`, if the error is raised there.
    /// Absent when only `finish` can detect it.
    #[serde(default)]
    pub consumed: Option<usize>,
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name<T: DeserializeOwned>(name: &str) -> Vec<T> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
