//! Matching options.

use crate::one_or_many::OneOrMany;
use serde::Deserialize;

pub const DEFAULT_SEPARATOR: &str = "->";
pub const DEFAULT_NUMERIC_MARKER: &str = "_check_number";

/// Options controlling how data is compared to a pattern.
///
/// Deserializes from camelCase JSON with every field optional:
///
/// ```
/// use shapematch::Options;
///
/// let options: Options = serde_json::from_str(
///     r#"{"strictArrays": false, "ignoreProperties": "id"}"#,
/// ).unwrap();
/// assert!(options.strict_strings);
/// assert!(!options.strict_arrays);
/// assert!(options.is_ignored("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Options {
    /// Require exact string equality instead of substring containment.
    pub strict_strings: bool,
    /// Require every array candidate to match instead of at least one.
    pub strict_arrays: bool,
    /// Joins path segments in mismatch messages.
    pub separator: String,
    /// Keys removed from object patterns before comparison.
    pub ignore_properties: OneOrMany<String>,
    /// Prefix marking a string pattern as a numeric comparison.
    pub numeric_marker: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strict_strings: true,
            strict_arrays: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            ignore_properties: OneOrMany::default(),
            numeric_marker: DEFAULT_NUMERIC_MARKER.to_string(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_strings(mut self, strict: bool) -> Self {
        self.strict_strings = strict;
        self
    }

    pub fn strict_arrays(mut self, strict: bool) -> Self {
        self.strict_arrays = strict;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn ignore_property(mut self, key: impl Into<String>) -> Self {
        self.ignore_properties.push(key.into());
        self
    }

    pub fn ignore_properties(mut self, keys: impl Into<OneOrMany<String>>) -> Self {
        self.ignore_properties = keys.into();
        self
    }

    pub fn numeric_marker(mut self, marker: impl Into<String>) -> Self {
        self.numeric_marker = marker.into();
        self
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore_properties.iter().any(|ignored| ignored == key)
    }
}
