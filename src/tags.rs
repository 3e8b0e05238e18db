//! Field annotation parsing.
//!
//! Annotations are compact `key[=value]` lists separated by commas, e.g.
//! `file,format=yaml`. They are attached to fields through [`crate::configurable!`]
//! and parsed once per type into [`FieldMeta`].

use std::collections::HashMap;

/// Annotation key carrying loader metadata.
pub const MARKER: &str = "layerconf";

/// Annotation keys whose first part is treated as a field alias.
pub const ALIAS_KEYS: [&str; 2] = ["json", "yaml"];

/// Parse an annotation into key/value pairs.
///
/// A key without `=` maps to `"true"`; the last occurrence of a key wins.
/// For example `"file,format=yaml"` yields `{"file": "true", "format": "yaml"}`.
pub fn parse_tag(raw: &str) -> HashMap<String, String> {
    let mut kvs = HashMap::new();

    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.split_once('=') {
            Some((key, value)) => kvs.insert(key.trim().to_string(), value.trim().to_string()),
            None => kvs.insert(part.to_string(), "true".to_string()),
        };
    }

    kvs
}

/// Loader metadata of a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    /// Field holds the path of another configuration file.
    pub file: bool,
    /// Explicit decode format for the referenced file.
    pub format: Option<String>,
}

impl FieldMeta {
    /// Build metadata from the raw marker annotation.
    pub fn parse(raw: &str) -> Self {
        let mut kvs = parse_tag(raw);
        Self {
            file: kvs.contains_key("file"),
            format: kvs.remove("format").filter(|f| !f.is_empty()),
        }
    }
}

/// Alias declared by a serialization annotation such as `email_address,omitempty`.
pub fn alias_from_tag(raw: &str) -> Option<&str> {
    raw.split(',').next().map(str::trim).filter(|name| !name.is_empty())
}
