//! Dot-separated field paths.
//!
//! A path such as `database.replicas.0.host` addresses a value inside a
//! configuration object. Segments are matched against field names or
//! aliases, sequence indices and map keys by [`crate::resolve`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A parsed field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dot-separated path. Empty segments are kept and fail to resolve.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    /// Path addressed by a long flag name: dashes separate segments.
    pub fn from_flag(name: &str) -> Self {
        Self::parse(&name.replace('-', "."))
    }

    /// Path addressed by an environment key with its prefix already removed:
    /// lower-cased, underscores separate segments.
    pub fn from_env_key(key: &str) -> Self {
        Self::parse(&key.to_lowercase().replace('_', "."))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let path = FieldPath::parse("database.replicas.0.host");
        assert_eq!(path.segments(), ["database", "replicas", "0", "host"]);
        assert_eq!(path.to_string(), "database.replicas.0.host");
    }

    #[test]
    fn test_empty_segments_preserved() {
        let path = FieldPath::parse("a..b");
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[1], "");
    }

    #[test]
    fn test_from_flag() {
        let path = FieldPath::from_flag("database-host");
        assert_eq!(path.segments(), ["database", "host"]);
    }

    #[test]
    fn test_from_env_key() {
        let path = FieldPath::from_env_key("DATABASE_HOST");
        assert_eq!(path.segments(), ["database", "host"]);

        let path = FieldPath::from_env_key("NAME");
        assert_eq!(path.segments(), ["name"]);
    }

    #[test]
    fn test_child() {
        let path = FieldPath::parse("servers").child("1").child("config");
        assert_eq!(path.to_string(), "servers.1.config");
    }
}
