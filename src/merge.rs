//! Sparse merging of configuration documents.
//!
//! A file is decoded into a fresh zero-valued shadow of the target's type,
//! then the shadow is overlaid onto the target:
//! - structs merge field by field, recursively
//! - growable sequences are replaced entirely when the shadow's is non-empty
//! - fixed arrays, maps and set optionals merge element by element
//! - scalars and self-decoding values are replaced when the shadow's is non-zero
//!
//! A source can therefore never reset a field to its zero value.

use crate::coerce::{Value, short_type_name, store_scalar};
use crate::error::{ConfigError, DecodeOrigin, Result};
use crate::loader::FileSystem;
use crate::reflect::{Reflect, ReflectMut, ScalarKind, find_field};
use serde_json::Value as Document;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Document format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Detect the format from the file extension: `.yaml` and `.yml` in any
    /// case are YAML, everything else is JSON.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }

    /// Use `explicit` when given, otherwise detect from `path`.
    pub fn resolve(explicit: Option<&str>, path: &Path) -> Result<Self> {
        match explicit {
            Some(name) => name.parse(),
            None => Ok(Self::detect(path)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "yaml" => Ok(Format::Yaml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Decode a whole document.
pub fn decode_document(reader: impl Read, format: Format) -> Result<Document> {
    match format {
        Format::Json => {
            serde_json::from_reader(reader).map_err(|err| ConfigError::decode(format, err))
        }
        Format::Yaml => {
            serde_yaml::from_reader(reader).map_err(|err| ConfigError::decode(format, err))
        }
    }
}

/// Write a decoded document into `node`.
///
/// Object keys match fields like path segments; unknown keys and nulls are
/// ignored. Sequences take the document's elements, extra elements beyond a
/// fixed array's length are dropped. Scalars must already have the field's
/// type: a quoted number is not an integer and `1.5` is not a `u16`.
pub fn apply_document(node: &mut dyn Reflect, doc: &Document) -> Result<()> {
    if doc.is_null() {
        return Ok(());
    }

    match node.reflect_mut() {
        ReflectMut::Optional(optional) => apply_document(optional.get_or_insert_zero(), doc),
        ReflectMut::Struct(record) => {
            let Document::Object(entries) = doc else {
                return Err(ConfigError::coercion("struct", doc));
            };
            for (key, value) in entries {
                let Some(index) = find_field(record.fields(), key) else {
                    continue;
                };
                if let Some(field) = record.field_mut(index) {
                    apply_document(field, value)?;
                }
            }
            Ok(())
        }
        ReflectMut::Sequence(sequence) => {
            let Document::Array(items) = doc else {
                return Err(ConfigError::coercion("sequence", doc));
            };
            sequence.clear();
            for (index, item) in items.iter().enumerate() {
                let slot = if sequence.is_fixed() {
                    sequence.get_mut(index)
                } else {
                    sequence.push_zero()
                };
                match slot {
                    Some(slot) => apply_document(slot, item)?,
                    None => break,
                }
            }
            Ok(())
        }
        ReflectMut::Map(map) => {
            let Document::Object(entries) = doc else {
                return Err(ConfigError::coercion("map", doc));
            };
            for (key, value) in entries {
                apply_document(map.entry_zero(key), value)?;
            }
            Ok(())
        }
        ReflectMut::Scalar(scalar) => {
            if !document_fits(scalar.kind(), doc) {
                return Err(ConfigError::coercion(short_type_name(scalar.type_name()), doc));
            }
            store_scalar(scalar, Value::from_document(doc))
        }
        ReflectMut::Decode(target) => target
            .decode(doc.clone())
            .map_err(|source| ConfigError::decode(DecodeOrigin::Value, source)),
    }
}

fn document_fits(kind: ScalarKind, doc: &Document) -> bool {
    match (kind, doc) {
        (ScalarKind::String, Document::String(_)) | (ScalarKind::Bool, Document::Bool(_)) => true,
        (ScalarKind::Int | ScalarKind::Uint, Document::Number(n)) => n.is_i64() || n.is_u64(),
        (ScalarKind::Float, Document::Number(_)) => true,
        _ => false,
    }
}

/// Overlay the non-zero parts of `shadow` onto `target`.
///
/// Both must have the same type. Values moved into `target` are swapped out
/// of `shadow`, which is left unspecified afterwards.
pub fn overlay(target: &mut dyn Reflect, shadow: &mut dyn Reflect) {
    let replace = match (target.reflect_mut(), shadow.reflect_mut()) {
        (ReflectMut::Struct(target), ReflectMut::Struct(shadow)) => {
            for index in 0..shadow.fields().len() {
                if let (Some(t), Some(s)) = (target.field_mut(index), shadow.field_mut(index)) {
                    overlay(t, s);
                }
            }
            false
        }
        (ReflectMut::Sequence(target), ReflectMut::Sequence(shadow)) => {
            if target.is_fixed() {
                for index in 0..shadow.len() {
                    if let (Some(t), Some(s)) = (target.get_mut(index), shadow.get_mut(index)) {
                        overlay(t, s);
                    }
                }
                false
            } else {
                !shadow.is_empty()
            }
        }
        (ReflectMut::Map(target), ReflectMut::Map(shadow)) => {
            for key in shadow.keys() {
                if let Some(s) = shadow.get_mut(&key) {
                    overlay(target.entry_zero(&key), s);
                }
            }
            false
        }
        (ReflectMut::Optional(target), ReflectMut::Optional(shadow)) => {
            if let Some(s) = shadow.inner_mut() {
                overlay(target.get_or_insert_zero(), s);
            }
            false
        }
        (ReflectMut::Scalar(_), ReflectMut::Scalar(shadow)) => !shadow.is_zero(),
        (ReflectMut::Decode(_), ReflectMut::Decode(shadow)) => !shadow.is_zero(),
        _ => false,
    };

    if replace {
        target.swap_from(shadow);
    }
}

/// Decode the file at `path` and sparsely merge it into `target`.
///
/// Returns `Ok(false)` when the file does not exist. Decoding happens before
/// any mutation, so a malformed file leaves `target` untouched.
pub fn merge_file<T: Reflect>(
    fs: &dyn FileSystem,
    target: &mut T,
    path: &Path,
    format: Format,
) -> Result<bool> {
    let reader = match fs.open(path) {
        Ok(reader) => reader,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Config file not found, skipping");
            return Ok(false);
        }
        Err(source) => {
            return Err(ConfigError::FileAccess {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let document = decode_document(reader, format)?;

    let mut shadow = T::zeroed();
    apply_document(&mut shadow, &document).map_err(|err| ConfigError::decode(format, err))?;
    overlay(target, &mut shadow);

    debug!(path = %path.display(), %format, "Merged config file");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemFs;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Default, Clone, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        #[default]
        Off,
        Fast,
        Safe,
    }

    crate::self_decoding!(Mode);

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Database {
        host: String,
        port: u16,
    }

    crate::configurable!(Database { host, port });

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Config {
        name: String,
        port: u16,
        debug: bool,
        ratio: f64,
        database: Database,
        tags: Vec<String>,
        weights: [u8; 3],
        labels: HashMap<String, String>,
        backup: Option<Database>,
        mode: Mode,
    }

    crate::configurable!(Config {
        name,
        port,
        debug,
        ratio,
        database(yaml = "db"),
        tags,
        weights,
        labels,
        backup,
        mode,
    });

    fn merge_str(target: &mut Config, content: &str, format: Format) -> Result<bool> {
        let fs = MemFs::new().with_file("config", content);
        merge_file(&fs, target, Path::new("config"), format)
    }

    #[test]
    fn test_format_detect() {
        assert_eq!(Format::detect(Path::new("config.YAML")), Format::Yaml);
        assert_eq!(Format::detect(Path::new("config.yml")), Format::Yaml);
        assert_eq!(Format::detect(Path::new("config.json")), Format::Json);
        assert_eq!(Format::detect(Path::new("config")), Format::Json);
        assert_eq!(Format::detect(Path::new("config.toml")), Format::Json);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("yaml".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        let err = "toml".parse::<Format>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(f) if f == "toml"));
    }

    #[test]
    fn test_format_resolve_prefers_explicit() {
        let path = Path::new("settings.yaml");
        assert_eq!(Format::resolve(Some("json"), path).unwrap(), Format::Json);
        assert_eq!(Format::resolve(None, path).unwrap(), Format::Yaml);
    }

    #[test]
    fn test_zero_values_do_not_override() {
        let mut cfg = Config {
            name: "Default".to_string(),
            port: 8080,
            ..Default::default()
        };
        merge_str(&mut cfg, r#"{"port": 9000, "name": ""}"#, Format::Json).unwrap();
        assert_eq!(cfg.name, "Default");
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn test_nested_struct_merges_field_wise() {
        let mut cfg = Config {
            database: Database {
                host: "localhost".to_string(),
                port: 5432,
            },
            ..Default::default()
        };
        merge_str(&mut cfg, "db:\n  port: 6543\n", Format::Yaml).unwrap();
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.port, 6543);
    }

    #[test]
    fn test_sequences() {
        let mut cfg = Config {
            tags: vec!["a".to_string(), "b".to_string()],
            weights: [1, 2, 3],
            ..Default::default()
        };

        merge_str(&mut cfg, r#"{"tags": []}"#, Format::Json).unwrap();
        assert_eq!(cfg.tags, vec!["a", "b"]);

        merge_str(&mut cfg, r#"{"tags": ["c"], "weights": [0, 9]}"#, Format::Json).unwrap();
        assert_eq!(cfg.tags, vec!["c"]);
        assert_eq!(cfg.weights, [1, 9, 3]);
    }

    #[test]
    fn test_maps_merge_entry_wise() {
        let mut cfg = Config::default();
        cfg.labels.insert("team".to_string(), "core".to_string());
        cfg.labels.insert("tier".to_string(), "gold".to_string());

        merge_str(&mut cfg, "labels:\n  tier: silver\n  zone: eu\n", Format::Yaml).unwrap();
        assert_eq!(cfg.labels["team"], "core");
        assert_eq!(cfg.labels["tier"], "silver");
        assert_eq!(cfg.labels["zone"], "eu");
    }

    #[test]
    fn test_optionals() {
        let mut cfg = Config::default();
        merge_str(&mut cfg, r#"{"name": "x"}"#, Format::Json).unwrap();
        assert_eq!(cfg.backup, None);

        merge_str(&mut cfg, r#"{"backup": {"host": "b1"}}"#, Format::Json).unwrap();
        merge_str(&mut cfg, r#"{"backup": {"port": 1}}"#, Format::Json).unwrap();
        assert_eq!(
            cfg.backup,
            Some(Database {
                host: "b1".to_string(),
                port: 1,
            })
        );
    }

    #[test]
    fn test_self_decoding_values() {
        let mut cfg = Config {
            mode: Mode::Safe,
            ..Default::default()
        };
        merge_str(&mut cfg, r#"{"name": "x"}"#, Format::Json).unwrap();
        assert_eq!(cfg.mode, Mode::Safe);

        merge_str(&mut cfg, "mode: fast\n", Format::Yaml).unwrap();
        assert_eq!(cfg.mode, Mode::Fast);
    }

    #[test]
    fn test_unknown_keys_ignored_and_case_insensitive() {
        let mut cfg = Config::default();
        merge_str(&mut cfg, r#"{"NAME": "x", "extra": {"a": 1}}"#, Format::Json).unwrap();
        assert_eq!(cfg.name, "x");
    }

    #[test]
    fn test_missing_file_is_noop() {
        let fs = MemFs::new();
        let mut cfg = Config::default();
        let merged = merge_file(&fs, &mut cfg, Path::new("absent.json"), Format::Json).unwrap();
        assert!(!merged);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_malformed_content_leaves_target() {
        let mut cfg = Config {
            port: 8080,
            ..Default::default()
        };
        let err = merge_str(&mut cfg, r#"{"port": 9000"#, Format::Json).unwrap_err();
        assert!(err.is_decode());
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let mut cfg = Config {
            port: 8080,
            ..Default::default()
        };
        let err = merge_str(&mut cfg, r#"{"name": "x", "port": "abc"}"#, Format::Json)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Decode {
                format: DecodeOrigin::File(Format::Json),
                ..
            }
        ));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.name, "");

        let err = merge_str(&mut cfg, r#"{"database": "x"}"#, Format::Json).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_scalars_are_not_coerced_from_other_document_types() {
        let mut cfg = Config {
            port: 8080,
            ..Default::default()
        };
        for content in [
            r#"{"port": "9000"}"#,
            r#"{"name": 5}"#,
            r#"{"debug": "true"}"#,
            r#"{"port": 90.5}"#,
            r#"{"port": 9000.0}"#,
            r#"{"ratio": "0.5"}"#,
            r#"{"debug": 1}"#,
        ] {
            let err = merge_str(&mut cfg, content, Format::Json).unwrap_err();
            assert!(err.is_decode(), "{content} should not decode");
        }
        assert_eq!(
            cfg,
            Config {
                port: 8080,
                ..Default::default()
            }
        );

        merge_str(&mut cfg, "ratio: 2
name: '5'
", Format::Yaml).unwrap();
        assert_eq!(cfg.ratio, 2.0);
        assert_eq!(cfg.name, "5");
    }

    #[test]
    fn test_yaml_scalars() {
        let mut cfg = Config::default();
        merge_str(&mut cfg, "debug: true\nratio: 0.5\nport: 9000\n", Format::Yaml).unwrap();
        assert!(cfg.debug);
        assert_eq!(cfg.ratio, 0.5);
        assert_eq!(cfg.port, 9000);
    }
}
