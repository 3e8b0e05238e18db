//! Layered configuration loading.
//!
//! A [`Loader`] owns the registered sources and applies them to a target in
//! stage order. The canonical order, lowest precedence first:
//! 1. Registered files
//! 2. Explicit command-line flags
//! 3. Prefixed environment variables
//! 4. Files named by file-reference fields of the target itself
//!
//! Loading stops at the first failing stage. Mutations made by earlier stages
//! are kept.

mod files;
mod flags;
mod global;

pub use files::{FileSystem, MemFs, OsFs};
pub use flags::{ClapFlags, ExplicitFlags, FlagSource};
pub use global::{
    configure, load, register_env, register_file, register_file_with_format, register_flags,
};

use crate::coerce::Value;
use crate::discover::{discover, text_value};
use crate::error::{ConfigError, LoadError, Stage};
use crate::merge::{Format, merge_file};
use crate::path::FieldPath;
use crate::reflect::{Reflect, ReflectRef, eq_fold};
use crate::resolve;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Reads the process environment as `(key, value)` pairs.
pub type EnvReader = Box<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// A registered configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: Format,
}

/// Applies registered sources to configuration objects.
pub struct Loader {
    fs: Box<dyn FileSystem>,
    env_reader: EnvReader,
    env_prefix: Option<String>,
    flag_sources: Vec<Box<dyn FlagSource>>,
    files: Vec<ConfigFile>,
    order: Vec<Stage>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("env_prefix", &self.env_prefix)
            .field("flag_sources", &self.flag_sources.len())
            .field("files", &self.files)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl Loader {
    /// A loader reading the OS filesystem and process environment.
    pub fn new() -> Self {
        Self {
            fs: Box::new(OsFs),
            env_reader: Box::new(process_env),
            env_prefix: None,
            flag_sources: Vec::new(),
            files: Vec::new(),
            order: Stage::CANONICAL.to_vec(),
        }
    }

    /// Read files through `fs`.
    pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// Read the environment through `reader`.
    pub fn with_env_reader(
        mut self,
        reader: impl Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    ) -> Self {
        self.env_reader = Box::new(reader);
        self
    }

    /// Apply stages in `order`, lowest precedence first. Omitted stages are
    /// skipped; repeated stages run once, at their first position.
    pub fn with_stage_order(mut self, order: impl IntoIterator<Item = Stage>) -> Self {
        self.order.clear();
        for stage in order {
            if !self.order.contains(&stage) {
                self.order.push(stage);
            }
        }
        self
    }

    /// Load environment variables named `<prefix>_...`. Replaces any earlier prefix.
    pub fn register_env(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load a file, detecting its format from the extension.
    pub fn register_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        let path = path.into();
        let format = Format::detect(&path);
        self.register_file_with_format(path, format)
    }

    /// Load a file in an explicit format.
    pub fn register_file_with_format(
        &mut self,
        path: impl Into<PathBuf>,
        format: Format,
    ) -> &mut Self {
        self.files.push(ConfigFile {
            path: path.into(),
            format,
        });
        self
    }

    /// Load the explicit flags of `flags`. Flags must already be parsed.
    pub fn register_flags(&mut self, flags: impl FlagSource + 'static) -> &mut Self {
        self.flag_sources.push(Box::new(flags));
        self
    }

    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    pub fn stage_order(&self) -> &[Stage] {
        &self.order
    }

    /// Populate `target` by applying every registered source.
    ///
    /// The target must be a struct, possibly behind set optionals; this is
    /// checked before any mutation.
    pub fn load<T: Reflect>(&self, target: &mut T) -> Result<(), LoadError> {
        check_root(&*target).map_err(LoadError::Target)?;

        for stage in &self.order {
            let applied = match stage {
                Stage::Files => self.load_files(target)?,
                Stage::Flags => self.load_flags(target),
                Stage::Env => self.load_env(target)?,
                Stage::FileFields => self.load_file_fields(target)?,
            };
            debug!(stage = %stage, applied, "Load stage complete");
        }

        info!(
            stages = self.order.len(),
            files = self.files.len(),
            "Configuration loaded"
        );
        Ok(())
    }

    fn load_files<T: Reflect>(&self, target: &mut T) -> Result<usize, LoadError> {
        let mut merged = 0;
        for file in &self.files {
            let found = merge_file(self.fs.as_ref(), target, &file.path, file.format).map_err(
                |err| LoadError::stage(Stage::Files, file.path.display().to_string(), err),
            )?;
            if found {
                merged += 1;
            }
        }
        Ok(merged)
    }

    // Flags that do not map to a settable field are skipped, since flag sets
    // usually carry switches unrelated to configuration.
    fn load_flags(&self, target: &mut dyn Reflect) -> usize {
        let mut applied = 0;
        for source in &self.flag_sources {
            for (name, raw) in source.explicit_flags() {
                let path = FieldPath::from_flag(&name);
                match resolve::set(target, &path, Value::String(raw)) {
                    Ok(()) => applied += 1,
                    Err(err) => debug!(flag = %name, error = %err, "Skipping flag"),
                }
            }
        }
        applied
    }

    fn load_env(&self, target: &mut dyn Reflect) -> Result<usize, LoadError> {
        let Some(prefix) = self.env_prefix.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(0);
        };

        let mut applied = 0;
        for (key, value) in (self.env_reader)() {
            let Some(rest) = strip_env_prefix(&key, prefix) else {
                continue;
            };

            let path = FieldPath::from_env_key(rest);
            resolve::set(target, &path, Value::String(value))
                .map_err(|err| LoadError::stage(Stage::Env, key.as_str(), err))?;
            debug!(key = %key, path = %path, "Applied environment variable");
            applied += 1;
        }
        Ok(applied)
    }

    fn load_file_fields<T: Reflect>(&self, target: &mut T) -> Result<usize, LoadError> {
        let mut merged = 0;

        for field in discover(&*target) {
            let subject = field.path.to_string();
            let fail =
                |err: ConfigError| LoadError::stage(Stage::FileFields, subject.as_str(), err);

            // Read at consumption time: earlier merges may have changed it.
            let location = resolve::get(&*target, &field.path).map_err(fail)?;
            let text = text_value(location).ok_or_else(|| {
                fail(ConfigError::FileFieldNotString {
                    path: subject.clone(),
                })
            })?;
            if text.is_empty() {
                continue;
            }

            let path = PathBuf::from(text);
            let format = Format::resolve(field.format.as_deref(), &path).map_err(fail)?;
            debug!(field = %field.path, path = %path.display(), %format, "Loading referenced file");

            if merge_file(self.fs.as_ref(), target, &path, format).map_err(fail)? {
                merged += 1;
            }
        }
        Ok(merged)
    }
}

fn check_root(node: &dyn Reflect) -> Result<(), ConfigError> {
    match node.reflect_ref() {
        ReflectRef::Struct(_) => Ok(()),
        ReflectRef::Optional(optional) => match optional.inner() {
            Some(inner) => check_root(inner),
            None => Err(ConfigError::RootNotStruct {
                type_name: node.type_name(),
            }),
        },
        _ => Err(ConfigError::RootNotStruct {
            type_name: node.type_name(),
        }),
    }
}

/// Remainder of `key` after `<prefix>_`, with the prefix matched case-insensitively.
fn strip_env_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let split = key
        .char_indices()
        .map(|(at, _)| at)
        .chain(std::iter::once(key.len()))
        .nth(prefix.chars().count())?;
    let (head, rest) = key.split_at(split);
    if !eq_fold(head, prefix) {
        return None;
    }
    rest.strip_prefix('_').filter(|rest| !rest.is_empty())
}

fn process_env() -> Vec<(String, String)> {
    utf8_vars(std::env::vars_os())
}

/// Keep variables whose key and value are both valid UTF-8.
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| match (key.to_str(), value.to_str()) {
            (Some(key), Some(value)) => Some((key.to_owned(), value.to_owned())),
            _ => {
                warn!(key = %key.to_string_lossy(), "Skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Database {
        host: String,
    }

    crate::configurable!(Database { host });

    #[derive(Debug, Default)]
    struct Config {
        name: String,
        port: u16,
        database: Database,
    }

    crate::configurable!(Config { name, port, database });

    fn env(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn() -> Vec<(String, String)> + Send + Sync {
        move || {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }
    }

    #[test]
    fn test_strip_env_prefix() {
        assert_eq!(strip_env_prefix("APP_NAME", "APP"), Some("NAME"));
        assert_eq!(strip_env_prefix("app_name", "APP"), Some("name"));
        assert_eq!(strip_env_prefix("APPNAME", "APP"), None);
        assert_eq!(strip_env_prefix("APP_", "APP"), None);
        assert_eq!(strip_env_prefix("AP", "APP"), None);
        assert_eq!(strip_env_prefix("OTHER_NAME", "APP"), None);
    }

    #[test]
    fn test_strip_env_prefix_folds_unicode() {
        assert_eq!(strip_env_prefix("ÄPP_NAME", "äpp"), Some("NAME"));
        assert_eq!(strip_env_prefix("straße_port", "STRAẞE"), Some("port"));
        assert_eq!(strip_env_prefix("ÄP", "äpp"), None);
        assert_eq!(strip_env_prefix("ÄPPX_NAME", "äpp"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_env_vars_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("APP_NAME"), OsString::from("ok")),
            (OsString::from("APP_HOST"), OsString::from_vec(vec![0x66, 0xff])),
            (OsString::from_vec(vec![0xfe, 0x41]), OsString::from("x")),
        ];
        assert_eq!(utf8_vars(vars), vec![("APP_NAME".to_string(), "ok".to_string())]);
    }

    #[test]
    fn test_root_must_be_struct() {
        let loader = Loader::new().with_env_reader(env(&[]));
        let mut port = 0u16;
        let err = loader.load(&mut port).unwrap_err();
        assert!(matches!(err, LoadError::Target(ConfigError::RootNotStruct { .. })));

        let mut unset: Option<Config> = None;
        assert!(loader.load(&mut unset).is_err());

        let mut set = Some(Config::default());
        assert!(loader.load(&mut set).is_ok());
    }

    #[test]
    fn test_env_prefix_unset_skips_stage() {
        let loader = Loader::new().with_env_reader(env(&[("APP_NAME", "X")]));
        let mut cfg = Config::default();
        loader.load(&mut cfg).unwrap();
        assert_eq!(cfg.name, "");
    }

    #[test]
    fn test_env_failure_names_key() {
        let mut loader = Loader::new().with_env_reader(env(&[("APP_PORT", "abc")]));
        loader.register_env("APP");
        let mut cfg = Config::default();
        let err = loader.load(&mut cfg).unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Env));
        assert_eq!(err.to_string(), "env source 'APP_PORT' failed");
    }

    #[test]
    fn test_stage_order_dedupes() {
        let loader = Loader::new().with_stage_order([Stage::Env, Stage::Files, Stage::Env]);
        assert_eq!(loader.stage_order(), [Stage::Env, Stage::Files]);
    }

    #[test]
    fn test_register_file_detects_format() {
        let mut loader = Loader::new();
        loader
            .register_file("a.yml")
            .register_file("b.json")
            .register_file_with_format("c.conf", Format::Yaml);
        let formats: Vec<Format> = loader.files().iter().map(|f| f.format).collect();
        assert_eq!(formats, vec![Format::Yaml, Format::Json, Format::Yaml]);
    }
}
