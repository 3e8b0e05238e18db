//! Layered configuration loading.
//!
//! Populates a configuration struct from files, explicit command-line flags,
//! prefixed environment variables and files named by the configuration
//! itself. Sources merge sparsely: values a source leaves at zero never
//! override what an earlier source set.
//!
//! ```
//! use layerconf::{Loader, MemFs, configurable};
//!
//! #[derive(Debug, Default)]
//! struct Config {
//!     name: String,
//!     port: u16,
//! }
//!
//! configurable!(Config { name, port });
//!
//! let fs = MemFs::new().with_file("app.json", r#"{"port": 9000}"#);
//! let mut loader = Loader::new()
//!     .with_fs(fs)
//!     .with_env_reader(|| vec![("APP_NAME".to_string(), "demo".to_string())]);
//! loader.register_file("app.json").register_env("APP");
//!
//! let mut config = Config::default();
//! loader.load(&mut config).unwrap();
//! assert_eq!(config.name, "demo");
//! assert_eq!(config.port, 9000);
//! ```

pub mod cli;
pub mod coerce;
pub mod discover;
pub mod error;
pub mod format;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod path;
pub mod reflect;
pub mod resolve;
pub mod tags;

pub use coerce::Value;
pub use discover::{FileField, discover};
pub use error::{BoxError, ConfigError, DecodeOrigin, LoadError, Stage};
pub use loader::{
    ClapFlags, ConfigFile, ExplicitFlags, FileSystem, FlagSource, Loader, MemFs, OsFs, configure,
    load, register_env, register_file, register_file_with_format, register_flags,
};
pub use merge::Format;
pub use path::FieldPath;
pub use reflect::Reflect;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
