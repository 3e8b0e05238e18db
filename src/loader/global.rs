//! Process-wide default loader.
//!
//! Convenience functions for programs that need a single loader. The loader
//! is guarded by a mutex; a panic while it was held does not disable it.

use super::{FlagSource, Loader};
use crate::error::LoadError;
use crate::merge::Format;
use crate::reflect::Reflect;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

static DEFAULT_LOADER: LazyLock<Mutex<Loader>> = LazyLock::new(|| Mutex::new(Loader::new()));

fn default_loader() -> MutexGuard<'static, Loader> {
    DEFAULT_LOADER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the default loader. Sources registered so far are discarded.
pub fn configure(loader: Loader) {
    *default_loader() = loader;
}

/// Register an environment prefix on the default loader.
pub fn register_env(prefix: impl Into<String>) {
    default_loader().register_env(prefix);
}

/// Register a file on the default loader, detecting its format.
pub fn register_file(path: impl Into<PathBuf>) {
    default_loader().register_file(path);
}

/// Register a file in an explicit format on the default loader.
pub fn register_file_with_format(path: impl Into<PathBuf>, format: Format) {
    default_loader().register_file_with_format(path, format);
}

/// Register parsed flags on the default loader.
pub fn register_flags(flags: impl FlagSource + 'static) {
    default_loader().register_flags(flags);
}

/// Populate `target` from the default loader's sources.
pub fn load<T: Reflect>(target: &mut T) -> Result<(), LoadError> {
    default_loader().load(target)
}
