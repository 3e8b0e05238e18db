//! Command-line flag sources.
//!
//! Only flags the user supplied explicitly take part in a load; defaults of
//! the flag parser never override values from files.

use clap::parser::ValueSource;
use clap::{ArgMatches, Command};

/// A set of parsed flags.
pub trait FlagSource: Send + Sync {
    /// Explicitly supplied flags as `(long name, raw value)`, in order.
    fn explicit_flags(&self) -> Vec<(String, String)>;
}

/// Flags given as literal name/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitFlags {
    flags: Vec<(String, String)>,
}

impl ExplicitFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag, builder-style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.flags.push((name.into(), value.into()));
        self
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ExplicitFlags {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            flags: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl FlagSource for ExplicitFlags {
    fn explicit_flags(&self) -> Vec<(String, String)> {
        self.flags.clone()
    }
}

/// Flags parsed by `clap`.
///
/// Each argument is reported under its long name. Arguments without a long
/// name and values that came from defaults or the environment are left out.
#[derive(Debug, Clone, Default)]
pub struct ClapFlags {
    flags: Vec<(String, String)>,
}

impl ClapFlags {
    /// Collect the explicit flags of `matches`, produced by `command`.
    pub fn new(command: &Command, matches: &ArgMatches) -> Self {
        let mut flags = Vec::new();

        for arg in command.get_arguments() {
            let Some(long) = arg.get_long() else {
                continue;
            };
            let id = arg.get_id().as_str();
            if matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }

            // Switches without a value report as set.
            let value = matches
                .try_get_raw(id)
                .ok()
                .flatten()
                .and_then(|raw| raw.last())
                .map(|raw| raw.to_string_lossy().into_owned())
                .unwrap_or_else(|| "true".to_string());

            flags.push((long.to_string(), value));
        }

        Self { flags }
    }
}

impl FlagSource for ClapFlags {
    fn explicit_flags(&self) -> Vec<(String, String)> {
        self.flags.clone()
    }
}
