//! `get` command: print a single configuration value.

use crate::coerce::Value;
use crate::path::FieldPath;
use crate::reflect::{Reflect, ReflectRef};
use crate::resolve;
use anyhow::{Result, bail};
use clap::Args;

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Dot-separated path of the value, e.g. `database.host`
    pub path: String,
}

/// Render the scalar at `args.path` as plain text.
pub fn run_get(config: &dyn Reflect, args: &GetArgs) -> Result<String> {
    let path = FieldPath::parse(&args.path);
    let value = resolve::get(config, &path)?;
    render_scalar(value, &path)
}

fn render_scalar(value: &dyn Reflect, path: &FieldPath) -> Result<String> {
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => Ok(match scalar.load() {
            Value::String(s) => s,
            other => other.to_string(),
        }),
        ReflectRef::Optional(optional) => match optional.inner() {
            Some(inner) => render_scalar(inner, path),
            None => Ok(String::new()),
        },
        other => bail!("'{}' is a {}, not a single value", path, other.kind_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AppConfig;

    fn get(config: &AppConfig, path: &str) -> Result<String> {
        run_get(
            config,
            &GetArgs {
                path: path.to_string(),
            },
        )
    }

    #[test]
    fn test_get_scalars() {
        let config = AppConfig::default();
        assert_eq!(get(&config, "name").unwrap(), "default");
        assert_eq!(get(&config, "PORT").unwrap(), "8080");
        assert_eq!(get(&config, "database.ssl").unwrap(), "false");
    }

    #[test]
    fn test_get_rejects_containers() {
        let config = AppConfig::default();
        let err = get(&config, "database").unwrap_err();
        assert_eq!(err.to_string(), "'database' is a struct, not a single value");
        assert!(get(&config, "missing").is_err());
    }
}
