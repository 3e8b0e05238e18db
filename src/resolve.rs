//! Field location by dot-path.
//!
//! Each segment is resolved against the current value:
//! - unset optionals stop the walk with [`ConfigError::PathUnreachable`]
//! - structs match declared names, then aliases, case-insensitively
//! - sequences take a non-negative index
//! - maps take the segment as an exact key
//!
//! Mutable lookups insert a zero entry for missing map keys.

use crate::coerce::{Value, assign};
use crate::error::{ConfigError, Result};
use crate::path::FieldPath;
use crate::reflect::{Reflect, ReflectMut, ReflectRef, find_field};

/// Locate the value at `path`.
pub fn get<'a>(root: &'a dyn Reflect, path: &FieldPath) -> Result<&'a dyn Reflect> {
    let mut node = root;
    for segment in path.segments() {
        node = step(node, segment)?;
    }
    Ok(node)
}

/// Mutably locate the value at `path`.
pub fn get_mut<'a>(root: &'a mut dyn Reflect, path: &FieldPath) -> Result<&'a mut dyn Reflect> {
    let mut node = root;
    for segment in path.segments() {
        node = step_mut(node, segment)?;
    }
    Ok(node)
}

/// Assign `value` to the field at `path`, converting it to the field's kind.
pub fn set(root: &mut dyn Reflect, path: &FieldPath, value: Value) -> Result<()> {
    let location = get_mut(root, path)?;
    assign(location, value)
}

fn step<'a>(node: &'a dyn Reflect, segment: &str) -> Result<&'a dyn Reflect> {
    match node.reflect_ref() {
        ReflectRef::Optional(optional) => match optional.inner() {
            Some(inner) => step(inner, segment),
            None => Err(unreachable(segment)),
        },
        ReflectRef::Struct(record) => {
            let index = find_field(record.fields(), segment).ok_or_else(|| not_found(segment))?;
            record.field(index).ok_or_else(|| not_found(segment))
        }
        ReflectRef::Sequence(sequence) => {
            let index = parse_index(segment)?;
            sequence.get(index).ok_or(ConfigError::IndexOutOfRange {
                index,
                len: sequence.len(),
            })
        }
        ReflectRef::Map(map) => map.get(segment).ok_or_else(|| not_found(segment)),
        other => Err(ConfigError::UnsupportedContainer {
            segment: segment.to_string(),
            kind: other.kind_name(),
        }),
    }
}

fn step_mut<'a>(node: &'a mut dyn Reflect, segment: &str) -> Result<&'a mut dyn Reflect> {
    match node.reflect_mut() {
        ReflectMut::Optional(optional) => match optional.inner_mut() {
            Some(inner) => step_mut(inner, segment),
            None => Err(unreachable(segment)),
        },
        ReflectMut::Struct(record) => {
            let index = find_field(record.fields(), segment).ok_or_else(|| not_found(segment))?;
            record.field_mut(index).ok_or_else(|| not_found(segment))
        }
        ReflectMut::Sequence(sequence) => {
            let index = parse_index(segment)?;
            let len = sequence.len();
            sequence
                .get_mut(index)
                .ok_or(ConfigError::IndexOutOfRange { index, len })
        }
        ReflectMut::Map(map) => Ok(map.entry_zero(segment)),
        other => Err(ConfigError::UnsupportedContainer {
            segment: segment.to_string(),
            kind: other.kind_name(),
        }),
    }
}

fn parse_index(segment: &str) -> Result<usize> {
    segment.parse().map_err(|_| ConfigError::InvalidIndex {
        segment: segment.to_string(),
    })
}

fn not_found(segment: &str) -> ConfigError {
    ConfigError::FieldNotFound {
        segment: segment.to_string(),
    }
}

fn unreachable(segment: &str) -> ConfigError {
    ConfigError::PathUnreachable {
        segment: segment.to_string(),
    }
}
