//! Discovery of fields that name other configuration files.

use crate::coerce::Value;
use crate::path::FieldPath;
use crate::reflect::{Reflect, ReflectRef, ScalarKind};

/// A text field marked with `file` metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// Location of the field from the root.
    pub path: FieldPath,
    /// Format override from the field's `format=` metadata.
    pub format: Option<String>,
}

/// Enumerate file-reference fields depth-first, in declaration order.
///
/// Unset optionals are skipped, nested structs are recursed into. Fields
/// flagged as file references that do not hold text are ignored.
pub fn discover(root: &dyn Reflect) -> Vec<FileField> {
    let mut found = Vec::new();
    walk(root, &FieldPath::default(), &mut found);
    found
}

fn walk(node: &dyn Reflect, prefix: &FieldPath, found: &mut Vec<FileField>) {
    match node.reflect_ref() {
        ReflectRef::Optional(optional) => {
            if let Some(inner) = optional.inner() {
                walk(inner, prefix, found);
            }
        }
        ReflectRef::Struct(record) => {
            for (index, info) in record.fields().iter().enumerate() {
                let Some(field) = record.field(index) else {
                    continue;
                };
                let path = prefix.child(info.name);

                if info.meta.file && text_value(field).is_some() {
                    found.push(FileField {
                        path,
                        format: info.meta.format.clone(),
                    });
                } else {
                    walk(field, &path, found);
                }
            }
        }
        _ => {}
    }
}

/// Current text of a string field, looking through set optionals.
pub(crate) fn text_value(node: &dyn Reflect) -> Option<String> {
    match node.reflect_ref() {
        ReflectRef::Optional(optional) => optional.inner().and_then(text_value),
        ReflectRef::Scalar(scalar) if scalar.kind() == ScalarKind::String => match scalar.load() {
            Value::String(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}
