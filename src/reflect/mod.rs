//! Shape introspection for configuration objects.
//!
//! Every type that can take part in a load implements [`Reflect`], which
//! exposes the value as one of a small set of shapes:
//! - **Struct** - named fields with aliases and loader metadata
//! - **Sequence** - `Vec<T>` (growable) and `[T; N]` (fixed)
//! - **Map** - string-keyed `HashMap` and `BTreeMap`
//! - **Optional** - `Option<T>`, the only indirection that can be unset
//! - **Scalar** - strings, paths, booleans, integers and floats
//! - **Decode** - types that decode themselves from a JSON document
//!
//! Structs opt in through [`crate::configurable!`], self-decoding types through
//! [`crate::self_decoding!`]. The accessor table of a struct is built once per
//! type and shared by every traversal.

mod impls;
mod macros;

use crate::coerce::Value;
use crate::error::{BoxError, Result};
use crate::tags::{ALIAS_KEYS, FieldMeta, MARKER, alias_from_tag};
use std::any::Any;
use std::fmt;

/// A value whose shape can be inspected and mutated at runtime.
pub trait Reflect: Any {
    /// Borrow the value as its shape.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Mutably borrow the value as its shape.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Swap contents with `other` when both have the same concrete type.
    fn swap_from(&mut self, other: &mut dyn Reflect) -> bool;

    /// The zero value: empty strings and containers, `0`, `false`, `None`,
    /// and structs whose fields are all zero.
    fn zeroed() -> Self
    where
        Self: Sized;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<'a> dyn Reflect + 'a {
    /// Downcast to a concrete type.
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete type.
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Reflect + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reflect").field(&self.type_name()).finish()
    }
}

/// Shared view of a reflected value.
pub enum ReflectRef<'a> {
    Struct(&'a dyn Struct),
    Sequence(&'a dyn Sequence),
    Map(&'a dyn Mapping),
    Optional(&'a dyn Optional),
    Scalar(&'a dyn Scalar),
    Decode(&'a dyn SelfDecode),
}

impl ReflectRef<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ReflectRef::Struct(_) => "struct",
            ReflectRef::Sequence(_) => "sequence",
            ReflectRef::Map(_) => "map",
            ReflectRef::Optional(_) => "optional",
            ReflectRef::Scalar(_) => "scalar",
            ReflectRef::Decode(_) => "self-decoding value",
        }
    }
}

/// Mutable view of a reflected value.
pub enum ReflectMut<'a> {
    Struct(&'a mut dyn Struct),
    Sequence(&'a mut dyn Sequence),
    Map(&'a mut dyn Mapping),
    Optional(&'a mut dyn Optional),
    Scalar(&'a mut dyn Scalar),
    Decode(&'a mut dyn SelfDecode),
}

impl ReflectMut<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ReflectMut::Struct(_) => "struct",
            ReflectMut::Sequence(_) => "sequence",
            ReflectMut::Map(_) => "map",
            ReflectMut::Optional(_) => "optional",
            ReflectMut::Scalar(_) => "scalar",
            ReflectMut::Decode(_) => "self-decoding value",
        }
    }
}

/// A record with named fields in declaration order.
pub trait Struct {
    /// Accessor table, indexed like [`Struct::field`].
    fn fields(&self) -> &'static [FieldInfo];

    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// An ordered sequence.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Fixed-length arrays cannot grow or shrink.
    fn is_fixed(&self) -> bool;

    /// Remove all elements, or zero them for fixed arrays.
    fn clear(&mut self);

    /// Append a zero element; `None` for fixed arrays.
    fn push_zero(&mut self) -> Option<&mut dyn Reflect>;
}

/// A string-keyed map.
pub trait Mapping {
    fn len(&self) -> usize;

    fn keys(&self) -> Vec<String>;

    fn get(&self, key: &str) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, key: &str) -> Option<&mut dyn Reflect>;

    /// Get the entry for `key`, inserting a zero value when absent.
    fn entry_zero(&mut self, key: &str) -> &mut dyn Reflect;
}

/// An indirection that may be unset.
pub trait Optional {
    fn inner(&self) -> Option<&dyn Reflect>;

    fn inner_mut(&mut self) -> Option<&mut dyn Reflect>;

    fn get_or_insert_zero(&mut self) -> &mut dyn Reflect;
}

/// Kind of a scalar destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Uint,
    Float,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int => write!(f, "signed integer"),
            ScalarKind::Uint => write!(f, "unsigned integer"),
            ScalarKind::Float => write!(f, "float"),
        }
    }
}

/// A leaf value.
pub trait Scalar {
    fn kind(&self) -> ScalarKind;

    /// Current value as a [`Value`] of the matching variant.
    fn load(&self) -> Value;

    /// Store a value already coerced to this scalar's kind; range-checked.
    fn store(&mut self, value: Value) -> Result<()>;

    fn is_zero(&self) -> bool;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A type that decodes itself from a generic document.
pub trait SelfDecode {
    fn decode(&mut self, document: serde_json::Value) -> std::result::Result<(), BoxError>;

    fn is_zero(&self) -> bool;
}

/// Accessor table entry of a struct field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Declared field name.
    pub name: &'static str,
    /// Serialization aliases, in annotation order.
    pub aliases: Vec<&'static str>,
    /// Parsed loader metadata.
    pub meta: FieldMeta,
}

impl FieldInfo {
    /// Build an entry from the field name and its annotations.
    pub fn new(name: &'static str, tags: &[(&'static str, &'static str)]) -> Self {
        let name = name.strip_prefix("r#").unwrap_or(name);

        let aliases = tags
            .iter()
            .filter(|(key, _)| ALIAS_KEYS.contains(key))
            .filter_map(|(_, raw)| alias_from_tag(raw))
            .collect();

        let meta = tags
            .iter()
            .filter(|(key, _)| *key == MARKER)
            .last()
            .map(|(_, raw)| FieldMeta::parse(raw))
            .unwrap_or_default();

        Self {
            name,
            aliases,
            meta,
        }
    }

    /// Whether `segment` names this field or one of its aliases, case-insensitively.
    pub fn matches(&self, segment: &str) -> bool {
        eq_fold(self.name, segment) || self.aliases.iter().any(|alias| eq_fold(alias, segment))
    }
}

/// Find a field by segment. Fields are tried in declaration order and the
/// first whose name or alias matches wins.
pub fn find_field(fields: &[FieldInfo], segment: &str) -> Option<usize> {
    fields.iter().position(|f| f.matches(segment))
}

/// Case-insensitive comparison without allocating.
pub(crate) fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
