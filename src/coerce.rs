//! Loosely-typed source values and their conversion into field kinds.
//!
//! Flags and environment variables always deliver text, decoded documents
//! deliver JSON scalars. [`assign`] converts either into the kind of the
//! destination field, range-checked for integers.

use crate::error::{ConfigError, DecodeOrigin, Result};
use crate::reflect::{Reflect, ReflectMut, Scalar, ScalarKind};
use std::fmt;

/// A source value before it is converted to a destination kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Nested document; only self-decoding fields accept arrays and objects.
    Document(serde_json::Value),
}

impl Value {
    /// Convert a decoded document node, unwrapping JSON scalars.
    pub fn from_document(doc: &serde_json::Value) -> Self {
        match doc {
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => Value::Document(other.clone()),
        }
    }

    /// Canonical JSON representation handed to self-decoding fields.
    pub fn into_document(self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Uint(u) => serde_json::Value::from(u),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Document(doc) => doc,
        }
    }

    fn normalize(self) -> Self {
        match self {
            Value::Document(doc) => Value::from_document(&doc),
            other => other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<serde_json::Value> for Value {
    fn from(doc: serde_json::Value) -> Self {
        Value::Document(doc)
    }
}

/// Write `value` into `location`, converting it to the location's kind.
///
/// Self-decoding locations receive the value as a JSON document. An unset
/// optional at the leaf is not settable.
pub fn assign(location: &mut dyn Reflect, value: Value) -> Result<()> {
    let type_name = location.type_name();

    match location.reflect_mut() {
        ReflectMut::Decode(target) => target
            .decode(value.into_document())
            .map_err(|source| ConfigError::decode(DecodeOrigin::Value, source)),
        ReflectMut::Scalar(scalar) => store_scalar(scalar, value),
        ReflectMut::Optional(optional) => match optional.inner_mut() {
            Some(inner) => assign(inner, value),
            None => Err(ConfigError::NotSettable { type_name }),
        },
        ReflectMut::Struct(_) | ReflectMut::Sequence(_) | ReflectMut::Map(_) => {
            Err(ConfigError::coercion(type_name, &value))
        }
    }
}

/// Coerce `value` to the scalar's kind and store it.
pub(crate) fn store_scalar(scalar: &mut dyn Scalar, value: Value) -> Result<()> {
    let coerced = coerce(scalar.kind(), value, short_type_name(scalar.type_name()))?;
    scalar.store(coerced)
}

/// Convert `value` into the variant `kind` stores.
pub fn coerce(kind: ScalarKind, value: Value, expected: &'static str) -> Result<Value> {
    let value = value.normalize();

    let coerced = match (kind, &value) {
        (ScalarKind::String, Value::String(s)) => Some(Value::String(s.clone())),
        (ScalarKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (ScalarKind::String, Value::Int(i)) => Some(Value::String(i.to_string())),
        (ScalarKind::String, Value::Uint(u)) => Some(Value::String(u.to_string())),
        (ScalarKind::String, Value::Float(x)) => Some(Value::String(x.to_string())),

        (ScalarKind::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
        (ScalarKind::Bool, Value::String(s)) => parse_bool(s).map(Value::Bool),
        (ScalarKind::Bool, Value::Int(_) | Value::Uint(_) | Value::Float(_)) => None,

        (ScalarKind::Int | ScalarKind::Uint, Value::Int(i)) => Some(Value::Int(*i)),
        (ScalarKind::Int | ScalarKind::Uint, Value::Uint(u)) => Some(Value::Uint(*u)),
        (ScalarKind::Int | ScalarKind::Uint, Value::Float(x)) => integral_float(*x),
        (ScalarKind::Int | ScalarKind::Uint, Value::String(s)) => parse_integer(s),
        (ScalarKind::Int | ScalarKind::Uint, Value::Bool(_)) => None,

        (ScalarKind::Float, Value::Float(x)) => Some(Value::Float(*x)),
        (ScalarKind::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
        (ScalarKind::Float, Value::Uint(u)) => Some(Value::Float(*u as f64)),
        (ScalarKind::Float, Value::String(s)) => s.trim().parse::<f64>().ok().map(Value::Float),
        (ScalarKind::Float, Value::Bool(_)) => None,

        (_, Value::Document(_)) => None,
    };

    coerced.ok_or_else(|| ConfigError::coercion(expected, &value))
}

/// Textual booleans: `1`, `t`, `true` and `0`, `f`, `false` in common cases.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_integer(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::Int(i));
    }
    s.parse::<u64>().ok().map(Value::Uint)
}

/// Floats convert to integers only when they have no fractional part.
fn integral_float(x: f64) -> Option<Value> {
    if !x.is_finite() || x.fract() != 0.0 {
        return None;
    }
    if x >= 0.0 && x <= u64::MAX as f64 {
        Some(Value::Uint(x as u64))
    } else if x < 0.0 && x >= i64::MIN as f64 {
        Some(Value::Int(x as i64))
    } else {
        None
    }
}

pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    if name.contains('<') {
        return name;
    }
    name.rsplit("::").next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::path::PathBuf;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Prefixed(String);

    impl crate::reflect::Reflect for Wrapped {
        fn reflect_ref(&self) -> crate::reflect::ReflectRef<'_> {
            crate::reflect::ReflectRef::Decode(self)
        }

        fn reflect_mut(&mut self) -> ReflectMut<'_> {
            ReflectMut::Decode(self)
        }

        crate::__reflect_any!();

        fn zeroed() -> Self {
            Wrapped::default()
        }
    }

    /// Decodes a string and records it with a marker, like a hand-written decoder.
    #[derive(Debug, Default, PartialEq)]
    struct Wrapped {
        value: String,
    }

    impl crate::reflect::SelfDecode for Wrapped {
        fn decode(&mut self, document: serde_json::Value) -> Result<(), crate::BoxError> {
            let s: String = serde_json::from_value(document)?;
            self.value = format!("decoded:{}", s);
            Ok(())
        }

        fn is_zero(&self) -> bool {
            self.value.is_empty()
        }
    }

    crate::self_decoding!(Prefixed);

    #[test]
    fn test_assign_string() {
        let mut name = String::new();
        assign(&mut name, Value::from("test")).unwrap();
        assert_eq!(name, "test");

        assign(&mut name, Value::Int(42)).unwrap();
        assert_eq!(name, "42");

        assign(&mut name, Value::Bool(true)).unwrap();
        assert_eq!(name, "true");
    }

    #[test]
    fn test_assign_path_from_string() {
        let mut path = PathBuf::new();
        assign(&mut path, Value::from("/etc/app.yaml")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/app.yaml"));
    }

    #[test]
    fn test_assign_bool() {
        let mut flag = false;
        assign(&mut flag, Value::Bool(true)).unwrap();
        assert!(flag);

        assign(&mut flag, Value::from("false")).unwrap();
        assert!(!flag);

        assign(&mut flag, Value::from("T")).unwrap();
        assert!(flag);

        let err = assign(&mut flag, Value::from("invalid")).unwrap_err();
        assert!(matches!(err, ConfigError::TypeCoercion { expected: "bool", .. }));
    }

    #[test]
    fn test_assign_integers() {
        let mut count: i32 = 0;
        assign(&mut count, Value::Int(42)).unwrap();
        assert_eq!(count, 42);

        assign(&mut count, Value::from(" -7 ")).unwrap();
        assert_eq!(count, -7);

        assign(&mut count, Value::Float(3.0)).unwrap();
        assert_eq!(count, 3);

        assert!(assign(&mut count, Value::Float(3.5)).is_err());
        assert!(assign(&mut count, Value::from("not a number")).is_err());
        assert!(assign(&mut count, Value::Bool(true)).is_err());

        let mut port: u16 = 0;
        assign(&mut port, Value::from("8080")).unwrap();
        assert_eq!(port, 8080);

        let err = assign(&mut port, Value::from("-1")).unwrap_err();
        assert_eq!(err.to_string(), "cannot convert -1 into u16");

        let mut big: u64 = 0;
        assign(&mut big, Value::from("18446744073709551615")).unwrap();
        assert_eq!(big, u64::MAX);
    }

    #[test]
    fn test_assign_float() {
        let mut ratio: f64 = 0.0;
        assign(&mut ratio, Value::Float(1.25)).unwrap();
        assert_eq!(ratio, 1.25);

        assign(&mut ratio, Value::from("2.5")).unwrap();
        assert_eq!(ratio, 2.5);

        assign(&mut ratio, Value::Uint(4)).unwrap();
        assert_eq!(ratio, 4.0);

        assert!(assign(&mut ratio, Value::from("not a number")).is_err());
    }

    #[test]
    fn test_document_scalars_are_unwrapped() {
        let mut port: u16 = 0;
        assign(&mut port, Value::Document(serde_json::json!(9000))).unwrap();
        assert_eq!(port, 9000);

        let err = assign(&mut port, Value::Document(serde_json::json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ConfigError::TypeCoercion { .. }));
    }

    #[test]
    fn test_self_decoding_receives_document() {
        let mut wrapped = Wrapped::default();
        assign(&mut wrapped, Value::from("test")).unwrap();
        assert_eq!(wrapped.value, "decoded:test");

        let err = assign(&mut wrapped, Value::Int(5)).unwrap_err();
        assert!(err.is_decode());

        let mut prefixed = Prefixed::default();
        assign(&mut prefixed, Value::from("x")).unwrap();
        assert_eq!(prefixed, Prefixed("x".to_string()));
    }

    #[test]
    fn test_optional_leaf() {
        let mut timeout: Option<u32> = None;
        let err = assign(&mut timeout, Value::from("5")).unwrap_err();
        assert!(matches!(err, ConfigError::NotSettable { .. }));

        timeout = Some(1);
        assign(&mut timeout, Value::from("5")).unwrap();
        assert_eq!(timeout, Some(5));
    }

    #[test]
    fn test_containers_reject_scalars() {
        let mut items: Vec<u32> = Vec::new();
        let err = assign(&mut items, Value::from("1,2")).unwrap_err();
        assert!(matches!(err, ConfigError::TypeCoercion { .. }));
    }

    #[test]
    fn test_value_document_round() {
        assert_eq!(Value::from_document(&serde_json::json!(-3)), Value::Int(-3));
        assert_eq!(
            Value::from_document(&serde_json::json!(u64::MAX)),
            Value::Uint(u64::MAX)
        );
        assert_eq!(Value::from_document(&serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::Float(f64::NAN).into_document(), serde_json::Value::Null);
    }
}
