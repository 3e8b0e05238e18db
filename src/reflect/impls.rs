//! [`Reflect`] implementations for std types.

use super::{Mapping, Optional, Reflect, ReflectMut, ReflectRef, Scalar, ScalarKind, Sequence};
use crate::coerce::Value;
use crate::error::{ConfigError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

macro_rules! signed_scalars {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }

            crate::__reflect_any!();

            fn zeroed() -> Self {
                0
            }
        }

        impl Scalar for $ty {
            fn kind(&self) -> ScalarKind {
                ScalarKind::Int
            }

            fn load(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn store(&mut self, value: Value) -> Result<()> {
                let converted = match &value {
                    Value::Int(v) => <$ty>::try_from(*v).ok(),
                    Value::Uint(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                };
                *self = converted.ok_or_else(|| ConfigError::coercion(stringify!($ty), &value))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

macro_rules! unsigned_scalars {
    ($($ty:ty),*) => {$(
        impl Reflect for $ty {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }

            crate::__reflect_any!();

            fn zeroed() -> Self {
                0
            }
        }

        impl Scalar for $ty {
            fn kind(&self) -> ScalarKind {
                ScalarKind::Uint
            }

            fn load(&self) -> Value {
                Value::Uint(*self as u64)
            }

            fn store(&mut self, value: Value) -> Result<()> {
                let converted = match &value {
                    Value::Uint(v) => <$ty>::try_from(*v).ok(),
                    Value::Int(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                };
                *self = converted.ok_or_else(|| ConfigError::coercion(stringify!($ty), &value))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

signed_scalars!(i8, i16, i32, i64, isize);
unsigned_scalars!(u8, u16, u32, u64, usize);

impl Reflect for f64 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        0.0
    }
}

impl Scalar for f64 {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Float
    }

    fn load(&self) -> Value {
        Value::Float(*self)
    }

    fn store(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Float(v) => {
                *self = v;
                Ok(())
            }
            other => Err(ConfigError::coercion("f64", &other)),
        }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl Reflect for f32 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        0.0
    }
}

impl Scalar for f32 {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Float
    }

    fn load(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn store(&mut self, value: Value) -> Result<()> {
        match value {
            // Finite values that overflow f32 would silently become infinite.
            Value::Float(v) if v.is_finite() && !(v as f32).is_finite() => {
                Err(ConfigError::coercion("f32", &Value::Float(v)))
            }
            Value::Float(v) => {
                *self = v as f32;
                Ok(())
            }
            other => Err(ConfigError::coercion("f32", &other)),
        }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl Reflect for bool {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        false
    }
}

impl Scalar for bool {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Bool
    }

    fn load(&self) -> Value {
        Value::Bool(*self)
    }

    fn store(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Bool(v) => {
                *self = v;
                Ok(())
            }
            other => Err(ConfigError::coercion("bool", &other)),
        }
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Reflect for String {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        String::new()
    }
}

impl Scalar for String {
    fn kind(&self) -> ScalarKind {
        ScalarKind::String
    }

    fn load(&self) -> Value {
        Value::String(self.clone())
    }

    fn store(&mut self, value: Value) -> Result<()> {
        match value {
            Value::String(v) => {
                *self = v;
                Ok(())
            }
            other => Err(ConfigError::coercion("String", &other)),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Reflect for PathBuf {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        PathBuf::new()
    }
}

impl Scalar for PathBuf {
    fn kind(&self) -> ScalarKind {
        ScalarKind::String
    }

    fn load(&self) -> Value {
        Value::String(self.to_string_lossy().into_owned())
    }

    fn store(&mut self, value: Value) -> Result<()> {
        match value {
            Value::String(v) => {
                *self = PathBuf::from(v);
                Ok(())
            }
            other => Err(ConfigError::coercion("PathBuf", &other)),
        }
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        None
    }
}

impl<T: Reflect> Optional for Option<T> {
    fn inner(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn inner_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn get_or_insert_zero(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::zeroed)
    }
}

// Boxes are transparent: they can never be unset.
impl<T: Reflect> Reflect for Box<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        Box::new(T::zeroed())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        Vec::new()
    }
}

impl<T: Reflect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn is_fixed(&self) -> bool {
        false
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        self.push(T::zeroed());
        self.last_mut().map(|v| v as &mut dyn Reflect)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Sequence(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        std::array::from_fn(|_| T::zeroed())
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }

    fn is_fixed(&self) -> bool {
        true
    }

    fn clear(&mut self) {
        for item in self.iter_mut() {
            *item = T::zeroed();
        }
    }

    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        None
    }
}

impl<T: Reflect> Reflect for HashMap<String, T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        HashMap::new()
    }
}

impl<T: Reflect> Mapping for HashMap<String, T> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }

    fn get(&self, key: &str) -> Option<&dyn Reflect> {
        HashMap::get(self, key).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        HashMap::get_mut(self, key).map(|v| v as &mut dyn Reflect)
    }

    fn entry_zero(&mut self, key: &str) -> &mut dyn Reflect {
        self.entry(key.to_string()).or_insert_with(T::zeroed)
    }
}

impl<T: Reflect> Reflect for BTreeMap<String, T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    crate::__reflect_any!();

    fn zeroed() -> Self {
        BTreeMap::new()
    }
}

impl<T: Reflect> Mapping for BTreeMap<String, T> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn get(&self, key: &str) -> Option<&dyn Reflect> {
        BTreeMap::get(self, key).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut dyn Reflect> {
        BTreeMap::get_mut(self, key).map(|v| v as &mut dyn Reflect)
    }

    fn entry_zero(&mut self, key: &str) -> &mut dyn Reflect {
        self.entry(key.to_string()).or_insert_with(T::zeroed)
    }
}
