//! Declarative macros that build accessor tables.

/// Implement [`Reflect`](crate::reflect::Reflect) and
/// [`Struct`](crate::reflect::Struct) for a struct.
///
/// Every field must be listed, in declaration order. Annotations follow the
/// field name in parentheses: `json`/`yaml` declare aliases, `layerconf`
/// carries loader metadata.
///
/// ```
/// use layerconf::configurable;
///
/// #[derive(Debug, Default)]
/// struct Server {
///     host: String,
///     port: u16,
///     tls_config: String,
/// }
///
/// configurable!(Server {
///     host,
///     port(json = "port"),
///     tls_config(json = "tls", layerconf = "file,format=yaml"),
/// });
/// ```
#[macro_export]
macro_rules! configurable {
    ($ty:ty { $( $field:ident $( ( $( $key:ident = $val:literal ),* $(,)? ) )? ),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                $crate::reflect::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                $crate::reflect::ReflectMut::Struct(self)
            }

            $crate::__reflect_any!();

            fn zeroed() -> Self {
                Self {
                    $( $field: $crate::reflect::Reflect::zeroed(), )*
                }
            }
        }

        impl $crate::reflect::Struct for $ty {
            fn fields(&self) -> &'static [$crate::reflect::FieldInfo] {
                static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<$crate::reflect::FieldInfo>> =
                    ::std::sync::OnceLock::new();
                FIELDS.get_or_init(|| {
                    ::std::vec![
                        $(
                            $crate::reflect::FieldInfo::new(
                                ::std::stringify!($field),
                                &[ $( $( (::std::stringify!($key), $val) ),* )? ],
                            ),
                        )*
                    ]
                })
            }

            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::reflect::Reflect> {
                #[allow(non_camel_case_types, dead_code)]
                enum Index { $( $field, )* }
                $(
                    if index == Index::$field as usize {
                        return ::std::option::Option::Some(
                            &self.$field as &dyn $crate::reflect::Reflect,
                        );
                    }
                )*
                ::std::option::Option::None
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn $crate::reflect::Reflect> {
                #[allow(non_camel_case_types, dead_code)]
                enum Index { $( $field, )* }
                $(
                    if index == Index::$field as usize {
                        return ::std::option::Option::Some(
                            &mut self.$field as &mut dyn $crate::reflect::Reflect,
                        );
                    }
                )*
                ::std::option::Option::None
            }
        }
    };
}

/// Implement [`Reflect`](crate::reflect::Reflect) for types that decode
/// themselves from a document through serde.
///
/// The type must be `DeserializeOwned + Default + PartialEq`; its `Default`
/// is the zero value used by sparse merging.
///
/// ```
/// use layerconf::self_decoding;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, PartialEq, Deserialize)]
/// #[serde(rename_all = "lowercase")]
/// enum Level {
///     #[default]
///     Info,
///     Debug,
/// }
///
/// self_decoding!(Level);
/// ```
#[macro_export]
macro_rules! self_decoding {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::reflect::Reflect for $ty {
            fn reflect_ref(&self) -> $crate::reflect::ReflectRef<'_> {
                $crate::reflect::ReflectRef::Decode(self)
            }

            fn reflect_mut(&mut self) -> $crate::reflect::ReflectMut<'_> {
                $crate::reflect::ReflectMut::Decode(self)
            }

            $crate::__reflect_any!();

            fn zeroed() -> Self {
                <$ty as ::std::default::Default>::default()
            }
        }

        impl $crate::reflect::SelfDecode for $ty {
            fn decode(
                &mut self,
                document: $crate::__private::serde_json::Value,
            ) -> ::std::result::Result<(), $crate::BoxError> {
                *self = $crate::__private::serde_json::from_value(document)?;
                ::std::result::Result::Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::std::default::Default>::default()
            }
        }
    )+};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn swap_from(&mut self, other: &mut dyn $crate::reflect::Reflect) -> bool {
            match other.as_any_mut().downcast_mut::<Self>() {
                ::std::option::Option::Some(other) => {
                    ::std::mem::swap(self, other);
                    true
                }
                ::std::option::Option::None => false,
            }
        }
    };
}
