use core::any::{Any, TypeId};

use crate::info::{TypeInfo, Typed};
use crate::value::{IntoValue, Value};

// -----------------------------------------------------------------------------
// NamedField

/// A readable field of a complex type.
///
/// Fields describe what a serialiser writes, in declaration order.
#[derive(Clone, Debug)]
pub struct NamedField {
    type_id: TypeId,
    name: &'static str,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    type_info: fn() -> &'static TypeInfo,
}

impl NamedField {
    #[inline]
    pub fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            type_info: T::type_info,
            type_id: TypeId::of::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }
}

// -----------------------------------------------------------------------------
// UnnamedField

/// A positional element of a tuple.
#[derive(Clone, Debug)]
pub struct UnnamedField {
    type_id: TypeId,
    index: usize,
    type_info: fn() -> &'static TypeInfo,
}

impl UnnamedField {
    #[inline]
    pub fn new<T: Typed>(index: usize) -> Self {
        Self {
            index,
            type_info: T::type_info,
            type_id: TypeId::of::<T>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }
}

// -----------------------------------------------------------------------------
// ParamInfo

/// A constructor parameter of a complex type.
///
/// Parameters describe what a deserialiser reads. A parameter with a default
/// may be absent from the input.
///
/// ```
/// use pact_reflect::info::ParamInfo;
/// use pact_reflect::value::Value;
///
/// let param = ParamInfo::new::<String>("label").with_default(|| Value::Str("x".into()));
/// assert!(param.has_default());
/// assert_eq!(param.default_value(), Some(Value::Str("x".into())));
/// ```
#[derive(Clone, Debug)]
pub struct ParamInfo {
    type_id: TypeId,
    name: &'static str,
    type_info: fn() -> &'static TypeInfo,
    default: Option<fn() -> Value>,
}

impl ParamInfo {
    #[inline]
    pub fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            type_info: T::type_info,
            type_id: TypeId::of::<T>(),
            default: None,
        }
    }

    /// Creates a parameter whose default is `T::default()`.
    #[inline]
    pub fn defaulted<T: Typed + Default + IntoValue>(name: &'static str) -> Self {
        Self::new::<T>(name).with_default(|| T::default().to_value())
    }

    /// Attaches a default value producer.
    #[inline]
    pub fn with_default(mut self, default: fn() -> Value) -> Self {
        self.default = Some(default);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    #[inline]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Produces the default value, if the parameter has one.
    #[inline]
    pub fn default_value(&self) -> Option<Value> {
        self.default.map(|default| default())
    }
}

impl From<&NamedField> for ParamInfo {
    #[inline]
    fn from(field: &NamedField) -> Self {
        Self {
            type_id: field.type_id,
            name: field.name,
            type_info: field.type_info,
            default: None,
        }
    }
}
