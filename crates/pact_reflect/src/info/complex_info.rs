use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::info::{NamedField, ParamInfo, Type, TypePath, impl_type_fn};

// -----------------------------------------------------------------------------
// ConstructorInfo

/// A public constructor of a complex type: an ordered parameter list.
#[derive(Clone, Debug)]
pub struct ConstructorInfo {
    params: Box<[ParamInfo]>,
}

impl ConstructorInfo {
    #[inline]
    pub fn new(params: &[ParamInfo]) -> Self {
        Self {
            params: params.into(),
        }
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Finds a parameter by name, ignoring ASCII case.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|param| param.name().eq_ignore_ascii_case(name))
    }
}

// -----------------------------------------------------------------------------
// ComplexInfo

/// Type information for a record-like type.
///
/// A complex type is written from its readable [`fields`](Self::fields), and
/// read back through its public [`constructors`](Self::constructors). Decoding
/// requires exactly one constructor.
///
/// # Examples
///
/// ```
/// use pact_reflect::cell::NonGenericTypeInfoCell;
/// use pact_reflect::impl_type_path;
/// use pact_reflect::info::{ComplexInfo, NamedField, TypeInfo, Typed};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// impl_type_path!(Point);
///
/// impl Typed for Point {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
///                 NamedField::new::<i32>("x"),
///                 NamedField::new::<i32>("y"),
///             ]))
///         })
///     }
/// }
///
/// let info = Point::type_info().as_complex().unwrap();
/// assert_eq!(info.constructors().len(), 1);
/// assert_eq!(info.constructors()[0].params()[1].name(), "y");
/// ```
#[derive(Clone, Debug)]
pub struct ComplexInfo {
    ty: Type,
    constructors: Box<[ConstructorInfo]>,
    fields: Box<[NamedField]>,
}

impl ComplexInfo {
    impl_type_fn!(ty);

    /// Creates a new [`ComplexInfo`] with explicit constructors.
    #[inline]
    pub fn new<T: TypePath>(constructors: &[ConstructorInfo], fields: &[NamedField]) -> Self {
        Self {
            ty: Type::of::<T>(),
            constructors: constructors.into(),
            fields: fields.into(),
        }
    }

    /// Creates a [`ComplexInfo`] whose single constructor takes every field,
    /// in order and without defaults.
    pub fn with_fields<T: TypePath>(fields: &[NamedField]) -> Self {
        let params: Vec<ParamInfo> = fields.iter().map(ParamInfo::from).collect();
        Self::new::<T>(&[ConstructorInfo::new(&params)], fields)
    }

    #[inline]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// Returns the constructor if there is exactly one.
    #[inline]
    pub fn single_constructor(&self) -> Option<&ConstructorInfo> {
        match &*self.constructors {
            [ctor] => Some(ctor),
            _ => None,
        }
    }

    /// Returns the readable fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[NamedField] {
        &self.fields
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }
}
