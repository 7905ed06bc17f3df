//! Described types shared by the unit tests.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::Barrier;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_pack::Unpacker;
use pact_reflect::Bytes;
use pact_reflect::cell::NonGenericTypeInfoCell;
use pact_reflect::impl_type_path;
use pact_reflect::info::{
    ComplexInfo, ConstructorInfo, EnumInfo, NamedField, OpaqueInfo, ParamInfo, PrimitiveKind,
    TypeInfo, Typed, UnionInfo, UnionMember,
};
use pact_reflect::value::{FromValue, IntoValue, Record, Value, ValueError};

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, TypeProvider};
use crate::{CodecError, Context, DeserialisationError, SerialisationError, UnsupportedTypeError};

/// Declares a record type whose constructor mirrors its fields.
macro_rules! record {
    ($name:ident { $($field:ident: $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone, PartialEq)]
        pub(crate) struct $name {
            $(pub(crate) $field: $ty,)*
        }

        impl_type_path!($name);

        impl Typed for $name {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
                        $(NamedField::new::<$ty>(stringify!($field)),)*
                    ]))
                })
            }
        }

        impl IntoValue for $name {
            fn to_value(&self) -> Value {
                Value::Record(Record::of::<Self>()$(.with(stringify!($field), &self.$field))*)
            }
        }

        impl FromValue for $name {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                let mut record = value.into_record::<Self>()?;
                Ok(Self {
                    $($field: record.take_as(stringify!($field))?,)*
                })
            }
        }
    };
}

record!(Narrow { a: i32 });
record!(Wide { a: i32, b: i32, c: i32 });
record!(V1 { a: i32 });
record!(Node {
    value: i32,
    next: Option<Box<Node>>,
});
record!(Circle { radius: f64 });
record!(Square { side: f64 });
record!(Everything {
    flag: bool,
    small: u8,
    count: i64,
    ratio: f32,
    big: f64,
    label: String,
    blob: Bytes,
    colour: Colour,
    shape: Shape,
    pair: (String, u16),
    tags: BTreeMap<String, i32>,
    items: Vec<Option<i32>>,
});
record!(Holder { inner: Option<Opaque> });
record!(WithOpaque { value: Opaque });
record!(Outer {
    name: String,
    inner: WithOpaque,
});
record!(Guarded {
    inner: Narrow,
    value: Opaque,
});
record!(FlagOnly { flag: bool });

// -----------------------------------------------------------------------------
// Records with defaults

/// `{a}` plus a field `b` defaulting to `"x"`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct V2 {
    pub(crate) a: i32,
    pub(crate) b: String,
}

impl_type_path!(V2);

impl Typed for V2 {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Complex(ComplexInfo::new::<Self>(
                &[ConstructorInfo::new(&[
                    ParamInfo::new::<i32>("a"),
                    ParamInfo::new::<String>("b").with_default(|| Value::Str(String::from("x"))),
                ])],
                &[NamedField::new::<i32>("a"), NamedField::new::<String>("b")],
            ))
        })
    }
}

impl IntoValue for V2 {
    fn to_value(&self) -> Value {
        Value::Record(Record::of::<Self>().with("a", &self.a).with("b", &self.b))
    }
}

impl FromValue for V2 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut record = value.into_record::<Self>()?;
        Ok(Self {
            a: record.take_as("a")?,
            b: record.take_as("b")?,
        })
    }
}

/// Fields declared `b, a`; the constructor takes `a, b`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reordered {
    pub(crate) b: String,
    pub(crate) a: i32,
}

impl_type_path!(Reordered);

impl Typed for Reordered {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Complex(ComplexInfo::new::<Self>(
                &[ConstructorInfo::new(&[
                    ParamInfo::new::<i32>("a"),
                    ParamInfo::new::<String>("b"),
                ])],
                &[NamedField::new::<String>("b"), NamedField::new::<i32>("a")],
            ))
        })
    }
}

impl IntoValue for Reordered {
    fn to_value(&self) -> Value {
        Value::Record(Record::of::<Self>().with("b", &self.b).with("a", &self.a))
    }
}

impl FromValue for Reordered {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        let mut record = value.into_record::<Self>()?;
        Ok(Self {
            b: record.take_as("b")?,
            a: record.take_as("a")?,
        })
    }
}

/// Only its contract is used: a defaulted, nullable `note`.
pub(crate) struct Scores;

impl_type_path!(Scores);

impl Typed for Scores {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Complex(ComplexInfo::new::<Self>(
                &[ConstructorInfo::new(&[
                    ParamInfo::new::<String>("name"),
                    ParamInfo::new::<Vec<i32>>("scores"),
                    ParamInfo::defaulted::<Option<String>>("note"),
                ])],
                &[
                    NamedField::new::<String>("name"),
                    NamedField::new::<Vec<i32>>("scores"),
                ],
            ))
        })
    }
}

/// Two constructors: writable, never readable.
pub(crate) struct Ambiguous;

impl_type_path!(Ambiguous);

impl Typed for Ambiguous {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Complex(ComplexInfo::new::<Self>(
                &[
                    ConstructorInfo::new(&[ParamInfo::new::<i32>("a")]),
                    ConstructorInfo::new(&[]),
                ],
                &[NamedField::new::<i32>("a")],
            ))
        })
    }
}

// -----------------------------------------------------------------------------
// Enum and union

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Colour {
    Red,
    Green,
    Blue,
}

impl_type_path!(Colour);

const COLOURS: [&str; 3] = ["Red", "Green", "Blue"];

impl Typed for Colour {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Enum(EnumInfo::new::<Self>(&COLOURS)))
    }
}

impl IntoValue for Colour {
    fn to_value(&self) -> Value {
        Value::Enum(String::from(COLOURS[*self as usize]))
    }
}

impl FromValue for Colour {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Enum(name) => match name.as_str() {
                "Red" => Ok(Self::Red),
                "Green" => Ok(Self::Green),
                "Blue" => Ok(Self::Blue),
                _ => Err(ValueError::UnknownMember {
                    type_path: Self::type_info().type_path(),
                    member: name,
                }),
            },
            other => Err(other.mismatch("enum")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Circle(Circle),
    Square(Square),
}

impl_type_path!(Shape);

impl Typed for Shape {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::Union(UnionInfo::new::<Self>(&[
                UnionMember::of::<Circle>(),
                UnionMember::of::<Square>(),
            ]))
        })
    }
}

impl IntoValue for Shape {
    fn to_value(&self) -> Value {
        let (tag, value) = match self {
            Self::Circle(circle) => ("Circle", circle.to_value()),
            Self::Square(square) => ("Square", square.to_value()),
        };
        Value::Union {
            tag: String::from(tag),
            value: Box::new(value),
        }
    }
}

impl FromValue for Shape {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Union { tag, value } if tag == "Circle" => Circle::from_value(*value).map(Self::Circle),
            Value::Union { tag, value } if tag == "Square" => Square::from_value(*value).map(Self::Square),
            Value::Union { tag, .. } => Err(ValueError::UnknownMember {
                type_path: Self::type_info().type_path(),
                member: tag,
            }),
            other => Err(other.mismatch("union")),
        }
    }
}

// -----------------------------------------------------------------------------
// Opaque

/// A type only a custom provider can handle; written as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Opaque(pub(crate) i64);

impl_type_path!(Opaque);

impl Typed for Opaque {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Opaque(OpaqueInfo::new::<Self>()))
    }
}

impl IntoValue for Opaque {
    fn to_value(&self) -> Value {
        Value::I64(self.0)
    }
}

impl FromValue for Opaque {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        i64::from_value(value).map(Self)
    }
}

/// Handles [`Opaque`] and counts how often its read step runs.
#[derive(Debug, Default, Clone)]
pub(crate) struct OpaqueProvider {
    pub(crate) reads: Arc<AtomicUsize>,
}

impl TypeProvider for OpaqueProvider {
    fn name(&self) -> &'static str {
        "opaque"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        info.type_id() == Opaque::type_info().type_id()
    }

    fn write_contract(
        &self,
        _: &'static TypeInfo,
        _: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        Ok(ContractShape::Primitive(PrimitiveKind::I64))
    }

    fn read_contract(
        &self,
        _: &'static TypeInfo,
        _: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        Ok(ContractShape::Primitive(PrimitiveKind::I64))
    }

    fn build_reader(&self, _: &'static TypeInfo, _: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        let reads = self.reads.clone();
        Ok(ReadStep::Custom(Arc::new(
            move |input: &mut Unpacker<'_>, _: &Context| -> Result<Value, DeserialisationError> {
                reads.fetch_add(1, Ordering::Relaxed);
                Ok(Value::I64(input.read_i64()?))
            },
        )))
    }

    fn build_writer(&self, _: &'static TypeInfo, _: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        Ok(WriteStep::Custom(Arc::new(
            |out: &mut dyn pact_pack::Packer, value: &Value, _: &Context| -> Result<(), SerialisationError> {
                match value {
                    Value::I64(v) => Ok(out.pack_i64(*v)?),
                    other => Err(SerialisationError::new(alloc::format!(
                        "expected i64, found {}",
                        other.variant_name()
                    ))),
                }
            },
        )))
    }
}

/// Claims [`Opaque`] and fails to build its writer, after meeting a second
/// thread at `barrier` and holding on for `delay`.
#[derive(Debug, Clone)]
pub(crate) struct StallingProvider {
    pub(crate) barrier: Arc<Barrier>,
    pub(crate) delay: Duration,
}

impl TypeProvider for StallingProvider {
    fn name(&self) -> &'static str {
        "stalling"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        info.type_id() == Opaque::type_info().type_id()
    }

    fn write_contract(
        &self,
        _: &'static TypeInfo,
        _: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        Ok(ContractShape::Primitive(PrimitiveKind::I64))
    }

    fn read_contract(
        &self,
        _: &'static TypeInfo,
        _: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        Ok(ContractShape::Primitive(PrimitiveKind::I64))
    }

    fn build_reader(&self, info: &'static TypeInfo, _: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        Err(UnsupportedTypeError::new(info.type_path(), "stalling provider never builds").into())
    }

    fn build_writer(&self, info: &'static TypeInfo, _: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        self.barrier.wait();
        std::thread::sleep(self.delay);
        Err(UnsupportedTypeError::new(info.type_path(), "stalling provider never builds").into())
    }
}

/// A sample covering every built-in shape.
pub(crate) fn everything() -> Everything {
    Everything {
        flag: true,
        small: 200,
        count: -5_000_000_000,
        ratio: 0.5,
        big: 1e300,
        label: String::from("sample"),
        blob: Bytes(alloc::vec![1, 2, 3]),
        colour: Colour::Green,
        shape: Shape::Square(Square { side: 2.5 }),
        pair: (String::from("left"), 7),
        tags: BTreeMap::from([(String::from("x"), 1), (String::from("y"), -1)]),
        items: alloc::vec![Some(1), None, Some(3)],
    }
}
