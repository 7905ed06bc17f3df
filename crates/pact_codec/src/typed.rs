use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use pact_pack::{BufferPacker, Packer};
use pact_reflect::info::Typed;
use pact_reflect::value::{FromValue, IntoValue};

use crate::build::{ReadProcedure, WriteProcedure};
use crate::context::from_value;
use crate::{CodecError, Context, DeserialisationError, SerialisationError, UnexpectedFieldPolicy};

// -----------------------------------------------------------------------------
// Serialiser

/// Writes values of one type, holding on to its procedure.
///
/// ```
/// use pact_codec::{Context, Deserialiser, Serialiser};
/// # use pact_reflect::cell::NonGenericTypeInfoCell;
/// # use pact_reflect::info::{ComplexInfo, NamedField, TypeInfo, Typed};
/// # use pact_reflect::value::{FromValue, IntoValue, Record, Value, ValueError};
/// # #[derive(Debug, PartialEq)]
/// # struct Tag { name: String }
/// # pact_reflect::impl_type_path!(Tag);
/// # impl Typed for Tag {
/// #     fn type_info() -> &'static TypeInfo {
/// #         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
/// #         CELL.get_or_init(|| TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
/// #             NamedField::new::<String>("name"),
/// #         ])))
/// #     }
/// # }
/// # impl IntoValue for Tag {
/// #     fn to_value(&self) -> Value { Value::Record(Record::of::<Self>().with("name", &self.name)) }
/// # }
/// # impl FromValue for Tag {
/// #     fn from_value(value: Value) -> Result<Self, ValueError> {
/// #         Ok(Self { name: value.into_record::<Self>()?.take_as("name")? })
/// #     }
/// # }
///
/// let cx = Context::new();
/// let writer = Serialiser::<Tag>::new(&cx).unwrap();
/// let reader = Deserialiser::<Tag>::new(&cx).unwrap();
///
/// let bytes = writer.serialise(&Tag { name: "urgent".into() }).unwrap();
/// assert_eq!(reader.deserialise(&bytes).unwrap().name, "urgent");
/// ```
pub struct Serialiser<'c, T> {
    cx: &'c Context,
    procedure: Arc<WriteProcedure>,
    _marker: PhantomData<fn(&T)>,
}

impl<'c, T: Typed + IntoValue> Serialiser<'c, T> {
    pub fn new(cx: &'c Context) -> Result<Self, CodecError> {
        Ok(Self {
            cx,
            procedure: cx.write_procedure(T::type_info())?,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn procedure(&self) -> &Arc<WriteProcedure> {
        &self.procedure
    }

    pub fn serialise(&self, value: &T) -> Result<Vec<u8>, SerialisationError> {
        let mut packer = BufferPacker::with_capacity(self.cx.options().buffer_capacity);
        self.serialise_into(&mut packer, value)?;
        Ok(packer.into_inner())
    }

    pub fn serialise_into(&self, out: &mut dyn Packer, value: &T) -> Result<(), SerialisationError> {
        self.procedure.write(out, &value.to_value(), self.cx)
    }
}

impl<T> fmt::Debug for Serialiser<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serialiser")
            .field("type_path", &self.procedure.type_info().type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Deserialiser

/// Reads values of one type under one unexpected-field policy.
pub struct Deserialiser<'c, T> {
    cx: &'c Context,
    procedure: Arc<ReadProcedure>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T: Typed + FromValue> Deserialiser<'c, T> {
    /// Uses the context's default policy.
    #[inline]
    pub fn new(cx: &'c Context) -> Result<Self, CodecError> {
        Self::with_policy(cx, cx.options().unexpected_fields)
    }

    pub fn with_policy(cx: &'c Context, policy: UnexpectedFieldPolicy) -> Result<Self, CodecError> {
        Ok(Self {
            cx,
            procedure: cx.read_procedure(T::type_info(), policy)?,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn policy(&self) -> UnexpectedFieldPolicy {
        self.procedure.policy()
    }

    #[inline]
    pub fn procedure(&self) -> &Arc<ReadProcedure> {
        &self.procedure
    }

    pub fn deserialise(&self, bytes: &[u8]) -> Result<T, DeserialisationError> {
        from_value(self.cx.read_root(&self.procedure, bytes)?)
    }
}

impl<T> fmt::Debug for Deserialiser<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deserialiser")
            .field("type_path", &self.procedure.type_info().type_path())
            .field("policy", &self.procedure.policy())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Deserialiser, Serialiser};
    use crate::fixtures::{Narrow, Wide};
    use crate::{Context, ContextOptions, UnexpectedFieldPolicy};

    #[test]
    fn deserialiser_defaults_to_the_context_policy() {
        let cx = Context::with_options(
            ContextOptions::new().with_unexpected_fields(UnexpectedFieldPolicy::Ignore),
        );
        let bytes = Serialiser::<Wide>::new(&cx)
            .unwrap()
            .serialise(&Wide { a: 1, b: 2, c: 3 })
            .unwrap();

        let lenient = Deserialiser::<Narrow>::new(&cx).unwrap();
        assert_eq!(lenient.policy(), UnexpectedFieldPolicy::Ignore);
        assert_eq!(lenient.deserialise(&bytes).unwrap(), Narrow { a: 1 });

        let strict = Deserialiser::<Narrow>::with_policy(&cx, UnexpectedFieldPolicy::Throw).unwrap();
        assert!(strict.deserialise(&bytes).is_err());
    }

    #[test]
    fn handles_share_the_cached_procedure() {
        let cx = Context::new();
        let first = Serialiser::<Narrow>::new(&cx).unwrap();
        let second = Serialiser::<Narrow>::new(&cx).unwrap();
        assert!(alloc::sync::Arc::ptr_eq(first.procedure(), second.procedure()));
        assert_eq!(cx.build_count(), 1);
    }
}
