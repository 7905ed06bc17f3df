use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use pact_contract::{
    Contract, Direction, ReadContractGraph, ReadField, WriteContractGraph, WriteField,
};
use pact_pack::{BufferPacker, Packer, Unpacker};
use pact_reflect::info::{TypeInfo, Typed};
use pact_reflect::value::{FromValue, IntoValue, Value};

use crate::build::{ReadBuilder, ReadKey, ReadProcedure, WriteBuilder, WriteProcedure};
use crate::cache::ProcedureCache;
use crate::provider::{ContractBuilder, TypeProviderRegistry};
use crate::{
    CodecError, ContextOptions, DeserialisationError, SerialisationError, UnexpectedFieldPolicy,
    UnsupportedTypeError,
};

// -----------------------------------------------------------------------------
// Procedure

/// A built procedure of either direction.
#[derive(Debug, Clone)]
pub enum Procedure {
    Read(Arc<ReadProcedure>),
    Write(Arc<WriteProcedure>),
}

impl Procedure {
    #[inline]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Read(_) => Direction::Read,
            Self::Write(_) => Direction::Write,
        }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        match self {
            Self::Read(procedure) => procedure.type_info(),
            Self::Write(procedure) => procedure.type_info(),
        }
    }
}

// -----------------------------------------------------------------------------
// Context

/// The entry point: builds, caches and runs procedures.
///
/// A context is created once per application and shared, by reference or
/// in an `Arc`, with every call site. Procedures are built on first use of a
/// `(type, policy)` pair and then kept for the lifetime of the context; the
/// cache never evicts.
///
/// ```
/// use pact_codec::{Context, UnexpectedFieldPolicy};
/// use pact_reflect::cell::NonGenericTypeInfoCell;
/// use pact_reflect::info::{ComplexInfo, NamedField, TypeInfo, Typed};
/// use pact_reflect::value::{FromValue, IntoValue, Record, Value, ValueError};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
/// pact_reflect::impl_type_path!(Point);
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
/// impl IntoValue for Point {
///     fn to_value(&self) -> Value {
///         Value::Record(Record::of::<Self>().with("x", &self.x).with("y", &self.y))
///     }
/// }
///
/// impl FromValue for Point {
///     fn from_value(value: Value) -> Result<Self, ValueError> {
///         let mut record = value.into_record::<Self>()?;
///         Ok(Self { x: record.take_as("x")?, y: record.take_as("y")? })
///     }
/// }
///
/// let cx = Context::new();
/// let bytes = cx.serialise(&Point { x: 1, y: -2 }).unwrap();
/// let point: Point = cx.deserialise(&bytes, UnexpectedFieldPolicy::Throw).unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// assert_eq!(cx.build_count(), 2);
/// ```
pub struct Context {
    options: ContextOptions,
    registry: TypeProviderRegistry,
    readers: ProcedureCache<ReadKey, ReadProcedure>,
    writers: ProcedureCache<TypeId, WriteProcedure>,
    builds: AtomicUsize,
}

impl Context {
    /// A context with default options and the built-in providers.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(ContextOptions::new())
    }

    #[inline]
    pub fn with_options(options: ContextOptions) -> Self {
        Self::with_registry(options, TypeProviderRegistry::new())
    }

    pub fn with_registry(options: ContextOptions, registry: TypeProviderRegistry) -> Self {
        Self {
            options,
            registry,
            readers: ProcedureCache::new("read", options.cache_capacity),
            writers: ProcedureCache::new("write", options.cache_capacity),
            builds: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    #[inline]
    pub fn registry(&self) -> &TypeProviderRegistry {
        &self.registry
    }

    #[inline]
    pub(crate) fn readers(&self) -> &ProcedureCache<ReadKey, ReadProcedure> {
        &self.readers
    }

    #[inline]
    pub(crate) fn writers(&self) -> &ProcedureCache<TypeId, WriteProcedure> {
        &self.writers
    }

    /// How many procedures this context has built so far.
    #[inline]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// How many built procedures are cached, both directions together.
    pub fn cached_procedures(&self) -> usize {
        self.readers.ready_len() + self.writers.ready_len()
    }

    // -------------------------------------------------------------------------
    // Procedures

    /// Returns the read procedure of `info` under `policy`, building it on
    /// first use.
    ///
    /// Concurrent first uses build once; the other callers wait for the
    /// result.
    pub fn read_procedure(
        &self,
        info: &'static TypeInfo,
        policy: UnexpectedFieldPolicy,
    ) -> Result<Arc<ReadProcedure>, CodecError> {
        if info.is_primitive() {
            return Err(DeserialisationError::new(
                "cannot deserialise a primitive type at the root; the root must contain fields to support versioning",
            )
            .in_type(info.type_path())
            .into());
        }
        let key = (info.type_id(), policy);
        let (procedure, built) = self.readers.get_or_build(key, info.type_path(), |session| {
            ReadBuilder::new(self, policy, session).build_procedure(info)
        })?;
        self.builds.fetch_add(built, Ordering::Relaxed);
        Ok(procedure)
    }

    /// Returns the write procedure of `info`, building it on first use.
    pub fn write_procedure(&self, info: &'static TypeInfo) -> Result<Arc<WriteProcedure>, CodecError> {
        if info.is_primitive() {
            return Err(SerialisationError::new(
                "cannot serialise a primitive type at the root; the root must contain fields to support versioning",
            )
            .in_type(info.type_path())
            .into());
        }
        let (procedure, built) = self.writers.get_or_build(info.type_id(), info.type_path(), |session| {
            WriteBuilder::new(self, session).build_procedure(info)
        })?;
        self.builds.fetch_add(built, Ordering::Relaxed);
        Ok(procedure)
    }

    /// Returns the procedure of `info` for `direction`.
    ///
    /// `policy` only matters when reading.
    pub fn get_or_build(
        &self,
        info: &'static TypeInfo,
        policy: UnexpectedFieldPolicy,
        direction: Direction,
    ) -> Result<Procedure, CodecError> {
        match direction {
            Direction::Read => self.read_procedure(info, policy).map(Procedure::Read),
            Direction::Write => self.write_procedure(info).map(Procedure::Write),
        }
    }

    // -------------------------------------------------------------------------
    // Serialisation

    /// Serialises `value` as its type's root.
    pub fn serialise<T: Typed + IntoValue>(&self, value: &T) -> Result<Vec<u8>, SerialisationError> {
        self.serialise_value(T::type_info(), &value.to_value())
    }

    /// Serialises a dynamic value with the procedure of `info`.
    pub fn serialise_value(&self, info: &'static TypeInfo, value: &Value) -> Result<Vec<u8>, SerialisationError> {
        let mut packer = BufferPacker::with_capacity(self.options.buffer_capacity);
        self.serialise_into(&mut packer, info, value)?;
        Ok(packer.into_inner())
    }

    /// Serialises into any packer, such as a
    /// [`StreamPacker`](pact_pack::StreamPacker).
    pub fn serialise_into(
        &self,
        out: &mut dyn Packer,
        info: &'static TypeInfo,
        value: &Value,
    ) -> Result<(), SerialisationError> {
        self.write_procedure(info)?.write(out, value, self)
    }

    /// Deserialises a `T` from exactly the bytes of one root value.
    pub fn deserialise<T: Typed + FromValue>(
        &self,
        bytes: &[u8],
        policy: UnexpectedFieldPolicy,
    ) -> Result<T, DeserialisationError> {
        let value = self.deserialise_value(bytes, T::type_info(), policy)?;
        from_value(value)
    }

    /// Deserialises a dynamic value with the procedure of `info`.
    pub fn deserialise_value(
        &self,
        bytes: &[u8],
        info: &'static TypeInfo,
        policy: UnexpectedFieldPolicy,
    ) -> Result<Value, DeserialisationError> {
        let procedure = self.read_procedure(info, policy)?;
        self.read_root(&procedure, bytes)
    }

    /// Runs `procedure` over `bytes`, rejecting trailing input.
    pub(crate) fn read_root(&self, procedure: &ReadProcedure, bytes: &[u8]) -> Result<Value, DeserialisationError> {
        let mut input = Unpacker::new(bytes);
        let value = procedure.read(&mut input, self)?;
        if !input.is_empty() {
            return Err(DeserialisationError::new(format!(
                "{} trailing byte(s) after the root value",
                input.remaining()
            ))
            .in_type(procedure.type_info().type_path())
            .at_offset(input.position()));
        }
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Contracts

    /// Computes the contract of `info` in `direction`.
    pub fn contract_for(&self, info: &'static TypeInfo, direction: Direction) -> Result<Contract, UnsupportedTypeError> {
        match direction {
            Direction::Write => self.write_contract_for(info).map(Contract::Write),
            Direction::Read => self.read_contract_for(info).map(Contract::Read),
        }
    }

    pub fn write_contract_for(&self, info: &'static TypeInfo) -> Result<WriteContractGraph, UnsupportedTypeError> {
        let mut builder = ContractBuilder::<WriteField>::new(&self.registry);
        let root = builder.contract_for(info)?;
        Ok(builder.finish(root))
    }

    pub fn read_contract_for(&self, info: &'static TypeInfo) -> Result<ReadContractGraph, UnsupportedTypeError> {
        let mut builder = ContractBuilder::<ReadField>::new(&self.registry);
        let root = builder.contract_for(info)?;
        Ok(builder.finish(root))
    }
}

/// Converts a decoded root into `T`.
pub(crate) fn from_value<T: Typed + FromValue>(value: Value) -> Result<T, DeserialisationError> {
    T::from_value(value).map_err(|err| {
        DeserialisationError::from(CodecError::from(err)).in_type(T::type_info().type_path())
    })
}

impl Default for Context {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("cached_procedures", &self.cached_procedures())
            .field("build_count", &self.build_count())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::Ordering;
    use core::time::Duration;
    use std::sync::Barrier;
    use std::thread;

    use pact_contract::{Direction, are_compatible};
    use pact_pack::{BufferPacker, Packer};
    use pact_reflect::info::Typed;
    use pact_reflect::value::{IntoValue, Record, Value};

    use super::Context;
    use crate::fixtures::*;
    use crate::provider::TypeProviderRegistry;
    use crate::{CodecError, ComplexLayout, ContextOptions, UnexpectedFieldPolicy};

    const THROW: UnexpectedFieldPolicy = UnexpectedFieldPolicy::Throw;
    const IGNORE: UnexpectedFieldPolicy = UnexpectedFieldPolicy::Ignore;

    #[test]
    fn every_shape_round_trips() {
        let cx = Context::new();
        let sample = everything();
        let bytes = cx.serialise(&sample).unwrap();
        let back: Everything = cx.deserialise(&bytes, THROW).unwrap();
        assert_eq!(back, sample);

        let circle = Everything {
            shape: Shape::Circle(Circle { radius: 1.0 }),
            ..sample
        };
        let bytes = cx.serialise(&circle).unwrap();
        assert_eq!(cx.deserialise::<Everything>(&bytes, THROW).unwrap(), circle);
    }

    #[test]
    fn recursive_types_round_trip() {
        let cx = Context::new();
        let list = Node {
            value: 1,
            next: Some(Box::new(Node {
                value: 2,
                next: Some(Box::new(Node { value: 3, next: None })),
            })),
        };
        let bytes = cx.serialise(&list).unwrap();
        assert_eq!(cx.build_count(), 1);
        assert_eq!(cx.deserialise::<Node>(&bytes, THROW).unwrap(), list);
        assert_eq!(cx.build_count(), 2);
    }

    #[test]
    fn nested_complex_types_build_once_each() {
        let cx = Context::new();
        cx.serialise(&everything()).unwrap();
        // Everything, Shape, Circle and Square.
        assert_eq!(cx.build_count(), 4);
        assert_eq!(cx.cached_procedures(), 4);
        cx.serialise(&Square { side: 1.0 }).unwrap();
        assert_eq!(cx.build_count(), 4);
    }

    #[test]
    fn array_layout_is_read_by_any_context() {
        let array = Context::with_options(ContextOptions::new().with_layout(ComplexLayout::Array));
        let bytes = array.serialise(&Wide { a: 1, b: 2, c: 3 }).unwrap();
        assert_eq!(bytes, [0x93, 0x01, 0x02, 0x03]);

        let map = Context::new();
        let back: Wide = map.deserialise(&bytes, THROW).unwrap();
        assert_eq!(back, Wide { a: 1, b: 2, c: 3 });

        assert!(map.deserialise::<Narrow>(&bytes, THROW).is_err());
        assert_eq!(map.deserialise::<Narrow>(&bytes, IGNORE).unwrap(), Narrow { a: 1 });
    }

    #[test]
    fn unexpected_fields_follow_the_policy() {
        let cx = Context::new();
        let bytes = cx.serialise(&Wide { a: 1, b: 2, c: 3 }).unwrap();

        let err = cx.deserialise::<Narrow>(&bytes, THROW).unwrap_err();
        assert_eq!(err.message, "unexpected field `b`");
        assert_eq!(err.type_path, Some(Narrow::type_info().type_path()));

        assert_eq!(cx.deserialise::<Narrow>(&bytes, IGNORE).unwrap(), Narrow { a: 1 });
    }

    #[test]
    fn missing_fields_take_defaults_or_fail() {
        let cx = Context::new();

        let v1 = cx.serialise(&V1 { a: 5 }).unwrap();
        let v2: V2 = cx.deserialise(&v1, THROW).unwrap();
        assert_eq!(v2, V2 { a: 5, b: String::from("x") });

        let narrow = cx.serialise(&Narrow { a: 1 }).unwrap();
        let err = cx.deserialise::<Wide>(&narrow, THROW).unwrap_err();
        assert_eq!(err.message, "missing required field");
        assert_eq!(err.field_path.as_str(), "b");
    }

    #[test]
    fn field_names_match_case_insensitively() {
        let mut packer = BufferPacker::new();
        packer.pack_map_header(1).unwrap();
        packer.pack_str("A").unwrap();
        packer.pack_i64(3).unwrap();

        let cx = Context::new();
        let narrow: Narrow = cx.deserialise(packer.as_bytes(), THROW).unwrap();
        assert_eq!(narrow, Narrow { a: 3 });
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut packer = BufferPacker::new();
        packer.pack_map_header(2).unwrap();
        for _ in 0..2 {
            packer.pack_str("a").unwrap();
            packer.pack_i64(3).unwrap();
        }
        let err = Context::new()
            .deserialise::<Narrow>(packer.as_bytes(), IGNORE)
            .unwrap_err();
        assert_eq!(err.message, "duplicate field `a`");
        assert_eq!(err.offset, Some(4));
    }

    #[test]
    fn nil_on_a_nullable_field_skips_the_inner_step() {
        let provider = OpaqueProvider::default();
        let reads = provider.reads.clone();
        let registry = TypeProviderRegistry::new().with_provider(provider);
        let cx = Context::with_registry(ContextOptions::new(), registry);

        let bytes = cx.serialise(&Holder { inner: None }).unwrap();
        let back: Holder = cx.deserialise(&bytes, THROW).unwrap();
        assert_eq!(back, Holder { inner: None });
        assert_eq!(reads.load(Ordering::Relaxed), 0);

        let bytes = cx.serialise(&Holder { inner: Some(Opaque(9)) }).unwrap();
        let back: Holder = cx.deserialise(&bytes, THROW).unwrap();
        assert_eq!(back.inner, Some(Opaque(9)));
        assert_eq!(reads.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let cx = Context::new();
        let barrier = Barrier::new(8);
        let outputs: Vec<Vec<u8>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let (cx, barrier) = (&cx, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        cx.serialise(&Node { value: 1, next: None }).unwrap();
                        cx.serialise(&Narrow { a: i }).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert_eq!(cx.build_count(), 2);
        assert_eq!(cx.cached_procedures(), 2);
        for (i, bytes) in outputs.iter().enumerate() {
            let narrow: Narrow = cx.deserialise(bytes, THROW).unwrap();
            assert_eq!(narrow.a, i as i32);
        }
    }

    #[test]
    fn failed_builds_leave_no_cache_entry() {
        let cx = Context::new();
        let outer = Outer {
            name: String::from("outer"),
            inner: WithOpaque { value: Opaque(1) },
        };

        for _ in 0..2 {
            let err = cx.serialise(&outer).unwrap_err();
            assert!(err.message.contains("opaque types need a custom type provider"));
            assert_eq!(cx.cached_procedures(), 0);
            assert_eq!(cx.build_count(), 0);
        }

        let err = cx
            .read_procedure(WithOpaque::type_info(), THROW)
            .unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(_)));
        assert_eq!(cx.cached_procedures(), 0);
    }

    #[test]
    fn roots_must_have_fields() {
        let cx = Context::new();
        let err = cx
            .deserialise_value(&[0x01], i32::type_info(), THROW)
            .unwrap_err();
        assert!(err.message.contains("cannot deserialise a primitive type"));
        assert_eq!(err.type_path, Some("i32"));

        let err = cx.serialise_value(u8::type_info(), &Value::U8(1)).unwrap_err();
        assert!(err.message.contains("cannot serialise a primitive type"));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let cx = Context::new();
        let mut bytes = cx.serialise(&Narrow { a: 1 }).unwrap();
        let len = bytes.len();
        bytes.push(0xc0);
        let err = cx.deserialise::<Narrow>(&bytes, THROW).unwrap_err();
        assert_eq!(err.offset, Some(len));
    }

    #[test]
    fn values_must_match_their_type() {
        let cx = Context::new();

        let too_big = Record::of::<Narrow>().with("a", &(1_i64 << 40));
        let err = cx
            .serialise_value(Narrow::type_info(), &Value::Record(too_big))
            .unwrap_err();
        assert_eq!(err.field_path.as_str(), "a");
        assert!(err.message.contains("does not fit in i32"));

        let wrong = Wide { a: 1, b: 2, c: 3 }.to_value();
        let err = cx.serialise_value(Narrow::type_info(), &wrong).unwrap_err();
        assert!(err.message.contains("expected a record of"));

        let nil = Record::of::<Narrow>().with("a", &Value::Nil);
        let err = cx.serialise_value(Narrow::type_info(), &Value::Record(nil)).unwrap_err();
        assert!(err.message.starts_with("nil is not a valid"));
    }

    #[test]
    fn narrow_integers_are_range_checked_when_read() {
        let mut packer = BufferPacker::new();
        packer.pack_map_header(1).unwrap();
        packer.pack_str("small").unwrap();
        packer.pack_u64(300).unwrap();

        let err = Context::new()
            .deserialise_value(packer.as_bytes(), Everything::type_info(), IGNORE)
            .unwrap_err();
        assert!(err.message.contains("does not fit in u8"));
        assert_eq!(err.field_path.as_str(), "small");
    }

    #[test]
    fn unknown_members_are_rejected() {
        let mut record = everything().to_value().into_record::<Everything>().unwrap();
        let _ = record.take("colour");
        record.push("colour", Value::Enum(String::from("Purple")));

        let err = Context::new()
            .serialise_value(Everything::type_info(), &Value::Record(record))
            .unwrap_err();
        assert_eq!(err.field_path.as_str(), "colour");
        assert!(err.message.contains("unknown enum member `Purple`"));
    }

    #[test]
    fn multiple_constructors_are_write_only() {
        let cx = Context::new();
        let value = Value::Record(Record::of::<Ambiguous>().with("a", &1));
        assert!(cx.serialise_value(Ambiguous::type_info(), &value).is_ok());

        let err = cx.read_procedure(Ambiguous::type_info(), THROW).unwrap_err();
        assert!(matches!(err, CodecError::Deserialisation(_)));
        assert!(cx.read_contract_for(Ambiguous::type_info()).is_err());
    }

    #[test]
    fn contracts_from_types_decide_compatibility() {
        let cx = Context::new();
        let v1_write = cx.write_contract_for(V1::type_info()).unwrap();
        let v1_read = cx.read_contract_for(V1::type_info()).unwrap();
        let v2_write = cx.write_contract_for(V2::type_info()).unwrap();
        let v2_read = cx.read_contract_for(V2::type_info()).unwrap();

        assert_eq!(v2_read.markup(), "{complex a:i32 b?:str}");
        assert!(are_compatible(&v1_write, &v2_read, true));
        assert!(!are_compatible(&v2_write, &v1_read, true));
        assert!(are_compatible(&v2_write, &v1_read, false));

        let contract = cx.contract_for(Node::type_info(), Direction::Read).unwrap();
        assert_eq!(contract.direction(), Direction::Read);
        assert_eq!(contract.markup(), "{complex value:i32 next:{nullable #0}}");

        // Structurally equal to V1 despite being another type.
        assert_eq!(cx.write_contract_for(Narrow::type_info()).unwrap(), v1_write);
    }

    #[test]
    fn array_positions_follow_field_order() {
        let value = Reordered {
            b: String::from("x"),
            a: 1,
        };
        let array = Context::with_options(ContextOptions::new().with_layout(ComplexLayout::Array));
        let bytes = array.serialise(&value).unwrap();
        assert_eq!(bytes, [0x92, 0xa1, b'x', 0x01]);
        assert_eq!(array.deserialise::<Reordered>(&bytes, THROW).unwrap(), value);

        let map = Context::new();
        let bytes = map.serialise(&value).unwrap();
        assert_eq!(map.deserialise::<Reordered>(&bytes, THROW).unwrap(), value);
    }

    #[test]
    fn ignored_fields_may_be_containers() {
        let sample = everything();
        for layout in [ComplexLayout::Map, ComplexLayout::Array] {
            let cx = Context::with_options(ContextOptions::new().with_layout(layout));
            let bytes = cx.serialise(&sample).unwrap();
            let flag: FlagOnly = cx.deserialise(&bytes, IGNORE).unwrap();
            assert_eq!(flag, FlagOnly { flag: true });
            assert!(cx.deserialise::<FlagOnly>(&bytes, THROW).is_err());
        }
    }

    #[test]
    fn concurrent_reads_build_once_per_policy() {
        let cx = Context::new();
        let bytes = cx.serialise(&Narrow { a: 5 }).unwrap();
        let writes = cx.build_count();
        let barrier = Barrier::new(8);
        thread::scope(|scope| {
            for i in 0..8 {
                let (cx, barrier, bytes) = (&cx, &barrier, &bytes);
                scope.spawn(move || {
                    let policy = if i % 2 == 0 { THROW } else { IGNORE };
                    barrier.wait();
                    let narrow: Narrow = cx.deserialise(bytes, policy).unwrap();
                    assert_eq!(narrow.a, 5);
                });
            }
        });
        assert_eq!(cx.build_count() - writes, 2);
        assert_eq!(cx.cached_procedures(), 3);
    }

    #[test]
    fn waiters_retry_after_an_unrelated_failure() {
        let barrier = Arc::new(Barrier::new(2));
        let provider = StallingProvider {
            barrier: barrier.clone(),
            delay: Duration::from_millis(100),
        };
        let registry = TypeProviderRegistry::new().with_provider(provider);
        let cx = Context::with_registry(ContextOptions::new(), registry);
        let guarded = Guarded {
            inner: Narrow { a: 1 },
            value: Opaque(2),
        };

        let (failed, narrow) = thread::scope(|scope| {
            let failed = scope.spawn(|| cx.serialise(&guarded));
            let narrow = scope.spawn(|| {
                // The other thread holds the slot of `Narrow` past this point.
                barrier.wait();
                cx.serialise(&Narrow { a: 3 })
            });
            (failed.join().unwrap(), narrow.join().unwrap())
        });

        assert!(failed.unwrap_err().message.contains("stalling provider never builds"));
        let bytes = narrow.unwrap();
        assert_eq!(cx.deserialise::<Narrow>(&bytes, THROW).unwrap(), Narrow { a: 3 });
        assert_eq!(cx.cached_procedures(), 2);
    }
}
