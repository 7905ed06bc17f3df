use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use pact_pack::{Format, Unpacker};
use pact_reflect::info::{ConstructorInfo, EnumInfo, PrimitiveKind, TypeInfo, UnionInfo};
use pact_reflect::value::{Record, Value};

use crate::cache::Slot;
use crate::{Context, DeserialisationError, UnexpectedFieldPolicy};

// -----------------------------------------------------------------------------
// CustomReader

/// A hand-written read step supplied by a custom provider.
///
/// Custom steps see the raw input, nil markers included.
pub trait CustomReader: Send + Sync + 'static {
    fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError>;
}

impl<F> CustomReader for F
where
    F: Fn(&mut Unpacker<'_>, &Context) -> Result<Value, DeserialisationError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError> {
        self(input, cx)
    }
}

impl fmt::Debug for dyn CustomReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomReader")
    }
}

// -----------------------------------------------------------------------------
// ReadStep

/// One node of a read procedure.
#[derive(Debug)]
pub enum ReadStep {
    Primitive(PrimitiveKind),
    Nullable(Box<ReadStep>),
    List(Box<ReadStep>),
    Dictionary {
        key: Box<ReadStep>,
        value: Box<ReadStep>,
    },
    Enum(&'static EnumInfo),
    /// One step per member of the union, in declaration order.
    Union(&'static UnionInfo, Box<[ReadStep]>),
    Tuple(Box<[ReadStep]>),
    Complex(ComplexReader),
    /// The cached procedure of another type.
    Nested(NestedReader),
    Custom(Arc<dyn CustomReader>),
}

impl ReadStep {
    /// Reads one value.
    ///
    /// A nil marker in front of anything but a primitive or custom step
    /// yields [`Value::Nil`] without running the step.
    pub fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError> {
        match self {
            Self::Primitive(kind) => read_primitive(*kind, input),
            Self::Custom(reader) => reader.read(input, cx),
            _ if input.try_read_nil() => Ok(Value::Nil),
            Self::Nullable(inner) => inner.read(input, cx),
            Self::List(item) => {
                let len = input.read_array_header()?;
                let mut items = Vec::with_capacity(len.min(input.remaining()));
                for index in 0..len {
                    items.push(item.read(input, cx).map_err(|err| err.in_item(index))?);
                }
                Ok(Value::List(items))
            }
            Self::Dictionary { key, value } => {
                let len = input.read_map_header()?;
                let mut entries = Vec::with_capacity(len.min(input.remaining() / 2));
                for index in 0..len {
                    let k = key.read(input, cx).map_err(|err| err.in_item(index))?;
                    let v = value.read(input, cx).map_err(|err| err.in_item(index))?;
                    entries.push((k, v));
                }
                Ok(Value::Map(entries))
            }
            Self::Enum(info) => {
                let offset = input.position();
                let name = input.read_str()?;
                match info.index_of(name).and_then(|index| info.member_at(index)) {
                    Some(member) => Ok(Value::Enum(String::from(member))),
                    None => Err(DeserialisationError::new(format!("unknown enum member `{name}`"))
                        .in_type(info.type_path())
                        .at_offset(offset)),
                }
            }
            Self::Union(info, steps) => read_union(info, steps, input, cx),
            Self::Tuple(items) => {
                let offset = input.position();
                let len = input.read_array_header()?;
                if len != items.len() {
                    return Err(DeserialisationError::new(format!(
                        "expected a tuple of {} item(s), found {len}",
                        items.len()
                    ))
                    .at_offset(offset));
                }
                let mut values = Vec::with_capacity(len);
                for (index, item) in items.iter().enumerate() {
                    values.push(item.read(input, cx).map_err(|err| err.in_item(index))?);
                }
                Ok(Value::Tuple(values))
            }
            Self::Complex(reader) => reader.read(input, cx),
            Self::Nested(nested) => nested.read(input, cx),
        }
    }
}

fn narrow<S, T: TryFrom<S>>(
    value: S,
    target: PrimitiveKind,
    offset: usize,
) -> Result<T, DeserialisationError> {
    T::try_from(value).map_err(|_| {
        DeserialisationError::new(format!("integer does not fit in {target}")).at_offset(offset)
    })
}

fn read_primitive(kind: PrimitiveKind, input: &mut Unpacker<'_>) -> Result<Value, DeserialisationError> {
    let offset = input.position();
    let value = match kind {
        PrimitiveKind::Bool => Value::Bool(input.read_bool()?),
        PrimitiveKind::I8 => Value::I8(narrow(input.read_i64()?, kind, offset)?),
        PrimitiveKind::I16 => Value::I16(narrow(input.read_i64()?, kind, offset)?),
        PrimitiveKind::I32 => Value::I32(narrow(input.read_i64()?, kind, offset)?),
        PrimitiveKind::I64 => Value::I64(input.read_i64()?),
        PrimitiveKind::U8 => Value::U8(narrow(input.read_u64()?, kind, offset)?),
        PrimitiveKind::U16 => Value::U16(narrow(input.read_u64()?, kind, offset)?),
        PrimitiveKind::U32 => Value::U32(narrow(input.read_u64()?, kind, offset)?),
        PrimitiveKind::U64 => Value::U64(input.read_u64()?),
        PrimitiveKind::F32 => Value::F32(input.read_f32()?),
        PrimitiveKind::F64 => Value::F64(input.read_f64()?),
        PrimitiveKind::Str => Value::Str(String::from(input.read_str()?)),
        PrimitiveKind::Bytes => Value::Bytes(input.read_bin()?.to_vec()),
    };
    Ok(value)
}

fn read_union(
    info: &'static UnionInfo,
    steps: &[ReadStep],
    input: &mut Unpacker<'_>,
    cx: &Context,
) -> Result<Value, DeserialisationError> {
    let offset = input.position();
    let len = input.read_array_header()?;
    if len != 2 {
        return Err(DeserialisationError::new(format!(
            "expected a [tag, value] pair, found an array of {len}"
        ))
        .in_type(info.type_path())
        .at_offset(offset));
    }
    let tag_offset = input.position();
    let tag = input.read_str()?;
    let Some(index) = info
        .members()
        .iter()
        .position(|member| member.tag().eq_ignore_ascii_case(tag))
    else {
        return Err(DeserialisationError::new(format!("unknown union tag `{tag}`"))
            .in_type(info.type_path())
            .at_offset(tag_offset));
    };
    let tag = info.members()[index].tag();
    let value = steps[index]
        .read(input, cx)
        .map_err(|err| err.in_field(tag))?;
    Ok(Value::Union {
        tag: String::from(tag),
        value: Box::new(value),
    })
}

// -----------------------------------------------------------------------------
// ComplexReader

/// Reads a record through the parameters of its single constructor.
///
/// Accepts both the map and the array layout. Names match ASCII
/// case-insensitively. Positional fields follow the declaration order of
/// the readable fields, each mapped to the parameter of the same name.
#[derive(Debug)]
pub struct ComplexReader {
    type_path: &'static str,
    constructor: &'static ConstructorInfo,
    steps: Box<[ReadStep]>,
    positions: Box<[Option<usize>]>,
    policy: UnexpectedFieldPolicy,
}

impl ComplexReader {
    /// `steps` holds one step per constructor parameter. `positions` maps
    /// each readable field, in declaration order, to its parameter.
    pub fn new(
        type_path: &'static str,
        constructor: &'static ConstructorInfo,
        steps: Box<[ReadStep]>,
        positions: Box<[Option<usize>]>,
        policy: UnexpectedFieldPolicy,
    ) -> Self {
        debug_assert_eq!(constructor.params().len(), steps.len());
        Self {
            type_path,
            constructor,
            steps,
            positions,
            policy,
        }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// The parameter read at each array position.
    #[inline]
    pub fn positions(&self) -> &[Option<usize>] {
        &self.positions
    }

    fn read_param(
        &self,
        index: usize,
        input: &mut Unpacker<'_>,
        cx: &Context,
    ) -> Result<Value, DeserialisationError> {
        let param = &self.constructor.params()[index];
        self.steps[index]
            .read(input, cx)
            .map_err(|err| err.in_field(param.name()))
    }

    pub fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError> {
        self.read_record(input, cx)
            .map(Value::Record)
            .map_err(|err| err.in_type(self.type_path))
    }

    fn read_record(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Record, DeserialisationError> {
        let mut slots: Vec<Option<Value>> = alloc::vec![None; self.steps.len()];
        let offset = input.position();

        match input.peek_format()? {
            Format::Map => {
                let len = input.read_map_header()?;
                for _ in 0..len {
                    let name_offset = input.position();
                    let name = input.read_str()?;
                    match self.constructor.param_index(name) {
                        Some(index) if slots[index].is_some() => {
                            return Err(DeserialisationError::new(format!("duplicate field `{name}`"))
                                .at_offset(name_offset));
                        }
                        Some(index) => slots[index] = Some(self.read_param(index, input, cx)?),
                        None => match self.policy {
                            UnexpectedFieldPolicy::Throw => {
                                return Err(DeserialisationError::new(format!(
                                    "unexpected field `{name}`"
                                ))
                                .at_offset(name_offset));
                            }
                            UnexpectedFieldPolicy::Ignore => input.skip_value()?,
                        },
                    }
                }
            }
            Format::Array => {
                let len = input.read_array_header()?;
                if len > self.positions.len() && self.policy == UnexpectedFieldPolicy::Throw {
                    return Err(DeserialisationError::new(format!(
                        "expected at most {} positional field(s), found {len}",
                        self.positions.len()
                    ))
                    .at_offset(offset));
                }
                for position in 0..len {
                    match self.positions.get(position).copied().flatten() {
                        Some(index) => slots[index] = Some(self.read_param(index, input, cx)?),
                        None => input.skip_value()?,
                    }
                }
            }
            found => {
                return Err(DeserialisationError::new(format!(
                    "expected a map or an array, found {found}"
                ))
                .at_offset(offset));
            }
        }

        let mut record = Record::with_capacity(self.type_path, slots.len());
        for (param, slot) in self.constructor.params().iter().zip(slots) {
            let value = match slot {
                Some(value) => value,
                None => param.default_value().ok_or_else(|| {
                    DeserialisationError::new("missing required field").in_field(param.name())
                })?,
            };
            record.push(param.name(), value);
        }
        Ok(record)
    }
}

// -----------------------------------------------------------------------------
// NestedReader

/// A reference to another type's read procedure.
///
/// The slot may still be empty while the procedure is being built; it is
/// only dereferenced when a value is read.
pub struct NestedReader {
    slot: Arc<Slot<ReadProcedure>>,
    info: &'static TypeInfo,
    policy: UnexpectedFieldPolicy,
}

impl NestedReader {
    pub(crate) fn new(
        slot: Arc<Slot<ReadProcedure>>,
        info: &'static TypeInfo,
        policy: UnexpectedFieldPolicy,
    ) -> Self {
        Self { slot, info, policy }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.info.type_path()
    }

    pub fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError> {
        match self.slot.ready() {
            Some(procedure) => procedure.read(input, cx),
            // Built by another thread, or rolled back since this reference
            // was taken.
            None => cx.read_procedure(self.info, self.policy)?.read(input, cx),
        }
    }
}

impl fmt::Debug for NestedReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedReader")
            .field(&self.info.type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ReadProcedure

/// The built read procedure of one `(type, policy)` pair.
#[derive(Debug)]
pub struct ReadProcedure {
    info: &'static TypeInfo,
    policy: UnexpectedFieldPolicy,
    step: ReadStep,
}

impl ReadProcedure {
    pub(crate) fn new(info: &'static TypeInfo, policy: UnexpectedFieldPolicy, step: ReadStep) -> Self {
        Self { info, policy, step }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    #[inline]
    pub fn policy(&self) -> UnexpectedFieldPolicy {
        self.policy
    }

    #[inline]
    pub fn step(&self) -> &ReadStep {
        &self.step
    }

    /// Reads one value of the procedure's type.
    pub fn read(&self, input: &mut Unpacker<'_>, cx: &Context) -> Result<Value, DeserialisationError> {
        self.step
            .read(input, cx)
            .map_err(|err| err.in_type(self.info.type_path()))
    }
}
