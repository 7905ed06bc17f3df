use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use core::fmt;

use pact_pack::Packer;
use pact_reflect::info::{EnumInfo, PrimitiveKind, TypeInfo, UnionInfo};
use pact_reflect::value::{Record, Value};

use crate::cache::Slot;
use crate::{ComplexLayout, Context, SerialisationError};

// -----------------------------------------------------------------------------
// CustomWriter

/// A hand-written write step supplied by a custom provider.
///
/// Custom steps receive every value, [`Value::Nil`] included.
pub trait CustomWriter: Send + Sync + 'static {
    fn write(&self, out: &mut dyn Packer, value: &Value, cx: &Context) -> Result<(), SerialisationError>;
}

impl<F> CustomWriter for F
where
    F: Fn(&mut dyn Packer, &Value, &Context) -> Result<(), SerialisationError> + Send + Sync + 'static,
{
    #[inline]
    fn write(&self, out: &mut dyn Packer, value: &Value, cx: &Context) -> Result<(), SerialisationError> {
        self(out, value, cx)
    }
}

impl fmt::Debug for dyn CustomWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomWriter")
    }
}

// -----------------------------------------------------------------------------
// WriteStep

/// One node of a write procedure.
#[derive(Debug)]
pub enum WriteStep {
    Primitive(PrimitiveKind),
    Nullable(Box<WriteStep>),
    List(Box<WriteStep>),
    Dictionary {
        key: Box<WriteStep>,
        value: Box<WriteStep>,
    },
    Enum(&'static EnumInfo),
    /// One step per member of the union, in declaration order.
    Union(&'static UnionInfo, Box<[WriteStep]>),
    Tuple(Box<[WriteStep]>),
    Complex(ComplexWriter),
    /// The cached procedure of another type.
    Nested(NestedWriter),
    Custom(Arc<dyn CustomWriter>),
}

impl WriteStep {
    /// The value variant this step accepts, for error messages.
    fn expected(&self) -> &'static str {
        match self {
            Self::Primitive(kind) => kind.name(),
            Self::Nullable(inner) => inner.expected(),
            Self::List(_) => "list",
            Self::Dictionary { .. } => "map",
            Self::Enum(_) => "enum",
            Self::Union(..) => "union",
            Self::Tuple(_) => "tuple",
            Self::Complex(_) | Self::Nested(_) => "record",
            Self::Custom(_) => "custom",
        }
    }

    /// Writes one value.
    ///
    /// [`Value::Nil`] is only accepted by nullable and custom steps.
    pub fn write(&self, out: &mut dyn Packer, value: &Value, cx: &Context) -> Result<(), SerialisationError> {
        match (self, value) {
            (Self::Custom(writer), value) => writer.write(out, value, cx),
            (Self::Nullable(_), Value::Nil) => Ok(out.pack_nil()?),
            (Self::Nullable(inner), value) => inner.write(out, value, cx),
            (_, Value::Nil) => Err(SerialisationError::new(format!(
                "nil is not a valid {}",
                self.expected()
            ))),
            (Self::Primitive(kind), value) => write_primitive(*kind, out, value),
            (Self::List(item), Value::List(items)) => {
                out.pack_array_header(items.len())?;
                for (index, value) in items.iter().enumerate() {
                    item.write(out, value, cx)
                        .map_err(|err| err.in_item(index))?;
                }
                Ok(())
            }
            (Self::Dictionary { key, value: step }, Value::Map(entries)) => {
                out.pack_map_header(entries.len())?;
                for (index, (k, v)) in entries.iter().enumerate() {
                    key.write(out, k, cx).map_err(|err| err.in_item(index))?;
                    step.write(out, v, cx).map_err(|err| err.in_item(index))?;
                }
                Ok(())
            }
            (Self::Enum(info), Value::Enum(name)) => {
                let member = info
                    .index_of(name)
                    .and_then(|index| info.member_at(index))
                    .ok_or_else(|| {
                        SerialisationError::new(format!("unknown enum member `{name}`"))
                            .in_type(info.type_path())
                    })?;
                Ok(out.pack_str(member)?)
            }
            (Self::Union(info, steps), Value::Union { tag, value }) => {
                let Some(index) = info
                    .members()
                    .iter()
                    .position(|member| member.tag().eq_ignore_ascii_case(tag))
                else {
                    return Err(SerialisationError::new(format!("unknown union tag `{tag}`"))
                        .in_type(info.type_path()));
                };
                let tag = info.members()[index].tag();
                out.pack_array_header(2)?;
                out.pack_str(tag)?;
                steps[index]
                    .write(out, value, cx)
                    .map_err(|err| err.in_field(tag))
            }
            (Self::Tuple(items), Value::Tuple(values)) => {
                if items.len() != values.len() {
                    return Err(SerialisationError::new(format!(
                        "expected a tuple of {} item(s), found {}",
                        items.len(),
                        values.len()
                    )));
                }
                out.pack_array_header(values.len())?;
                for (index, (item, value)) in items.iter().zip(values).enumerate() {
                    item.write(out, value, cx)
                        .map_err(|err| err.in_item(index))?;
                }
                Ok(())
            }
            (Self::Complex(writer), Value::Record(record)) => writer.write(out, record, cx),
            (Self::Nested(nested), value) => nested.write(out, value, cx),
            (step, value) => Err(SerialisationError::new(format!(
                "expected a {} value, found {}",
                step.expected(),
                value.variant_name()
            ))),
        }
    }
}

/// Inclusive range of an integer kind.
fn integer_range(kind: PrimitiveKind) -> Option<(i128, i128)> {
    Some(match kind {
        PrimitiveKind::I8 => (i8::MIN as i128, i8::MAX as i128),
        PrimitiveKind::I16 => (i16::MIN as i128, i16::MAX as i128),
        PrimitiveKind::I32 => (i32::MIN as i128, i32::MAX as i128),
        PrimitiveKind::I64 => (i64::MIN as i128, i64::MAX as i128),
        PrimitiveKind::U8 => (0, u8::MAX as i128),
        PrimitiveKind::U16 => (0, u16::MAX as i128),
        PrimitiveKind::U32 => (0, u32::MAX as i128),
        PrimitiveKind::U64 => (0, u64::MAX as i128),
        _ => return None,
    })
}

fn write_primitive(kind: PrimitiveKind, out: &mut dyn Packer, value: &Value) -> Result<(), SerialisationError> {
    match (kind, value) {
        (PrimitiveKind::Bool, Value::Bool(v)) => out.pack_bool(*v)?,
        (PrimitiveKind::F32, Value::F32(v)) => out.pack_f32(*v)?,
        (PrimitiveKind::F64, Value::F64(v)) => out.pack_f64(*v)?,
        (PrimitiveKind::F64, Value::F32(v)) => out.pack_f64(f64::from(*v))?,
        (PrimitiveKind::Str, Value::Str(v)) => out.pack_str(v)?,
        (PrimitiveKind::Bytes, Value::Bytes(v)) => out.pack_bin(v)?,
        _ => {
            let (Some((min, max)), Some(int)) = (integer_range(kind), value.as_integer()) else {
                return Err(SerialisationError::new(format!(
                    "expected a {kind} value, found {}",
                    value.variant_name()
                )));
            };
            if int < min || int > max {
                return Err(SerialisationError::new(format!("{int} does not fit in {kind}")));
            }
            if int < 0 {
                out.pack_i64(int as i64)?;
            } else {
                out.pack_u64(int as u64)?;
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// ComplexWriter

/// Writes a record's readable fields in declaration order.
#[derive(Debug)]
pub struct ComplexWriter {
    type_path: &'static str,
    fields: Box<[(&'static str, WriteStep)]>,
    layout: ComplexLayout,
}

impl ComplexWriter {
    pub fn new(
        type_path: &'static str,
        fields: Box<[(&'static str, WriteStep)]>,
        layout: ComplexLayout,
    ) -> Self {
        Self {
            type_path,
            fields,
            layout,
        }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn layout(&self) -> ComplexLayout {
        self.layout
    }

    pub fn write(&self, out: &mut dyn Packer, record: &Record, cx: &Context) -> Result<(), SerialisationError> {
        self.write_record(out, record, cx)
            .map_err(|err| err.in_type(self.type_path))
    }

    fn write_record(&self, out: &mut dyn Packer, record: &Record, cx: &Context) -> Result<(), SerialisationError> {
        if record.type_path() != self.type_path {
            return Err(SerialisationError::new(format!(
                "expected a record of `{}`, found `{}`",
                self.type_path,
                record.type_path()
            )));
        }
        match self.layout {
            ComplexLayout::Map => out.pack_map_header(self.fields.len())?,
            ComplexLayout::Array => out.pack_array_header(self.fields.len())?,
        }
        for (name, step) in self.fields.iter() {
            let value = record
                .get(name)
                .ok_or_else(|| SerialisationError::new("missing field").in_field(name))?;
            if self.layout == ComplexLayout::Map {
                out.pack_str(name)?;
            }
            step.write(out, value, cx)
                .map_err(|err| err.in_field(name))?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// NestedWriter

/// A reference to another type's write procedure.
pub struct NestedWriter {
    slot: Arc<Slot<WriteProcedure>>,
    info: &'static TypeInfo,
}

impl NestedWriter {
    pub(crate) fn new(slot: Arc<Slot<WriteProcedure>>, info: &'static TypeInfo) -> Self {
        Self { slot, info }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.info.type_path()
    }

    pub fn write(&self, out: &mut dyn Packer, value: &Value, cx: &Context) -> Result<(), SerialisationError> {
        match self.slot.ready() {
            Some(procedure) => procedure.write(out, value, cx),
            None => cx.write_procedure(self.info)?.write(out, value, cx),
        }
    }
}

impl fmt::Debug for NestedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedWriter")
            .field(&self.info.type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// WriteProcedure

/// The built write procedure of one type.
#[derive(Debug)]
pub struct WriteProcedure {
    info: &'static TypeInfo,
    step: WriteStep,
}

impl WriteProcedure {
    pub(crate) fn new(info: &'static TypeInfo, step: WriteStep) -> Self {
        Self { info, step }
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    #[inline]
    pub fn step(&self) -> &WriteStep {
        &self.step
    }

    /// Writes one value of the procedure's type.
    pub fn write(&self, out: &mut dyn Packer, value: &Value, cx: &Context) -> Result<(), SerialisationError> {
        self.step
            .write(out, value, cx)
            .map_err(|err| err.in_type(self.info.type_path()))
    }
}
