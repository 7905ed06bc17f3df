use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use core::fmt;

use pact_pack::{PackError, UnpackError};
use pact_reflect::value::ValueError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// UnsupportedTypeError

/// A type no provider can handle.
///
/// Raised while computing contracts or building procedures, before any data
/// is touched. It signals a usage mistake and is never worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("type `{type_path}` is not supported: {reason}")]
pub struct UnsupportedTypeError {
    pub type_path: &'static str,
    pub reason: Cow<'static, str>,
}

impl UnsupportedTypeError {
    #[inline]
    pub fn new(type_path: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_path,
            reason: reason.into(),
        }
    }
}

// -----------------------------------------------------------------------------
// Field path

/// A dotted path from the root value to the failing one, such as `items[2].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn prepend_field(&mut self, name: &str) {
        let sep = if self.0.is_empty() || self.0.starts_with('[') { "" } else { "." };
        self.0 = alloc::format!("{name}{sep}{}", self.0);
    }

    fn prepend_index(&mut self, index: usize) {
        let sep = if self.0.is_empty() || self.0.starts_with('[') { "" } else { "." };
        self.0 = alloc::format!("[{index}]{sep}{}", self.0);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Formats the optional context of a codec error.
fn location<'a>(
    type_path: &Option<&'static str>,
    field: &'a FieldPath,
    offset: &Option<usize>,
) -> Location<'a> {
    Location {
        type_path: *type_path,
        field,
        offset: *offset,
    }
}

struct Location<'a> {
    type_path: Option<&'static str>,
    field: &'a FieldPath,
    offset: Option<usize>,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_path) = self.type_path {
            write!(f, " in `{type_path}`")?;
        }
        if !self.field.is_empty() {
            write!(f, " at field `{}`", self.field)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (byte offset {offset})")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// DeserialisationError

/// Input that is malformed or does not match the target type.
///
/// Carries the innermost type being decoded, the field path from the root and
/// the byte offset, when they are known.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("deserialisation failed{}: {message}", location(.type_path, .field_path, .offset))]
pub struct DeserialisationError {
    pub message: Cow<'static, str>,
    pub type_path: Option<&'static str>,
    pub field_path: FieldPath,
    pub offset: Option<usize>,
}

impl DeserialisationError {
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            type_path: None,
            field_path: FieldPath::default(),
            offset: None,
        }
    }

    /// Records the type being decoded, unless an inner one is already known.
    #[inline]
    pub fn in_type(mut self, type_path: &'static str) -> Self {
        self.type_path.get_or_insert(type_path);
        self
    }

    /// Records the byte offset, unless an inner one is already known.
    #[inline]
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset.get_or_insert(offset);
        self
    }

    /// Prefixes the field path with a field name.
    #[inline]
    pub fn in_field(mut self, name: &str) -> Self {
        self.field_path.prepend_field(name);
        self
    }

    /// Prefixes the field path with a list or tuple index.
    #[inline]
    pub fn in_item(mut self, index: usize) -> Self {
        self.field_path.prepend_index(index);
        self
    }
}

impl From<UnpackError> for DeserialisationError {
    fn from(err: UnpackError) -> Self {
        let offset = err.offset();
        Self::new(err.to_string()).at_offset(offset)
    }
}

impl From<CodecError> for DeserialisationError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Deserialisation(err) => err,
            other => Self::new(other.to_string()),
        }
    }
}

// -----------------------------------------------------------------------------
// SerialisationError

/// A value that does not match the contract it is written with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("serialisation failed{}: {message}", location(.type_path, .field_path, &None))]
pub struct SerialisationError {
    pub message: Cow<'static, str>,
    pub type_path: Option<&'static str>,
    pub field_path: FieldPath,
}

impl SerialisationError {
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            type_path: None,
            field_path: FieldPath::default(),
        }
    }

    #[inline]
    pub fn in_type(mut self, type_path: &'static str) -> Self {
        self.type_path.get_or_insert(type_path);
        self
    }

    #[inline]
    pub fn in_field(mut self, name: &str) -> Self {
        self.field_path.prepend_field(name);
        self
    }

    #[inline]
    pub fn in_item(mut self, index: usize) -> Self {
        self.field_path.prepend_index(index);
        self
    }
}

impl From<PackError> for SerialisationError {
    fn from(err: PackError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<CodecError> for SerialisationError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Serialisation(err) => err,
            other => Self::new(other.to_string()),
        }
    }
}

// -----------------------------------------------------------------------------
// CodecError

/// Any failure surfaced by a [`Context`](crate::Context).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecError {
    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),

    #[error(transparent)]
    Deserialisation(#[from] DeserialisationError),

    #[error(transparent)]
    Serialisation(#[from] SerialisationError),

    #[error("value conversion failed: {0}")]
    Value(#[from] ValueError),
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_location() {
        let err = DeserialisationError::new("missing required field")
            .in_type("demo::Inner")
            .at_offset(12)
            .in_field("name")
            .in_item(3)
            .in_field("items")
            .in_type("demo::Outer");

        assert_eq!(err.type_path, Some("demo::Inner"));
        assert_eq!(err.field_path.as_str(), "items[3].name");
        assert_eq!(
            err.to_string(),
            "deserialisation failed in `demo::Inner` at field `items[3].name` (byte offset 12): missing required field"
        );
    }

    #[test]
    fn unpack_errors_keep_their_offset() {
        let err = DeserialisationError::from(UnpackError::Truncated { offset: 7, needed: 2 });
        assert_eq!(err.offset, Some(7));
    }
}
