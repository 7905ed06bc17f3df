use alloc::vec::Vec;

use crate::info::TypePath;
use crate::value::{FromValue, IntoValue, Value, ValueError};

/// The dynamic form of a complex value: its type path and named fields.
///
/// Decoding assembles fields in constructor parameter order; encoding looks
/// fields up by name, ignoring ASCII case.
///
/// ```
/// use pact_reflect::value::{Record, Value};
///
/// let mut record = Record::new("demo::Point").with("x", &1_i32).with("y", &2_i32);
/// assert_eq!(record.get("X"), Some(&Value::I32(1)));
/// assert_eq!(record.take_as::<i32>("y"), Ok(2));
/// assert_eq!(record.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_path: &'static str,
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    #[inline]
    pub const fn new(type_path: &'static str) -> Self {
        Self {
            type_path,
            fields: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(type_path: &'static str, capacity: usize) -> Self {
        Self {
            type_path,
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Creates an empty record for `T`.
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self::new(T::type_path())
    }

    /// Builder form of [`push`](Self::push) that converts the value.
    #[inline]
    pub fn with<V: IntoValue + ?Sized>(mut self, name: &'static str, value: &V) -> Self {
        self.push(name, value.to_value());
        self
    }

    #[inline]
    pub fn push(&mut self, name: &'static str, value: Value) {
        self.fields.push((name, value));
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Removes a field and returns its value.
    pub fn take(&mut self, name: &'static str) -> Result<Value, ValueError> {
        let index = self
            .fields
            .iter()
            .position(|(field, _)| field.eq_ignore_ascii_case(name))
            .ok_or(ValueError::MissingField {
                type_path: self.type_path,
                field: name,
            })?;
        Ok(self.fields.swap_remove(index).1)
    }

    /// Removes a field and converts it.
    #[inline]
    pub fn take_as<T: FromValue>(&mut self, name: &'static str) -> Result<T, ValueError> {
        self.take(name).and_then(T::from_value)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn fields(&self) -> &[(&'static str, Value)] {
        &self.fields
    }

    #[inline]
    pub fn into_fields(self) -> Vec<(&'static str, Value)> {
        self.fields
    }
}
