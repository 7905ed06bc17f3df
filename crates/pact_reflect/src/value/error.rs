use alloc::string::String;

use thiserror::Error;

/// Failure while converting a [`Value`](crate::value::Value) into a Rust type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValueError {
    #[error("expected a {expected} value, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} does not fit in {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("record of `{expected}` expected, found record of `{found}`")]
    WrongRecord {
        expected: &'static str,
        found: &'static str,
    },

    #[error("record of `{type_path}` has no field `{field}`")]
    MissingField {
        type_path: &'static str,
        field: &'static str,
    },

    #[error("`{member}` is not a member of `{type_path}`")]
    UnknownMember {
        type_path: &'static str,
        member: String,
    },
}
