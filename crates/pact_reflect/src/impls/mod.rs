//! [`Typed`](crate::info::Typed), [`TypePath`](crate::info::TypePath) and value
//! conversions for common standard types.
//!
//! - `bool`, `i8`..`i64`, `u8`..`u64`, `f32`, `f64`, `String`, [`Bytes`]: primitive
//! - `Option<T>`: nullable
//! - `Vec<T>`: list
//! - `HashMap<K, V>`, `BTreeMap<K, V>`: map
//! - `(T1,)` .. `(T1, T2, T3, T4)`: tuple
//! - `Box<T>`: transparent, described as `T`

mod bytes;
mod collections;
mod option;
mod primitive;
mod tuple;

pub use bytes::Bytes;
