//! MessagePack wire primitives.
//!
//! This crate knows nothing about types or contracts. It only reads and writes
//! the scalar values and container headers of the MessagePack format.
//!
//! ## Menu
//!
//! - [`Format`]: classification of a leading marker byte.
//! - [`Packer`]: the encoding trait, all encoding logic lives in its provided methods.
//!     - [`StreamPacker`]: safe variant, writes through a buffered [`std::io::Write`].
//!     - [`BufferPacker`]: fast variant, writes into an owned `Vec<u8>` after
//!       reserving the maximum encoded size of each primitive.
//! - [`Unpacker`]: bounds-checked reader over a borrowed byte slice.
//!
//! Both packers produce byte-identical output for the same sequence of calls.
//!
//! ```
//! use pact_pack::{BufferPacker, Packer, Unpacker};
//!
//! let mut packer = BufferPacker::new();
//! packer.pack_map_header(1).unwrap();
//! packer.pack_str("id").unwrap();
//! packer.pack_u64(300).unwrap();
//!
//! let bytes = packer.into_inner();
//! let mut unpacker = Unpacker::new(&bytes);
//! assert_eq!(unpacker.read_map_header().unwrap(), 1);
//! assert_eq!(unpacker.read_str().unwrap(), "id");
//! assert_eq!(unpacker.read_u64().unwrap(), 300);
//! assert!(unpacker.is_empty());
//! ```

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod format;
mod packer;
mod unpacker;

pub mod marker;

// -----------------------------------------------------------------------------
// Exports

pub use error::{PackError, UnpackError};
pub use format::Format;
pub use packer::{BufferPacker, Packer, StreamPacker};
pub use unpacker::Unpacker;
