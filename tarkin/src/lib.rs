//! BMOF (Binary Managed Object Format) container decoder
//!
//! Decodes the proprietary binary container certain firmware
//! distributions use to ship manageability object descriptions (classes,
//! instances, qualifiers, properties, methods) into an in-memory tree of
//! [`Object`]s.
//!
//! This crate performs no I/O: callers read the container bytes
//! themselves and supply a [`DoubleSpaceDecompressor`] to
//! [`Container::decode`]. See `tarkin-cli` for a file-driven front end.

pub mod array;
pub mod container;
pub mod error;
pub mod flavor;
pub mod heap;
pub mod method;
pub mod object;
pub mod property;
pub mod qualifier;
pub mod root;
#[cfg(test)]
pub(crate) mod test_support;
pub mod type_tag;
pub mod value;

pub use container::{Container, DoubleSpaceDecompressor, ExecDecompressor};
pub use error::{Error, Result};
pub use flavor::FlavorFlags;
pub use heap::{Cursor, HeapRef};
pub use method::Method;
pub use object::{Object, WmiObjectType};
pub use property::Property;
pub use qualifier::Qualifier;
pub use root::Root;
pub use type_tag::{BasicKind, TypeTag};
pub use value::Value;
