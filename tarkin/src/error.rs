//! Errors raised while decoding a BMOF container

use crate::value::StringError;
use crate::type_tag::BasicKind;

/// Errors from BMOF parsing
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("bad magic at offset {offset}: expected {expected:?}, got {found:?}")]
    BadMagic {
        expected: &'static [u8],
        found: Vec<u8>,
        offset: u32,
    },

    #[error("unsupported container version: {found}")]
    UnsupportedVersion { found: u32 },

    #[error("decompression failed: {0}")]
    DecompressionFailure(String),

    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressionSizeMismatch { expected: usize, actual: usize },

    #[error("invalid type tag 0x{code:x} at offset {offset}")]
    InvalidType { code: u32, offset: u32 },

    #[error("invalid boolean raw value 0x{raw:04x} at offset {offset}")]
    InvalidBoolean { raw: u16, offset: u32 },

    #[error("invalid string at offset {offset}: {reason}")]
    InvalidString { offset: u32, reason: StringError },

    #[error("unsupported scalar type {kind:?} at offset {offset}")]
    UnsupportedType { kind: BasicKind, offset: u32 },

    #[error("heap reference out of bounds: offset {offset} from base {heap_base} exceeds heap length {heap_len}")]
    HeapRefOutOfBounds {
        offset: u32,
        heap_base: u32,
        heap_len: u32,
    },

    #[error("array length mismatch at offset {offset}: declared {declared}, consumed {consumed}")]
    ArrayLengthMismatch {
        declared: u32,
        consumed: u32,
        offset: u32,
    },

    #[error("malformed method at offset {offset}: {reason}")]
    MalformedMethod { reason: String, offset: u32 },

    #[error("parameter {parameter:?} type mismatch at offset {offset}")]
    TypeMismatch { parameter: String, offset: u32 },

    #[error("parameter {parameter:?} value mismatch at offset {offset}")]
    ValueMismatch { parameter: String, offset: u32 },

    #[error("duplicate flavor entry for offset {offset}")]
    DuplicateFlavor { offset: u32 },

    #[error("trailing bytes at offset {offset}: expected {expected}, found {actual}")]
    TrailingBytes {
        expected: u32,
        actual: u32,
        offset: u32,
    },
}

/// Convenience result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The buffer ran out while a primitive read was in flight.
    ///
    /// Running off the end of the buffer is, in every caller, a heap
    /// reference (or array) that reaches past its containing block, so
    /// it is folded into [`Error::HeapRefOutOfBounds`] rather than given
    /// its own variant.
    pub(crate) fn eof(offset: u32, buffer_len: u32) -> Self {
        Error::HeapRefOutOfBounds {
            offset,
            heap_base: offset,
            heap_len: buffer_len,
        }
    }
}
