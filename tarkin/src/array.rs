//! Length-prefixed array reader (C4)
//!
//! Shared by the qualifiers, properties, and methods heap substructures of
//! an object (C8): `{byte_length: u32, count: u32, entries...}`, where
//! `byte_length` is self-inclusive (covers the two header fields too) and
//! every entry manages its own length prefix.

use crate::error::{Error, Result};
use crate::heap::Cursor;

/// Read a C4 array, validating that the declared `byte_length` matches the
/// bytes actually consumed by `count` entries.
pub fn read_array<'a, T>(
    cursor: &mut Cursor<'a>,
    mut parse_entry: impl FnMut(&mut Cursor<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let start = cursor.position();
    let byte_length = cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
    let count = cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;

    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(parse_entry(cursor)?);
    }

    let consumed = cursor.position() - start;
    if consumed != byte_length {
        return Err(Error::ArrayLengthMismatch {
            declared: byte_length,
            consumed,
            offset: start,
        });
    }

    Ok(items)
}
