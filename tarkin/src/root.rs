//! Root parser (C10)
//!
//! The inner `FOMB` block: a magic-tagged, count-prefixed array of
//! top-level objects, optionally followed by the flavor table (C12) in
//! whatever bytes of the decompressed payload remain afterward.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::flavor::{self, FlavorFlags};
use crate::heap::Cursor;
use crate::object::Object;
use serde::Serialize;

const MAGIC: &[u8; 4] = b"FOMB";

/// The fully decoded contents of a BMOF container: a flat list of
/// top-level objects plus an optional qualifier-flavor map
#[derive(Debug, Clone, Serialize)]
pub struct Root {
    pub objects: Vec<Object>,
    pub flavors: Option<BTreeMap<u32, FlavorFlags>>,
}

/// Parse the inner `FOMB` root block plus its optional trailing flavor
/// table from a fully decompressed payload (C10)
///
/// Layout: `magic: "FOMB"`, `length: u32` (self-inclusive, covers only the
/// root block), `reserved1: u32 == 1`, `reserved2: u32 == 1`, then a
/// `u32`-prefixed (count, not byte-length) array of objects. Any bytes
/// remaining in `payload` after the root block are handed to the flavor
/// table parser (C12).
pub fn parse(payload: &[u8]) -> Result<Root> {
    let mut cursor = Cursor::new(payload);
    let magic_offset = cursor.position();

    let magic = cursor
        .read_bytes(MAGIC.len())
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
    if magic != MAGIC.as_slice() {
        return Err(Error::BadMagic {
            expected: MAGIC.as_slice(),
            found: magic.to_vec(),
            offset: magic_offset,
        });
    }

    // `length` is self-inclusive over the whole root block *including* the
    // 4 magic bytes that precede it (`root.py`: `FixedSized(this.length - 8,
    // ...)`, "8 is the length of the magic and length fields"), unlike the
    // C4/C5/C6/C8 length prefixes which only cover themselves onward.
    let length_offset = cursor.position();
    let length = require_u32(&mut cursor)?;
    let reserved1 = require_u32(&mut cursor)?;
    let reserved2 = require_u32(&mut cursor)?;
    if reserved1 != 1 || reserved2 != 1 {
        return Err(Error::MalformedMethod {
            reason: format!("root reserved fields must both be 1, got ({reserved1}, {reserved2})"),
            offset: length_offset + 4,
        });
    }

    let count = require_u32(&mut cursor)?;
    let mut objects = Vec::with_capacity(count as usize);
    for _ in 0..count {
        objects.push(Object::parse(&mut cursor)?);
    }

    let consumed = cursor.position() - magic_offset;
    if consumed != length {
        return Err(Error::TrailingBytes {
            expected: length,
            actual: consumed,
            offset: length_offset,
        });
    }

    let flavors = if cursor.remaining() > 0 {
        Some(flavor::parse(&mut cursor)?)
    } else {
        None
    };

    Ok(Root { objects, flavors })
}

fn require_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))
}
