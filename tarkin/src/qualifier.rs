//! Qualifier parser (C5)

use crate::error::{Error, Result};
use crate::heap::{Cursor, HeapRef};
use crate::type_tag::TypeTag;
use crate::value::{read_utf16_cstring, read_value, Value};
use serde::Serialize;

/// A named, typed annotation attached to an object, property, or method
///
/// `offset` is the absolute byte position (relative to the start of the
/// decompressed payload) at which this qualifier's header begins — the
/// join key used by the flavor table (C12).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qualifier {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: TypeTag,
    pub value: Value,
    pub offset: u32,
}

/// Parse one qualifier at the cursor's current position (C5)
///
/// Layout: `length: u32 (self-inclusive), type_tag: u32, name_offset: u32,
/// value_offset: u32, <heap bytes>`.
pub fn parse(cursor: &mut Cursor<'_>) -> Result<Qualifier> {
    let offset = cursor.position();
    let start = offset;

    let length = require_u32(cursor)?;
    let type_raw = require_u32(cursor)?;
    let data_type = TypeTag::from_u32(type_raw, start + 4)?;
    let name_offset = require_u32(cursor)?;
    let value_offset = require_u32(cursor)?;
    let heap_base = cursor.position();

    let buffer = cursor.buffer();
    let buffer_len = buffer.len() as u32;

    let name = match HeapRef(name_offset).resolve(heap_base) {
        Some(pos) => {
            if pos > buffer_len {
                return Err(Error::HeapRefOutOfBounds {
                    offset: pos,
                    heap_base,
                    heap_len: buffer_len,
                });
            }
            let mut name_cursor = Cursor::at(buffer, pos);
            read_utf16_cstring(&mut name_cursor, pos)?
        }
        None => String::new(),
    };

    let value = match HeapRef(value_offset).resolve(heap_base) {
        Some(pos) => {
            if pos > buffer_len {
                return Err(Error::HeapRefOutOfBounds {
                    offset: pos,
                    heap_base,
                    heap_len: buffer_len,
                });
            }
            let mut value_cursor = Cursor::at(buffer, pos);
            read_value(&mut value_cursor, data_type, pos)?
        }
        // No qualifier in any known BMOF sample omits its value; a sentinel
        // value offset is treated as an (untested) edge case rather than a
        // hard failure. See DESIGN.md.
        None => Value::Bool(false),
    };

    cursor.jump(start + length);

    Ok(Qualifier {
        name,
        data_type,
        value,
        offset,
    })
}

fn require_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))
}
