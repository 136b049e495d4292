//! Property parser (C6)

use crate::array::read_array;
use crate::error::{Error, Result};
use crate::heap::{Cursor, HeapRef};
use crate::qualifier::{self, Qualifier};
use crate::type_tag::TypeTag;
use crate::value::{read_utf16_cstring, read_value, Value};
use serde::Serialize;

/// A named, typed field of an object, optionally carrying a value and
/// qualifiers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: TypeTag,
    pub value: Option<Value>,
    pub qualifiers: Option<Vec<Qualifier>>,
}

/// Parse one property at the cursor's current position (C6)
///
/// Layout: `length: u32 (self-inclusive), type_tag: u32, name_offset: u32,
/// value_offset: u32, qualifiers_offset: u32, <heap bytes>`. All three heap
/// offsets default to the `0xFFFFFFFF` sentinel (absent). `name` is typed
/// non-optional (spec.md §3's `Property.name: String`); no known property
/// omits it, so an absent offset falls back to the empty string rather than
/// a hard failure, the same pragmatic call made for `Qualifier::name`. See
/// DESIGN.md.
pub fn parse(cursor: &mut Cursor<'_>) -> Result<Property> {
    let start = cursor.position();

    let length = require_u32(cursor)?;
    let type_raw = require_u32(cursor)?;
    let data_type = TypeTag::from_u32(type_raw, start + 4)?;
    let name_offset = require_u32(cursor)?;
    let value_offset = require_u32(cursor)?;
    let qualifiers_offset = require_u32(cursor)?;
    let heap_base = cursor.position();

    let buffer = cursor.buffer();
    let buffer_len = buffer.len() as u32;

    let name = match HeapRef(name_offset).resolve(heap_base) {
        Some(pos) => {
            bounds_check(pos, buffer_len)?;
            let mut name_cursor = Cursor::at(buffer, pos);
            read_utf16_cstring(&mut name_cursor, pos)?
        }
        None => String::new(),
    };

    let value = match HeapRef(value_offset).resolve(heap_base) {
        Some(pos) => {
            bounds_check(pos, buffer_len)?;
            let mut value_cursor = Cursor::at(buffer, pos);
            Some(read_value(&mut value_cursor, data_type, pos)?)
        }
        None => None,
    };

    let qualifiers = match HeapRef(qualifiers_offset).resolve(heap_base) {
        Some(pos) => {
            bounds_check(pos, buffer_len)?;
            let mut qualifiers_cursor = Cursor::at(buffer, pos);
            Some(read_array(&mut qualifiers_cursor, qualifier::parse)?)
        }
        None => None,
    };

    cursor.jump(start + length);

    Ok(Property {
        name,
        data_type,
        value,
        qualifiers,
    })
}

fn bounds_check(pos: u32, buffer_len: u32) -> Result<()> {
    if pos > buffer_len {
        return Err(Error::HeapRefOutOfBounds {
            offset: pos,
            heap_base: pos,
            heap_len: buffer_len,
        });
    }
    Ok(())
}

fn require_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))
}
