//! Scalar value reading (C2) and composite value reading (C7)

use crate::error::{Error, Result};
use crate::heap::Cursor;
use crate::object::Object;
use crate::type_tag::{BasicKind, TypeTag};
use serde::Serialize;

/// Why a UTF-16LE string failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StringError {
    #[error("odd byte length ({0} bytes remaining)")]
    OddLength(usize),
    #[error("unpaired UTF-16 surrogate")]
    UnpairedSurrogate,
}

/// A decoded BMOF value
///
/// `Object` is boxed to break the `Object -> Property -> Value -> Object`
/// recursive-type cycle without a forward declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i128),
    Real(f64),
    String(String),
    Object(Box<Object>),
    Array(Vec<Value>),
}

/// Read a null-terminated UTF-16LE string, stripping the terminator (C2, §1 data model)
pub fn read_utf16_cstring(cursor: &mut Cursor<'_>, offset: u32) -> Result<String> {
    let mut units = Vec::new();
    loop {
        match cursor.read_u16() {
            Some(0) => break,
            Some(unit) => units.push(unit),
            None => {
                let remaining = cursor.remaining();
                if remaining == 1 {
                    return Err(Error::InvalidString {
                        offset,
                        reason: StringError::OddLength(remaining),
                    });
                }
                return Err(Error::eof(cursor.position(), cursor.buffer_len()));
            }
        }
    }

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::InvalidString {
            offset,
            reason: StringError::UnpairedSurrogate,
        })
}

fn require_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))
}

/// Read a scalar value for a given basic kind (C2)
pub fn read_scalar(cursor: &mut Cursor<'_>, basic: BasicKind, offset: u32) -> Result<Value> {
    match basic {
        BasicKind::Boolean => {
            let raw = cursor
                .read_u16()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            match raw {
                0x0000 => Ok(Value::Bool(false)),
                0xFFFF => Ok(Value::Bool(true)),
                _ => Err(Error::InvalidBoolean { raw, offset }),
            }
        }
        BasicKind::Sint8 => {
            let raw = cursor
                .read_u8()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i8 as i128))
        }
        BasicKind::Uint8 => {
            let raw = cursor
                .read_u8()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i128))
        }
        BasicKind::Sint16 => {
            let raw = cursor
                .read_u16()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i16 as i128))
        }
        BasicKind::Uint16 => {
            let raw = cursor
                .read_u16()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i128))
        }
        BasicKind::Sint32 => {
            let raw = require_u32(cursor)?;
            Ok(Value::Int(raw as i32 as i128))
        }
        BasicKind::Uint32 => {
            let raw = require_u32(cursor)?;
            Ok(Value::Int(raw as i128))
        }
        BasicKind::Sint64 => {
            let raw = cursor
                .read_u64()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i64 as i128))
        }
        BasicKind::Uint64 => {
            let raw = cursor
                .read_u64()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Int(raw as i128))
        }
        BasicKind::Real32 => {
            let raw = require_u32(cursor)?;
            Ok(Value::Real(f32::from_bits(raw) as f64))
        }
        BasicKind::Real64 => {
            let raw = cursor
                .read_u64()
                .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))?;
            Ok(Value::Real(f64::from_bits(raw)))
        }
        BasicKind::String => read_utf16_cstring(cursor, offset).map(Value::String),
        BasicKind::Object => Object::parse(cursor).map(|obj| Value::Object(Box::new(obj))),
        BasicKind::Void | BasicKind::Datetime | BasicKind::Reference | BasicKind::Char16 => {
            Err(Error::UnsupportedType { kind: basic, offset })
        }
    }
}

/// Read a value dispatching on the array flag (C7)
pub fn read_value(cursor: &mut Cursor<'_>, tag: TypeTag, offset: u32) -> Result<Value> {
    if !tag.is_array {
        return read_scalar(cursor, tag.basic, offset);
    }

    let _total_length = require_u32(cursor)?;
    let _reserved = require_u32(cursor)?;
    let count = require_u32(cursor)?;
    let _items_length = require_u32(cursor)?;

    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let item_offset = cursor.position();
        items.push(read_scalar(cursor, tag.basic, item_offset)?);
    }
    Ok(Value::Array(items))
}
