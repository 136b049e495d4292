//! Byte-fixture builders shared across parser test modules
//!
//! Every C5/C6/C8 layout has its own fixed header plus heap bytes; rather
//! than hand-encoding the same property/object shapes in every module's
//! `#[cfg(test)] mod tests`, the common ones live here once.

use crate::heap::ABSENT;
use crate::type_tag::TypeTag;

/// An object with all three heap offsets absent: no qualifiers, properties,
/// or methods.
pub fn empty_object_bytes(object_type: u32) -> Vec<u8> {
    let header_len = 20u32;
    let mut buf = Vec::new();
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(&ABSENT.to_le_bytes());
    buf.extend_from_slice(&ABSENT.to_le_bytes());
    buf.extend_from_slice(&ABSENT.to_le_bytes());
    buf.extend_from_slice(&object_type.to_le_bytes());
    buf
}

/// A UTF-16LE, null-terminated encoding of `name`.
pub fn utf16_cstring_bytes(name: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.extend_from_slice(&[0x00, 0x00]);
    bytes
}

/// A property with a string name and a scalar `SINT32` value, no qualifiers.
pub fn sint32_property_bytes(name: &str, value: i32) -> Vec<u8> {
    use crate::type_tag::BasicKind;

    let name_bytes = utf16_cstring_bytes(name);
    let name_offset = 0u32;
    let value_offset = name_bytes.len() as u32;

    let mut heap = name_bytes;
    heap.extend_from_slice(&value.to_le_bytes());

    let header_len = 20u32;
    let total_len = header_len + heap.len() as u32;

    let mut buf = Vec::new();
    buf.extend_from_slice(&total_len.to_le_bytes());
    buf.extend_from_slice(&TypeTag::scalar(BasicKind::Sint32).as_u32().to_le_bytes());
    buf.extend_from_slice(&name_offset.to_le_bytes());
    buf.extend_from_slice(&value_offset.to_le_bytes());
    buf.extend_from_slice(&ABSENT.to_le_bytes());
    buf.extend_from_slice(&heap);
    buf
}

/// Wrap a sequence of already-encoded C6/C5 entries in a C4 length-prefixed
/// array: `{byte_length, count, entries...}`.
pub fn c4_array_bytes(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for entry in entries {
        body.extend_from_slice(entry);
    }
    let count = entries.len() as u32;
    let byte_length = 8 + body.len() as u32;

    let mut buf = Vec::new();
    buf.extend_from_slice(&byte_length.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&body);
    buf
}
