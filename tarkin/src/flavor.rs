//! Flavor table parser (C12)
//!
//! The optional trailing table maps a qualifier's absolute byte offset
//! (`Qualifier::offset`) to a set of flavor flags further modifying it. It
//! is the only part of a BMOF container addressed by an out-of-line key
//! rather than by heap offset.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::heap::Cursor;
use serde::Serialize;

const MAGIC: &[u8; 16] = b"BMOFQUALFLAVOR11";

/// Known bits of a flavor flag set; any other bit set is a decode error
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlavorFlags(u32);

impl FlavorFlags {
    pub const TO_INSTANCE: u32 = 0x1;
    pub const TO_SUBCLASS: u32 = 0x2;
    pub const DISABLE_OVERRIDE: u32 = 0x10;
    pub const AMENDED: u32 = 0x80;

    const KNOWN_BITS: u32 =
        Self::TO_INSTANCE | Self::TO_SUBCLASS | Self::DISABLE_OVERRIDE | Self::AMENDED;

    // No dedicated error variant exists for an unrecognized flag bit; it is
    // reported as `InvalidType` since a flag set is, structurally, a closed
    // enumeration like any other type code.
    fn from_raw(raw: u32, offset: u32) -> Result<Self> {
        let unknown = raw & !Self::KNOWN_BITS;
        if unknown != 0 {
            return Err(Error::InvalidType {
                code: raw,
                offset,
            });
        }
        Ok(Self(raw))
    }

    pub fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Lowercase names of every flag set, in a stable order
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::TO_INSTANCE) {
            names.push("to_instance");
        }
        if self.contains(Self::TO_SUBCLASS) {
            names.push("to_subclass");
        }
        if self.contains(Self::DISABLE_OVERRIDE) {
            names.push("disable_override");
        }
        if self.contains(Self::AMENDED) {
            names.push("amended");
        }
        names
    }
}

/// Parse the flavor table occupying the remainder of the decompressed
/// payload after the root object block (C12)
///
/// Layout: `magic: "BMOFQUALFLAVOR11"` (16 bytes), `count: u32`, then
/// `count` pairs of `{offset: u32 (!= 0), flags: u32}`.
pub fn parse(cursor: &mut Cursor<'_>) -> Result<BTreeMap<u32, FlavorFlags>> {
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

    let count = require_u32(cursor)?;
    let mut flavors = BTreeMap::new();
    for _ in 0..count {
        let entry_offset = cursor.position();
        let offset = require_u32(cursor)?;
        let raw_flags = require_u32(cursor)?;
        if offset == 0 {
            return Err(Error::InvalidType {
                code: offset,
                offset: entry_offset,
            });
        }
        let flags = FlavorFlags::from_raw(raw_flags, entry_offset + 4)?;
        if flavors.insert(offset, flags).is_some() {
            return Err(Error::DuplicateFlavor { offset });
        }
    }

    Ok(flavors)
}

fn require_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    cursor
        .read_u32()
        .ok_or_else(|| Error::eof(cursor.position(), cursor.buffer_len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The `{offset=0xDEAD, flags=TO_INSTANCE|AMENDED}` fixture from spec scenario 5.
    fn build_single_flavor() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0xDEADu32.to_le_bytes());
        buf.extend_from_slice(&(FlavorFlags::TO_INSTANCE | FlavorFlags::AMENDED).to_le_bytes());
        buf
    }

    #[test]
    fn parses_single_flavor_entry() {
        let data = build_single_flavor();
        let mut cursor = Cursor::new(&data);
        let flavors = parse(&mut cursor).unwrap();
        assert_eq!(flavors.len(), 1);
        let flags = flavors[&0xDEAD];
        assert!(flags.contains(FlavorFlags::TO_INSTANCE));
        assert!(flags.contains(FlavorFlags::AMENDED));
        assert!(!flags.contains(FlavorFlags::TO_SUBCLASS));
        assert_eq!(flags.names(), vec!["to_instance", "amended"]);
    }

    #[test]
    fn rejects_unknown_flag_bits() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0x04u32.to_le_bytes());
        let mut cursor = Cursor::new(&buf);
        assert!(parse(&mut cursor).is_err());
    }

    #[test]
    fn rejects_zero_offset() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let mut cursor = Cursor::new(&buf);
        assert!(parse(&mut cursor).is_err());
    }

    #[test]
    fn rejects_duplicate_offsets() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let mut cursor = Cursor::new(&buf);
        assert!(matches!(parse(&mut cursor), Err(Error::DuplicateFlavor { offset: 1 })));
    }
}
