//! Type tag decoding (C1)

use crate::error::{Error, Result};
use serde::Serialize;

/// Bit that marks a type tag as describing an array of its basic kind
const ARRAY_FLAG: u32 = 0x2000;

/// The closed set of scalar kinds a BMOF value can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Void,
    Sint16,
    Sint32,
    Real32,
    Real64,
    String,
    Boolean,
    Object,
    Sint8,
    Uint8,
    Uint16,
    Uint32,
    Sint64,
    Uint64,
    Datetime,
    Reference,
    Char16,
}

impl BasicKind {
    fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Self::Void,
            2 => Self::Sint16,
            3 => Self::Sint32,
            4 => Self::Real32,
            5 => Self::Real64,
            8 => Self::String,
            11 => Self::Boolean,
            13 => Self::Object,
            16 => Self::Sint8,
            17 => Self::Uint8,
            18 => Self::Uint16,
            19 => Self::Uint32,
            20 => Self::Sint64,
            21 => Self::Uint64,
            101 => Self::Datetime,
            102 => Self::Reference,
            103 => Self::Char16,
            _ => return None,
        })
    }

    fn code(self) -> u32 {
        match self {
            Self::Void => 0,
            Self::Sint16 => 2,
            Self::Sint32 => 3,
            Self::Real32 => 4,
            Self::Real64 => 5,
            Self::String => 8,
            Self::Boolean => 11,
            Self::Object => 13,
            Self::Sint8 => 16,
            Self::Uint8 => 17,
            Self::Uint16 => 18,
            Self::Uint32 => 19,
            Self::Sint64 => 20,
            Self::Uint64 => 21,
            Self::Datetime => 101,
            Self::Reference => 102,
            Self::Char16 => 103,
        }
    }
}

/// A decoded type tag: a basic kind plus the array flag
#[derive(Debug, Clone, Copy, Eq, Serialize)]
pub struct TypeTag {
    #[serde(rename = "basic_type")]
    pub basic: BasicKind,
    pub is_array: bool,
}

impl TypeTag {
    pub fn scalar(basic: BasicKind) -> Self {
        Self {
            basic,
            is_array: false,
        }
    }

    /// Decode a 32-bit type tag, stripping the array flag (C1)
    pub fn from_u32(raw: u32, offset: u32) -> Result<Self> {
        let is_array = raw & ARRAY_FLAG != 0;
        let code = raw & !ARRAY_FLAG;
        let basic = BasicKind::from_code(code).ok_or(Error::InvalidType { code, offset })?;
        Ok(Self { basic, is_array })
    }

    pub fn as_u32(self) -> u32 {
        let mut value = self.basic.code();
        if self.is_array {
            value |= ARRAY_FLAG;
        }
        value
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.basic == other.basic && self.is_array == other.is_array
    }
}

/// `TypeTag{k, false} == BasicKind k` (spec.md §3/§8)
impl PartialEq<BasicKind> for TypeTag {
    fn eq(&self, other: &BasicKind) -> bool {
        !self.is_array && self.basic == *other
    }
}

impl PartialEq<TypeTag> for BasicKind {
    fn eq(&self, other: &TypeTag) -> bool {
        other == self
    }
}
