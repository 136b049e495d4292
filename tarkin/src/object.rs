//! Object parser (C8) and reserved-property views

use crate::array::read_array;
use crate::error::{Error, Result};
use crate::heap::{Cursor, HeapRef};
use crate::method::{self, Method};
use crate::property::{self, Property};
use crate::qualifier::{self, Qualifier};
use crate::value::Value;
use serde::Serialize;

/// Whether an object describes a class definition or a class instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WmiObjectType {
    Class,
    Instance,
}

impl WmiObjectType {
    fn from_u32(raw: u32, offset: u32) -> Result<Self> {
        match raw {
            0 => Ok(Self::Class),
            1 => Ok(Self::Instance),
            _ => Err(Error::InvalidType { code: raw, offset }),
        }
    }
}

/// A WMI class or instance: a bag of qualifiers, properties, and methods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
    pub object_type: WmiObjectType,
    pub qualifiers: Option<Vec<Qualifier>>,
    pub properties: Option<Vec<Property>>,
    pub methods: Option<Vec<Method>>,
}

impl Object {
    /// Parse one object at the cursor's current position (C8)
    ///
    /// Layout: `length: u32 (self-inclusive), qualifiers_offset: u32,
    /// properties_offset: u32, methods_offset: u32, object_type: u32,
    /// <heap bytes>`.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Object> {
        let start = cursor.position();

        let length = require_u32(cursor)?;
        let qualifiers_offset = require_u32(cursor)?;
        let properties_offset = require_u32(cursor)?;
        let methods_offset = require_u32(cursor)?;
        let object_type_raw = require_u32(cursor)?;
        let object_type = WmiObjectType::from_u32(object_type_raw, start + 16)?;
        let heap_base = cursor.position();

        let buffer = cursor.buffer();
        let buffer_len = buffer.len() as u32;

        let qualifiers = match HeapRef(qualifiers_offset).resolve(heap_base) {
            Some(pos) => {
                bounds_check(pos, buffer_len)?;
                let mut qualifiers_cursor = Cursor::at(buffer, pos);
                Some(read_array(&mut qualifiers_cursor, qualifier::parse)?)
            }
            None => None,
        };

        let raw_properties = match HeapRef(properties_offset).resolve(heap_base) {
            Some(pos) => {
                bounds_check(pos, buffer_len)?;
                let mut properties_cursor = Cursor::at(buffer, pos);
                Some(read_array(&mut properties_cursor, property::parse)?)
            }
            None => None,
        };

        let methods = match HeapRef(methods_offset).resolve(heap_base) {
            Some(pos) => {
                bounds_check(pos, buffer_len)?;
                let mut methods_cursor = Cursor::at(buffer, pos);
                let raw_methods: Vec<Property> =
                    read_array(&mut methods_cursor, property::parse)?;
                let mut methods = Vec::with_capacity(raw_methods.len());
                for raw in raw_methods {
                    methods.push(method::lift(raw, pos)?);
                }
                Some(methods)
            }
            None => None,
        };

        cursor.jump(start + length);

        Ok(Object {
            object_type,
            qualifiers,
            properties: raw_properties,
            methods,
        })
    }

    /// Look up a property by name among `self.properties` (reserved names
    /// are ordinary properties; there is no separate metadata table)
    fn property(&self, name: &str) -> Option<&Property> {
        self.properties.as_ref()?.iter().find(|p| p.name == name)
    }

    fn property_string(&self, name: &str) -> Option<&str> {
        match self.property(name)?.value.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn property_int(&self, name: &str) -> Option<i128> {
        match self.property(name)?.value.as_ref()? {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// `__CLASS` reserved property
    pub fn name(&self) -> Option<&str> {
        self.property_string("__CLASS")
    }

    /// `__NAMESPACE` reserved property
    pub fn namespace(&self) -> Option<&str> {
        self.property_string("__NAMESPACE")
    }

    /// `__SUPERCLASS` reserved property
    pub fn superclass(&self) -> Option<&str> {
        self.property_string("__SUPERCLASS")
    }

    /// `__CLASSFLAGS` reserved property
    pub fn class_flags(&self) -> Option<i128> {
        self.property_int("__CLASSFLAGS")
    }

    /// `__INSTANCEFLAGS` reserved property
    pub fn instance_flags(&self) -> Option<i128> {
        self.property_int("__INSTANCEFLAGS")
    }

    /// Properties excluding the reserved `__`-prefixed metadata fields
    pub fn variables(&self) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .flatten()
            .filter(|p| !is_reserved_name(&p.name))
    }
}

fn is_reserved_name(name: &str) -> bool {
    matches!(
        name,
        "__CLASS" | "__NAMESPACE" | "__SUPERCLASS" | "__CLASSFLAGS" | "__INSTANCEFLAGS"
    )
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
