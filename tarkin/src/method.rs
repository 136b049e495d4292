//! Method reconstruction (C9)
//!
//! BMOF has no dedicated method wire format: a method is stored as an
//! ordinary [`Property`] shaped one of two ways —
//!
//! - a scalar `VOID` property with no value: a parameterless method with no
//!   return value, or
//! - an array-of-`OBJECT` property whose value holds zero, one, or two child
//!   `Instance` objects named by convention `__PARAMETERS` (conventionally
//!   one per direction: in-parameters and out-parameters).
//!
//! [`lift`] fuses that shape back into a single [`Method`], keying the two
//! child objects' properties by name and special-casing `ReturnValue` as the
//! method's return type rather than a parameter.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::object::{Object, WmiObjectType};
use crate::property::Property;
use crate::qualifier::Qualifier;
use crate::type_tag::{BasicKind, TypeTag};
use crate::value::Value;
use serde::Serialize;

/// A reconstructed WMI method: parameters and return type fused from the
/// method's underlying `__PARAMETERS` child objects (C9)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub parameters: Option<Vec<Property>>,
    pub qualifiers: Option<Vec<Qualifier>>,
    #[serde(rename = "return_type")]
    pub return_type: TypeTag,
}

/// Lift a parsed method-shaped [`Property`] into a [`Method`] (C9)
///
/// `offset` is the position of the owning object's methods array, used to
/// anchor error reporting since the source property carries no offset of
/// its own.
pub fn lift(raw: Property, offset: u32) -> Result<Method> {
    let name = raw.name;

    if raw.data_type == BasicKind::Void {
        return Ok(Method {
            name,
            parameters: None,
            qualifiers: raw.qualifiers,
            return_type: TypeTag::scalar(BasicKind::Void),
        });
    }

    if raw.data_type.basic != BasicKind::Object || !raw.data_type.is_array {
        return Err(Error::MalformedMethod {
            reason: format!(
                "method property {name:?} has unsupported type {:?}",
                raw.data_type
            ),
            offset,
        });
    }

    let children = match raw.value {
        Some(Value::Array(items)) => items,
        None => Vec::new(),
        Some(_) => {
            return Err(Error::MalformedMethod {
                reason: format!("method property {name:?} value is not an object array"),
                offset,
            })
        }
    };

    if children.len() > 2 {
        return Err(Error::MalformedMethod {
            reason: format!(
                "method property {name:?} has {} __PARAMETERS objects, expected at most 2",
                children.len()
            ),
            offset,
        });
    }

    let mut parameters: Vec<Property> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut return_type = TypeTag::scalar(BasicKind::Void);

    for child in children {
        let object = match child {
            Value::Object(object) => *object,
            _ => {
                return Err(Error::MalformedMethod {
                    reason: format!("method property {name:?} parameter entry is not an object"),
                    offset,
                })
            }
        };

        if object.object_type != WmiObjectType::Instance {
            return Err(Error::MalformedMethod {
                reason: format!("__PARAMETERS object for method {name:?} must be an instance"),
                offset,
            });
        }
        if object.name() != Some("__PARAMETERS") {
            return Err(Error::MalformedMethod {
                reason: format!("__PARAMETERS object for method {name:?} has unexpected __CLASS"),
                offset,
            });
        }
        if object.qualifiers.as_ref().is_some_and(|q| !q.is_empty()) {
            return Err(Error::MalformedMethod {
                reason: format!("__PARAMETERS object for method {name:?} carries qualifiers"),
                offset,
            });
        }
        if object.methods.as_ref().is_some_and(|m| !m.is_empty()) {
            return Err(Error::MalformedMethod {
                reason: format!("__PARAMETERS object for method {name:?} carries methods"),
                offset,
            });
        }

        for property in object.variables().cloned().collect::<Vec<_>>() {
            let param_name = property.name.clone();

            if param_name == "ReturnValue" {
                return_type = property.data_type;
                continue;
            }

            match index_by_name.get(&param_name) {
                Some(&index) => {
                    if parameters[index].data_type != property.data_type {
                        return Err(Error::TypeMismatch {
                            parameter: param_name,
                            offset,
                        });
                    }
                    if parameters[index].value.is_some()
                        && property.value.is_some()
                        && parameters[index].value != property.value
                    {
                        return Err(Error::ValueMismatch {
                            parameter: param_name,
                            offset,
                        });
                    }
                    union_qualifiers(&mut parameters[index].qualifiers, property.qualifiers);
                }
                None => {
                    index_by_name.insert(param_name, parameters.len());
                    parameters.push(property);
                }
            }
        }
    }

    Ok(Method {
        name,
        parameters: if parameters.is_empty() {
            None
        } else {
            Some(parameters)
        },
        qualifiers: raw.qualifiers,
        return_type,
    })
}

/// Union `incoming`'s qualifiers into `existing` by name, first occurrence
/// winning on collision (`wmi_method.py::from_properties`)
fn union_qualifiers(existing: &mut Option<Vec<Qualifier>>, incoming: Option<Vec<Qualifier>>) {
    let Some(incoming) = incoming else { return };
    let target = existing.get_or_insert_with(Vec::new);
    for qualifier in incoming {
        if !target.iter().any(|q| q.name == qualifier.name) {
            target.push(qualifier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn void_property(name: &str) -> Property {
        Property {
            name: name.to_string(),
            data_type: TypeTag::scalar(BasicKind::Void),
            value: None,
            qualifiers: None,
        }
    }

    fn class_property(class_name: &str) -> Property {
        Property {
            name: "__CLASS".to_string(),
            data_type: TypeTag::scalar(BasicKind::String),
            value: Some(Value::String(class_name.to_string())),
            qualifiers: None,
        }
    }

    fn parameters_object(mut properties: Vec<Property>) -> Object {
        properties.insert(0, class_property("__PARAMETERS"));
        Object {
            object_type: WmiObjectType::Instance,
            qualifiers: None,
            properties: Some(properties),
            methods: None,
        }
    }

    fn int_property(name: &str, value: i128) -> Property {
        Property {
            name: name.to_string(),
            data_type: TypeTag::scalar(BasicKind::Sint32),
            value: Some(Value::Int(value)),
            qualifiers: None,
        }
    }

    #[test]
    fn void_method_has_no_parameters() {
        let method = lift(void_property("Reset"), 0).unwrap();
        assert_eq!(method.name, "Reset");
        assert_eq!(method.parameters, None);
        assert_eq!(method.return_type, BasicKind::Void);
    }

    #[test]
    fn fuses_in_and_out_parameter_objects_and_return_value() {
        let in_params = parameters_object(vec![int_property("Count", 1)]);
        let out_params = parameters_object(vec![
            int_property("Result", 0),
            Property {
                name: "ReturnValue".to_string(),
                data_type: TypeTag::scalar(BasicKind::Uint32),
                value: None,
                qualifiers: None,
            },
        ]);

        let raw = Property {
            name: "DoThing".to_string(),
            data_type: TypeTag {
                basic: BasicKind::Object,
                is_array: true,
            },
            value: Some(Value::Array(vec![
                Value::Object(Box::new(in_params)),
                Value::Object(Box::new(out_params)),
            ])),
            qualifiers: None,
        };

        let method = lift(raw, 0).unwrap();
        assert_eq!(method.name, "DoThing");
        assert_eq!(method.return_type, BasicKind::Uint32);
        let params = method.parameters.unwrap();
        assert_eq!(params.len(), 2);
        assert!(params.iter().any(|p| p.name == "Count"));
        assert!(params.iter().any(|p| p.name == "Result"));
    }

    fn qualifier(name: &str) -> Qualifier {
        Qualifier {
            name: name.to_string(),
            data_type: TypeTag::scalar(BasicKind::Boolean),
            value: Value::Bool(true),
            offset: 0,
        }
    }

    #[test]
    fn fusing_parameters_unions_qualifiers_first_occurrence_wins() {
        let mut first = int_property("Count", 1);
        first.qualifiers = Some(vec![qualifier("In"), qualifier("Shared")]);
        let in_params = parameters_object(vec![first]);

        let mut second = int_property("Count", 1);
        second.qualifiers = Some(vec![qualifier("Shared"), qualifier("Out")]);
        let out_params = parameters_object(vec![second]);

        let raw = Property {
            name: "DoThing".to_string(),
            data_type: TypeTag {
                basic: BasicKind::Object,
                is_array: true,
            },
            value: Some(Value::Array(vec![
                Value::Object(Box::new(in_params)),
                Value::Object(Box::new(out_params)),
            ])),
            qualifiers: None,
        };

        let method = lift(raw, 0).unwrap();
        let params = method.parameters.unwrap();
        assert_eq!(params.len(), 1);
        let names: Vec<&str> = params[0]
            .qualifiers
            .as_ref()
            .unwrap()
            .iter()
            .map(|q| q.name.as_str())
            .collect();
        assert_eq!(names, vec!["In", "Shared", "Out"]);
    }

    #[test]
    fn conflicting_parameter_types_are_rejected() {
        let in_params = parameters_object(vec![int_property("Flag", 1)]);
        let out_params = parameters_object(vec![Property {
            name: "Flag".to_string(),
            data_type: TypeTag::scalar(BasicKind::String),
            value: None,
            qualifiers: None,
        }]);

        let raw = Property {
            name: "Mixed".to_string(),
            data_type: TypeTag {
                basic: BasicKind::Object,
                is_array: true,
            },
            value: Some(Value::Array(vec![
                Value::Object(Box::new(in_params)),
                Value::Object(Box::new(out_params)),
            ])),
            qualifiers: None,
        };

        let err = lift(raw, 0).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn too_many_parameter_objects_is_malformed() {
        let raw = Property {
            name: "TooMany".to_string(),
            data_type: TypeTag {
                basic: BasicKind::Object,
                is_array: true,
            },
            value: Some(Value::Array(vec![
                Value::Object(Box::new(parameters_object(vec![]))),
                Value::Object(Box::new(parameters_object(vec![]))),
                Value::Object(Box::new(parameters_object(vec![]))),
            ])),
            qualifiers: None,
        };

        let err = lift(raw, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedMethod { .. }));
    }

    #[test]
    fn parameters_object_with_wrong_class_name_is_rejected() {
        let bad = Object {
            object_type: WmiObjectType::Instance,
            qualifiers: None,
            properties: Some(vec![class_property("NotParameters")]),
            methods: None,
        };

        let raw = Property {
            name: "Weird".to_string(),
            data_type: TypeTag {
                basic: BasicKind::Object,
                is_array: true,
            },
            value: Some(Value::Array(vec![Value::Object(Box::new(bad))])),
            qualifiers: None,
        };

        let err = lift(raw, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedMethod { .. }));
    }
}
