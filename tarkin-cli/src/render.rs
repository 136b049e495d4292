//! JSON rendering (C15)
//!
//! Converts a decoded [`tarkin::Root`] into the wire JSON shape documented
//! for this CLI: derived `name`/`namespace`/`superclass`/`classflags`/
//! `instanceflags` fields promoted to the top of each object, lowercase
//! flavor-flag names resolved onto each qualifier, and `TypeTag`s emitted
//! as `{basic_type, is_array}`. This is a distinct view over the core
//! tree, not the core tree's own `Serialize` impl — the library's derives
//! are for structural round-tripping, this is for the documented wire
//! contract.

use std::collections::{BTreeMap, HashSet};

use anyhow::{bail, Result};
use serde_json::{json, Value as Json};
use tarkin::{FlavorFlags, Method, Object, Property, Qualifier, Root, TypeTag, Value};

/// Render a decoded [`Root`] to its wire JSON shape
///
/// When `flavor_strict` is set, a flavor entry with no matching qualifier
/// offset anywhere in the tree is an error; otherwise it is logged via
/// `tracing::warn!` and rendering proceeds (the spec's default behavior).
pub fn render(root: &Root, flavor_strict: bool) -> Result<Json> {
    check_flavor_cross_references(root, flavor_strict)?;

    let flavors = root.flavors.clone().unwrap_or_default();
    let objects: Vec<Json> = root
        .objects
        .iter()
        .map(|object| render_object(object, &flavors))
        .collect();

    Ok(json!({ "objects": objects }))
}

fn check_flavor_cross_references(root: &Root, flavor_strict: bool) -> Result<()> {
    let Some(flavors) = &root.flavors else {
        return Ok(());
    };

    let mut known_offsets = HashSet::new();
    for object in &root.objects {
        collect_qualifier_offsets(object, &mut known_offsets);
    }

    let mut unmatched: Vec<u32> = flavors
        .keys()
        .filter(|offset| !known_offsets.contains(offset))
        .copied()
        .collect();
    unmatched.sort_unstable();

    if unmatched.is_empty() {
        return Ok(());
    }

    if flavor_strict {
        bail!(
            "flavor entries with no matching qualifier offset: {:?}",
            unmatched
        );
    }

    for offset in unmatched {
        tracing::warn!(offset, "flavor entry has no matching qualifier");
    }
    Ok(())
}

fn collect_qualifier_offsets(object: &Object, offsets: &mut HashSet<u32>) {
    for qualifier in object.qualifiers.iter().flatten() {
        offsets.insert(qualifier.offset);
    }
    for property in object.properties.iter().flatten() {
        collect_from_property(property, offsets);
    }
    for method in object.methods.iter().flatten() {
        for qualifier in method.qualifiers.iter().flatten() {
            offsets.insert(qualifier.offset);
        }
        for parameter in method.parameters.iter().flatten() {
            collect_from_property(parameter, offsets);
        }
    }
}

fn collect_from_property(property: &Property, offsets: &mut HashSet<u32>) {
    for qualifier in property.qualifiers.iter().flatten() {
        offsets.insert(qualifier.offset);
    }
    collect_from_value(property.value.as_ref(), offsets);
}

fn collect_from_value(value: Option<&Value>, offsets: &mut HashSet<u32>) {
    match value {
        Some(Value::Object(object)) => collect_qualifier_offsets(object, offsets),
        Some(Value::Array(items)) => {
            for item in items {
                collect_from_value(Some(item), offsets);
            }
        }
        _ => {}
    }
}

fn render_object(object: &Object, flavors: &BTreeMap<u32, FlavorFlags>) -> Json {
    json!({
        "name": object.name(),
        "object_type": match object.object_type {
            tarkin::WmiObjectType::Class => "class",
            tarkin::WmiObjectType::Instance => "instance",
        },
        "superclass": object.superclass(),
        "namespace": object.namespace(),
        // Raw SINT32, not a lowercase flag name: no flag/enum table is
        // grounded anywhere in the corpus for these two fields (see
        // DESIGN.md's C15 entry).
        "classflags": object.class_flags(),
        "instanceflags": object.instance_flags(),
        "qualifiers": object.qualifiers.as_ref().map(|qs| {
            qs.iter().map(|q| render_qualifier(q, flavors)).collect::<Vec<_>>()
        }),
        "properties": object.properties.as_ref().map(|ps| {
            ps.iter().map(|p| render_property(p, flavors)).collect::<Vec<_>>()
        }),
        "methods": object.methods.as_ref().map(|ms| {
            ms.iter().map(|m| render_method(m, flavors)).collect::<Vec<_>>()
        }),
    })
}

fn render_qualifier(qualifier: &Qualifier, flavors: &BTreeMap<u32, FlavorFlags>) -> Json {
    let flavor_names = flavors
        .get(&qualifier.offset)
        .map(|flags| flags.names())
        .filter(|names| !names.is_empty())
        .map(|names| Json::Array(names.into_iter().map(Json::from).collect()));

    json!({
        "name": qualifier.name,
        "type": render_type_tag(&qualifier.data_type),
        "value": render_value(&qualifier.value),
        "flavors": flavor_names,
    })
}

fn render_property(property: &Property, flavors: &BTreeMap<u32, FlavorFlags>) -> Json {
    json!({
        "name": property.name,
        "type": render_type_tag(&property.data_type),
        "value": property.value.as_ref().map(render_value),
        "qualifiers": property.qualifiers.as_ref().map(|qs| {
            qs.iter().map(|q| render_qualifier(q, flavors)).collect::<Vec<_>>()
        }),
    })
}

fn render_method(method: &Method, flavors: &BTreeMap<u32, FlavorFlags>) -> Json {
    json!({
        "name": method.name,
        "parameters": method.parameters.as_ref().map(|ps| {
            ps.iter().map(|p| render_property(p, flavors)).collect::<Vec<_>>()
        }),
        "qualifiers": method.qualifiers.as_ref().map(|qs| {
            qs.iter().map(|q| render_qualifier(q, flavors)).collect::<Vec<_>>()
        }),
        "return_type": render_type_tag(&method.return_type),
    })
}

fn render_type_tag(tag: &TypeTag) -> Json {
    serde_json::to_value(tag).unwrap_or(Json::Null)
}

fn render_value(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => i128_to_json(*i),
        Value::Real(r) => serde_json::Number::from_f64(*r).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::Object(object) => render_object(object, &BTreeMap::new()),
        Value::Array(items) => Json::Array(items.iter().map(render_value).collect()),
    }
}

fn i128_to_json(value: i128) -> Json {
    if let Ok(v) = i64::try_from(value) {
        Json::from(v)
    } else if let Ok(v) = u64::try_from(value) {
        Json::from(v)
    } else {
        Json::String(value.to_string())
    }
}
