//! Map form of the element tree.
//!
//! `{"node": {"-id": "xxx", "-uname": "c001n01"}}`: the root tag is the single
//! top-level key, attributes are `-`-prefixed strings, children are keyed by
//! tag and repeated tags become arrays. Empty elements are `""`.

use serde_json::Map;
use serde_json::Value;

use super::Element;
use crate::DocumentError;

const ATTR_PREFIX: char = '-';
const TEXT_KEY: &str = "#text";

pub(super) fn to_value(root: &Element) -> Value {
    let mut top = Map::new();
    top.insert(root.name.clone(), element_value(root));
    Value::Object(top)
}

fn element_value(element: &Element) -> Value {
    if element.attributes.is_empty() && element.children.is_empty() {
        return Value::String(String::new());
    }

    let mut map = Map::new();
    for (key, value) in &element.attributes {
        map.insert(format!("{ATTR_PREFIX}{key}"), Value::String(value.clone()));
    }
    for child in &element.children {
        let value = element_value(child);
        match map.get_mut(&child.name) {
            None => {
                map.insert(child.name.clone(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(map)
}

pub(super) fn from_value(value: Value) -> Result<Element, DocumentError> {
    let Value::Object(top) = value else {
        return Err(DocumentError::InvalidJson("top level must be an object".into()));
    };
    if top.len() != 1 {
        return Err(DocumentError::InvalidJson(format!(
            "expected exactly one root key, found {}",
            top.len()
        )));
    }
    let (name, body) = top.into_iter().next().ok_or(DocumentError::Empty)?;
    if matches!(body, Value::Array(_)) {
        return Err(DocumentError::MultipleRoots);
    }
    element_from(name, body)
}

fn element_from(
    name: String,
    value: Value,
) -> Result<Element, DocumentError> {
    let mut element = Element::new(name);
    let map = match value {
        Value::Object(map) => map,
        // text content, not part of the tree
        Value::String(_) | Value::Null => return Ok(element),
        other => {
            return Err(DocumentError::InvalidJson(format!(
                "<{}> must be an object or string, found {other}",
                element.name
            )))
        }
    };

    for (key, value) in map {
        if key == TEXT_KEY {
            continue;
        }
        if let Some(attr) = key.strip_prefix(ATTR_PREFIX) {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(DocumentError::InvalidJson(format!(
                        "attribute {attr} must be a scalar, found {other}"
                    )))
                }
            };
            element.attributes.insert(attr.to_string(), value);
            continue;
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    element.children.push(element_from(key.clone(), item)?);
                }
            }
            single => element.children.push(element_from(key, single)?),
        }
    }
    Ok(element)
}
