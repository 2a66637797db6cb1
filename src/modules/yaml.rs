// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! YAML parsing and emission for scripts
//!
//! Mappings keep string keys only; non-string keys are dropped during
//! marshalling, as in the original binding.

use super::string_arg;
use crate::engine::{native_fn, Value};
use crate::error::Result;
use std::collections::HashMap;

/// Create the yaml module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "load".to_string(),
        native_fn("load", |args| {
            let text = string_arg(args, 0, "text")?;
            load(&text)
        }),
    );
    exports.insert(
        "dump".to_string(),
        native_fn("dump", |args| {
            let value = args.first().cloned().unwrap_or_default();
            dump(&value).map(Value::String)
        }),
    );

    Value::Object(exports)
}

/// `yaml.load(text)`
pub fn load(text: &str) -> Result<Value> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(from_yaml(doc))
}

/// `yaml.dump(value)`
pub fn dump(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(&to_yaml(value))?)
}

fn from_yaml(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut object = HashMap::new();
            for (key, item) in map {
                if let serde_yaml::Value::String(key) = key {
                    object.insert(key, from_yaml(item));
                }
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        // callables and undefined have no YAML form
        Value::Undefined | Value::Null | Value::Function(_) => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(items) => serde_yaml::Value::Sequence(items.iter().map(to_yaml).collect()),
        Value::Object(object) => {
            let mut map = serde_yaml::Mapping::new();
            for (key, item) in object {
                map.insert(serde_yaml::Value::String(key.clone()), to_yaml(item));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_scalars_and_structures() {
        let doc = load("name: demo\nenabled: true\nretries: 3\nitems:\n  - a\n  - b\n").unwrap();
        let doc = doc.as_object().unwrap();
        assert_eq!(doc["name"], Value::from("demo"));
        assert_eq!(doc["enabled"], Value::Bool(true));
        assert_eq!(doc["retries"], Value::Number(3.0));
        assert_eq!(
            doc["items"],
            Value::Array(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_load_rejects_malformed_input() {
        assert!(load("key: [unclosed").is_err());
    }

    #[test]
    fn test_dump_roundtrip() {
        let mut object = HashMap::new();
        object.insert("host".to_string(), Value::from("localhost"));
        object.insert("port".to_string(), Value::Number(8080.0));
        let text = dump(&Value::Object(object)).unwrap();

        let back = load(&text).unwrap();
        let back = back.as_object().unwrap();
        assert_eq!(back["host"], Value::from("localhost"));
        assert_eq!(back["port"], Value::Number(8080.0));
    }

    #[test]
    fn test_callables_serialize_as_null() {
        let f = native_fn("f", |_| Ok(Value::Undefined));
        assert_eq!(dump(&f).unwrap().trim(), "null");
    }

    #[test]
    fn test_module_export_names() {
        let m = create_module();
        let exports = m.as_object().unwrap();
        assert!(exports["load"].is_callable());
        assert!(exports["dump"].is_callable());
    }
}
