// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in native modules
//!
//! Each module adapts a host capability to the engine's calling
//! convention: argument marshalling in front, one library call behind.

pub mod fs;
pub mod libc;
pub mod math;
pub mod path;
pub mod request;
pub mod util;
pub mod watch;
pub mod yaml;

use crate::engine::bridge::EngineBridge;
use crate::engine::Value;
use crate::error::{HostError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Create all native module exports
pub fn create_native_modules(bridge: &Arc<EngineBridge>) -> HashMap<String, Value> {
    let mut modules = HashMap::new();

    modules.insert("fs".to_string(), fs::create_module());
    modules.insert("libc".to_string(), libc::create_module());
    modules.insert("path".to_string(), path::create_module());
    modules.insert("math".to_string(), math::create_module());
    modules.insert("util".to_string(), util::create_module());
    modules.insert("yaml".to_string(), yaml::create_module());
    modules.insert("request".to_string(), request::create_module());

    // the watcher calls back into scripts, so it needs the bridge
    modules.insert("watch".to_string(), watch::create_module(bridge));

    modules
}

pub(crate) fn string_arg(args: &[Value], index: usize, what: &str) -> Result<String> {
    args.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| HostError::type_error(format!("{what} must be a string")))
}

pub(crate) fn number_arg(args: &[Value], index: usize, what: &str) -> Result<f64> {
    args.get(index)
        .and_then(Value::as_number)
        .ok_or_else(|| HostError::type_error(format!("{what} must be a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_every_module() {
        let bridge = Arc::new(EngineBridge::new());
        let modules = create_native_modules(&bridge);
        for name in ["fs", "libc", "path", "math", "util", "yaml", "request", "watch"] {
            let module = modules.get(name).unwrap_or_else(|| panic!("missing {name}"));
            assert!(module.as_object().is_some(), "{name} is not an object");
        }
    }

    #[test]
    fn test_arg_helpers() {
        let args = [Value::from("x"), Value::Number(2.0)];
        assert_eq!(string_arg(&args, 0, "path").unwrap(), "x");
        assert_eq!(number_arg(&args, 1, "n").unwrap(), 2.0);
        assert!(string_arg(&args, 1, "path").is_err());
        assert!(number_arg(&args, 2, "n").is_err());
    }
}
