// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Miscellaneous string utilities

use super::string_arg;
use crate::engine::{native_fn, Value};
use crate::error::HostError;
use std::collections::HashMap;

/// Create the util module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "uppercase".to_string(),
        native_fn("uppercase", |args| {
            if args.len() != 1 {
                return Err(HostError::type_error("uppercase() requires 1 argument"));
            }
            let s = string_arg(args, 0, "argument")?;
            Ok(Value::String(s.to_uppercase()))
        }),
    );

    Value::Object(exports)
}
