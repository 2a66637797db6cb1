// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arithmetic helpers exposed to scripts

use super::number_arg;
use crate::engine::{native_fn, Value};
use crate::error::{HostError, Result};
use std::collections::HashMap;

/// Create the math module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "add".to_string(),
        native_fn("add", |args| binary_op("add", args, |a, b| a + b)),
    );
    exports.insert(
        "multiply".to_string(),
        native_fn("multiply", |args| binary_op("multiply", args, |a, b| a * b)),
    );

    Value::Object(exports)
}

fn binary_op(name: &str, args: &[Value], op: impl Fn(f64, f64) -> f64) -> Result<Value> {
    if args.len() != 2 {
        return Err(HostError::type_error(format!(
            "{name}() requires 2 arguments"
        )));
    }
    let a = number_arg(args, 0, "argument")?;
    let b = number_arg(args, 1, "argument")?;
    Ok(Value::Number(op(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(module: &Value, name: &str, args: &[Value]) -> Result<Value> {
        module.as_object().unwrap()[name]
            .as_function()
            .unwrap()
            .invoke(args)
    }

    #[test]
    fn test_add_and_multiply() {
        let m = create_module();
        assert_eq!(
            call(&m, "add", &[Value::Number(2.0), Value::Number(3.5)]).unwrap(),
            Value::Number(5.5)
        );
        assert_eq!(
            call(&m, "multiply", &[Value::Number(4.0), Value::Number(2.5)]).unwrap(),
            Value::Number(10.0)
        );
    }

    #[test]
    fn test_arity_and_type_errors() {
        let m = create_module();
        assert!(call(&m, "add", &[Value::Number(1.0)]).is_err());
        assert!(call(&m, "multiply", &[Value::from("x"), Value::Number(1.0)]).is_err());
    }
}
