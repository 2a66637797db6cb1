// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The engine binding interface
//!
//! The Ember interpreter itself is an external collaborator; this module
//! models only what crosses the boundary: marshalled [`Value`]s, callable
//! [`NativeFunction`]s, and the serialized entry point into the single
//! shared interpreter instance ([`bridge::EngineBridge`]).

pub mod bridge;
pub mod stash;

use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value marshalled between native code and the script engine
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number (scripts have a single numeric type)
    Number(f64),
    /// String
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Plain object
    Object(HashMap<String, Value>),
    /// A callable: either a native entry point handed to scripts, or a
    /// script callback handed to native code
    Function(NativeFunction),
}

impl Value {
    /// True when this value can be invoked
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Borrow as a string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a number, if this is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow as an object map, if this is one
    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Borrow as a callable, if this is one
    pub fn as_function(&self) -> Option<&NativeFunction> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            // Callables compare by identity
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(&a.func, &b.func),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Signature shared by native entry points and script callbacks
pub type CallableFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A named callable crossing the native/script boundary
#[derive(Clone)]
pub struct NativeFunction {
    name: &'static str,
    func: Arc<CallableFn>,
}

impl NativeFunction {
    /// Wrap a closure as a callable value
    pub fn new<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// The name the callable was registered under
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Build a function value in one line; module registration shorthand
pub fn native_fn<F>(name: &'static str, func: F) -> Value
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
{
    Value::Function(NativeFunction::new(name, func))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callable_detection() {
        assert!(!Value::Number(1.0).is_callable());
        assert!(native_fn("noop", |_| Ok(Value::Undefined)).is_callable());
    }

    #[test]
    fn test_function_identity_equality() {
        let f = native_fn("f", |_| Ok(Value::Undefined));
        let g = native_fn("f", |_| Ok(Value::Undefined));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(2i64), Value::Number(2.0));
        assert_eq!(Value::from("hi"), Value::String("hi".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
    }
}
