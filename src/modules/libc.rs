// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-level helpers scripts cannot express themselves
//!
//! `arrtoip` formats a byte array as an IP address string. Invalid input
//! yields `undefined` rather than an error; device scripts probe address
//! fields of unknown shape and branch on the result.

use crate::engine::{native_fn, Value};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Create the libc module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "arrtoip".to_string(),
        native_fn("arrtoip", |args| {
            let Some(octets) = args.first().and_then(octets_from_value) else {
                return Ok(Value::Undefined);
            };
            Ok(arrtoip(&octets).map_or(Value::Undefined, Value::String))
        }),
    );

    Value::Object(exports)
}

/// Format 4 bytes as dotted-quad IPv4 or 16 bytes as RFC 5952 IPv6
pub fn arrtoip(octets: &[u8]) -> Option<String> {
    match *octets {
        [a, b, c, d] => Some(Ipv4Addr::new(a, b, c, d).to_string()),
        _ => {
            let bytes: [u8; 16] = octets.try_into().ok()?;
            Some(Ipv6Addr::from(bytes).to_string())
        }
    }
}

/// Array of numbers in `0..=255` as raw bytes; anything else is `None`
fn octets_from_value(value: &Value) -> Option<Vec<u8>> {
    let Value::Array(items) = value else {
        return None;
    };
    items
        .iter()
        .map(|item| {
            let n = item.as_number()?;
            (0.0..=255.0).contains(&n).then_some(n as u8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(args: &[Value]) -> Value {
        let m = create_module();
        let f = m.as_object().unwrap()["arrtoip"].as_function().unwrap().clone();
        f.invoke(args).unwrap()
    }

    #[test]
    fn test_ipv4() {
        let arg = Value::Array([192, 168, 1, 100].iter().map(|&b| Value::from(b as i64)).collect());
        assert_eq!(invoke(&[arg]), Value::from("192.168.1.100"));
    }

    #[test]
    fn test_ipv6_compresses_zero_runs() {
        let mut bytes = vec![0u8; 16];
        bytes[0] = 0x20;
        bytes[1] = 0x01;
        bytes[2] = 0x0d;
        bytes[3] = 0xb8;
        bytes[15] = 0x01;
        let arg = Value::Array(bytes.iter().map(|&b| Value::from(b as i64)).collect());
        assert_eq!(invoke(&[arg]), Value::from("2001:db8::1"));
    }

    #[test]
    fn test_invalid_input_yields_undefined() {
        // not an array
        assert_eq!(invoke(&[Value::from("10.0.0.1")]), Value::Undefined);
        // non-number element
        assert_eq!(
            invoke(&[Value::Array(vec![Value::from(1i64), Value::Null])]),
            Value::Undefined
        );
        // octet out of range
        assert_eq!(
            invoke(&[Value::Array(vec![Value::from(256i64); 4])]),
            Value::Undefined
        );
        // neither 4 nor 16 bytes
        assert_eq!(
            invoke(&[Value::Array(vec![Value::from(1i64); 5])]),
            Value::Undefined
        );
        // missing argument
        assert_eq!(invoke(&[]), Value::Undefined);
    }
}
