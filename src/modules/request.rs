// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous HTTP client for scripts
//!
//! `getSync` / `postSync` / `putSync` / `deleteSync` block the interpreter
//! until the transfer completes, mirroring the original binding. Responses
//! marshal as `{statusCode, body, headers}`.

use super::string_arg;
use crate::engine::{native_fn, Value};
use crate::error::{HostError, Result};
use std::collections::HashMap;
use std::time::Duration;

const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the request module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "getSync".to_string(),
        native_fn("getSync", |args| {
            let url = string_arg(args, 0, "url")?;
            let headers = headers_from_options(args.get(1))?;
            perform(Method::Get, &url, None, headers)
        }),
    );
    exports.insert(
        "postSync".to_string(),
        native_fn("postSync", |args| {
            let url = string_arg(args, 0, "url")?;
            let body = string_arg(args, 1, "body")?;
            let headers = headers_from_options(args.get(2))?;
            perform(Method::Post, &url, Some(body), headers)
        }),
    );
    exports.insert(
        "putSync".to_string(),
        native_fn("putSync", |args| {
            let url = string_arg(args, 0, "url")?;
            // body is optional, as in the original binding
            let body = args.get(1).and_then(Value::as_str).map(str::to_string);
            let headers = headers_from_options(args.get(2))?;
            perform(Method::Put, &url, body, headers)
        }),
    );
    exports.insert(
        "deleteSync".to_string(),
        native_fn("deleteSync", |args| {
            let url = string_arg(args, 0, "url")?;
            let headers = headers_from_options(args.get(1))?;
            perform(Method::Delete, &url, None, headers)
        }),
    );

    Value::Object(exports)
}

enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Extract `options.headers` into name/value pairs; non-scalar header
/// values are skipped
fn headers_from_options(options: Option<&Value>) -> Result<Vec<(String, String)>> {
    let opts = match options {
        None | Some(Value::Undefined) => return Ok(Vec::new()),
        Some(Value::Object(opts)) => opts,
        Some(_) => return Err(HostError::type_error("options must be an object")),
    };

    let mut pairs = Vec::new();
    if let Some(Value::Object(headers)) = opts.get("headers") {
        for (name, value) in headers {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            pairs.push((name.clone(), value));
        }
    }
    Ok(pairs)
}

fn perform(
    method: Method,
    url: &str,
    body: Option<String>,
    headers: Vec<(String, String)>,
) -> Result<Value> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TRANSFER_TIMEOUT)
        .build()?;

    let mut request = match method {
        Method::Get => client.get(url),
        Method::Post => client.post(url),
        Method::Put => client.put(url),
        Method::Delete => client.delete(url),
    };
    for (name, value) in headers {
        request = request.header(&name, &value);
    }
    if let Some(body) = body {
        request = request.body(body);
    }

    let response = request.send()?;
    let status = response.status().as_u16();
    let response_headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response.text()?;

    Ok(response_value(status, response_headers, body))
}

fn response_value(status: u16, headers: Vec<(String, String)>, body: String) -> Value {
    let mut header_map = HashMap::new();
    for (name, value) in headers {
        header_map.insert(name, Value::String(value));
    }

    let mut response = HashMap::new();
    response.insert("statusCode".to_string(), Value::Number(f64::from(status)));
    response.insert("body".to_string(), Value::String(body));
    response.insert("headers".to_string(), Value::Object(header_map));
    Value::Object(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_from_options() {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), Value::from("application/json"));
        headers.insert("X-Retry".to_string(), Value::Number(3.0));
        headers.insert("X-Skip".to_string(), Value::Array(vec![]));
        let mut opts = HashMap::new();
        opts.insert("headers".to_string(), Value::Object(headers));

        let mut pairs = headers_from_options(Some(&Value::Object(opts))).unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            [
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Retry".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_options_must_be_an_object() {
        assert!(headers_from_options(Some(&Value::from("nope"))).is_err());
        assert!(headers_from_options(None).unwrap().is_empty());
        assert!(headers_from_options(Some(&Value::Undefined)).unwrap().is_empty());
    }

    #[test]
    fn test_exports_every_verb() {
        let m = create_module();
        let exports = m.as_object().unwrap();
        for name in ["getSync", "postSync", "putSync", "deleteSync"] {
            assert!(exports[name].is_callable(), "missing {name}");
        }
        // every verb type-checks the url before touching the network
        for name in ["getSync", "postSync", "putSync", "deleteSync"] {
            let f = exports[name].as_function().unwrap();
            assert!(f.invoke(&[Value::Number(1.0)]).is_err(), "{name}");
        }
    }

    #[test]
    fn test_response_shape() {
        let value = response_value(
            201,
            vec![("content-type".to_string(), "text/plain".to_string())],
            "created".to_string(),
        );
        let response = value.as_object().unwrap();
        assert_eq!(response["statusCode"], Value::Number(201.0));
        assert_eq!(response["body"], Value::from("created"));
        assert_eq!(
            response["headers"].as_object().unwrap()["content-type"],
            Value::from("text/plain")
        );
    }
}
