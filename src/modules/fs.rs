// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous filesystem access for scripts
//!
//! Errors carry the script-visible operation name and the offending path,
//! mirroring how the engine reports host failures.

use super::string_arg;
use crate::engine::{native_fn, Value};
use crate::error::{HostError, Result};
use std::collections::HashMap;
use std::fs;
use std::time::UNIX_EPOCH;

/// Create the fs module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert(
        "readFileSync".to_string(),
        native_fn("readFileSync", |args| {
            let path = string_arg(args, 0, "path")?;
            read_file_sync(&path).map(Value::String)
        }),
    );
    exports.insert(
        "writeFileSync".to_string(),
        native_fn("writeFileSync", |args| {
            let path = string_arg(args, 0, "path")?;
            let data = string_arg(args, 1, "data")?;
            require_utf8_encoding(args.get(2))?;
            write_file_sync(&path, &data)?;
            Ok(Value::Undefined)
        }),
    );
    exports.insert(
        "readdirSync".to_string(),
        native_fn("readdirSync", |args| {
            let path = string_arg(args, 0, "path")?;
            let entries = readdir_sync(&path)?;
            Ok(Value::Array(entries.into_iter().map(Value::String).collect()))
        }),
    );
    exports.insert(
        "statSync".to_string(),
        native_fn("statSync", |args| {
            let path = string_arg(args, 0, "path")?;
            stat_sync(&path)
        }),
    );

    Value::Object(exports)
}

/// Only utf8 text is supported, as in the original binding
fn require_utf8_encoding(options: Option<&Value>) -> Result<()> {
    let Some(options) = options else {
        return Ok(());
    };
    match options {
        Value::Undefined => Ok(()),
        Value::Object(opts) => match opts.get("encoding").and_then(Value::as_str) {
            None | Some("utf8") => Ok(()),
            Some(other) => Err(HostError::type_error(format!(
                "only utf8 encoding is supported, got '{other}'"
            ))),
        },
        _ => Err(HostError::type_error("options must be an object")),
    }
}

/// `fs.readFileSync(path)`: whole file as a utf8 string
pub fn read_file_sync(path: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| HostError::fs("readFileSync", path, e))
}

/// `fs.writeFileSync(path, data)`: create or truncate, then write
pub fn write_file_sync(path: &str, data: &str) -> Result<()> {
    fs::write(path, data).map_err(|e| HostError::fs("writeFileSync", path, e))
}

/// `fs.readdirSync(path)`: entry names, dot entries excluded
pub fn readdir_sync(path: &str) -> Result<Vec<String>> {
    let dir = fs::read_dir(path).map_err(|e| HostError::fs("readdirSync", path, e))?;
    let mut names = Vec::new();
    for entry in dir {
        let entry = entry.map_err(|e| HostError::fs("readdirSync", path, e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// `fs.statSync(path)`: `{mode, size, mtime, isFile(), isDirectory()}`,
/// with the two predicates as callables closing over the stat result
pub fn stat_sync(path: &str) -> Result<Value> {
    let meta = fs::metadata(path).map_err(|e| HostError::fs("statSync", path, e))?;

    let mode = unix_mode(&meta);
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64());

    let is_file = meta.is_file();
    let is_dir = meta.is_dir();

    let mut stat = HashMap::new();
    stat.insert("mode".to_string(), Value::Number(f64::from(mode)));
    stat.insert("size".to_string(), Value::Number(meta.len() as f64));
    stat.insert("mtime".to_string(), Value::Number(mtime));
    stat.insert(
        "isFile".to_string(),
        native_fn("isFile", move |_| Ok(Value::Bool(is_file))),
    );
    stat.insert(
        "isDirectory".to_string(),
        native_fn("isDirectory", move |_| Ok(Value::Bool(is_dir))),
    );

    Ok(Value::Object(stat))
}

#[cfg(unix)]
fn unix_mode(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    meta.mode()
}

#[cfg(not(unix))]
fn unix_mode(_meta: &fs::Metadata) -> u32 {
    0
}
