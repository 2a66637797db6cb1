// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! POSIX-style path manipulation for scripts

use super::string_arg;
use crate::engine::{native_fn, Value};
use crate::error::Result;
use std::collections::HashMap;

/// Create the path module exports
pub fn create_module() -> Value {
    let mut exports = HashMap::new();

    exports.insert("sep".to_string(), Value::from("/"));

    exports.insert(
        "join".to_string(),
        native_fn("join", |args| {
            let segments = collect_strings(args)?;
            Ok(Value::String(join(&segments)))
        }),
    );
    exports.insert(
        "resolve".to_string(),
        native_fn("resolve", |args| {
            let segments = collect_strings(args)?;
            Ok(Value::String(resolve(&segments)))
        }),
    );
    exports.insert(
        "basename".to_string(),
        native_fn("basename", |args| {
            let p = string_arg(args, 0, "path")?;
            let ext = args.get(1).and_then(Value::as_str);
            Ok(Value::String(basename(&p, ext)))
        }),
    );
    exports.insert(
        "dirname".to_string(),
        native_fn("dirname", |args| {
            let p = string_arg(args, 0, "path")?;
            Ok(Value::String(dirname(&p)))
        }),
    );
    exports.insert(
        "extname".to_string(),
        native_fn("extname", |args| {
            let p = string_arg(args, 0, "path")?;
            Ok(Value::String(extname(&p)))
        }),
    );
    exports.insert(
        "normalize".to_string(),
        native_fn("normalize", |args| {
            let p = string_arg(args, 0, "path")?;
            Ok(Value::String(normalize(&p)))
        }),
    );
    exports.insert(
        "isAbsolute".to_string(),
        native_fn("isAbsolute", |args| {
            let p = string_arg(args, 0, "path")?;
            Ok(Value::Bool(is_absolute(&p)))
        }),
    );

    Value::Object(exports)
}

fn collect_strings(args: &[Value]) -> Result<Vec<String>> {
    args.iter()
        .enumerate()
        .map(|(i, _)| string_arg(args, i, "path segment"))
        .collect()
}

/// `path.join(...segments)`: concatenate and normalize
pub fn join(segments: &[String]) -> String {
    let joined = segments
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        ".".to_string()
    } else {
        normalize(&joined)
    }
}

/// `path.resolve(...segments)`: resolve to an absolute path, using the
/// process working directory as the base when no segment is absolute
pub fn resolve(segments: &[String]) -> String {
    let mut base = std::env::current_dir()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "/".to_string());
    for segment in segments {
        if is_absolute(segment) {
            base = segment.clone();
        } else if !segment.is_empty() {
            base.push('/');
            base.push_str(segment);
        }
    }
    normalize(&base)
}

/// `path.basename(path[, ext])`
pub fn basename(path: &str, ext: Option<&str>) -> String {
    let trimmed = path.trim_end_matches('/');
    // all-slash input names the root itself
    if trimmed.is_empty() && path.starts_with('/') {
        return "/".to_string();
    }
    let name = trimmed.rsplit('/').next().unwrap_or("").to_string();
    match ext {
        Some(ext) if name.len() > ext.len() && name.ends_with(ext) => {
            name[..name.len() - ext.len()].to_string()
        }
        _ => name,
    }
}

/// `path.dirname(path)`
pub fn dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        return "/".to_string();
    }
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(pos) => trimmed[..pos].to_string(),
        None => ".".to_string(),
    }
}

/// `path.extname(path)`: the final extension, including the dot
pub fn extname(path: &str) -> String {
    let name = basename(path, None);
    match name.rfind('.') {
        // a leading dot marks a hidden file, not an extension
        Some(pos) if pos > 0 => name[pos..].to_string(),
        _ => String::new(),
    }
}

/// `path.isAbsolute(path)`
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// `path.normalize(path)`: collapse `.`, `..` and repeated separators
pub fn normalize(path: &str) -> String {
    let absolute = is_absolute(path);
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (absolute, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        let s = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join(&s(&["a", "b", "c"])), "a/b/c");
        assert_eq!(join(&s(&["/a", "..", "b"])), "/b");
        assert_eq!(join(&s(&["a", "", "b/"])), "a/b");
        assert_eq!(join(&[]), ".");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/foo/bar/baz.txt", None), "baz.txt");
        assert_eq!(basename("/foo/bar/baz.txt", Some(".txt")), "baz");
        assert_eq!(basename("/foo/bar/", None), "bar");
        assert_eq!(basename("plain", None), "plain");
        assert_eq!(basename("/", None), "/");
        assert_eq!(basename("///", None), "/");
        assert_eq!(basename("", None), "");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/foo/bar/baz.txt"), "/foo/bar");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("plain"), ".");
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname("///"), "/");
        assert_eq!(dirname(""), ".");
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("index.html"), ".html");
        assert_eq!(extname("archive.tar.gz"), ".gz");
        assert_eq!(extname(".bashrc"), "");
        assert_eq!(extname("no_ext"), "");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a/b/../c/./d"), "/a/c/d");
        assert_eq!(normalize("a//b///c"), "a/b/c");
        assert_eq!(normalize("../x"), "../x");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize(""), ".");
    }

    #[test]
    fn test_module_marshalling() {
        let m = create_module();
        let exports = m.as_object().unwrap();
        assert_eq!(exports["sep"], Value::from("/"));

        let join_fn = exports["join"].as_function().unwrap();
        assert_eq!(
            join_fn.invoke(&[Value::from("a"), Value::from("b")]).unwrap(),
            Value::from("a/b")
        );
        assert!(join_fn.invoke(&[Value::Number(1.0)]).is_err());
    }
}
