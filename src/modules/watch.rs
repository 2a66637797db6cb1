// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-file change monitor
//!
//! Watches one file at a time and reports `("initial", size)` once, then
//! `("modified", size)` whenever the size changes and `("deleted", -1)` when
//! the file disappears, at which point the monitor stops itself. Callback
//! invocations route through the engine bridge like every other native to
//! script call.

use super::string_arg;
use crate::engine::bridge::EngineBridge;
use crate::engine::{native_fn, NativeFunction, Value};
use crate::error::{HostError, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Create the watch module exports
pub fn create_module(bridge: &Arc<EngineBridge>) -> Value {
    let monitor = Arc::new(FileMonitor::new(Arc::clone(bridge)));
    let mut exports = HashMap::new();

    let m = Arc::clone(&monitor);
    exports.insert(
        "watch".to_string(),
        native_fn("watch", move |args| {
            let path = string_arg(args, 0, "path")?;
            let callback = args
                .get(1)
                .and_then(Value::as_function)
                .cloned()
                .ok_or_else(|| HostError::type_error("callback must be a function"))?;
            m.watch(path, callback)?;
            Ok(Value::Undefined)
        }),
    );

    let m = monitor;
    exports.insert(
        "stop".to_string(),
        native_fn("stop", move |_| {
            m.stop();
            Ok(Value::Undefined)
        }),
    );

    Value::Object(exports)
}

/// Owns at most one monitor thread at a time
pub struct FileMonitor {
    bridge: Arc<EngineBridge>,
    current: Mutex<Option<MonitorHandle>>,
}

struct MonitorHandle {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

impl FileMonitor {
    /// Create a monitor reporting through `bridge`
    pub fn new(bridge: Arc<EngineBridge>) -> Self {
        Self {
            bridge,
            current: Mutex::new(None),
        }
    }

    /// Start watching `path`, replacing any running monitor.
    ///
    /// Fails synchronously if the file cannot be stat'ed or the watcher
    /// backend refuses the path.
    pub fn watch(&self, path: String, callback: NativeFunction) -> Result<()> {
        self.stop();

        let meta = fs::metadata(&path).map_err(|e| HostError::fs("watch", path.clone(), e))?;
        let initial_size = meta.len();

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        watcher.watch(Path::new(&path), RecursiveMode::NonRecursive)?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread = thread::Builder::new()
            .name("file-monitor".to_string())
            .spawn({
                let bridge = Arc::clone(&self.bridge);
                let stop = Arc::clone(&stop);
                move || run_monitor(watcher, rx, bridge, path, callback, initial_size, stop)
            })
            .map_err(HostError::ThreadCreation)?;

        *self.current.lock() = Some(MonitorHandle { stop, thread });
        Ok(())
    }

    /// Stop the running monitor, if any, and wait for its thread to exit
    pub fn stop(&self) {
        if let Some(handle) = self.current.lock().take() {
            handle.stop.store(true, Ordering::SeqCst);
            let _ = handle.thread.join();
        }
    }
}

impl Drop for FileMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_monitor(
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<notify::Event>>,
    bridge: Arc<EngineBridge>,
    path: String,
    callback: NativeFunction,
    mut last_size: u64,
    stop: Arc<AtomicBool>,
) {
    notify_script(&bridge, &callback, "initial", last_size as i64);

    while !stop.load(Ordering::SeqCst) {
        // short timeout so the stop flag is observed promptly
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(Ok(_event)) => match fs::metadata(&path) {
                Ok(meta) => {
                    if meta.len() != last_size {
                        last_size = meta.len();
                        notify_script(&bridge, &callback, "modified", last_size as i64);
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    notify_script(&bridge, &callback, "deleted", -1);
                    break;
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "stat failed after change event");
                }
            },
            Ok(Err(err)) => {
                tracing::error!(path = %path, error = %err, "file watcher failed");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::debug!(path = %path, "file monitor exited");
}

fn notify_script(bridge: &EngineBridge, callback: &NativeFunction, event: &str, size: i64) {
    bridge.with_engine(|engine| {
        if let Err(err) = engine.call(callback, &[Value::from(event), Value::from(size)]) {
            tracing::error!(error = %err, "file change callback raised an error");
        }
    });
}
