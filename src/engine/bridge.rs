// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serialized entry into the interpreter
//!
//! The interpreter is single-threaded and non-reentrant, so every call from
//! a native thread into script code must pass through one global lock. That
//! lock is deliberately distinct from the timer pool's lock: a slow callback
//! must not block unrelated timers from being scheduled, cancelled, or from
//! timing their own waits. No thread may hold both locks across a blocking
//! wait.

use crate::engine::{NativeFunction, Value};
use crate::error::{HostError, Result};
use parking_lot::Mutex;

/// The single serialization point for all native → script calls.
///
/// One bridge exists per [`crate::Host`], created at module load and dropped
/// only at shutdown.
pub struct EngineBridge {
    inner: Mutex<Engine>,
}

impl EngineBridge {
    /// Create the bridge around a fresh interpreter handle
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Engine { calls_made: 0 }),
        }
    }

    /// Run `f` with exclusive access to the interpreter.
    ///
    /// Scoped acquisition: the lock is released on every exit path,
    /// including an early return or panic inside `f`.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        let mut engine = self.inner.lock();
        f(&mut engine)
    }
}

impl Default for EngineBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive handle to the interpreter, only reachable through
/// [`EngineBridge::with_engine`]
pub struct Engine {
    calls_made: u64,
}

impl Engine {
    /// Invoke a script callable with the given arguments.
    ///
    /// An error raised by the callable comes back as
    /// [`HostError::Callback`]; callers at asynchronous boundaries log it
    /// and carry on.
    pub fn call(&mut self, func: &NativeFunction, args: &[Value]) -> Result<Value> {
        self.calls_made += 1;
        func.invoke(args)
            .map_err(|e| HostError::Callback(e.to_string()))
    }

    /// Total calls dispatched into the interpreter since load
    pub fn calls_made(&self) -> u64 {
        self.calls_made
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::native_fn;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_calls_are_serialized() {
        let bridge = Arc::new(EngineBridge::new());
        let cb = native_fn("tick", |_| Ok(Value::Undefined));
        let Value::Function(cb) = cb else { unreachable!() };

        let mut handles = Vec::new();
        for _ in 0..8 {
            let bridge = Arc::clone(&bridge);
            let cb = cb.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    bridge.with_engine(|e| e.call(&cb, &[]).unwrap());
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(bridge.with_engine(|e| e.calls_made()), 800);
    }

    #[test]
    fn test_callback_error_is_surfaced_not_panicked() {
        let bridge = EngineBridge::new();
        let bad = NativeFunction::new("boom", |_| {
            Err(HostError::Generic("exploded".to_string()))
        });
        let err = bridge.with_engine(|e| e.call(&bad, &[])).unwrap_err();
        assert!(matches!(err, HostError::Callback(_)));
    }
}
