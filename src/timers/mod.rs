// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript-style timers on OS threads
//!
//! Fabricates `setTimeout` / `setInterval` / `clearTimeout` /
//! `clearInterval` semantics for scripts: a fixed pool of timer slots, one
//! detached worker thread per live timer, and callback registrations parked
//! in a stash the firing thread reads back by slot id. Scheduling and
//! cancellation are synchronous; firing is asynchronous and serialized
//! through the engine bridge.
//!
//! Cancellation is a request, not a guarantee: `clear_timer` returns before
//! the worker has necessarily observed the signal, and a callback already
//! past its wait completes that one firing.

pub mod pool;
mod worker;

pub use self::pool::{MAX_DELAY_MS, MAX_TIMERS, MIN_DELAY_MS};

use crate::engine::bridge::EngineBridge;
use crate::engine::stash::{CallbackStash, Registration};
use crate::engine::{native_fn, Value};
use crate::error::{HostError, Result};
use self::pool::TimerPool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The four public scheduling operations
pub struct TimerScheduler {
    pool: Arc<TimerPool>,
    bridge: Arc<EngineBridge>,
    stash: Arc<CallbackStash>,
}

impl TimerScheduler {
    /// Create a scheduler firing callbacks through `bridge`
    pub fn new(bridge: Arc<EngineBridge>) -> Self {
        Self {
            pool: Arc::new(TimerPool::new()),
            bridge,
            stash: Arc::new(CallbackStash::new()),
        }
    }

    /// `setTimeout(callback, delayMs, ...args)`: fire once after the delay
    pub fn set_timeout(&self, callback: Value, delay_ms: i64, args: Vec<Value>) -> Result<u32> {
        self.schedule(callback, delay_ms, args, false)
    }

    /// `setInterval(callback, delayMs, ...args)`: fire repeatedly
    pub fn set_interval(&self, callback: Value, delay_ms: i64, args: Vec<Value>) -> Result<u32> {
        self.schedule(callback, delay_ms, args, true)
    }

    fn schedule(
        &self,
        callback: Value,
        delay_ms: i64,
        args: Vec<Value>,
        repeat: bool,
    ) -> Result<u32> {
        let Value::Function(callback) = callback else {
            return Err(HostError::type_error("callback must be a function"));
        };
        if delay_ms < 0 || delay_ms > MAX_DELAY_MS as i64 {
            return Err(HostError::range_error(format!(
                "delay must be between 0 and {MAX_DELAY_MS} ms"
            )));
        }
        // zero-delay timers busy-wait the interpreter; hold them to a floor
        let delay_ms = if delay_ms == 0 {
            MIN_DELAY_MS
        } else {
            delay_ms as u64
        };

        let lease = self.pool.allocate(repeat, Duration::from_millis(delay_ms))?;
        self.stash.insert(lease.id, Registration { callback, args });

        let spawned = thread::Builder::new()
            .name(format!("timer-{}", lease.id))
            .spawn({
                let pool = Arc::clone(&self.pool);
                let bridge = Arc::clone(&self.bridge);
                let stash = Arc::clone(&self.stash);
                move || worker::run(pool, bridge, stash, lease.id, lease.generation)
            });

        match spawned {
            // detached: the worker frees its own slot on exit
            Ok(_handle) => Ok(lease.id),
            Err(err) => {
                self.stash.remove(lease.id);
                self.pool.release(lease.id, lease.generation);
                Err(HostError::ThreadCreation(err))
            }
        }
    }

    /// `clearTimeout(timerId)` / `clearInterval(timerId)`.
    ///
    /// Range-checked; a valid id that is free or already completed is a
    /// silent no-op. Returns without waiting for the worker to exit.
    pub fn clear_timer(&self, timer_id: i64) -> Result<()> {
        if timer_id < 1 || timer_id > MAX_TIMERS as i64 {
            return Err(HostError::range_error(format!(
                "invalid timerId: {timer_id}"
            )));
        }
        let id = timer_id as u32;
        self.pool.deactivate(id);
        self.stash.remove(id);
        Ok(())
    }

    /// Number of live timers
    pub fn active_timers(&self) -> usize {
        self.pool.count_in_use()
    }

    /// Cooperative drain: block until every worker has torn itself down.
    ///
    /// Best effort only: a repeating timer that was never cleared keeps
    /// this waiting.
    pub fn shutdown(&self) {
        while self.pool.count_in_use() > 0 {
            thread::sleep(Duration::from_millis(5));
        }
    }
}

/// Coerce the script-side delay argument; non-numbers fall back to 0,
/// which the scheduler then lifts to the minimum delay
fn delay_arg(args: &[Value]) -> i64 {
    match args.get(1) {
        Some(Value::Number(n)) if n.is_finite() => *n as i64,
        _ => 0,
    }
}

fn timer_id_arg(args: &[Value]) -> Result<i64> {
    match args.first() {
        Some(Value::Number(n)) if n.is_finite() => Ok(*n as i64),
        _ => Err(HostError::type_error("timerId must be a number")),
    }
}

/// Create the global timer entry points bound to one scheduler
pub fn create_timer_functions(scheduler: &Arc<TimerScheduler>) -> Vec<(String, Value)> {
    let mut functions = Vec::new();

    let s = Arc::clone(scheduler);
    functions.push((
        "setTimeout".to_string(),
        native_fn("setTimeout", move |args| {
            let callback = args.first().cloned().unwrap_or_default();
            let extra = args.get(2..).map(<[Value]>::to_vec).unwrap_or_default();
            s.set_timeout(callback, delay_arg(args), extra)
                .map(|id| Value::Number(f64::from(id)))
        }),
    ));

    let s = Arc::clone(scheduler);
    functions.push((
        "setInterval".to_string(),
        native_fn("setInterval", move |args| {
            let callback = args.first().cloned().unwrap_or_default();
            let extra = args.get(2..).map(<[Value]>::to_vec).unwrap_or_default();
            s.set_interval(callback, delay_arg(args), extra)
                .map(|id| Value::Number(f64::from(id)))
        }),
    ));

    // clearTimeout and clearInterval share one implementation
    for name in ["clearTimeout", "clearInterval"] {
        let s = Arc::clone(scheduler);
        functions.push((
            name.to_string(),
            native_fn(name, move |args| {
                s.clear_timer(timer_id_arg(args)?)?;
                Ok(Value::Undefined)
            }),
        ));
    }

    functions
}
