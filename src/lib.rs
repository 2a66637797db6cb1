// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # emberhost
//!
//! Native host bindings for the Ember embedded JavaScript engine.
//!
//! Each module adapts a host capability (filesystem access, HTTP
//! transfers, YAML parsing, file-change notification, timers) to the
//! engine's calling convention, registering named callables into a global
//! namespace or a module object:
//!
//! - `fs`, `path`, `math`, `util`, `yaml`, `request`, `watch`, `libc` module objects
//! - `setTimeout` / `setInterval` / `clearTimeout` / `clearInterval` globals
//!
//! The interpreter itself is an external collaborator: it is single-threaded
//! and non-reentrant, so every call from a native thread into script code is
//! serialized through one [`engine::bridge::EngineBridge`]. The timer
//! subsystem runs one detached OS thread per live timer over a fixed pool of
//! 100 slots; see [`timers`] for the wait/fire/reschedule protocol.
//!
//! ## Quick start
//!
//! ```rust
//! use emberhost::Host;
//!
//! let host = Host::new();
//! let globals = host.globals();          // timer entry points
//! let modules = host.native_modules();   // fs, path, yaml, ...
//! assert!(modules.contains_key("fs"));
//! host.shutdown();                       // drain in-flight timers
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod modules;
pub mod timers;

pub use engine::bridge::EngineBridge;
pub use engine::{NativeFunction, Value};
pub use error::{HostError, Result};
pub use timers::TimerScheduler;

use std::collections::HashMap;
use std::sync::Arc;

/// Version of the host bindings
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level owner of the binding state: one engine bridge and one timer
/// scheduler per embedded interpreter instance.
///
/// Created at module load; [`Host::shutdown`] is the orderly teardown at
/// process exit.
pub struct Host {
    bridge: Arc<EngineBridge>,
    scheduler: Arc<TimerScheduler>,
}

impl Host {
    /// Wire up a fresh bridge and scheduler
    pub fn new() -> Self {
        let bridge = Arc::new(EngineBridge::new());
        let scheduler = Arc::new(TimerScheduler::new(Arc::clone(&bridge)));
        Self { bridge, scheduler }
    }

    /// The serialization point for calls into the interpreter
    pub fn bridge(&self) -> &Arc<EngineBridge> {
        &self.bridge
    }

    /// The timer scheduler backing the global timer functions
    pub fn scheduler(&self) -> &Arc<TimerScheduler> {
        &self.scheduler
    }

    /// Entry points to register into the global namespace
    pub fn globals(&self) -> Vec<(String, Value)> {
        timers::create_timer_functions(&self.scheduler)
    }

    /// Module objects keyed by the name scripts import them under
    pub fn native_modules(&self) -> HashMap<String, Value> {
        modules::create_native_modules(&self.bridge)
    }

    /// Cooperative drain: wait for in-flight timers to self-terminate.
    ///
    /// Best effort; hangs if a repeating timer was never cleared.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}
