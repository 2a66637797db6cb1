// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback registrations keyed by timer id
//!
//! A firing worker thread must never carry interpreter call-stack state
//! across a thread boundary, so the callback and its captured arguments are
//! parked here, addressable by the slot identity, and looked up again at
//! fire time. A lookup that comes back empty means the registration was
//! removed by a concurrent cancel; that is a lost race, not an error.

use crate::engine::{NativeFunction, Value};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A callback plus the extra arguments captured at schedule time
#[derive(Clone)]
pub struct Registration {
    /// The script callback to fire
    pub callback: NativeFunction,
    /// Extra arguments passed after the delay at schedule time
    pub args: Vec<Value>,
}

/// Scheduler-owned storage for timer callback registrations
#[derive(Default)]
pub struct CallbackStash {
    entries: Mutex<HashMap<u32, Registration>>,
}

impl CallbackStash {
    /// Create an empty stash
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the callback for a timer id
    pub fn insert(&self, id: u32, registration: Registration) {
        self.entries.lock().insert(id, registration);
    }

    /// Fetch a clone of the registration, leaving it in place so a
    /// repeating timer can fire again
    pub fn get(&self, id: u32) -> Option<Registration> {
        self.entries.lock().get(&id).cloned()
    }

    /// Drop the registration; no-op if it was already removed
    pub fn remove(&self, id: u32) {
        self.entries.lock().remove(&id);
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no registrations are held
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::native_fn;

    fn registration() -> Registration {
        let Value::Function(callback) = native_fn("cb", |_| Ok(Value::Undefined)) else {
            unreachable!()
        };
        Registration {
            callback,
            args: vec![Value::Number(1.0)],
        }
    }

    #[test]
    fn test_insert_get_remove() {
        let stash = CallbackStash::new();
        stash.insert(7, registration());
        assert!(stash.get(7).is_some());
        // interval semantics: a lookup does not consume the entry
        assert!(stash.get(7).is_some());
        stash.remove(7);
        assert!(stash.get(7).is_none());
        assert!(stash.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let stash = CallbackStash::new();
        stash.remove(42);
        stash.remove(42);
        assert_eq!(stash.len(), 0);
    }
}
