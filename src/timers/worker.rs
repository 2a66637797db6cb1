// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-timer worker thread
//!
//! Each live timer is driven by one detached OS thread running the state
//! machine `WAITING -> FIRING -> (RESCHEDULE -> WAITING) | TERMINATED`.
//! The thread waits under the pool lock, fires under the engine lock, and
//! never holds both across a blocking wait. Whatever path it exits on, it
//! releases its own slot.

use crate::engine::bridge::EngineBridge;
use crate::engine::stash::CallbackStash;
use crate::timers::pool::TimerPool;
use std::sync::Arc;
use std::time::Instant;

enum WaitOutcome {
    /// Deadline elapsed; proceed to fire
    Fire { repeat: bool },
    /// Cancellation observed (or the slot is no longer ours); skip firing
    Cancelled,
}

/// Drive one timer slot to completion.
pub(crate) fn run(
    pool: Arc<TimerPool>,
    bridge: Arc<EngineBridge>,
    stash: Arc<CallbackStash>,
    id: u32,
    generation: u64,
) {
    tracing::debug!(timer = id, generation, "timer thread started");

    loop {
        match wait_for_deadline(&pool, id, generation) {
            WaitOutcome::Cancelled => break,
            WaitOutcome::Fire { repeat } => {
                if !fire(&bridge, &stash, id) {
                    // registration gone: lost a race with cancellation
                    break;
                }
                if !repeat {
                    pool.deactivate(id);
                    stash.remove(id);
                    break;
                }
                // repeating: loop back with a fresh deadline; elapsed
                // callback time is not subtracted, so each period starts
                // after the previous fire completes
            }
        }
    }

    pool.release(id, generation);
    tracing::debug!(timer = id, generation, "timer thread exited");
}

/// Wait out one delay period under the pool lock.
///
/// The deadline is absolute (`now + delay`, computed on entry) so spurious
/// wakeups resume waiting toward the same instant instead of restarting the
/// full delay.
fn wait_for_deadline(pool: &TimerPool, id: u32, generation: u64) -> WaitOutcome {
    let index = (id - 1) as usize;
    let mut slots = pool.lock();

    if !slots[index].in_use || slots[index].generation != generation || !slots[index].active {
        return WaitOutcome::Cancelled;
    }
    let Some(cond) = slots[index].cond.clone() else {
        return WaitOutcome::Cancelled;
    };
    let deadline = Instant::now() + slots[index].delay;

    loop {
        let result = cond.wait_until(&mut slots, deadline);
        let slot = &slots[index];
        if !slot.in_use || slot.generation != generation || !slot.active {
            return WaitOutcome::Cancelled;
        }
        if result.timed_out() {
            return WaitOutcome::Fire { repeat: slot.repeat };
        }
        // spurious wakeup while still active: keep waiting
    }
}

/// Invoke the stashed callback under the engine lock.
///
/// Returns false when the registration has been removed. An error raised by
/// the callback is logged and swallowed; it must not take down this thread,
/// the interpreter, or pool bookkeeping.
fn fire(bridge: &EngineBridge, stash: &CallbackStash, id: u32) -> bool {
    bridge.with_engine(|engine| {
        let Some(registration) = stash.get(id) else {
            return false;
        };
        if let Err(err) = engine.call(&registration.callback, &registration.args) {
            tracing::error!(timer = id, error = %err, "timer callback raised an error");
        }
        true
    })
}
