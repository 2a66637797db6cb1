// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-capacity timer slot pool
//!
//! Timer identities are 1-based slot indices, stable for the lifetime of an
//! allocation. One mutex guards every slot's bookkeeping fields; the only
//! blocking operation performed under it is the worker's timed condvar wait.

use crate::error::{HostError, Result};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;

/// Hard cap on concurrently live timers; bounds thread creation
pub const MAX_TIMERS: usize = 100;

/// Largest accepted delay, keeping millisecond arithmetic inside i32 range
pub const MAX_DELAY_MS: u64 = 2_147_483;

/// A requested delay of 0 is coerced up to this to avoid a degenerate
/// busy-wait
pub const MIN_DELAY_MS: u64 = 10;

/// One timer control block
pub(crate) struct Slot {
    /// Slot is allocated; the condvar is valid exactly while this holds
    pub in_use: bool,
    /// Cleared by cancellation or after a one-shot fire; in-use with
    /// active=false is the brief teardown window
    pub active: bool,
    /// setInterval semantics when set
    pub repeat: bool,
    /// Normalized delay between fires
    pub delay: Duration,
    /// Bumped on every allocation of this slot; guards teardown against a
    /// rapidly recycled identity
    pub generation: u64,
    /// Per-slot wakeup channel, Some exactly while in use
    pub cond: Option<Arc<Condvar>>,
}

impl Slot {
    fn vacant() -> Self {
        Self {
            in_use: false,
            active: false,
            repeat: false,
            delay: Duration::ZERO,
            generation: 0,
            cond: None,
        }
    }
}

/// Proof of a successful allocation, handed to the worker thread
#[derive(Debug, Clone, Copy)]
pub struct SlotLease {
    /// Public timer id, in `[1, MAX_TIMERS]`
    pub id: u32,
    /// Generation the lease belongs to
    pub generation: u64,
}

/// The fixed-capacity collection of all timer slots
pub struct TimerPool {
    slots: Mutex<Vec<Slot>>,
}

impl TimerPool {
    /// Create a pool with all [`MAX_TIMERS`] slots vacant
    pub fn new() -> Self {
        let slots = (0..MAX_TIMERS).map(|_| Slot::vacant()).collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock()
    }

    /// Claim a free slot, initializing its condvar and state.
    ///
    /// Fails with [`HostError::ResourceExhausted`] when all slots are busy.
    pub fn allocate(&self, repeat: bool, delay: Duration) -> Result<SlotLease> {
        let mut slots = self.slots.lock();
        let Some(index) = slots.iter().position(|s| !s.in_use) else {
            return Err(HostError::ResourceExhausted);
        };
        let slot = &mut slots[index];
        slot.in_use = true;
        slot.active = true;
        slot.repeat = repeat;
        slot.delay = delay;
        slot.generation += 1;
        slot.cond = Some(Arc::new(Condvar::new()));
        Ok(SlotLease {
            id: (index + 1) as u32,
            generation: slot.generation,
        })
    }

    /// Return a slot to the pool.
    ///
    /// Silently ignores ids that are out of range, already free, or from a
    /// stale generation; a double release legitimately races with
    /// concurrent cancellation.
    pub fn release(&self, id: u32, generation: u64) {
        let Some(index) = Self::index_of(id) else {
            return;
        };
        let mut slots = self.slots.lock();
        let slot = &mut slots[index];
        if !slot.in_use || slot.generation != generation {
            return;
        }
        let preserved = slot.generation;
        *slot = Slot::vacant();
        slot.generation = preserved;
    }

    /// Request cancellation: clear `active` and wake the owning worker.
    ///
    /// A no-op for vacant slots, supporting idempotent cancellation and
    /// cancel-after-natural-completion races.
    pub fn deactivate(&self, id: u32) {
        let Some(index) = Self::index_of(id) else {
            return;
        };
        let mut slots = self.slots.lock();
        let slot = &mut slots[index];
        if !slot.in_use {
            return;
        }
        slot.active = false;
        if let Some(cond) = &slot.cond {
            cond.notify_all();
        }
    }

    /// Number of currently allocated slots; used by the shutdown drain
    pub fn count_in_use(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.in_use).count()
    }

    fn index_of(id: u32) -> Option<usize> {
        if (1..=MAX_TIMERS as u32).contains(&id) {
            Some((id - 1) as usize)
        } else {
            None
        }
    }
}

impl Default for TimerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay() -> Duration {
        Duration::from_millis(50)
    }

    #[test]
    fn test_allocate_assigns_one_based_ids() {
        let pool = TimerPool::new();
        let a = pool.allocate(false, delay()).unwrap();
        let b = pool.allocate(true, delay()).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(pool.count_in_use(), 2);
    }

    #[test]
    fn test_pool_exhaustion_and_recovery() {
        let pool = TimerPool::new();
        let leases: Vec<_> = (0..MAX_TIMERS)
            .map(|_| pool.allocate(false, delay()).unwrap())
            .collect();
        assert!(matches!(
            pool.allocate(false, delay()),
            Err(HostError::ResourceExhausted)
        ));

        let freed = leases[41];
        pool.release(freed.id, freed.generation);
        let again = pool.allocate(false, delay()).unwrap();
        assert_eq!(again.id, freed.id);
        assert_eq!(again.generation, freed.generation + 1);
    }

    #[test]
    fn test_release_ignores_double_free_and_bad_ids() {
        let pool = TimerPool::new();
        let lease = pool.allocate(false, delay()).unwrap();
        pool.release(lease.id, lease.generation);
        pool.release(lease.id, lease.generation); // double free
        pool.release(0, 1); // out of range
        pool.release(MAX_TIMERS as u32 + 1, 1);
        assert_eq!(pool.count_in_use(), 0);
    }

    #[test]
    fn test_release_ignores_stale_generation() {
        let pool = TimerPool::new();
        let old = pool.allocate(false, delay()).unwrap();
        pool.release(old.id, old.generation);
        let new = pool.allocate(false, delay()).unwrap();
        assert_eq!(new.id, old.id);

        // a lingering reference to the old lease must not free the new one
        pool.release(old.id, old.generation);
        assert_eq!(pool.count_in_use(), 1);
    }

    #[test]
    fn test_deactivate_is_a_noop_for_vacant_slots() {
        let pool = TimerPool::new();
        pool.deactivate(7);
        pool.deactivate(0);
        pool.deactivate(10_000);
        assert_eq!(pool.count_in_use(), 0);
    }

    #[test]
    fn test_deactivate_clears_active_but_not_in_use() {
        let pool = TimerPool::new();
        let lease = pool.allocate(true, delay()).unwrap();
        pool.deactivate(lease.id);
        let slots = pool.lock();
        let slot = &slots[(lease.id - 1) as usize];
        assert!(slot.in_use);
        assert!(!slot.active);
    }
}
