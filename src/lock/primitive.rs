use crate::error::{LockError, Result};
use crate::lock::traits::{Lockable, TimedMutex};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// In-process binary lock backed by `Mutex<bool>` + `Condvar`.
///
/// Unlike `std::sync::Mutex`, holding it is not tied to a guard or a thread:
/// one thread may acquire and another may release. Releasing while free is
/// an error rather than a no-op.
#[derive(Debug, Default)]
pub struct RawLock {
    state: Mutex<bool>,
    wake: Condvar,
}

impl RawLock {
    pub fn new() -> Self {
        RawLock {
            state: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    /// Block until the lock is free, then take it.
    pub fn lock(&self) {
        let mut held = self.state.lock();
        while *held {
            self.wake.wait(&mut held);
        }
        *held = true;
    }
}

impl TimedMutex for RawLock {
    fn try_lock(&self) -> bool {
        let mut held = self.state.lock();
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    fn try_lock_for(&self, timeout: Duration) -> bool {
        if timeout.is_zero() {
            return self.try_lock();
        }

        // Deadline past what Instant can represent: wait without one
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.lock();
            return true;
        };

        let mut held = self.state.lock();
        while *held {
            if self.wake.wait_until(&mut held, deadline).timed_out() && *held {
                return false;
            }
        }
        *held = true;
        true
    }

    fn unlock(&self) -> Result<()> {
        let mut held = self.state.lock();
        if !*held {
            return Err(LockError::NotHeld);
        }
        *held = false;
        drop(held);
        self.wake.notify_one();
        Ok(())
    }

    fn is_locked(&self) -> bool {
        *self.state.lock()
    }
}

impl Lockable for RawLock {
    fn acquire(&self) -> bool {
        self.lock();
        true
    }

    fn release(&self) -> Result<()> {
        self.unlock()
    }
}
