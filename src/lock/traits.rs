//! Seams between the lock types.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

/// A binary mutual-exclusion primitive that supports bounded waits.
///
/// [`RetryLock`](super::RetryLock) drives one of these. Implementations are
/// not owner-bound: any thread may unlock a held primitive.
pub trait TimedMutex: Send + Sync {
    /// Take the lock if it is free right now.
    fn try_lock(&self) -> bool;

    /// Wait up to `timeout` for the lock. A zero timeout is a single probe.
    fn try_lock_for(&self, timeout: Duration) -> bool;

    /// Release the lock.
    ///
    /// Returns [`LockError::NotHeld`](crate::LockError::NotHeld) if the lock
    /// is currently free.
    fn unlock(&self) -> Result<()>;

    /// Snapshot of the held state. Can be stale by the time it is read.
    fn is_locked(&self) -> bool;
}

/// The capability a [`MultiLock`](super::MultiLock) member must expose.
///
/// Anything that can be acquired and released qualifies: a `RetryLock`, a
/// bare `RawLock`, or a caller's own type.
pub trait Lockable: Send + Sync {
    /// Acquire in blocking mode. `false` means the lock was not obtained.
    fn acquire(&self) -> bool;

    /// Release a held member. Releasing an unheld member returns
    /// [`LockError::NotHeld`](crate::LockError::NotHeld).
    fn release(&self) -> Result<()>;
}

impl<T: Lockable + ?Sized> Lockable for &T {
    fn acquire(&self) -> bool {
        (**self).acquire()
    }

    fn release(&self) -> Result<()> {
        (**self).release()
    }
}

impl<T: Lockable + ?Sized> Lockable for Arc<T> {
    fn acquire(&self) -> bool {
        (**self).acquire()
    }

    fn release(&self) -> Result<()> {
        (**self).release()
    }
}
