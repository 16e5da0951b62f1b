use crate::error::{LockError, Result};
use crate::lock::traits::Lockable;
use std::fmt;
use tracing::{debug, warn};

/// Acquires an ordered group of locks as a single all-or-nothing unit.
///
/// Members are borrowed, so each lock stays usable on its own once the
/// group lets go of it. Acquisition is sequential, not atomic: if member `i`
/// fails, members `0..i` are released again before the error is returned.
///
/// Locks are always taken and released in ascending index order. Build
/// groups over shared locks in the same order everywhere to avoid cyclic
/// waits.
pub struct MultiLock<'a> {
    locks: Vec<&'a dyn Lockable>,
}

impl<'a> MultiLock<'a> {
    pub fn new(locks: Vec<&'a dyn Lockable>) -> Self {
        MultiLock { locks }
    }

    pub fn empty() -> Self {
        MultiLock { locks: Vec::new() }
    }

    /// Append a member at the end of the acquisition order.
    pub fn with(mut self, lock: &'a dyn Lockable) -> Self {
        self.locks.push(lock);
        self
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Acquire every member in order and return a guard over the group.
    ///
    /// # Errors
    ///
    /// [`LockError::AcquisitionFailed`] as soon as one member fails. Every
    /// member acquired before it has been released by then, and members
    /// after it were never touched.
    pub fn lock(&self) -> Result<MultiLockGuard<'_>> {
        debug!("Acquiring lock group ({} members)", self.locks.len());

        for (index, lock) in self.locks.iter().enumerate() {
            if !lock.acquire() {
                debug!(
                    "Lock group member {} failed, rolling back {} acquired",
                    index, index
                );
                // Errors are already logged per member; the group result
                // is AcquisitionFailed either way
                let _ = release_in_order(&self.locks[..index]);
                return Err(LockError::AcquisitionFailed);
            }
        }

        debug!("Lock group acquired ({} members)", self.locks.len());
        Ok(MultiLockGuard {
            locks: self.locks.as_slice(),
            released: false,
        })
    }
}

impl Default for MultiLock<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for MultiLock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLock")
            .field("len", &self.locks.len())
            .finish()
    }
}

/// Release `locks` front to back. Every member is attempted; the first
/// error is returned.
fn release_in_order(locks: &[&dyn Lockable]) -> Result<()> {
    let mut first_error = None;
    for (index, lock) in locks.iter().enumerate() {
        if let Err(e) = lock.release() {
            warn!("Failed to release lock group member {}: {}", index, e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Holds every member of a [`MultiLock`] until dropped or unlocked.
#[must_use = "the lock group is released as soon as the guard is dropped"]
pub struct MultiLockGuard<'g> {
    locks: &'g [&'g dyn Lockable],
    released: bool,
}

impl MultiLockGuard<'_> {
    /// Release all members now.
    ///
    /// Every member is released even if an earlier one fails; the first
    /// failure is returned.
    pub fn unlock(mut self) -> Result<()> {
        self.released = true;
        release_in_order(self.locks)
    }
}

impl Drop for MultiLockGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let _ = release_in_order(self.locks);
    }
}

impl fmt::Debug for MultiLockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLockGuard")
            .field("len", &self.locks.len())
            .field("released", &self.released)
            .finish()
    }
}
