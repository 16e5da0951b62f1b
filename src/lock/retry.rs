use crate::error::{LockError, Result};
use crate::lock::primitive::RawLock;
use crate::lock::traits::{Lockable, TimedMutex};
use crate::utils::backoff;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Base of the exponential backoff, in milliseconds.
    pub base_timeout_ms: u64,
    pub max_attempts: u32,
    /// Upper bound of a random pause between failed timed attempts.
    /// Non-blocking probes and zero-timeout attempts never pause.
    pub jitter: Option<Duration>,
}

impl RetryConfig {
    pub fn new(base_timeout_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_timeout_ms,
            max_attempts,
            jitter: None,
        }
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.jitter = Some(max_jitter);
        self
    }

    /// Timeout of attempt `attempt` (1-indexed).
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        backoff::attempt_timeout(self.base_timeout_ms, attempt)
    }

    pub fn schedule(&self) -> Vec<Duration> {
        backoff::backoff_schedule(self.base_timeout_ms, self.max_attempts)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(10, 3)
    }
}

/// A lock that retries failed acquisitions with exponentially growing
/// per-attempt timeouts.
///
/// The configuration is fixed for the lifetime of the lock. Dropping a
/// `RetryLock` while it is held discards the held state; callers must
/// release first.
#[derive(Debug)]
pub struct RetryLock<M = RawLock> {
    primitive: M,
    config: RetryConfig,
}

impl RetryLock<RawLock> {
    /// Lock over a fresh [`RawLock`]. `timeout_ms` is the backoff base.
    ///
    /// The base is a whole number of milliseconds, so the schedule never
    /// shrinks between attempts. Sub-millisecond or fractional bases are
    /// not supported; a base of 0 turns every attempt into a probe.
    pub fn new(timeout_ms: u64, attempts: u32) -> Self {
        Self::with_config(RetryConfig::new(timeout_ms, attempts))
    }

    pub fn with_config(config: RetryConfig) -> Self {
        Self::with_primitive(RawLock::new(), config)
    }
}

impl Default for RetryLock<RawLock> {
    fn default() -> Self {
        Self::with_config(RetryConfig::default())
    }
}

impl<M: TimedMutex> RetryLock<M> {
    pub fn with_primitive(primitive: M, config: RetryConfig) -> Self {
        Self { primitive, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn primitive(&self) -> &M {
        &self.primitive
    }

    /// Try to take the lock, making up to `max_attempts` attempts.
    ///
    /// In blocking mode attempt `k` waits up to `base_timeout_ms^k`
    /// milliseconds. In non-blocking mode every attempt is an immediate
    /// probe, but the attempt count still applies. Returns `false` once the
    /// attempts are used up; exhaustion is never an error here.
    pub fn acquire(&self, blocking: bool) -> bool {
        let max_attempts = self.config.max_attempts;
        debug!(
            "Acquiring lock (blocking: {}, attempts: {}, base timeout: {}ms)",
            blocking, max_attempts, self.config.base_timeout_ms
        );

        for attempt in 1..=max_attempts {
            let timeout = self.config.attempt_timeout(attempt);
            let acquired = if blocking {
                self.primitive.try_lock_for(timeout)
            } else {
                self.primitive.try_lock()
            };

            if acquired {
                debug!("Lock acquired on attempt {}/{}", attempt, max_attempts);
                return true;
            }

            trace!(
                "Attempt {}/{} failed (timeout: {:?})",
                attempt,
                max_attempts,
                timeout
            );

            // Probes never sleep, so only timed attempts get a pause
            if blocking && !timeout.is_zero() && attempt < max_attempts {
                if let Some(max_jitter) = self.config.jitter {
                    thread::sleep(backoff::jitter(max_jitter));
                }
            }
        }

        debug!("Failed to acquire lock after {} attempts", max_attempts);
        false
    }

    pub fn try_acquire(&self) -> bool {
        self.acquire(false)
    }

    /// Release the lock. Fails with [`LockError::NotHeld`] if it is free.
    pub fn release(&self) -> Result<()> {
        self.primitive.unlock()
    }

    /// Whether the lock is held right now. Only a hint under contention.
    pub fn locked(&self) -> bool {
        self.primitive.is_locked()
    }

    /// Acquire in blocking mode and return a guard that releases on drop.
    ///
    /// # Errors
    ///
    /// [`LockError::AcquisitionFailed`] if every attempt failed. No guard is
    /// created in that case, so nothing is released.
    pub fn lock(&self) -> Result<RetryLockGuard<'_, M>> {
        if !self.acquire(true) {
            return Err(LockError::AcquisitionFailed);
        }
        Ok(RetryLockGuard {
            lock: self,
            released: false,
        })
    }
}

impl<M: TimedMutex> Lockable for RetryLock<M> {
    fn acquire(&self) -> bool {
        RetryLock::acquire(self, true)
    }

    fn release(&self) -> Result<()> {
        RetryLock::release(self)
    }
}

/// Holds a [`RetryLock`] until dropped or explicitly unlocked.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RetryLockGuard<'a, M: TimedMutex = RawLock> {
    lock: &'a RetryLock<M>,
    released: bool,
}

impl<M: TimedMutex> RetryLockGuard<'_, M> {
    /// Release now, reporting a failed release instead of logging it.
    pub fn unlock(mut self) -> Result<()> {
        self.released = true;
        self.lock.release()
    }
}

impl<M: TimedMutex> Drop for RetryLockGuard<'_, M> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.lock.release() {
            // Someone released the lock out from under the guard
            warn!("Failed to release lock on scope exit (non-fatal): {}", e);
        }
    }
}
