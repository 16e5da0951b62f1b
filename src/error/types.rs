use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Every retry attempt ran out before the lock became available.
    #[error("Failed to acquire lock: retry attempts exhausted")]
    AcquisitionFailed,

    #[error("Failed to release lock: lock is not held")]
    NotHeld,
}

impl LockError {
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, LockError::AcquisitionFailed)
    }

    pub fn is_release_failure(&self) -> bool {
        matches!(self, LockError::NotHeld)
    }

    /// Whether trying the same acquisition again later could succeed.
    ///
    /// Releasing an unheld lock is a caller bug and never becomes valid by
    /// waiting, so only exhaustion is retryable.
    pub fn retryable(&self) -> bool {
        self.is_acquisition_failure()
    }
}

pub type Result<T> = std::result::Result<T, LockError>;
