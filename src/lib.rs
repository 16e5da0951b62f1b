//! In-process locks with bounded exponential-backoff retries, plus
//! all-or-nothing lock groups

pub mod error;
pub mod lock;
pub mod utils;

pub use error::{LockError, Result};
pub use lock::{
    Lockable, MultiLock, MultiLockGuard, RawLock, RetryConfig, RetryLock, RetryLockGuard,
    TimedMutex,
};
pub use utils::backoff::{attempt_timeout, backoff_schedule};
