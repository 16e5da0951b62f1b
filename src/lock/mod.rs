mod multi;
mod primitive;
mod retry;
mod traits;

pub use multi::{MultiLock, MultiLockGuard};
pub use primitive::RawLock;
pub use retry::{RetryConfig, RetryLock, RetryLockGuard};
pub use traits::{Lockable, TimedMutex};
