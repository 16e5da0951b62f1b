#![allow(dead_code)]

use retrylock::{LockError, Lockable, RawLock, Result, TimedMutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Route crate logs to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One call a `RetryLock` made against its primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Try,
    Timed(Duration),
}

/// Primitive that fails every attempt except the `succeed_on`-th (1-indexed),
/// never actually waiting.
#[derive(Debug, Default)]
pub struct ScriptedMutex {
    succeed_on: Option<usize>,
    probes: Mutex<Vec<Probe>>,
    held: AtomicBool,
}

impl ScriptedMutex {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn succeed_on(attempt: usize) -> Self {
        Self {
            succeed_on: Some(attempt),
            ..Self::default()
        }
    }

    pub fn probes(&self) -> Vec<Probe> {
        self.probes.lock().unwrap().clone()
    }

    fn record(&self, probe: Probe) -> bool {
        let mut probes = self.probes.lock().unwrap();
        probes.push(probe);
        let acquired = self.succeed_on == Some(probes.len());
        if acquired {
            self.held.store(true, Ordering::SeqCst);
        }
        acquired
    }
}

impl TimedMutex for ScriptedMutex {
    fn try_lock(&self) -> bool {
        self.record(Probe::Try)
    }

    fn try_lock_for(&self, timeout: Duration) -> bool {
        self.record(Probe::Timed(timeout))
    }

    fn unlock(&self) -> Result<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LockError::NotHeld)
        }
    }

    fn is_locked(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Real `RawLock` that counts timed attempts and unlocks.
#[derive(Debug, Default)]
pub struct CountingMutex {
    inner: RawLock,
    timed_attempts: AtomicUsize,
    unlocks: AtomicUsize,
    first_timeout: Mutex<Option<Duration>>,
}

impl CountingMutex {
    /// The wrapped lock, for holders that should not be counted.
    pub fn inner(&self) -> &RawLock {
        &self.inner
    }

    pub fn timed_attempts(&self) -> usize {
        self.timed_attempts.load(Ordering::SeqCst)
    }

    pub fn unlocks(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }

    pub fn first_timeout(&self) -> Option<Duration> {
        *self.first_timeout.lock().unwrap()
    }
}

impl TimedMutex for CountingMutex {
    fn try_lock(&self) -> bool {
        self.inner.try_lock()
    }

    fn try_lock_for(&self, timeout: Duration) -> bool {
        if self.timed_attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            *self.first_timeout.lock().unwrap() = Some(timeout);
        }
        self.inner.try_lock_for(timeout)
    }

    fn unlock(&self) -> Result<()> {
        self.unlocks.fetch_add(1, Ordering::SeqCst);
        self.inner.unlock()
    }

    fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Acquired(usize),
    Refused(usize),
    Released(usize),
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Group member that writes every acquire and release to a shared journal.
#[derive(Debug)]
pub struct RecordingLock {
    id: usize,
    refuse: bool,
    inner: RawLock,
    journal: Journal,
}

impl RecordingLock {
    pub fn new(id: usize, journal: &Journal) -> Self {
        Self {
            id,
            refuse: false,
            inner: RawLock::new(),
            journal: journal.clone(),
        }
    }

    /// A member whose `acquire` always reports failure.
    pub fn refusing(id: usize, journal: &Journal) -> Self {
        Self {
            refuse: true,
            ..Self::new(id, journal)
        }
    }

    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn try_take(&self) -> bool {
        self.inner.try_lock()
    }

    fn push(&self, event: Event) {
        self.journal.lock().unwrap().push(event);
    }
}

impl Lockable for RecordingLock {
    fn acquire(&self) -> bool {
        if self.refuse || !self.inner.try_lock() {
            self.push(Event::Refused(self.id));
            return false;
        }
        self.push(Event::Acquired(self.id));
        true
    }

    fn release(&self) -> Result<()> {
        self.inner.unlock()?;
        self.push(Event::Released(self.id));
        Ok(())
    }
}
