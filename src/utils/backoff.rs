use rand::Rng;
use std::time::Duration;

/// Timeout for a single attempt, 1-indexed.
///
/// Attempt `k` waits `base_ms^k / 1000` seconds, i.e. `base_ms^k`
/// milliseconds. The power saturates at `u64::MAX` instead of overflowing.
/// Attempt 0 is not a real attempt and gets a zero timeout.
pub fn attempt_timeout(base_ms: u64, attempt: u32) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(base_ms.saturating_pow(attempt))
}

/// Per-attempt timeouts for attempts `1..=max_attempts`, in order.
pub fn backoff_schedule(base_ms: u64, max_attempts: u32) -> Vec<Duration> {
    (1..=max_attempts)
        .map(|attempt| attempt_timeout(base_ms, attempt))
        .collect()
}

/// Random pause in `[0, max)`, zero when `max` is zero.
pub fn jitter(max: Duration) -> Duration {
    let max_micros = max.as_micros().min(u64::MAX as u128) as u64;
    if max_micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(rand::thread_rng().gen_range(0..max_micros))
}
