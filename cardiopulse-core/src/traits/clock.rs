//! Monotonic time source

/// Monotonic clock used by the control loop
///
/// Timestamps never go backwards. The controller only ever compares
/// differences, so the epoch is arbitrary.
pub trait Clock {
    /// Microseconds since an arbitrary epoch
    fn now_us(&self) -> u64;

    /// Milliseconds since the same epoch
    fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }
}
