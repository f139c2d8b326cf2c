//! Runtime governor
//!
//! Limits how long a session may run. Reaching the limit does not stop the
//! motor; it latches a request that the cycle controller honors at the next
//! point where the mechanism can be brought home cleanly.

/// Elapsed-runtime limiter with a latched shutdown request
#[derive(Debug, Clone)]
pub struct RuntimeGovernor {
    /// Session limit in milliseconds, `None` for unlimited
    max_runtime_ms: Option<u64>,
    /// Session start timestamp
    started_ms: u64,
    /// Latched once per session, never cleared until the next start
    shutdown_requested: bool,
    /// Set together with the latch, consumed at the cycle boundary
    complete_current_cycle: bool,
}

impl RuntimeGovernor {
    /// Create a governor with the given limit in seconds
    pub fn new(max_runtime_s: Option<u32>) -> Self {
        Self {
            max_runtime_ms: max_runtime_s.map(|s| s as u64 * 1_000),
            started_ms: 0,
            shutdown_requested: false,
            complete_current_cycle: false,
        }
    }

    /// Begin a new session at `now_ms`, clearing any previous latch
    pub fn start(&mut self, now_ms: u64) {
        self.started_ms = now_ms;
        self.shutdown_requested = false;
        self.complete_current_cycle = false;
    }

    /// Evaluate the runtime limit
    ///
    /// Returns `true` only on the call that latches the request.
    pub fn update(&mut self, now_ms: u64) -> bool {
        if self.shutdown_requested {
            return false;
        }
        match self.max_runtime_ms {
            Some(limit) if self.elapsed_ms(now_ms) >= limit => {
                self.latch();
                true
            }
            _ => false,
        }
    }

    /// Latch a graceful shutdown regardless of elapsed time
    ///
    /// Returns `true` if this call set the latch.
    pub fn request_shutdown(&mut self) -> bool {
        if self.shutdown_requested {
            return false;
        }
        self.latch();
        true
    }

    fn latch(&mut self) {
        self.shutdown_requested = true;
        self.complete_current_cycle = true;
    }

    /// Consume the end-of-cycle flag when entering shutdown
    pub fn consume_cycle_boundary(&mut self) {
        self.complete_current_cycle = false;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    pub fn complete_current_cycle(&self) -> bool {
        self.complete_current_cycle
    }

    /// Milliseconds since the session started
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }
}
