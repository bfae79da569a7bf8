//! Cooperative control: wall-clock abstraction and cancellation.
//!
//! The acquisition loops are infinite by design. They never block beyond a
//! bounded sleep, and they stop only when their consumer stops pulling or
//! trips the shared [`CancelToken`]. Timing goes through the [`Clock`]
//! trait so the loops stay testable and free of platform dependencies.

use core::sync::atomic::{AtomicBool, Ordering};

/// Monotonic time plus bounded sleep.
///
/// Timeouts in the loops are plain elapsed-wall-clock comparisons, never
/// preemptive; millisecond resolution is plenty.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch.
    fn now_ms(&self) -> u64;

    /// Block for at least `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

/// Cooperative cancellation flag shared between an acquisition loop and its
/// consumer. Tripping it makes the loop's iterator end after at most one
/// in-flight capture.
#[derive(Debug, Default)]
pub struct CancelToken(AtomicBool);

impl CancelToken {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(feature = "std")]
mod std_clock {
    extern crate std;

    use std::time::Instant;

    use super::Clock;

    /// [`Clock`] backed by `std::time`, for host binaries.
    pub struct StdClock(Instant);

    impl StdClock {
        pub fn new() -> Self {
            Self(Instant::now())
        }
    }

    impl Default for StdClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for StdClock {
        fn now_ms(&self) -> u64 {
            self.0.elapsed().as_millis() as u64
        }

        fn sleep_ms(&mut self, ms: u32) {
            std::thread::sleep(std::time::Duration::from_millis(ms as u64));
        }
    }
}

#[cfg(feature = "std")]
pub use std_clock::StdClock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear_and_latches() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
