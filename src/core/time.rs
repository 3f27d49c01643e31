//! Engine time.
//!
//! The engine never reads a wall clock. Every inbound operation and every
//! timer firing carries a `Timestamp`, and drivers decide what "now" means:
//! the tokio runtime maps it to real elapsed time, tests drive a virtual
//! clock forward millisecond by millisecond. Latency math and remaining-time
//! math all happen here.

use serde::{Deserialize, Serialize};
use std::ops::Add;
use std::time::Duration;

/// Milliseconds since the driver's epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The driver epoch.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from milliseconds since the driver epoch.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the driver epoch.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Elapsed time since `earlier`, saturating to zero if `earlier` is in
    /// the future (drivers with skewed clocks must not underflow latency).
    #[must_use]
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Remaining time until `self + window`, zero once the window elapsed.
    #[must_use]
    pub fn remaining(self, window: Duration, now: Timestamp) -> Duration {
        let deadline = self.0.saturating_add(window.as_millis() as u64);
        Duration::from_millis(deadline.saturating_sub(now.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_saturates() {
        let early = Timestamp::from_millis(100);
        let late = Timestamp::from_millis(350);

        assert_eq!(late.since(early), Duration::from_millis(250));
        assert_eq!(early.since(late), Duration::ZERO);
    }

    #[test]
    fn test_remaining() {
        let start = Timestamp::from_millis(1_000);
        let window = Duration::from_millis(500);

        assert_eq!(
            start.remaining(window, Timestamp::from_millis(1_200)),
            Duration::from_millis(300)
        );
        assert_eq!(start.remaining(window, Timestamp::from_millis(2_000)), Duration::ZERO);
    }

    #[test]
    fn test_add_duration() {
        let t = Timestamp::from_millis(10) + Duration::from_millis(40);
        assert_eq!(t.as_millis(), 50);
    }
}
