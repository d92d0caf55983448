//! # Clock Port
//!
//! Time source for all expiry decisions.

use crate::errors::TtlError;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Longest accepted lifetime for nonces, tokens and sessions (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Convert a configured lifetime, rejecting zero and anything above
/// [`MAX_TTL_SECS`] so `now + ttl` stays far inside chrono's range.
pub fn checked_ttl(ttl: std::time::Duration) -> Result<Duration, TtlError> {
    let secs = ttl.as_secs();
    if ttl.is_zero() || secs > MAX_TTL_SECS {
        return Err(TtlError { secs });
    }
    Duration::from_std(ttl).map_err(|_| TtlError { secs })
}

/// Source of the current time.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }

    /// Jump to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_ttl_bounds() {
        assert_eq!(
            checked_ttl(std::time::Duration::from_secs(300)),
            Ok(Duration::seconds(300))
        );
        assert_eq!(
            checked_ttl(std::time::Duration::from_secs(MAX_TTL_SECS)),
            Ok(Duration::seconds(MAX_TTL_SECS as i64))
        );

        assert_eq!(
            checked_ttl(std::time::Duration::ZERO),
            Err(TtlError { secs: 0 })
        );
        assert_eq!(
            checked_ttl(std::time::Duration::from_secs(MAX_TTL_SECS + 1)),
            Err(TtlError {
                secs: MAX_TTL_SECS + 1
            })
        );
        assert!(checked_ttl(std::time::Duration::from_secs(u64::MAX)).is_err());
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);

        clock.advance(Duration::minutes(5));

        assert_eq!(clock.now(), start + Duration::minutes(5));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::default();
        let target = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        clock.set(target);

        assert_eq!(clock.now(), target);
    }
}
