//! Wall-clock source for preview timestamps.

use std::fmt::Display;

use time::{OffsetDateTime, UtcOffset};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Current time in the device's local offset.
    fn now(&self) -> OffsetDateTime;
}

/// System clock with the local offset captured at startup.
///
/// The offset must be read while the process is still single-threaded;
/// afterwards the platform lookup is refused on some targets. Install the
/// log subscriber first so the UTC fallback is recorded.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Detects the local offset, falling back to UTC.
    pub fn detect() -> Self {
        Self::from_detection(UtcOffset::current_local_offset())
    }

    /// Uses a detected offset, logging and falling back to UTC on failure.
    pub fn from_detection(detected: Result<UtcOffset, impl Display>) -> Self {
        let offset = detected.unwrap_or_else(|error| {
            tracing::warn!(stage = "clock", action = "detect_offset", %error, "local offset unavailable; using UTC");
            UtcOffset::UTC
        });
        Self { offset }
    }

    /// Uses an explicit offset.
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Offset applied to UTC readings.
    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
