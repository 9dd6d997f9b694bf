//! Civil-date resolution in the application's fixed reference timezone.

use time::{Date, OffsetDateTime, UtcOffset};

/// Resolves "today" as a civil date in a single fixed UTC offset.
///
/// Every lifecycle decision (voting window, result unlock, streaks) is made
/// against this clock so day boundaries do not depend on the server's or the
/// client's local timezone.
#[derive(Debug, Clone, Copy)]
pub struct CivilClock {
    offset: UtcOffset,
}

impl CivilClock {
    /// Build a clock for the given UTC offset.
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Build a clock from a whole-hour offset, falling back to UTC when the
    /// value is outside the representable range.
    pub fn from_offset_hours(hours: i8) -> Self {
        let offset = UtcOffset::from_hms(hours, 0, 0).unwrap_or(UtcOffset::UTC);
        Self { offset }
    }

    /// Current civil date in the reference timezone.
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_offset(self.offset).date()
    }
}
