//! # Booking Windows
//!
//! A rental occupies the half-open interval `[start, end)`.
//!
//! ## Overlap Rule
//! ```text
//! existing:        [=========)
//! requested:                 [=========)     touching: no conflict
//! requested:            [=========)          overlap:  conflict
//!
//! conflict  ⇔  existing.start < requested.end  AND  existing.end > requested.start
//! ```
//!
//! The store evaluates the same predicate in SQL against integer epoch
//! milliseconds (see `autorent-db`); [`BookingWindow::overlaps`] is the
//! in-memory form used by audits and tests.

use chrono::{DateTime, Duration, Utc};

use crate::error::ValidationError;

/// A non-empty half-open time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingWindow {
    /// Creates a window, rejecting `end <= start`.
    ///
    /// ## Example
    /// ```rust
    /// use autorent_core::window::BookingWindow;
    /// use chrono::{Duration, Utc};
    ///
    /// let now = Utc::now();
    /// assert!(BookingWindow::new(now, now + Duration::hours(2)).is_ok());
    /// assert!(BookingWindow::new(now, now).is_err());
    /// ```
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyInterval);
        }
        Ok(BookingWindow { start, end })
    }

    /// Builds a window from bounds already known to be ordered.
    pub(crate) fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        BookingWindow { start, end }
    }

    #[inline]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Start as epoch milliseconds (store representation).
    #[inline]
    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// End as epoch milliseconds (store representation).
    #[inline]
    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Half-open intersection test. Touching endpoints do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True once `now` has reached the start of the window.
    #[inline]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, hour, 0, 0).unwrap()
    }

    fn window(from: u32, to: u32) -> BookingWindow {
        BookingWindow::new(at(from), at(to)).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_inverted() {
        assert_eq!(
            BookingWindow::new(at(10), at(10)),
            Err(ValidationError::EmptyInterval)
        );
        assert_eq!(
            BookingWindow::new(at(11), at(10)),
            Err(ValidationError::EmptyInterval)
        );
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        assert!(!window(8, 10).overlaps(&window(10, 12)));
        assert!(!window(10, 12).overlaps(&window(8, 10)));
    }

    #[test]
    fn test_partial_and_nested_overlap() {
        assert!(window(8, 11).overlaps(&window(10, 12)));
        assert!(window(10, 12).overlaps(&window(8, 11)));
        assert!(window(8, 20).overlaps(&window(10, 12)));
        assert!(window(10, 12).overlaps(&window(8, 20)));
        assert!(window(10, 12).overlaps(&window(10, 12)));
    }

    #[test]
    fn test_disjoint() {
        assert!(!window(1, 2).overlaps(&window(5, 6)));
    }

    #[test]
    fn test_has_started() {
        let w = window(10, 12);
        assert!(!w.has_started(at(9)));
        assert!(w.has_started(at(10)));
        assert!(w.has_started(at(11)));
    }

    #[test]
    fn test_millis_round_trip_matches_bounds() {
        let w = window(10, 13);
        assert_eq!(w.end_millis() - w.start_millis(), 3 * 3_600_000);
        assert_eq!(w.duration(), Duration::hours(3));
    }
}
