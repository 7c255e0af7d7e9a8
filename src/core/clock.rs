//! Source of "now" for the lab service, and the calendar it is read in

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc,
};

/// Clock used for timestamps, sequence years and urgency windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall-clock time
    #[default]
    System,
    /// A frozen instant (tests, replays)
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Current instant according to this clock
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward; a system clock is left alone
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Fixed(at) = self {
            *at += by;
        }
    }
}

/// Timezone in which calendar days, months and years are reckoned
///
/// Instants are stored in UTC; sequence years, monthly figures and "today"
/// follow the lab's wall calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// The host's local timezone
    #[default]
    Local,
    /// A fixed UTC offset
    Offset(FixedOffset),
}

impl Calendar {
    /// A calendar kept in UTC
    pub fn utc() -> Self {
        Calendar::Offset(Utc.fix())
    }

    /// Wall-clock reading of `at`
    pub fn wall(&self, at: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Calendar::Local => at.with_timezone(&Local).naive_local(),
            Calendar::Offset(offset) => at.with_timezone(offset).naive_local(),
        }
    }

    pub fn date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.wall(at).date()
    }

    pub fn year(&self, at: DateTime<Utc>) -> i32 {
        self.wall(at).year()
    }

    /// Whether both instants fall in the same calendar month
    pub fn same_month(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        let (a, b) = (self.wall(a), self.wall(b));
        a.year() == b.year() && a.month() == b.month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn warsaw_winter() -> Calendar {
        Calendar::Offset(FixedOffset::east_opt(3600).unwrap())
    }

    #[test]
    fn test_calendar_year_boundary() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(Calendar::utc().year(at), 2025);
        assert_eq!(warsaw_winter().year(at), 2026);
        assert_eq!(
            warsaw_winter().date(at),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_calendar_same_month() {
        let end_of_may = Utc.with_ymd_and_hms(2025, 5, 31, 23, 15, 0).unwrap();
        let june = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert!(!Calendar::utc().same_month(end_of_may, june));
        assert!(warsaw_winter().same_month(end_of_may, june));
    }

    #[test]
    fn test_fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let mut clock = Clock::Fixed(start);
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), start + Duration::hours(2));
    }
}
