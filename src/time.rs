use chrono::NaiveTime;

/// Parse a time string in HH:MM:SS format
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a valid time in HH:MM:SS format.
pub fn parse_time_hms(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
}

/// Daily service window of a scheduled trip.
///
/// A window whose end lies before its start crosses midnight: the end is
/// taken on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ServiceWindow {
    #[must_use]
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Whether `now` (wall-clock time of day) lies inside the window, bounds inclusive
    #[must_use]
    pub fn contains(&self, now: NaiveTime) -> bool {
        if self.crosses_midnight() {
            now >= self.start || now <= self.end
        } else {
            self.start <= now && now <= self.end
        }
    }
}

/// Format an hour of the day as a 12-hour clock label ("12 AM", "3 PM")
#[must_use]
pub fn hour_label(hour: u32) -> String {
    let hour = hour % 24;
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display} {suffix}")
}
