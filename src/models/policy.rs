use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PolicyError {
    #[error("open hour ({open}) must be before close hour ({close})")]
    HoursOutOfOrder { open: u32, close: u32 },

    #[error("close hour must be at most 24, got {0}")]
    CloseHourOutOfRange(u32),

    #[error("slot length must be a non-zero divisor of 60 minutes, got {0}")]
    InvalidSlotMinutes(u32),

    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Business-hours rules shared by slot generation and booking validation.
///
/// Hours are half-open: a policy of 9–17 with 30 minute slots accepts slot
/// starts from 09:00 up to and including 16:30.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessHoursPolicy {
    workdays: HashSet<Weekday>,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
}

impl Default for BusinessHoursPolicy {
    fn default() -> Self {
        Self {
            workdays: WEEK[..5].iter().copied().collect(),
            open_hour: 9,
            close_hour: 17,
            slot_minutes: 30,
        }
    }
}

impl BusinessHoursPolicy {
    pub fn new(
        workdays: impl IntoIterator<Item = Weekday>,
        open_hour: u32,
        close_hour: u32,
        slot_minutes: u32,
    ) -> Result<Self, PolicyError> {
        if close_hour > 24 {
            return Err(PolicyError::CloseHourOutOfRange(close_hour));
        }
        if open_hour >= close_hour {
            return Err(PolicyError::HoursOutOfOrder {
                open: open_hour,
                close: close_hour,
            });
        }
        if slot_minutes == 0 || 60 % slot_minutes != 0 {
            return Err(PolicyError::InvalidSlotMinutes(slot_minutes));
        }

        Ok(Self {
            workdays: workdays.into_iter().collect(),
            open_hour,
            close_hour,
            slot_minutes,
        })
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Latest time of day a slot may start, e.g. 16:30 for a 17:00 close.
    pub fn last_slot_start(&self) -> NaiveTime {
        let minute = 60 - self.slot_minutes;
        NaiveTime::from_hms_opt(self.close_hour - 1, minute, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn is_workday(&self, ts: &NaiveDateTime) -> bool {
        self.workdays.contains(&ts.weekday())
    }

    pub fn is_within_hours(&self, ts: &NaiveDateTime) -> bool {
        let hour = ts.hour();
        let minute = ts.minute();
        let last_hour = self.close_hour - 1;

        hour >= self.open_hour
            && (hour < last_hour || (hour == last_hour && minute <= 60 - self.slot_minutes))
    }

    pub fn is_within_business_hours(&self, ts: &NaiveDateTime) -> bool {
        self.is_workday(ts) && self.is_within_hours(ts)
    }

    /// Slot starts carry no seconds, so 09:00:30 is not on a boundary.
    pub fn is_on_slot_boundary(&self, ts: &NaiveDateTime) -> bool {
        ts.minute() % self.slot_minutes == 0 && ts.second() == 0 && ts.nanosecond() == 0
    }

    /// Every slot start on `date` in chronological order; empty on non-workdays.
    pub fn slot_starts(&self, date: NaiveDate) -> Vec<NaiveDateTime> {
        if !self.workdays.contains(&date.weekday()) {
            return Vec::new();
        }

        let first = date.and_time(NaiveTime::MIN) + Duration::hours(self.open_hour as i64);
        let last = date.and_time(self.last_slot_start());
        let step = Duration::minutes(self.slot_minutes as i64);

        let mut starts = Vec::new();
        let mut current = first;
        while current <= last {
            starts.push(current);
            current += step;
        }
        starts
    }

    /// "Monday-Friday" for a contiguous run, otherwise a comma separated list.
    pub fn workdays_label(&self) -> String {
        let days: Vec<Weekday> = WEEK
            .iter()
            .copied()
            .filter(|d| self.workdays.contains(d))
            .collect();

        match days.as_slice() {
            [] => String::new(),
            [only] => day_name(*only).to_string(),
            [first, .., last] if is_contiguous(&days) => {
                format!("{}-{}", day_name(*first), day_name(*last))
            }
            _ => days
                .iter()
                .map(|d| day_name(*d))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// "9:00 AM and 4:30 PM": first and last bookable start of a day.
    pub fn hours_label(&self) -> String {
        let open = NaiveTime::from_hms_opt(self.open_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        format!(
            "{} and {}",
            clock_label(&open),
            clock_label(&self.last_slot_start())
        )
    }
}

pub fn parse_weekday(s: &str) -> Result<Weekday, PolicyError> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| PolicyError::InvalidWeekday(s.to_string()))
}

fn is_contiguous(days: &[Weekday]) -> bool {
    days.windows(2)
        .all(|w| w[0].num_days_from_monday() + 1 == w[1].num_days_from_monday())
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn clock_label(t: &NaiveTime) -> String {
    let (pm, hour) = t.hour12();
    let suffix = if pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", t.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_default_policy() {
        let policy = BusinessHoursPolicy::default();
        assert_eq!(policy.open_hour(), 9);
        assert_eq!(policy.close_hour(), 17);
        assert_eq!(policy.slot_minutes(), 30);
        assert_eq!(policy.last_slot_start(), NaiveTime::from_hms_opt(16, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert_eq!(
            BusinessHoursPolicy::new([Weekday::Mon], 17, 9, 30),
            Err(PolicyError::HoursOutOfOrder { open: 17, close: 9 })
        );
        assert_eq!(
            BusinessHoursPolicy::new([Weekday::Mon], 9, 25, 30),
            Err(PolicyError::CloseHourOutOfRange(25))
        );
        assert_eq!(
            BusinessHoursPolicy::new([Weekday::Mon], 9, 17, 25),
            Err(PolicyError::InvalidSlotMinutes(25))
        );
        assert_eq!(
            BusinessHoursPolicy::new([Weekday::Mon], 9, 17, 0),
            Err(PolicyError::InvalidSlotMinutes(0))
        );
    }

    #[test]
    fn test_within_business_hours() {
        let policy = BusinessHoursPolicy::default();
        // 2025-11-10 is a Monday
        assert!(policy.is_within_business_hours(&dt("2025-11-10 09:00")));
        assert!(policy.is_within_business_hours(&dt("2025-11-10 16:30")));
        assert!(!policy.is_within_business_hours(&dt("2025-11-10 08:30")));
        assert!(!policy.is_within_business_hours(&dt("2025-11-10 16:45")));
        assert!(!policy.is_within_business_hours(&dt("2025-11-10 17:00")));
    }

    #[test]
    fn test_weekend_is_not_a_workday() {
        let policy = BusinessHoursPolicy::default();
        // 2025-11-15 is a Saturday
        assert!(!policy.is_workday(&dt("2025-11-15 10:00")));
        assert!(policy.is_within_hours(&dt("2025-11-15 10:00")));
        assert!(!policy.is_within_business_hours(&dt("2025-11-15 10:00")));
    }

    #[test]
    fn test_slot_boundary() {
        let policy = BusinessHoursPolicy::default();
        assert!(policy.is_on_slot_boundary(&dt("2025-11-10 09:30")));
        assert!(!policy.is_on_slot_boundary(&dt("2025-11-10 09:15")));

        let with_seconds =
            NaiveDateTime::parse_from_str("2025-11-10 09:30:20", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(!policy.is_on_slot_boundary(&with_seconds));
    }

    #[test]
    fn test_slot_starts_for_a_workday() {
        let policy = BusinessHoursPolicy::default();
        let monday = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let starts = policy.slot_starts(monday);
        assert_eq!(starts.len(), 16);
        assert_eq!(starts[0], dt("2025-11-10 09:00"));
        assert_eq!(starts[15], dt("2025-11-10 16:30"));
    }

    #[test]
    fn test_slot_starts_for_hourly_policy() {
        let policy = BusinessHoursPolicy::new([Weekday::Mon], 8, 12, 60).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let starts = policy.slot_starts(monday);
        assert_eq!(starts.len(), 4);
        assert_eq!(starts[3], dt("2025-11-10 11:00"));
    }

    #[test]
    fn test_slot_starts_until_midnight() {
        let policy = BusinessHoursPolicy::new([Weekday::Mon], 22, 24, 30).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let starts = policy.slot_starts(monday);
        assert_eq!(starts.len(), 4);
        assert_eq!(starts[3], dt("2025-11-10 23:30"));
    }

    #[test]
    fn test_slot_starts_on_weekend_is_empty() {
        let policy = BusinessHoursPolicy::default();
        let saturday = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        assert!(policy.slot_starts(saturday).is_empty());
    }

    #[test]
    fn test_labels() {
        let policy = BusinessHoursPolicy::default();
        assert_eq!(policy.workdays_label(), "Monday-Friday");
        assert_eq!(policy.hours_label(), "9:00 AM and 4:30 PM");

        let split = BusinessHoursPolicy::new([Weekday::Sat, Weekday::Mon], 13, 18, 15).unwrap();
        assert_eq!(split.workdays_label(), "Monday, Saturday");
        assert_eq!(split.hours_label(), "1:00 PM and 5:45 PM");
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("mon"), Ok(Weekday::Mon));
        assert_eq!(parse_weekday(" Friday "), Ok(Weekday::Fri));
        assert!(parse_weekday("xyz").is_err());
    }
}
