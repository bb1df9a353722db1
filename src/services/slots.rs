use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{BusinessHoursPolicy, Slot};

/// Lists every free slot from `start_date` to `end_date` inclusive.
///
/// A slot is free when it starts strictly after `now` and its exact start is
/// not in `booked`. Output is day-major, time-minor. An inverted range yields
/// nothing; normalizing the range is the caller's job.
pub fn generate_available(
    policy: &BusinessHoursPolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    booked: &HashSet<NaiveDateTime>,
    now: NaiveDateTime,
) -> Vec<Slot> {
    start_date
        .iter_days()
        .take_while(|day| *day <= end_date)
        .flat_map(|day| policy.slot_starts(day))
        .filter(|start| *start > now && !booked.contains(start))
        .map(|start| Slot::new(start, policy.slot_minutes()))
        .collect()
}
