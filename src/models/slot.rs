use chrono::{Duration, FixedOffset, NaiveDateTime, TimeZone};
use serde::Serialize;

/// One bookable unit on the slot grid. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub minutes: u32,
}

impl Slot {
    pub fn new(start: NaiveDateTime, minutes: u32) -> Self {
        Self { start, minutes }
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.minutes as i64)
    }

    /// RFC 3339 timestamp in the business timezone.
    pub fn iso8601(&self, offset: &FixedOffset) -> String {
        to_iso8601(&self.start, offset)
    }

    pub fn label(&self) -> String {
        self.start.format("%A, %B %d, %Y at %I:%M %p").to_string()
    }
}

/// Wire shape of one entry in the availability listing.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub date_time: String,
    pub formatted: String,
}

impl SlotView {
    pub fn from_slot(slot: &Slot, offset: &FixedOffset) -> Self {
        Self {
            date_time: slot.iso8601(offset),
            formatted: slot.label(),
        }
    }
}

pub fn to_iso8601(local: &NaiveDateTime, offset: &FixedOffset) -> String {
    // A fixed offset maps every local time to exactly one instant.
    match offset.from_local_datetime(local).single() {
        Some(dt) => dt.to_rfc3339(),
        None => local.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}
