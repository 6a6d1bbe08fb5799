//! Time-slot helpers shared by the availability ledger and the shift registry.
//!
//! Dates are calendar days and times are wall-clock minutes; all interval math
//! works on minutes-since-midnight so that "touching" slots such as
//! 09:00-12:00 and 12:00-15:00 never count as overlapping.

use chrono::NaiveTime;

/// Minutes since midnight for a wall-clock time.
pub fn minutes_since_midnight(t: NaiveTime) -> i32 {
    use chrono::Timelike;
    (t.hour() * 60 + t.minute()) as i32
}

/// Half-open interval overlap: `max(start1, start2) < min(end1, end2)`.
///
/// Intervals that merely touch at a boundary do not overlap.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    let a1 = minutes_since_midnight(a_start);
    let a2 = minutes_since_midnight(a_end);
    let b1 = minutes_since_midnight(b_start);
    let b2 = minutes_since_midnight(b_end);
    a1.max(b1) < a2.min(b2)
}

/// Serde adapter for `NaiveTime` fields carried on the wire as `"HH:mm"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
