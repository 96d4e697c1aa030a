// crates/acgs2-core/src/time.rs
// ============================================================================
// Module: ACGS-2 Time Model
// Description: Wall-clock timestamp helpers for sliding windows, deadlines, and
//              night-hour checks.
// Purpose: Provide the real-UTC-instant semantics the governance core requires.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Unlike a deterministic-replay core, the governance components read real
//! wall-clock time: the impact scorer's 60-second volume window, the router's
//! night-hour context boost, and every deliberation/saga/signature deadline all
//! depend on genuine UTC instants and durations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::Add;
use std::ops::Sub;

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: UtcInstant
// ============================================================================

/// A UTC wall-clock instant, serialized as Unix nanoseconds for stable wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtcInstant(
    #[serde(
        serialize_with = "serialize_offset_date_time",
        deserialize_with = "deserialize_offset_date_time"
    )]
    OffsetDateTime,
);

impl UtcInstant {
    /// Returns the current wall-clock instant.
    ///
    /// This is the only place in the governance core allowed to read the system
    /// clock directly; every other module receives `UtcInstant` values as
    /// arguments so that tests can supply fixed times.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an existing `OffsetDateTime`, assumed already UTC.
    #[must_use]
    pub const fn from_offset_date_time(value: OffsetDateTime) -> Self {
        Self(value)
    }

    /// Returns the inner `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_date_time(self) -> OffsetDateTime {
        self.0
    }

    /// Returns the local hour-of-day `[0, 23]` for the night-hour context check.
    #[must_use]
    pub fn local_hour(self) -> u8 {
        self.0.hour()
    }

    /// Returns whether this instant falls in the night window `[01:00, 05:00]`.
    #[must_use]
    pub fn is_night_hour(self) -> bool {
        (1..=5).contains(&self.local_hour())
    }

    /// Returns the elapsed duration since `earlier`, or zero if `earlier` is later.
    #[must_use]
    pub fn elapsed_since(self, earlier: Self) -> Duration {
        let delta = self.0 - earlier.0;
        if delta.is_negative() {
            Duration::ZERO
        } else {
            delta
        }
    }

    /// Returns `true` if this instant is at or past `deadline`.
    #[must_use]
    pub fn has_passed(self, deadline: Self) -> bool {
        self.0 >= deadline.0
    }
}

impl Add<Duration> for UtcInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for UtcInstant {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self(self.0 - rhs)
    }
}

fn serialize_offset_date_time<S>(
    value: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i128(value.unix_timestamp_nanos())
}

fn deserialize_offset_date_time<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let nanos = i128::deserialize(deserializer)?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn detects_night_hour_window() {
        let two_am = UtcInstant::from_offset_date_time(
            OffsetDateTime::from_unix_timestamp(1_700_000_000)
                .expect("valid timestamp")
                .replace_hour(2)
                .expect("valid hour"),
        );
        assert!(two_am.is_night_hour());

        let five_am = UtcInstant::from_offset_date_time(
            two_am.as_offset_date_time().replace_hour(5).expect("valid hour"),
        );
        assert!(five_am.is_night_hour());

        let six_am = UtcInstant::from_offset_date_time(
            two_am.as_offset_date_time().replace_hour(6).expect("valid hour"),
        );
        assert!(!six_am.is_night_hour());

        let noon = UtcInstant::from_offset_date_time(
            two_am.as_offset_date_time().replace_hour(12).expect("valid hour"),
        );
        assert!(!noon.is_night_hour());
    }

    #[test]
    fn elapsed_since_never_negative() {
        let base = UtcInstant::now();
        let later = base + Duration::seconds(5);
        assert_eq!(base.elapsed_since(later), Duration::ZERO);
        assert_eq!(later.elapsed_since(base), Duration::seconds(5));
    }

    #[test]
    fn round_trips_through_json() {
        let instant = UtcInstant::now();
        let json = serde_json::to_string(&instant).expect("serialize");
        let back: UtcInstant = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(instant, back);
    }
}
