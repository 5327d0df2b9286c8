//! Pickup time scheduling.
//!
//! Walks the legs of an optimized route and assigns each intermediate stop a
//! pickup instant, either counting forward from a departure time or backward
//! from a required arrival time at the destination.
//!
//! A leg whose duration is missing, non-positive or absurdly long is skipped:
//! it gets no entry and contributes nothing to any cumulative sum. So is a leg
//! whose pickup instant falls outside the representable time range. The rest of the
//! schedule is still returned, so callers must align entries by
//! [`PickupEntry::leg_index`] rather than by position.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::domain::{AnchorMode, PickupEntry, PickupSchedule, RouteLeg};

/// Source of the current time when no anchor is supplied.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Compute a pickup instant for the end of every leg except the last.
///
/// With `anchor == None` the anchor is read from `clock`.
///
/// - `Departure`: `pickup[i] = anchor + Σ duration(legs[0..=i])`
/// - `Arrival`: `pickup[i] = anchor - Σ duration(legs[i+1..])`
pub fn compute_pickup_times(
    legs: &[RouteLeg],
    anchor: Option<DateTime<Utc>>,
    mode: AnchorMode,
    clock: &impl Clock,
) -> PickupSchedule {
    let anchor = anchor.unwrap_or_else(|| clock.now());

    let Some(last) = legs.len().checked_sub(1) else {
        return PickupSchedule::default();
    };

    let durations: Vec<Option<i64>> = legs.iter().map(RouteLeg::valid_duration).collect();
    let total = durations.iter().flatten().fold(0i64, |acc, d| acc.saturating_add(*d));

    let mut schedule = PickupSchedule::default();
    let mut elapsed = 0i64;

    for (index, leg) in legs[..last].iter().enumerate() {
        let Some(duration) = durations[index] else {
            warn!(
                leg = index,
                duration = ?leg.duration_secs,
                "Skipping leg with missing or invalid duration"
            );
            schedule.skipped_legs.push(index);
            continue;
        };
        elapsed = elapsed.saturating_add(duration);

        let Some(pickup_at) = offset_from_anchor(anchor, mode, elapsed, total) else {
            warn!(leg = index, %anchor, "Skipping leg whose pickup time is out of range");
            schedule.skipped_legs.push(index);
            continue;
        };

        schedule.entries.push(PickupEntry {
            leg_index: index,
            label: leg_label(leg),
            pickup_at,
        });
    }

    if durations[last].is_none() {
        warn!(
            leg = last,
            duration = ?legs[last].duration_secs,
            "Final leg has missing or invalid duration"
        );
        schedule.skipped_legs.push(last);
    }

    if schedule.is_partial() {
        warn!(
            skipped = schedule.skipped_legs.len(),
            entries = schedule.entries.len(),
            "Pickup schedule is partial"
        );
    }

    schedule
}

/// `anchor + elapsed` when departing, `anchor - (total - elapsed)` when
/// arriving. `None` if the instant is not representable.
fn offset_from_anchor(
    anchor: DateTime<Utc>,
    mode: AnchorMode,
    elapsed: i64,
    total: i64,
) -> Option<DateTime<Utc>> {
    match mode {
        AnchorMode::Departure => anchor.checked_add_signed(Duration::try_seconds(elapsed)?),
        AnchorMode::Arrival => {
            anchor.checked_sub_signed(Duration::try_seconds(total.checked_sub(elapsed)?)?)
        }
    }
}

/// Label for the stop at the end of a leg: its address, or the raw coordinate.
fn leg_label(leg: &RouteLeg) -> String {
    match leg.end_address.as_deref() {
        Some(address) if !address.trim().is_empty() => address.to_string(),
        _ => leg.end.to_string(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::MAX_LEG_DURATION_SECS;
    use crate::domain::test_support::leg;
    use proptest::prelude::*;

    fn anchor() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn durations() -> impl Strategy<Value = Vec<Option<i64>>> {
        proptest::collection::vec(
            prop_oneof![
                4 => (1i64..7200).prop_map(Some),
                1 => Just(Some(0)),
                1 => Just(None),
                1 => (MAX_LEG_DURATION_SECS + 1..=i64::MAX).prop_map(Some),
            ],
            0..12,
        )
    }

    proptest! {
        /// Departure-mode pickups never go backwards in time.
        #[test]
        fn departure_non_decreasing(ds in durations()) {
            let route: Vec<_> = ds.iter().map(|d| leg(*d)).collect();
            let s = compute_pickup_times(&route, Some(anchor()), AnchorMode::Departure, &SystemClock);
            for pair in s.entries.windows(2) {
                prop_assert!(pair[0].pickup_at <= pair[1].pickup_at);
                prop_assert!(pair[0].leg_index < pair[1].leg_index);
            }
            for e in &s.entries {
                prop_assert!(e.pickup_at > anchor());
            }
        }

        /// Arrival-mode pickups are non-decreasing and strictly before the
        /// anchor when the final leg has a valid duration.
        #[test]
        fn arrival_before_anchor(mut ds in durations(), last in 1i64..7200) {
            ds.push(Some(last));
            let route: Vec<_> = ds.iter().map(|d| leg(*d)).collect();
            let s = compute_pickup_times(&route, Some(anchor()), AnchorMode::Arrival, &SystemClock);
            for pair in s.entries.windows(2) {
                prop_assert!(pair[0].pickup_at <= pair[1].pickup_at);
            }
            for e in &s.entries {
                prop_assert!(e.pickup_at < anchor());
            }
        }

        /// Entry count equals the number of valid intermediate legs, and every
        /// entry's offset is its own cumulative valid duration.
        #[test]
        fn entries_track_valid_legs(ds in durations()) {
            let route: Vec<_> = ds.iter().map(|d| leg(*d)).collect();
            let s = compute_pickup_times(&route, Some(anchor()), AnchorMode::Departure, &SystemClock);

            let intermediate = ds.len().saturating_sub(1);
            let usable = |d: &&i64| (1..=MAX_LEG_DURATION_SECS).contains(*d);
            let valid = ds[..intermediate].iter().flatten().filter(usable).count();
            prop_assert_eq!(s.len(), valid);

            for e in &s.entries {
                let expected: i64 = ds[..=e.leg_index].iter().flatten().filter(usable).sum();
                prop_assert_eq!(e.pickup_at, anchor() + Duration::seconds(expected));
            }
        }
    }
}
