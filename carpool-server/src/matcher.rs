//! Location matching between a driver's destination and rider requests.
//!
//! Matching uses a per-axis tolerance in degrees: a candidate matches when
//! both `|Δlat|` and `|Δlng|` are within the tolerance. The region is a
//! square in degree space, not a geodesic circle. At city scale this is
//! close enough; near the poles or with large tolerances it is not.

use tracing::debug;

use crate::domain::{Coordinate, LocationRecord};

/// Default per-axis tolerance in degrees (roughly 55 m of latitude).
pub const DEFAULT_TOLERANCE: f64 = 0.0005;

/// No candidate fell within the tolerance window.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("no ride requests end within {tolerance} degrees of {target}")]
pub struct MatchNotFound {
    pub target: Coordinate,
    pub tolerance: f64,
}

/// Return the candidates whose end coordinate lies within `tolerance` of
/// `target` on both axes. The boundary is inclusive.
///
/// Order is preserved and duplicates are kept.
pub fn find_matches(
    target: &Coordinate,
    candidates: &[LocationRecord],
    tolerance: f64,
) -> Vec<LocationRecord> {
    let matches: Vec<LocationRecord> = candidates
        .iter()
        .filter(|record| target.within_square(&record.end, tolerance))
        .cloned()
        .collect();

    debug!(
        target = %target,
        tolerance,
        candidates = candidates.len(),
        matches = matches.len(),
        "Matched ride requests"
    );

    matches
}

/// Like [`find_matches`], but treats an empty result as [`MatchNotFound`].
pub fn require_matches(
    target: &Coordinate,
    candidates: &[LocationRecord],
    tolerance: f64,
) -> Result<Vec<LocationRecord>, MatchNotFound> {
    let matches = find_matches(target, candidates, tolerance);
    if matches.is_empty() {
        return Err(MatchNotFound {
            target: *target,
            tolerance,
        });
    }
    Ok(matches)
}



#[cfg(test)]
mod proptests {
    use super::test_support::{coord, record};
    use super::*;
    use proptest::prelude::*;

    // Offsets are multiples of 1/64 so the comparison is exact in f64.
    fn offset() -> impl Strategy<Value = f64> {
        (-64i32..=64).prop_map(|n| n as f64 / 64.0)
    }

    proptest! {
        /// A record is included exactly when both offsets are within tolerance.
        #[test]
        fn inclusion_matches_square(dlat in offset(), dlng in offset(), tol_steps in 0i32..=64) {
            let tolerance = tol_steps as f64 / 64.0;
            let target = coord(10.0, 20.0);
            let candidates = vec![record(1, (0.0, 0.0), (10.0 + dlat, 20.0 + dlng))];

            let included = !find_matches(&target, &candidates, tolerance).is_empty();
            let expected = dlat.abs() <= tolerance && dlng.abs() <= tolerance;
            prop_assert_eq!(included, expected);
        }

        /// Matching never invents records and preserves order.
        #[test]
        fn result_is_ordered_subsequence(ends in proptest::collection::vec((offset(), offset()), 0..20)) {
            let candidates: Vec<_> = ends
                .iter()
                .enumerate()
                .map(|(i, (a, b))| record(i as u64, (0.0, 0.0), (10.0 + a, 20.0 + b)))
                .collect();

            let matches = find_matches(&coord(10.0, 20.0), &candidates, 0.25);
            let ids: Vec<u64> = matches.iter().map(|m| m.user_id.0).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
            prop_assert!(matches.len() <= candidates.len());
        }
    }
}
