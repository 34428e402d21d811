use crate::constants::{MINUTES_PER_CYCLE, TIME_PRECISION, TIME_TOLERANCE};

/// Fold a minute offset into the repeating hourly cycle `[0, 60)`.
#[must_use]
pub fn mod60(minutes: f64) -> f64 {
    ((minutes % MINUTES_PER_CYCLE) + MINUTES_PER_CYCLE) % MINUTES_PER_CYCLE
}

/// Symmetric mirror of a clock-face minute: `60 - t`, with 0 as fixed point.
///
/// In a symmetric periodic timetable the departure minute at a node is the
/// mirror of the arrival minute around the full hour.
#[must_use]
pub fn symmetric(minutes: f64) -> f64 {
    let folded = mod60(minutes);
    if folded.abs() <= TIME_TOLERANCE {
        0.0
    } else {
        MINUTES_PER_CYCLE - folded
    }
}

/// Whether two minute offsets land on the same point of the hourly cycle.
///
/// Handles the wrap-around at 60, so 59.999 and 0.0 compare equal within
/// tolerance.
#[must_use]
pub fn cycle_equal(a: f64, b: f64) -> bool {
    let diff = mod60(a - b);
    diff <= TIME_TOLERANCE || diff >= MINUTES_PER_CYCLE - TIME_TOLERANCE
}

/// Whole-hour component of a travel time (`0`, `60`, `120`, …).
#[must_use]
pub fn hour_component(minutes: f64) -> f64 {
    if minutes <= 0.0 {
        return 0.0;
    }
    (minutes / MINUTES_PER_CYCLE).floor() * MINUTES_PER_CYCLE
}

/// Derive a travel time from a departure and the matching arrival minute.
///
/// The minute residue comes from the clock-face difference; the whole-hour
/// component of the previously stored value is preserved so a multi-hour leg
/// keeps its hour count when one of its ends is nudged. The result is lifted
/// by full cycles until it reaches [`TIME_PRECISION`], which preserves the
/// mod-60 congruence while avoiding degenerate zero-length legs.
#[must_use]
pub fn derive_travel_time(stored: f64, arrival: f64, departure: f64) -> f64 {
    let residue = mod60(arrival - departure);
    let mut travel = hour_component(stored) + residue;
    while travel < TIME_PRECISION {
        travel += MINUTES_PER_CYCLE;
    }
    travel
}

/// Round a minute value to the display precision.
#[must_use]
pub fn round_to_precision(minutes: f64) -> f64 {
    (minutes / TIME_PRECISION).round() * TIME_PRECISION
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mod60_in_range() {
        assert_eq!(mod60(0.0), 0.0);
        assert_eq!(mod60(60.0), 0.0);
        assert_eq!(mod60(61.5), 1.5);
        assert_eq!(mod60(-1.0), 59.0);
        assert_eq!(mod60(-120.0), 0.0);
    }

    #[test]
    fn test_symmetric_mirror() {
        assert_eq!(symmetric(0.0), 0.0);
        assert_eq!(symmetric(15.0), 45.0);
        assert_eq!(symmetric(45.0), 15.0);
        assert_eq!(symmetric(60.0), 0.0);
        assert_eq!(symmetric(75.0), 45.0);
    }

    #[test]
    fn test_cycle_equal_wraps() {
        assert!(cycle_equal(0.0, 60.0));
        assert!(cycle_equal(59.999, 0.0));
        assert!(cycle_equal(12.0, 72.0));
        assert!(!cycle_equal(12.0, 13.0));
    }

    #[test]
    fn test_hour_component() {
        assert_eq!(hour_component(0.0), 0.0);
        assert_eq!(hour_component(59.0), 0.0);
        assert_eq!(hour_component(60.0), 60.0);
        assert_eq!(hour_component(125.0), 120.0);
        assert_eq!(hour_component(-5.0), 0.0);
    }

    #[test]
    fn test_derive_travel_time_keeps_hours() {
        // Plain single-hour leg: 10 -> 25 is 15 minutes.
        assert_eq!(derive_travel_time(15.0, 25.0, 10.0), 15.0);
        // A 75-minute leg nudged at the arrival end stays in the second hour.
        assert_eq!(derive_travel_time(75.0, 26.0, 10.0), 76.0);
    }

    #[test]
    fn test_derive_travel_time_never_degenerate() {
        // Arrival equals departure: the leg is a full cycle, not zero.
        assert_eq!(derive_travel_time(1.0, 10.0, 10.0), 60.0);
        // A multi-hour leg with zero residue keeps its hours.
        assert_eq!(derive_travel_time(120.0, 10.0, 10.0), 120.0);
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(12.4), 12.0);
        assert_eq!(round_to_precision(12.5), 13.0);
    }

    proptest! {
        #[test]
        fn prop_mod60_closed(minutes in -1_000.0f64..1_000.0) {
            let folded = mod60(minutes);
            prop_assert!((0.0..60.0).contains(&folded));
        }

        #[test]
        fn prop_symmetric_involution(minutes in 0.1f64..59.9) {
            // Away from the 0/60 fixed point, mirroring twice is identity.
            let mirrored = symmetric(symmetric(minutes));
            prop_assert!((mirrored - minutes).abs() < 1e-9);
        }

        #[test]
        fn prop_symmetric_fixed_point_near_zero(
            offset in 0.0f64..crate::constants::TIME_TOLERANCE,
        ) {
            prop_assert_eq!(symmetric(offset), 0.0);
        }

        #[test]
        fn prop_symmetric_sums_to_cycle(minutes in 0.0f64..60.0) {
            prop_assert!(cycle_equal(minutes + symmetric(minutes), 0.0));
        }

        #[test]
        fn prop_derive_travel_time_congruent(
            stored in 0.0f64..180.0,
            arrival in 0.0f64..60.0,
            departure in 0.0f64..60.0,
        ) {
            let travel = derive_travel_time(stored, arrival, departure);
            prop_assert!(travel >= crate::constants::TIME_PRECISION);
            prop_assert!(cycle_equal(departure + travel, arrival));
        }
    }
}
