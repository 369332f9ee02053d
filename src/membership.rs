//! Membership scoring for the fuzzy set of "tall people"
//!
//! A three-segment piecewise-linear approximation of a sigmoid:
//!
//! ```text
//! degree
//!   1.0 |                    ______
//!   0.8 |               ____/
//!       |          ____/
//!   0.0 |_________/
//!       +---------+---------+----+------> height (cm)
//!                160       180  190
//! ```
//!
//! The curve is continuous at every segment boundary, so the output always
//! lies in `[0, 1]` without any clamping.

use std::ops::RangeInclusive;

/// Heights below this score zero
pub const LOWER_KNEE: f64 = 160.0;

/// Height at which the steep segment ends
pub const MIDDLE_KNEE: f64 = 180.0;

/// Heights at or above this score one
pub const UPPER_KNEE: f64 = 190.0;

/// Degree reached at the end of the steep segment
pub const MIDDLE_DEGREE: f64 = 0.8;

/// Range offered by the interactive height slider
pub const HEIGHT_RANGE: RangeInclusive<f64> = 140.0..=220.0;

/// Height shown before the user moves the slider
pub const DEFAULT_HEIGHT: f64 = 175.0;

/// Membership degree of a height (in cm) in the fuzzy set of tall people.
///
/// The documented slider range is 140-220 cm but the formula is defined for
/// any real input. A NaN height has no meaningful tallness and scores `0.0`.
pub fn score(height: f64) -> f64 {
    if height.is_nan() || height < LOWER_KNEE {
        0.0
    } else if height < MIDDLE_KNEE {
        (height - LOWER_KNEE) / (MIDDLE_KNEE - LOWER_KNEE) * MIDDLE_DEGREE
    } else if height < UPPER_KNEE {
        MIDDLE_DEGREE + (height - MIDDLE_KNEE) / (UPPER_KNEE - MIDDLE_KNEE) * (1.0 - MIDDLE_DEGREE)
    } else {
        1.0
    }
}
