//! # Piecewise Linear Interpolator
//!
//! Converts a signed command into a pulse width using the breakpoints of a [`CalibTable`].
//! Commands beyond the outermost breakpoints saturate to the outermost output, there is no
//! extrapolation past the ends of a table.
//!
//! All arithmetic is done in integers scaled by [`SCALE`], truncating toward zero on every
//! division, so that outputs are reproducible bit-for-bit on any target:
//!
//! ```text
//! slope  = (Δoutput * SCALE) / Δdomain
//! result = (out[i-1] * SCALE + slope * (x - domain[i-1])) / SCALE
//! ```
//!
//! The speed and steering drivers treat the region around zero differently, and both behaviours
//! are kept as-is rather than unified:
//!
//! | Command                     | [`interpolate_speed`]  | [`interpolate_steer`]             |
//! |-----------------------------|------------------------|-----------------------------------|
//! | `0`                         | `neutral`              | `output_pos[0]`                   |
//! | between 0 and breakpoint 0  | output of breakpoint 0 | first segment extended toward 0   |

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod table;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use table::*;

use crate::servo_ctrl::PulseWidth;
use util::maths::saturate_u16;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Precision factor for the fixed-point arithmetic.
pub const SCALE: i64 = 1000;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Interpolate a speed command.
///
/// Zero maps to `neutral`. A command between zero and the first breakpoint of its branch returns
/// that breakpoint's output without interpolating.
pub fn interpolate_speed(table: &CalibTable, speed: i32, neutral: PulseWidth) -> PulseWidth {
    let (dp, dn) = (table.domain_pos(), table.domain_neg());
    let (op, on) = (table.output_pos(), table.output_neg());
    let last = table.len() - 1;

    if speed == 0 {
        return neutral;
    }
    if speed >= dp[last] {
        return op[last];
    }
    if speed <= dn[last] {
        return on[last];
    }

    if speed < 0 {
        if speed >= dn[0] {
            return on[0];
        }

        for i in 1..=last {
            if speed >= dn[i] {
                return lerp_fixed((dn[i - 1], on[i - 1]), (dn[i], on[i]), speed);
            }
        }

        return neutral;
    }

    if speed <= dp[0] {
        return op[0];
    }

    for i in 1..=last {
        if speed <= dp[i] {
            return lerp_fixed((dp[i - 1], op[i - 1]), (dp[i], op[i]), speed);
        }
    }

    neutral
}

/// Interpolate a steering command.
///
/// Zero maps to the first positive output. A command between zero and the first breakpoint of its
/// branch is interpolated along the first segment of that branch.
pub fn interpolate_steer(table: &CalibTable, angle: i32) -> PulseWidth {
    let (dp, dn) = (table.domain_pos(), table.domain_neg());
    let (op, on) = (table.output_pos(), table.output_neg());
    let last = table.len() - 1;

    if angle == 0 {
        return op[0];
    }
    if angle >= dp[last] {
        return op[last];
    }
    if angle <= dn[last] {
        return on[last];
    }

    if angle < 0 {
        for i in 1..=last {
            if angle >= dn[i] {
                return lerp_fixed((dn[i - 1], on[i - 1]), (dn[i], on[i]), angle);
            }
        }

        return op[0];
    }

    for i in 1..=last {
        if angle <= dp[i] {
            return lerp_fixed((dp[i - 1], op[i - 1]), (dp[i], op[i]), angle);
        }
    }

    op[0]
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Fixed-point linear interpolation between two breakpoints.
///
/// The breakpoints must have different domain values, which [`CalibTable`] guarantees for adjacent
/// breakpoints. A command landing exactly on `end` returns its output unmodified, since the
/// truncated slope would otherwise fall short of it.
fn lerp_fixed(start: (i32, PulseWidth), end: (i32, PulseWidth), x: i32) -> PulseWidth {
    if x == end.0 {
        return end.1;
    }

    let (d0, o0) = (start.0 as i64, start.1.as_us() as i64);
    let (d1, o1) = (end.0 as i64, end.1.as_us() as i64);

    let delta_pwm = (o1 - o0) * SCALE;
    let delta_domain = d1 - d0;
    let slope = delta_pwm / delta_domain;

    let interp_fixed = o0 * SCALE + slope * (x as i64 - d0);

    PulseWidth(saturate_u16(interp_fixed / SCALE))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const NEUTRAL: PulseWidth = PulseWidth(1450);

    fn pw(v: &[u16]) -> Vec<PulseWidth> {
        v.iter().copied().map(PulseWidth).collect()
    }

    fn speed_table() -> CalibTable {
        CalibTable::new(
            vec![1, 10, 25],
            vec![-1, -10, -25],
            pw(&[1500, 1600, 1700]),
            pw(&[1400, 1300, 1100]),
        )
        .unwrap()
    }

    fn steer_table() -> CalibTable {
        CalibTable::new(
            vec![20, 150, 250],
            vec![-20, -150, -250],
            pw(&[1520, 1750, 1900]),
            pw(&[1480, 1250, 1100]),
        )
        .unwrap()
    }

    #[test]
    fn test_speed_zero_and_saturation() {
        let t = speed_table();

        assert_eq!(interpolate_speed(&t, 0, NEUTRAL), NEUTRAL);
        assert_eq!(interpolate_speed(&t, 25, NEUTRAL), PulseWidth(1700));
        assert_eq!(interpolate_speed(&t, 40, NEUTRAL), PulseWidth(1700));
        assert_eq!(interpolate_speed(&t, i32::MAX, NEUTRAL), PulseWidth(1700));
        assert_eq!(interpolate_speed(&t, -25, NEUTRAL), PulseWidth(1100));
        assert_eq!(interpolate_speed(&t, i32::MIN, NEUTRAL), PulseWidth(1100));
    }

    #[test]
    fn test_speed_below_first_breakpoint() {
        let t = CalibTable::new(
            vec![5, 10, 25],
            vec![-5, -10, -25],
            pw(&[1500, 1600, 1700]),
            pw(&[1400, 1300, 1100]),
        )
        .unwrap();

        // No interpolation between zero and the first breakpoint
        assert_eq!(interpolate_speed(&t, 1, NEUTRAL), PulseWidth(1500));
        assert_eq!(interpolate_speed(&t, 5, NEUTRAL), PulseWidth(1500));
        assert_eq!(interpolate_speed(&t, -1, NEUTRAL), PulseWidth(1400));
        assert_eq!(interpolate_speed(&t, -5, NEUTRAL), PulseWidth(1400));
    }

    #[test]
    fn test_knot_at_segment_end() {
        let t = speed_table();

        // slope = 100_000 / 9 = 11_111, which alone would land on 1599
        assert_eq!(interpolate_speed(&t, 10, NEUTRAL), PulseWidth(1600));
        assert_eq!(interpolate_speed(&t, 9, NEUTRAL), PulseWidth(1588));
    }

    #[test]
    fn test_speed_knots() {
        let t = speed_table();

        for i in 0..t.len() {
            assert_eq!(
                interpolate_speed(&t, t.domain_pos()[i], NEUTRAL),
                t.output_pos()[i]
            );
            assert_eq!(
                interpolate_speed(&t, t.domain_neg()[i], NEUTRAL),
                t.output_neg()[i]
            );
        }
    }

    #[test]
    fn test_speed_interpolation() {
        let t = speed_table();

        // slope = 100_000 / 9 = 11_111
        assert_eq!(interpolate_speed(&t, 5, NEUTRAL), PulseWidth(1544));
        // slope = 100_000 / 15 = 6_666
        assert_eq!(interpolate_speed(&t, 20, NEUTRAL), PulseWidth(1666));
        // slope = -100_000 / -9 = 11_111
        assert_eq!(interpolate_speed(&t, -5, NEUTRAL), PulseWidth(1355));
        // slope = -200_000 / -15 = 13_333
        assert_eq!(interpolate_speed(&t, -20, NEUTRAL), PulseWidth(1166));
    }

    #[test]
    fn test_fixed_point_truncation() {
        let t = CalibTable::new(
            vec![0, 3],
            vec![0, -3],
            pw(&[1000, 1001]),
            pw(&[1500, 1400]),
        )
        .unwrap();

        // slope = 1000 / 3 = 333, never enough to reach the next microsecond
        assert_eq!(interpolate_steer(&t, 1), PulseWidth(1000));
        assert_eq!(interpolate_steer(&t, 2), PulseWidth(1000));
        assert_eq!(interpolate_steer(&t, 3), PulseWidth(1001));

        // slope = -100_000 / -3 = 33_333
        assert_eq!(interpolate_steer(&t, -1), PulseWidth(1466));
        assert_eq!(interpolate_steer(&t, -2), PulseWidth(1433));
    }

    #[test]
    fn test_speed_monotonic() {
        let t = speed_table();

        let mut prev = interpolate_speed(&t, 1, NEUTRAL);
        for x in 2..=30 {
            let curr = interpolate_speed(&t, x, NEUTRAL);
            assert!(curr >= prev, "{} gave {} after {}", x, curr, prev);
            prev = curr;
        }

        let mut prev = interpolate_speed(&t, -1, NEUTRAL);
        for x in (-30..=-2).rev() {
            let curr = interpolate_speed(&t, x, NEUTRAL);
            assert!(curr <= prev, "{} gave {} after {}", x, curr, prev);
            prev = curr;
        }
    }

    #[test]
    fn test_steer_zero_and_saturation() {
        let t = steer_table();

        assert_eq!(interpolate_steer(&t, 0), PulseWidth(1520));
        assert_eq!(interpolate_steer(&t, 250), PulseWidth(1900));
        assert_eq!(interpolate_steer(&t, 1000), PulseWidth(1900));
        assert_eq!(interpolate_steer(&t, -250), PulseWidth(1100));
        assert_eq!(interpolate_steer(&t, -1000), PulseWidth(1100));
    }

    #[test]
    fn test_steer_knots() {
        let t = steer_table();

        for i in 0..t.len() {
            assert_eq!(interpolate_steer(&t, t.domain_pos()[i]), t.output_pos()[i]);
            assert_eq!(interpolate_steer(&t, t.domain_neg()[i]), t.output_neg()[i]);
        }
    }

    #[test]
    fn test_steer_below_first_breakpoint() {
        let t = steer_table();

        // slope = 230_000 / 130 = 1_769, first segment extended toward zero
        assert_eq!(interpolate_steer(&t, 10), PulseWidth(1502));
        // slope = -230_000 / -130 = 1_769
        assert_eq!(interpolate_steer(&t, -10), PulseWidth(1497));
    }

    #[test]
    fn test_steer_monotonic() {
        let t = steer_table();

        // Each branch is monotonic on its own, the extended first segments do not meet at zero
        for range in &[(-300, -1), (1, 300)] {
            let mut prev = interpolate_steer(&t, range.0);
            for x in (range.0 + 1)..=range.1 {
                let curr = interpolate_steer(&t, x);
                assert!(curr >= prev, "{} gave {} after {}", x, curr, prev);
                prev = curr;
            }
        }
    }

    #[test]
    fn test_single_breakpoint() {
        let t = CalibTable::new(vec![10], vec![-10], pw(&[1600]), pw(&[1400])).unwrap();

        assert_eq!(interpolate_speed(&t, 5, NEUTRAL), PulseWidth(1600));
        assert_eq!(interpolate_speed(&t, -5, NEUTRAL), PulseWidth(1400));
        assert_eq!(interpolate_speed(&t, 50, NEUTRAL), PulseWidth(1600));

        assert_eq!(interpolate_steer(&t, 5), PulseWidth(1600));
        assert_eq!(interpolate_steer(&t, -5), PulseWidth(1600));
        assert_eq!(interpolate_steer(&t, -50), PulseWidth(1400));
    }
}
