//! Utility maths functions

/// Clamp a value into the inclusive range `[min, max]`.
///
/// Unlike `Ord::clamp` this does not panic if `min > max`, the lower bound is
/// checked last and so takes priority.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: PartialOrd + Copy
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Saturating conversion of a wide integer into a `u16`.
pub fn saturate_u16(value: i64) -> u16 {
    clamp(&value, &0, &(u16::MAX as i64)) as u16
}
