//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
///
/// A `NAN` value is returned unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Clamp a value into the symmetric range `[-limit, limit]`.
pub fn clamp_abs<T>(value: T, limit: T) -> T
where
    T: Float,
{
    clamp(value, -limit.abs(), limit.abs())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap a difference between two values on a circular range of width `span`
/// (e.g. `2pi` for radians, `360` for degrees) into `[-span/2, span/2)`.
///
/// The result is the shortest signed distance around the range.
pub fn wrap_to_half_span<T>(value: T, span: T) -> T
where
    T: Float,
{
    let two = T::one() + T::one();
    let half = span.abs() / two;

    rem_euclid(value + half, span.abs()) - half
}
