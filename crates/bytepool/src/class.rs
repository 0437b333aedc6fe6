//! Size-class layout and index arithmetic.
//!
//! Classes double from `min` until the next step would reach `max`, then a
//! terminal class sits at exactly `max`. Index selection uses integer
//! arithmetic only: the class for `size` is the smallest `i` such that
//! `min << i >= size`, which is `ceil(log2(size / min))` without any
//! floating-point rounding at power-of-two boundaries.

/// Capacities of every class for the given (already clamped) bounds.
pub(crate) fn class_capacities(min: usize, max: usize) -> Vec<usize> {
    let mut capacities = Vec::new();
    let mut capacity = min;
    while capacity < max {
        capacities.push(capacity);
        match capacity.checked_mul(2) {
            Some(next) => capacity = next,
            None => break,
        }
    }
    capacities.push(max);
    capacities
}

/// Smallest `i` with `min << i >= size`, for `min < size`.
#[inline]
pub(crate) fn doubling_index(size: usize, min: usize) -> usize {
    let ratio = size.div_ceil(min);
    ratio.next_power_of_two().trailing_zeros() as usize
}
