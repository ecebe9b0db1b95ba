use crate::traits::Scalar;

/// `count` evenly spaced values on `[start, end)`.
pub fn linspace_half_open<T: Scalar>(start: T, end: T, count: usize) -> Vec<T> {
    if count == 0 {
        return Vec::new();
    }
    let n = T::from_usize(count).unwrap_or_else(T::one);
    let step = (end - start) / n;
    (0..count)
        .map(|i| start + step * T::from_usize(i).unwrap_or_else(T::zero))
        .collect()
}

/// Maps an angle onto (-pi, pi].
pub fn wrap_minus_pi_pi<T: Scalar>(angle: T) -> T {
    let two_pi = T::PI() + T::PI();
    angle - two_pi * ((angle - T::PI()) / two_pi).ceil()
}
