//! Float helpers missing from `core`

/// Largest magnitude below which an `f32` can have a fractional part
const F32_INTEGRAL_THRESHOLD: f32 = 8_388_608.0;

pub(crate) fn abs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// Inclusive clamp, passing NaN through unchanged
pub(crate) fn clamp(x: f32, min: f32, max: f32) -> f32 {
    if x > max {
        max
    } else if x < min {
        min
    } else {
        x
    }
}

pub(crate) fn ceil(x: f32) -> f32 {
    if !x.is_finite() || abs(x) >= F32_INTEGRAL_THRESHOLD {
        return x;
    }
    let truncated = x as i32 as f32;
    if truncated < x {
        truncated + 1.0
    } else {
        truncated
    }
}

/// Round up to `decimals` places
///
/// Values are returned unchanged when the scale overflows.
pub(crate) fn round_up_to_decimals(value: f32, decimals: u32) -> f32 {
    let mut scale = 1.0f32;
    for _ in 0..decimals {
        scale *= 10.0;
    }
    let scaled = value * scale;
    if !scale.is_finite() || !scaled.is_finite() {
        return value;
    }
    ceil(scaled) / scale
}

/// Approximate equality within `epsilon`
pub(crate) fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    abs(a - b) <= epsilon
}
