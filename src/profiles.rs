//! Initial profiles commonly used to exercise advection schemes.

use crate::Float;

/// Riemann data: `left` for `x < at`, `right` otherwise.
pub fn riemann(left: Float, right: Float, at: Float) -> impl Fn(Float) -> Float + Clone {
    move |x| if x < at { left } else { right }
}

/// Gaussian bump `alpha exp(-beta x^2)`.
pub fn bump(alpha: Float, beta: Float) -> impl Fn(Float) -> Float + Clone {
    move |x| alpha * (-beta * x * x).exp()
}

/// `height` on `[a, b]`, `bottom` elsewhere. An inverted interval gives the zero profile.
pub fn heaviside(
    a: Float,
    b: Float,
    bottom: Float,
    height: Float,
) -> impl Fn(Float) -> Float + Clone {
    move |x| {
        if b < a {
            0.0
        } else if (a..=b).contains(&x) {
            height
        } else {
            bottom
        }
    }
}

// smooth cubic transitions between two constant states

/// 1 → 0.5 over `[0, 2]`.
pub fn cubic_drop_to_half(x: Float) -> Float {
    if x < 0.0 {
        1.0
    } else if x <= 2.0 {
        1.0 - 0.125 * x * x * (3.0 - x)
    } else {
        0.5
    }
}

/// 1 → 0 over `[0, 2]`.
pub fn cubic_drop_to_zero(x: Float) -> Float {
    if x < 0.0 {
        1.0
    } else if x <= 2.0 {
        0.25 * (x + 1.0) * (x - 2.0).powi(2)
    } else {
        0.0
    }
}

/// 0.5 → 1 over `[-1, 1]`.
pub fn cubic_rise_to_one(x: Float) -> Float {
    if x < -1.0 {
        0.5
    } else if x <= 1.0 {
        0.5 - 0.125 * (x - 2.0) * (x + 1.0).powi(2)
    } else {
        1.0
    }
}

/// 1.1 → 0.9 over `[0, 2]`.
pub fn cubic_small_drop(x: Float) -> Float {
    if x < 0.0 {
        1.1
    } else if x <= 2.0 {
        0.05 * x.powi(3) - 0.15 * x * x + 1.1
    } else {
        0.9
    }
}
