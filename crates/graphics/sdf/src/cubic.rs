//! Closed-form roots of polynomials up to degree three.
//!
//! Roots that are not real (or don't exist) are reported as [f64::INFINITY].

use std::f64::consts::PI;

/// Discriminants within this distance of zero are treated as a double root
pub const DISCRIMINANT_EPSILON: f64 = 1e-7;

/// Leading coefficients smaller than this are treated as zero
const COEFFICIENT_EPSILON: f64 = 1e-12;

/// Find the real roots of `a3 t³ + a2 t² + a1 t + a0`.
///
/// The polynomial is solved as a lower degree one if the leading coefficients vanish.
#[must_use]
pub fn solve_cubic(a3: f64, a2: f64, a1: f64, a0: f64) -> [f64; 3] {
    if a3.abs() < COEFFICIENT_EPSILON {
        let [r0, r1] = solve_quadratic(a2, a1, a0);
        return [r0, r1, f64::INFINITY];
    }

    // Normalize to t³ + at² + bt + c
    let a = a2 / a3;
    let b = a1 / a3;
    let c = a0 / a3;

    let q = (3. * b - a * a) / 9.;
    let r = (9. * a * b - 27. * c - 2. * a * a * a) / 54.;
    let discriminant = q * q * q + r * r;
    let shift = a / 3.;

    if discriminant > DISCRIMINANT_EPSILON {
        // One real root
        let root_of_discriminant = discriminant.sqrt();
        let s = (r + root_of_discriminant).cbrt();
        let u = (r - root_of_discriminant).cbrt();
        [s + u - shift, f64::INFINITY, f64::INFINITY]
    } else if discriminant < -DISCRIMINANT_EPSILON {
        // Three distinct real roots
        let theta = (r / (-q * q * q).sqrt()).clamp(-1., 1.).acos();
        let magnitude = 2. * (-q).sqrt();
        [0., 1., 2.].map(|k| magnitude * ((theta + 2. * PI * k) / 3.).cos() - shift)
    } else {
        let s = r.cbrt();
        [2. * s - shift, -s - shift, f64::INFINITY]
    }
}

/// Find the real roots of `a2 t² + a1 t + a0`
#[must_use]
pub fn solve_quadratic(a2: f64, a1: f64, a0: f64) -> [f64; 2] {
    if a2.abs() < COEFFICIENT_EPSILON {
        return [solve_linear(a1, a0), f64::INFINITY];
    }

    let discriminant = a1 * a1 - 4. * a2 * a0;
    if discriminant < 0. {
        return [f64::INFINITY; 2];
    }

    let root_of_discriminant = discriminant.sqrt();
    [
        (-a1 + root_of_discriminant) / (2. * a2),
        (-a1 - root_of_discriminant) / (2. * a2),
    ]
}

/// Find the root of `a1 t + a0`
#[must_use]
pub fn solve_linear(a1: f64, a0: f64) -> f64 {
    if a1.abs() < COEFFICIENT_EPSILON {
        f64::INFINITY
    } else {
        -a0 / a1
    }
}
