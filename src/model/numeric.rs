use std::f64::consts::{PI, SQRT_2};

use super::error::RatingError;

// Rational approximation coefficients for the inverse normal CDF
// (central region numerator / denominator, tail numerator / denominator).
const A: [f64; 6] = [
    -3.969683028665376e+01,
    2.209460984245205e+02,
    -2.759285104469687e+02,
    1.383577518672690e+02,
    -3.066479806614716e+01,
    2.506628277459239e+00
];
const B: [f64; 5] = [
    -5.447609879822406e+01,
    1.615858368580409e+02,
    -1.556989798598866e+02,
    6.680131188771972e+01,
    -1.328068155288572e+01
];
const C: [f64; 6] = [
    -7.784894002430293e-03,
    -3.223964580411365e-01,
    -2.400758277161838e+00,
    -2.549732539343734e+00,
    4.374664141464968e+00,
    2.938163982698783e+00
];
const D: [f64; 4] = [
    7.784695709041462e-03,
    3.224671290700398e-01,
    2.445134137142996e+00,
    3.754408661907416e+00
];

const P_LOW: f64 = 0.02425;
const P_HIGH: f64 = 1.0 - P_LOW;

/// Error function, Chebyshev-fitted exponential approximation with a
/// fractional error below 1.2e-7 everywhere.
///
/// The result is odd by construction (`erf(-x) == -erf(x)` bit for bit) and
/// `erf(0.0)` is exactly zero, which keeps [`win_probability`] at exactly
/// one half for identical opponents.
pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    let t = 1.0 / (1.0 + 0.5 * x.abs());
    let poly = -1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398 + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let result = 1.0 - t * (-x * x + poly).exp();

    if x >= 0.0 {
        result
    } else {
        -result
    }
}

pub fn erfc(x: f64) -> f64 {
    1.0 - erf(x)
}

/// Probability that a participant rated `rating_a` (volatility `vol_a`)
/// finishes ahead of one rated `rating_b` (volatility `vol_b`).
pub fn win_probability(rating_a: f64, rating_b: f64, vol_a: f64, vol_b: f64) -> f64 {
    (erf((rating_a - rating_b) / (2.0 * (vol_a * vol_a + vol_b * vol_b)).sqrt()) + 1.0) * 0.5
}

/// Inverse of the standard normal CDF.
///
/// Three-region rational approximation (lower tail, central, upper tail) followed
/// by one Halley step against [`erfc`]. Returns negative / positive infinity at
/// `p <= 0` / `p >= 1` and propagates NaN. Use [`performance`] when an
/// out-of-range `p` indicates a bug rather than a boundary.
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let z = if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        tail(q)
    } else if p > P_HIGH {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -tail(q)
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    };

    refine(z, p)
}

fn tail(q: f64) -> f64 {
    (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
        / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
}

/// One Halley correction step of `x` towards the root of `Phi(x) - p`.
fn refine(x: f64, p: f64) -> f64 {
    let e = 0.5 * erfc(-x / SQRT_2) - p;
    let u = e * (2.0 * PI).sqrt() * (x * x / 2.0).exp();

    x - u / (1.0 + x * u / 2.0)
}

/// Converts a rank fraction into a performance value, `-inverse_normal_cdf(p)`.
///
/// Every `p` the pipeline produces lies strictly inside `(0, 1)` for rosters of
/// two or more participants, so anything else is reported instead of clamped.
pub fn performance(p: f64) -> Result<f64, RatingError> {
    if !(p > 0.0 && p < 1.0) {
        return Err(RatingError::NumericDomain { p });
    }

    Ok(-inverse_normal_cdf(p))
}
