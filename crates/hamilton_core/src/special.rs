//! Complete elliptic integrals by the arithmetic-geometric mean.
//!
//! Both functions take the modulus k (not the parameter m = k^2).

use std::f64::consts::FRAC_PI_2;

const AGM_MAX_ITERATIONS: usize = 64;

struct AgmSums {
    mean: f64,
    /// sum over n of 2^(n-1) c_n^2
    weighted_c: f64,
}

fn agm(k: f64) -> AgmSums {
    let mut a = 1.0;
    let mut b = (1.0 - k * k).sqrt();
    let mut c = k;
    let mut weight = 0.5;
    let mut weighted_c = weight * c * c;

    for _ in 0..AGM_MAX_ITERATIONS {
        if c.abs() <= f64::EPSILON * a {
            break;
        }
        let next_a = 0.5 * (a + b);
        let next_b = (a * b).sqrt();
        c = 0.5 * (a - b);
        a = next_a;
        b = next_b;
        weight *= 2.0;
        weighted_c += weight * c * c;
    }

    AgmSums {
        mean: a,
        weighted_c,
    }
}

/// K(k), infinite at |k| = 1.
pub fn ellint_1(k: f64) -> f64 {
    if k.abs() >= 1.0 {
        return if k.abs() == 1.0 { f64::INFINITY } else { f64::NAN };
    }
    FRAC_PI_2 / agm(k).mean
}

/// E(k), equal to 1 at |k| = 1.
pub fn ellint_2(k: f64) -> f64 {
    if k.abs() >= 1.0 {
        return if k.abs() == 1.0 { 1.0 } else { f64::NAN };
    }
    let sums = agm(k);
    FRAC_PI_2 / sums.mean * (1.0 - sums.weighted_c)
}
