//! Bessel function of the first kind for real order and real argument.
//!
//! The root searches only ever need point values of J_ν(x), so the evaluator
//! sits behind the [`BesselFunction`] trait and any special-function library
//! can stand in for the built-in [`BesselJ`].

use std::f64::consts::PI;

/// A provider of J_ν(x) for real ν ≥ 0 and real x.
pub trait BesselFunction {
    /// Returns J_order(argument). NaN signals an argument the provider cannot evaluate.
    fn evaluate(&self, order: f64, argument: f64) -> f64;

    /// Derivative with respect to the argument, J'_ν(x) = (ν/x) J_ν(x) - J_{ν+1}(x).
    fn derivative(&self, order: f64, argument: f64) -> f64 {
        if argument == 0.0 {
            return if order == 1.0 { 0.5 } else { 0.0 };
        }
        order / argument * self.evaluate(order, argument) - self.evaluate(order + 1.0, argument)
    }
}

impl<B: BesselFunction + ?Sized> BesselFunction for &B {
    fn evaluate(&self, order: f64, argument: f64) -> f64 {
        (**self).evaluate(order, argument)
    }
}

/// J_ν(x) via Steed's continued fractions, with Temme's series below `x = 2`
/// and Hankel's asymptotic expansion once `x` is large against both 1000 and ν².
#[derive(Debug, Clone, Copy, Default)]
pub struct BesselJ;

const EPS: f64 = 1.0e-16;
const FPMIN: f64 = 1.0e-30;
const MAX_ITERATIONS: usize = 100_000;
const SERIES_LIMIT: f64 = 2.0;
const ASYMPTOTIC_LIMIT: f64 = 1000.0;
// CF1 needs roughly x iterations; beyond this the argument is treated as unusable.
const MAX_CF1_ITERATIONS: f64 = 1.0e8;

// Chebyshev coefficients for 1/Γ(1 - μ) and 1/Γ(1 + μ) combinations, |μ| ≤ 1/2.
const GAMMA1_COEFFS: [f64; 7] = [
    -1.142022680371168e0,
    6.5165112670737e-3,
    3.087090173086e-4,
    -3.4706269649e-6,
    6.9437664e-9,
    3.67795e-11,
    -1.356e-13,
];
const GAMMA2_COEFFS: [f64; 8] = [
    1.843740587300905e0,
    -7.68528408447867e-2,
    1.2719271366546e-3,
    -4.9717367042e-6,
    -3.31261198e-8,
    2.423096e-10,
    -1.702e-13,
    -1.49e-15,
];

impl BesselFunction for BesselJ {
    fn evaluate(&self, order: f64, argument: f64) -> f64 {
        if !order.is_finite() || order < 0.0 || argument.is_nan() {
            return f64::NAN;
        }
        if argument == 0.0 {
            return if order == 0.0 { 1.0 } else { 0.0 };
        }
        if argument < 0.0 {
            // Only integral orders stay real on the negative axis.
            if order.fract() != 0.0 {
                return f64::NAN;
            }
            let value = besselj_positive(order, -argument);
            return if order % 2.0 == 0.0 { value } else { -value };
        }
        besselj_positive(order, argument)
    }
}

fn besselj_positive(nu: f64, x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    if x >= ASYMPTOTIC_LIMIT && x >= nu * nu {
        return hankel_asymptotic(nu, x);
    }
    // Recur down from nu to mu = nu - nl, with |mu| <= 1/2 for the series
    // branch and mu chosen so that mu < x for the continued fraction branch.
    let nl = if x < SERIES_LIMIT {
        (nu + 0.5) as usize
    } else {
        (nu - x + 1.5).max(0.0) as usize
    };
    let mu = nu - nl as f64;
    let mu2 = mu * mu;
    let xi = 1.0 / x;
    let xi2 = 2.0 * xi;
    let wronskian = xi2 / PI;

    // CF1: J'_nu / J_nu by modified Lentz.
    let mut sign = 1.0;
    let mut h = (nu * xi).max(FPMIN);
    let mut b = xi2 * nu;
    let mut d = 0.0;
    let mut c = h;
    let mut converged = false;
    let cf1_iterations = (2.0 * x).clamp(MAX_ITERATIONS as f64, MAX_CF1_ITERATIONS) as usize;
    for _ in 0..cf1_iterations {
        b += xi2;
        d = b - d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b - 1.0 / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = c * d;
        h *= delta;
        if d < 0.0 {
            sign = -sign;
        }
        if (delta - 1.0).abs() < EPS {
            converged = true;
            break;
        }
    }
    if !converged {
        return f64::NAN;
    }

    let mut j_l = sign * FPMIN;
    let mut jp_l = h * j_l;
    let j_nu_unscaled = j_l;
    let mut fact = nu * xi;
    for _ in 0..nl {
        let j_tmp = fact * j_l + jp_l;
        fact -= xi;
        jp_l = fact * j_tmp - j_l;
        j_l = j_tmp;
    }
    if j_l == 0.0 {
        j_l = EPS;
    }
    let f = jp_l / j_l;

    let j_mu = if x < SERIES_LIMIT {
        match temme_series(mu, mu2, x, xi, xi2) {
            Some((y_mu, y_mu_prime)) => wronskian / (y_mu_prime - f * y_mu),
            None => return f64::NAN,
        }
    } else {
        match steed_cf2(mu2, x, xi) {
            Some((p, q)) => {
                let gamma = (p - f) / q;
                let magnitude = (wronskian / ((p - f) * gamma + q)).sqrt();
                magnitude.copysign(j_l)
            }
            None => return f64::NAN,
        }
    };

    j_nu_unscaled * (j_mu / j_l)
}

/// J_ν(x) = sqrt(2 / (πx)) (P cos χ - Q sin χ), χ = x - (ν/2 + 1/4)π.
///
/// P and Q are summed until the terms drop below machine precision or start
/// to grow, whichever comes first.
fn hankel_asymptotic(nu: f64, x: f64) -> f64 {
    let mu = 4.0 * nu * nu;
    let mut p = 0.0;
    let mut q = 0.0;
    // a_k(ν) / x^k
    let mut term = 1.0f64;
    for k in 0..MAX_ITERATIONS {
        let signed = if (k / 2) % 2 == 0 { term } else { -term };
        if k % 2 == 0 {
            p += signed;
        } else {
            q += signed;
        }
        let odd = (2 * k + 1) as f64;
        let next = term * (mu - odd * odd) / ((k + 1) as f64 * 8.0 * x);
        let scale = p.abs().max(q.abs());
        if next.abs() < EPS * scale || (odd * odd > mu && next.abs() >= term.abs()) {
            break;
        }
        term = next;
    }

    // cos and sin of x - phase, without forming the difference.
    let phase = (0.5 * nu + 0.25) * PI;
    let (sin_x, cos_x) = x.sin_cos();
    let (sin_p, cos_p) = phase.sin_cos();
    let cos_chi = cos_x * cos_p + sin_x * sin_p;
    let sin_chi = sin_x * cos_p - cos_x * sin_p;
    (2.0 / (PI * x)).sqrt() * (p * cos_chi - q * sin_chi)
}

/// Temme's series for Y_mu and Y'_mu, valid for x < 2.
fn temme_series(mu: f64, mu2: f64, x: f64, xi: f64, xi2: f64) -> Option<(f64, f64)> {
    let x2 = 0.5 * x;
    let pimu = PI * mu;
    let fact = if pimu.abs() < EPS { 1.0 } else { pimu / pimu.sin() };
    let d = -x2.ln();
    let e = mu * d;
    let fact2 = if e.abs() < EPS { 1.0 } else { e.sinh() / e };
    let (gam1, gam2, gampl, gammi) = gamma_terms(mu);
    let mut ff = 2.0 / PI * fact * (gam1 * e.cosh() + gam2 * fact2 * d);
    let e = e.exp();
    let mut p = e / (gampl * PI);
    let mut q = 1.0 / (e * PI * gammi);
    let pimu2 = 0.5 * pimu;
    let fact3 = if pimu2.abs() < EPS {
        1.0
    } else {
        pimu2.sin() / pimu2
    };
    let r = PI * pimu2 * fact3 * fact3;
    let mut c = 1.0;
    let d = -x2 * x2;
    let mut sum = ff + r * q;
    let mut sum1 = p;
    for i in 1..=MAX_ITERATIONS {
        let i = i as f64;
        ff = (i * ff + p + q) / (i * i - mu2);
        c *= d / i;
        p /= i - mu;
        q /= i + mu;
        let delta = c * (ff + r * q);
        sum += delta;
        sum1 += c * p - i * delta;
        if delta.abs() < (1.0 + sum.abs()) * EPS {
            let y_mu = -sum;
            let y1 = -sum1 * xi2;
            return Some((y_mu, mu * xi * y_mu - y1));
        }
    }
    None
}

/// CF2 (p + iq) by complex modified Lentz, valid for x >= 2.
fn steed_cf2(mu2: f64, x: f64, xi: f64) -> Option<(f64, f64)> {
    let mut a = 0.25 - mu2;
    let mut p = -0.5 * xi;
    let mut q = 1.0;
    let br = 2.0 * x;
    let mut bi = 2.0;
    let fact = a * xi / (p * p + q * q);
    let mut cr = br + q * fact;
    let mut ci = bi + p * fact;
    let den = br * br + bi * bi;
    let mut dr = br / den;
    let mut di = -bi / den;
    let mut dlr = cr * dr - ci * di;
    let mut dli = cr * di + ci * dr;
    let temp = p * dlr - q * dli;
    q = p * dli + q * dlr;
    p = temp;
    for i in 2..=MAX_ITERATIONS {
        a += 2.0 * (i - 1) as f64;
        bi += 2.0;
        dr = a * dr + br;
        di = a * di + bi;
        if dr.abs() + di.abs() < FPMIN {
            dr = FPMIN;
        }
        let fact = a / (cr * cr + ci * ci);
        cr = br + cr * fact;
        ci = bi - ci * fact;
        if cr.abs() + ci.abs() < FPMIN {
            cr = FPMIN;
        }
        let den = dr * dr + di * di;
        dr /= den;
        di /= -den;
        dlr = cr * dr - ci * di;
        dli = cr * di + ci * dr;
        let temp = p * dlr - q * dli;
        q = p * dli + q * dlr;
        p = temp;
        if (dlr - 1.0).abs() + dli.abs() < EPS {
            return Some((p, q));
        }
    }
    None
}

fn gamma_terms(mu: f64) -> (f64, f64, f64, f64) {
    let xx = 8.0 * mu * mu - 1.0;
    let gam1 = chebyshev(&GAMMA1_COEFFS, xx);
    let gam2 = chebyshev(&GAMMA2_COEFFS, xx);
    (gam1, gam2, gam2 - mu * gam1, gam2 + mu * gam1)
}

/// Clenshaw evaluation of a Chebyshev series on [-1, 1].
fn chebyshev(coeffs: &[f64], y: f64) -> f64 {
    let y2 = 2.0 * y;
    let mut d = 0.0;
    let mut dd = 0.0;
    for &c in coeffs[1..].iter().rev() {
        let sv = d;
        d = y2 * d - dd + c;
        dd = sv;
    }
    y * d - dd + 0.5 * coeffs[0]
}
