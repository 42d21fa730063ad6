//! Bisection, golden-section minimisation and scan guards shared by every
//! search in this crate.

use crate::error::SearchError;

/// Most coarse samples a single scan may take.
pub(crate) const MAX_SCAN_SAMPLES: f64 = 10_000_000.0;

/// 1/φ, the golden-section shrink factor.
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Side of zero a sample lies on. Exactly zero counts as positive.
pub(crate) fn side(v: f64) -> bool {
    v >= 0.0
}

/// Check that a scan from `jd_from` to `jd_to` in steps of `step_days`
/// advances at every sample and stays within [`MAX_SCAN_SAMPLES`].
pub(crate) fn check_scan(jd_from: f64, jd_to: f64, step_days: f64) -> Result<(), SearchError> {
    if !jd_from.is_finite() || !jd_to.is_finite() {
        return Err(SearchError::InvalidConfig("scan bounds must be finite"));
    }
    // ULP spacing is largest at the endpoint farthest from zero.
    let far = if jd_from.abs() >= jd_to.abs() { jd_from } else { jd_to };
    if far + step_days == far || far - step_days == far {
        return Err(SearchError::InvalidConfig(
            "step_days is below the time resolution at this epoch",
        ));
    }
    if (jd_to - jd_from).abs() / step_days > MAX_SCAN_SAMPLES {
        return Err(SearchError::InvalidConfig("scan needs too many samples for step_days"));
    }
    Ok(())
}

/// Bisect a sign change of `f_at` between `t_a` and `t_b`.
///
/// `f_a` is the value at `t_a`; only its side of zero matters. Halves the
/// bracket until it is narrower than `tolerance_days` and returns the
/// midpoint. Fails with [`SearchError::NoConvergence`] when `max_iter`
/// halvings are spent first, or when the bracket can no longer shrink in
/// floating point.
pub(crate) fn bisect_zero<F>(
    mut t_a: f64,
    f_a: f64,
    mut t_b: f64,
    max_iter: u32,
    tolerance_days: f64,
    f_at: &F,
) -> Result<f64, SearchError>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    let side_a = side(f_a);
    for _ in 0..max_iter {
        if (t_b - t_a).abs() < tolerance_days {
            return Ok(0.5 * (t_a + t_b));
        }
        let t_mid = 0.5 * (t_a + t_b);
        if t_mid == t_a || t_mid == t_b {
            break;
        }
        let f_mid = f_at(t_mid)?;

        if side(f_mid) == side_a {
            t_a = t_mid;
        } else {
            t_b = t_mid;
        }
    }

    if (t_b - t_a).abs() < tolerance_days {
        return Ok(0.5 * (t_a + t_b));
    }
    Err(SearchError::NoConvergence {
        iterations: max_iter,
        width_days: (t_b - t_a).abs(),
    })
}

/// Golden-section search for the minimum of `f_at` on `[a, b]`.
///
/// Assumes one minimum inside the interval. Returns `(t, f(t))` once the
/// interval is narrower than `tolerance_days`.
pub(crate) fn golden_min<F>(
    a: f64,
    b: f64,
    max_iter: u32,
    tolerance_days: f64,
    f_at: &F,
) -> Result<(f64, f64), SearchError>
where
    F: Fn(f64) -> Result<f64, SearchError>,
{
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut f_c = f_at(c)?;
    let mut f_d = f_at(d)?;

    for _ in 0..max_iter {
        if b - a < tolerance_days {
            break;
        }
        if f_c < f_d {
            b = d;
            d = c;
            f_d = f_c;
            c = b - INV_PHI * (b - a);
            f_c = f_at(c)?;
        } else {
            a = c;
            c = d;
            f_c = f_d;
            d = a + INV_PHI * (b - a);
            f_d = f_at(d)?;
        }
    }

    if b - a < tolerance_days {
        let t = 0.5 * (a + b);
        return Ok((t, f_at(t)?));
    }
    Err(SearchError::NoConvergence {
        iterations: max_iter,
        width_days: b - a,
    })
}
