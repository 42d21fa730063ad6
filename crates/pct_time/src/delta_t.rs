//! ΔT = TT − UT, from the Espenak–Meeus polynomial expressions.
//!
//! Coverage is piecewise for 1800–2150; outside that span the long-term
//! parabola `−20 + 32·u²` is used.

use crate::julian::{SECONDS_PER_DAY, jd_to_decimal_year};

/// ΔT in seconds for a decimal year.
pub fn delta_t_seconds(year: f64) -> f64 {
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };

    if year < 1800.0 {
        long_term(year)
    } else if year < 1860.0 {
        let t = year - 1800.0;
        13.72 - 0.332447 * t + 0.006_861_2 * t.powi(2) + 0.004_111_6 * t.powi(3)
            - 0.000_374_36 * t.powi(4)
            + 0.000_012_127_2 * t.powi(5)
            - 0.000_000_169_9 * t.powi(6)
            + 0.000_000_000_875 * t.powi(7)
    } else if year < 1900.0 {
        let t = year - 1860.0;
        7.62 + 0.5737 * t - 0.251_754 * t.powi(2) + 0.016_806_68 * t.powi(3)
            - 0.000_447_362_4 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if year < 1920.0 {
        let t = year - 1900.0;
        -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3)
            - 0.000_197 * t.powi(4)
    } else if year < 1941.0 {
        let t = year - 1920.0;
        21.20 + 0.84493 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
    } else if year < 1961.0 {
        let t = year - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if year < 1986.0 {
        let t = year - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if year < 2005.0 {
        let t = year - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2)
            + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if year < 2050.0 {
        let t = year - 2000.0;
        62.92 + 0.32217 * t + 0.005_589 * t.powi(2)
    } else if year < 2150.0 {
        long_term(year) - 0.5628 * (2150.0 - year)
    } else {
        long_term(year)
    }
}

/// Convert a Julian Date in UT to Terrestrial Time.
pub fn jd_ut_to_tt(jd_ut: f64) -> f64 {
    jd_ut + delta_t_seconds(jd_to_decimal_year(jd_ut)) / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_2000_near_64s() {
        let dt = delta_t_seconds(2000.0);
        assert!((dt - 63.86).abs() < 0.01, "dt = {dt}");
    }

    #[test]
    fn year_1900_near_zero() {
        let dt = delta_t_seconds(1900.0);
        assert!(dt.abs() < 5.0, "dt = {dt}");
    }

    #[test]
    fn continuous_at_2005() {
        let before = delta_t_seconds(2004.999);
        let after = delta_t_seconds(2005.0);
        assert!((before - after).abs() < 1.0, "{before} vs {after}");
    }

    #[test]
    fn tt_is_later_than_ut_today() {
        let jd = 2_460_000.5;
        let tt = jd_ut_to_tt(jd);
        let secs = (tt - jd) * SECONDS_PER_DAY;
        assert!(secs > 60.0 && secs < 80.0, "secs = {secs}");
    }
}
