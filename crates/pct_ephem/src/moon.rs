//! Geocentric Moon and mean lunar node.
//!
//! The Moon uses the low-precision series of the Astronomical Almanac
//! (about 0.3° in longitude), referred to the mean equinox of date.

/// Equatorial radius of the Earth in km.
const EARTH_RADIUS_KM: f64 = 6378.14;

/// Astronomical unit in km.
pub(crate) const AU_KM: f64 = 149_597_870.7;

fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

/// Geocentric ecliptic `(lon_deg, lat_deg, distance_au)` of the Moon,
/// mean equinox of date, at `t` Julian centuries (TT) past J2000.
pub(crate) fn moon_of_date(t: f64) -> (f64, f64, f64) {
    let lon = 218.32 + 481_267.881 * t
        + 6.29 * sin_deg(135.0 + 477_198.87 * t)
        - 1.27 * sin_deg(259.3 - 413_335.36 * t)
        + 0.66 * sin_deg(235.7 + 890_534.22 * t)
        + 0.21 * sin_deg(269.9 + 954_397.74 * t)
        - 0.19 * sin_deg(357.5 + 35_999.05 * t)
        - 0.11 * sin_deg(186.5 + 966_404.03 * t);

    let lat = 5.13 * sin_deg(93.3 + 483_202.02 * t)
        + 0.28 * sin_deg(228.2 + 960_400.89 * t)
        - 0.28 * sin_deg(318.3 + 6_003.15 * t)
        - 0.17 * sin_deg(217.6 - 407_332.21 * t);

    let parallax = 0.9508
        + 0.0518 * cos_deg(135.0 + 477_198.87 * t)
        + 0.0095 * cos_deg(259.3 - 413_335.36 * t)
        + 0.0078 * cos_deg(235.7 + 890_534.22 * t)
        + 0.0028 * cos_deg(269.9 + 954_397.74 * t);

    let distance_au = EARTH_RADIUS_KM / sin_deg(parallax) / AU_KM;
    (lon, lat, distance_au)
}

/// Mean longitude of the ascending lunar node, mean equinox of date (Meeus 47.7).
pub(crate) fn mean_node_of_date(t: f64) -> f64 {
    125.044_547_9 - 1_934.136_289_1 * t + 0.002_075_4 * t * t + t * t * t / 467_441.0
        - t * t * t * t / 60_616_000.0
}

/// Accumulated general precession in longitude since J2000 (IAU 2006), degrees.
pub(crate) fn general_precession_deg(t: f64) -> f64 {
    (5_028.796_195 * t + 1.105_434_8 * t * t) / 3600.0
}
