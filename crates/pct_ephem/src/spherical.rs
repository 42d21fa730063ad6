//! Cartesian → spherical ecliptic coordinates.

use crate::angle::normalize_360;

/// Ecliptic position: longitude, latitude, distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    /// Longitude in degrees, range [0, 360).
    pub lon_deg: f64,
    /// Latitude in degrees, range [-90, 90].
    pub lat_deg: f64,
    /// Distance from the observer in AU (0 for computed points).
    pub distance_au: f64,
}

/// Longitude together with its rate of change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeState {
    /// Longitude in degrees, range [0, 360).
    pub lon_deg: f64,
    /// Latitude in degrees.
    pub lat_deg: f64,
    /// Longitude rate of change in deg/day. Negative while retrograde.
    pub speed_deg_per_day: f64,
}

impl LongitudeState {
    pub fn is_retrograde(&self) -> bool {
        self.speed_deg_per_day < 0.0
    }
}

/// Convert Cartesian `[x, y, z]` (AU) to ecliptic spherical coordinates.
pub fn cartesian_to_ecliptic(xyz: &[f64; 3]) -> EclipticPosition {
    let [x, y, z] = *xyz;
    let r = (x * x + y * y + z * z).sqrt();

    if r == 0.0 {
        return EclipticPosition {
            lon_deg: 0.0,
            lat_deg: 0.0,
            distance_au: 0.0,
        };
    }

    EclipticPosition {
        lon_deg: normalize_360(y.atan2(x).to_degrees()),
        lat_deg: (z / r).asin().to_degrees(),
        distance_au: r,
    }
}

/// Component-wise `a - b`.
pub(crate) fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
