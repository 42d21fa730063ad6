//! Angle normalization helpers shared by every crate in the workspace.

/// Normalize an angle to [0, 360) degrees.
pub fn normalize_360(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Normalize an angle to (-180, +180] degrees.
pub fn normalize_pm180(deg: f64) -> f64 {
    let d = normalize_360(deg);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Smallest absolute angular distance between two longitudes, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    normalize_pm180(a - b).abs()
}
