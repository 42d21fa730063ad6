//! The [`Ephemeris`] seam and the built-in analytic source.

use pct_time::{calendar_to_jd, jd_to_centuries, jd_ut_to_tt};

use crate::angle::{normalize_360, normalize_pm180};
use crate::body::{Body, Frame, Perspective, Query};
use crate::error::EphemError;
use crate::kepler::{elements_for, heliocentric_xyz};
use crate::moon::{general_precession_deg, mean_node_of_date, moon_of_date};
use crate::spherical::{EclipticPosition, LongitudeState, cartesian_to_ecliptic, sub};

/// Half-width of the central difference used for longitude speed, in days.
pub const SPEED_STEP_DAYS: f64 = 0.01;

/// A source of ecliptic positions.
///
/// Implementors only need [`Ephemeris::position`]; speed is derived by
/// central difference unless the source knows better.
pub trait Ephemeris {
    /// Ecliptic position for a query.
    fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError>;

    /// Longitude in [0, 360).
    fn longitude(&self, query: &Query) -> Result<f64, EphemError> {
        Ok(self.position(query)?.lon_deg)
    }

    /// Longitude, latitude and longitude speed (deg/day).
    fn longitude_state(&self, query: &Query) -> Result<LongitudeState, EphemError> {
        let h = SPEED_STEP_DAYS;
        let now = self.position(query)?;
        let before = self.position(&query.at(query.jd_ut - h))?;
        let after = self.position(&query.at(query.jd_ut + h))?;
        Ok(LongitudeState {
            lon_deg: now.lon_deg,
            lat_deg: now.lat_deg,
            speed_deg_per_day: normalize_pm180(after.lon_deg - before.lon_deg) / (2.0 * h),
        })
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError> {
        (**self).position(query)
    }

    fn longitude_state(&self, query: &Query) -> Result<LongitudeState, EphemError> {
        (**self).longitude_state(query)
    }
}

impl<E: Ephemeris + ?Sized> Ephemeris for Box<E> {
    fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError> {
        (**self).position(query)
    }

    fn longitude_state(&self, query: &Query) -> Result<LongitudeState, EphemError> {
        (**self).longitude_state(query)
    }
}

/// Analytic ephemeris: Keplerian planets, almanac Moon, mean nodes.
///
/// Accuracy is a few arc-minutes for the planets inside 1800–2050, which is
/// far below the sampling resolution of daily price data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeplerEphemeris {
    /// Reject epochs outside the element table's validity span.
    pub strict_range: bool,
}

impl KeplerEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ephemeris that refuses epochs outside 1800–2050.
    pub fn strict() -> Self {
        Self { strict_range: true }
    }

    /// Validity span `(jd_start, jd_end)` of the element table.
    pub fn valid_range() -> (f64, f64) {
        (calendar_to_jd(1800, 1, 1.0), calendar_to_jd(2051, 1, 1.0))
    }

    fn check_range(&self, jd_ut: f64) -> Result<(), EphemError> {
        if !jd_ut.is_finite() {
            return Err(EphemError::EpochOutOfRange { jd: jd_ut });
        }
        if self.strict_range {
            let (lo, hi) = Self::valid_range();
            if jd_ut < lo || jd_ut > hi {
                return Err(EphemError::EpochOutOfRange { jd: jd_ut });
            }
        }
        Ok(())
    }

    fn heliocentric_j2000(body: Body, t: f64) -> Result<[f64; 3], EphemError> {
        elements_for(body)
            .map(|el| heliocentric_xyz(el, t))
            .ok_or(EphemError::UnsupportedQuery {
                body,
                perspective: Perspective::Heliocentric,
            })
    }
}

impl Ephemeris for KeplerEphemeris {
    fn position(&self, query: &Query) -> Result<EclipticPosition, EphemError> {
        query.check_supported()?;
        self.check_range(query.jd_ut)?;

        let t = jd_to_centuries(jd_ut_to_tt(query.jd_ut));
        let precession = general_precession_deg(t);

        // Moon and nodes come out of date; planets come out in J2000.
        let (mut pos, of_date) = match (query.body, query.perspective) {
            (Body::Moon, _) => {
                let (lon, lat, d) = moon_of_date(t);
                (
                    EclipticPosition {
                        lon_deg: lon,
                        lat_deg: lat,
                        distance_au: d,
                    },
                    true,
                )
            }
            (Body::MeanNorthNode | Body::MeanSouthNode, _) => {
                let mut lon = mean_node_of_date(t);
                if query.body == Body::MeanSouthNode {
                    lon += 180.0;
                }
                (
                    EclipticPosition {
                        lon_deg: lon,
                        lat_deg: 0.0,
                        distance_au: 0.0,
                    },
                    true,
                )
            }
            (Body::Sun, Perspective::Geocentric) => {
                let earth = Self::heliocentric_j2000(Body::Earth, t)?;
                (cartesian_to_ecliptic(&[-earth[0], -earth[1], -earth[2]]), false)
            }
            (body, Perspective::Geocentric) => {
                let earth = Self::heliocentric_j2000(Body::Earth, t)?;
                let planet = Self::heliocentric_j2000(body, t)?;
                (cartesian_to_ecliptic(&sub(&planet, &earth)), false)
            }
            (body, Perspective::Heliocentric) => {
                (cartesian_to_ecliptic(&Self::heliocentric_j2000(body, t)?), false)
            }
        };

        pos.lon_deg = match (query.frame, of_date) {
            (Frame::EclipticOfDate, false) => pos.lon_deg + precession,
            (Frame::EclipticJ2000, true) => pos.lon_deg - precession,
            _ => pos.lon_deg,
        };
        pos.lon_deg = normalize_360(pos.lon_deg);
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ALL_BODIES;

    const J2000: f64 = 2_451_545.0;

    #[test]
    fn unsupported_combinations() {
        let eph = KeplerEphemeris::new();
        assert!(eph.position(&Query::geocentric(Body::Earth, J2000)).is_err());
        assert!(eph.position(&Query::heliocentric(Body::Sun, J2000)).is_err());
        assert!(eph.position(&Query::heliocentric(Body::Moon, J2000)).is_err());
    }

    #[test]
    fn every_supported_body_in_range() {
        let eph = KeplerEphemeris::new();
        for body in ALL_BODIES {
            for p in [Perspective::Geocentric, Perspective::Heliocentric] {
                if !body.supports(p) {
                    continue;
                }
                let q = Query::new(body, p, Frame::EclipticOfDate, J2000 + 1234.5);
                let pos = eph.position(&q).unwrap();
                assert!((0.0..360.0).contains(&pos.lon_deg), "{body} {p}: {}", pos.lon_deg);
            }
        }
    }

    #[test]
    fn sun_opposite_earth() {
        let eph = KeplerEphemeris::new();
        let sun = eph.longitude(&Query::geocentric(Body::Sun, J2000)).unwrap();
        let earth = eph.longitude(&Query::heliocentric(Body::Earth, J2000)).unwrap();
        assert!((normalize_pm180(sun - earth).abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn south_node_opposite_north() {
        let eph = KeplerEphemeris::new();
        let n = eph.longitude(&Query::geocentric(Body::MeanNorthNode, J2000)).unwrap();
        let s = eph.longitude(&Query::geocentric(Body::MeanSouthNode, J2000)).unwrap();
        assert!((normalize_360(s - n) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn frames_differ_by_precession() {
        let eph = KeplerEphemeris::new();
        let jd = calendar_to_jd(2050, 1, 1.0);
        let of_date = eph
            .longitude(&Query::new(Body::Mars, Perspective::Geocentric, Frame::EclipticOfDate, jd))
            .unwrap();
        let j2000 = eph
            .longitude(&Query::new(Body::Mars, Perspective::Geocentric, Frame::EclipticJ2000, jd))
            .unwrap();
        let diff = normalize_pm180(of_date - j2000);
        assert!((diff - 0.6985).abs() < 0.01, "diff = {diff}");
    }

    #[test]
    fn strict_rejects_out_of_range() {
        let eph = KeplerEphemeris::strict();
        let q = Query::geocentric(Body::Mars, calendar_to_jd(1700, 1, 1.0));
        assert!(matches!(eph.position(&q), Err(EphemError::EpochOutOfRange { .. })));
        assert!(KeplerEphemeris::new().position(&q).is_ok());
    }

    #[test]
    fn sun_speed_near_one_degree() {
        let eph = KeplerEphemeris::new();
        let st = eph.longitude_state(&Query::geocentric(Body::Sun, J2000)).unwrap();
        assert!((st.speed_deg_per_day - 1.019).abs() < 0.01, "{}", st.speed_deg_per_day);
    }

    #[test]
    fn node_speed_negative() {
        let eph = KeplerEphemeris::new();
        let st = eph
            .longitude_state(&Query::geocentric(Body::MeanNorthNode, J2000))
            .unwrap();
        assert!(st.is_retrograde());
    }
}
