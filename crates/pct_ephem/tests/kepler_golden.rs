//! Spot checks of the analytic ephemeris against widely published events.

use approx::assert_abs_diff_eq;
use pct_ephem::{
    Body, Ephemeris, Frame, KeplerEphemeris, Perspective, Query, TableEphemeris, normalize_pm180,
};
use pct_time::calendar_to_jd;

fn jd(year: i32, month: u32, day: u32, hour: f64) -> f64 {
    calendar_to_jd(year, month, day as f64 + hour / 24.0)
}

/// March equinox 2024-03-20 03:06 UTC: Sun at 0° of date.
#[test]
fn sun_at_march_equinox_2024() {
    let eph = KeplerEphemeris::new();
    let lon = eph
        .longitude(&Query::geocentric(Body::Sun, jd(2024, 3, 20, 3.1)))
        .unwrap();
    assert_abs_diff_eq!(normalize_pm180(lon), 0.0, epsilon = 0.05);
}

/// June solstice 2021-06-21 03:32 UTC: Sun at 90°.
#[test]
fn sun_at_june_solstice_2021() {
    let eph = KeplerEphemeris::new();
    let lon = eph
        .longitude(&Query::geocentric(Body::Sun, jd(2021, 6, 21, 3.53)))
        .unwrap();
    assert_abs_diff_eq!(lon, 90.0, epsilon = 0.05);
}

/// Great conjunction 2020-12-21: Jupiter and Saturn together near 0.5° Aquarius.
/// The element table is good to a few tenths of a degree for the gas giants.
#[test]
fn great_conjunction_2020() {
    let eph = KeplerEphemeris::new();
    let t = jd(2020, 12, 21, 18.0);
    let jup = eph.longitude(&Query::geocentric(Body::Jupiter, t)).unwrap();
    let sat = eph.longitude(&Query::geocentric(Body::Saturn, t)).unwrap();
    assert!(normalize_pm180(jup - sat).abs() < 0.5, "jup {jup} sat {sat}");
    assert_abs_diff_eq!(jup, 300.5, epsilon = 0.6);
}

/// Mercury is retrograde through most of April 2024.
#[test]
fn mercury_retrograde_april_2024() {
    let eph = KeplerEphemeris::new();
    let st = eph
        .longitude_state(&Query::geocentric(Body::Mercury, jd(2024, 4, 12, 0.0)))
        .unwrap();
    assert!(st.is_retrograde(), "speed = {}", st.speed_deg_per_day);
}

/// Heliocentric planets never go retrograde.
#[test]
fn heliocentric_always_direct() {
    let eph = KeplerEphemeris::new();
    let st = eph
        .longitude_state(&Query::heliocentric(Body::Mercury, jd(2024, 4, 12, 0.0)))
        .unwrap();
    assert!(st.speed_deg_per_day > 0.0);
}

/// A table sampled from the analytic source reproduces it between samples.
#[test]
fn table_tracks_analytic_source() {
    let eph = KeplerEphemeris::new();
    let start = jd(2010, 1, 1, 0.0);
    let mut csv = String::from("jd_ut,body,perspective,longitude_deg\n");
    for k in 0..=40 {
        let t = start + k as f64;
        let lon = eph.longitude(&Query::heliocentric(Body::Mars, t)).unwrap();
        csv.push_str(&format!("{t},mars,helio,{lon}\n"));
    }
    let table = TableEphemeris::from_reader(csv.as_bytes(), Frame::EclipticOfDate).unwrap();

    let q = Query::new(Body::Mars, Perspective::Heliocentric, Frame::EclipticOfDate, start + 17.5);
    let want = eph.longitude(&q).unwrap();
    let got = table.longitude(&q).unwrap();
    assert_abs_diff_eq!(normalize_pm180(got - want), 0.0, epsilon = 1e-3);
}

#[test]
fn table_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("venus.csv");
    std::fs::write(
        &path,
        "jd_ut,body,perspective,longitude_deg\n2451545.0,venus,geo,10.0\n2451546.0,venus,geo,11.0\n",
    )
    .unwrap();
    let table = TableEphemeris::load(&path, Frame::EclipticOfDate).unwrap();
    let lon = table
        .longitude(&Query::geocentric(Body::Venus, 2_451_545.25))
        .unwrap();
    assert_abs_diff_eq!(lon, 10.25, epsilon = 1e-9);
}
