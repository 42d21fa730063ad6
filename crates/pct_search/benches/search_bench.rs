use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pct_ephem::{Body, KeplerEphemeris};
use pct_search::{
    CrossingConfig, CrossingFilter, SearchError, SeparationConfig, StationaryConfig, Track,
    body_crossings, find_crossings, next_separation, next_stationary,
};

fn refiner_bench(c: &mut Criterion) {
    let lon = |t: f64| -> Result<f64, SearchError> { Ok(t * 13.2 + 5.0 * (t / 4.0).sin()) };
    let cfg = CrossingConfig::moon();

    let mut group = c.benchmark_group("search_refiner");
    group.bench_function("synthetic_year", |b| {
        b.iter(|| find_crossings(lon, 0.0, black_box(365.0), 123.0, &cfg).expect("search"))
    });
    group.finish();
}

fn kepler_search_bench(c: &mut Criterion) {
    let eph = KeplerEphemeris::new();
    let jd = 2_460_310.5;

    let mut group = c.benchmark_group("search_kepler");
    group.sample_size(20);
    group.bench_function("mars_crossings_decade", |b| {
        b.iter(|| {
            body_crossings(
                &eph,
                &Track::geocentric(Body::Mars),
                black_box(0.0),
                jd,
                jd + 3652.5,
                CrossingFilter::Any,
                &CrossingConfig::planet(),
            )
            .expect("search")
        })
    });
    group.bench_function("next_new_moon", |b| {
        b.iter(|| {
            next_separation(
                &eph,
                &Track::geocentric(Body::Moon),
                &Track::geocentric(Body::Sun),
                black_box(jd),
                &SeparationConfig::conjunction(0.5),
            )
            .expect("search")
            .expect("event")
        })
    });
    group.bench_function("next_mercury_station", |b| {
        b.iter(|| {
            next_stationary(
                &eph,
                &Track::geocentric(Body::Mercury),
                black_box(jd),
                &StationaryConfig::inner_planet(),
            )
            .expect("search")
            .expect("event")
        })
    });
    group.finish();
}

criterion_group!(benches, refiner_bench, kepler_search_bench);
criterion_main!(benches);
