use criterion::{black_box, criterion_group, criterion_main, Criterion};
use transit_flow::flow::{
    ArcGeometry, ArcStyle, GeoProjector, MapTransform, ParticleConfig, ParticlePath, ParticleSystem, SpawnCandidate,
};
use transit_flow::geometry::LatLon;
use std::rc::Rc;

/// A dense OD network: every station pair among 40 stations spread over the city
fn network_candidates() -> Vec<SpawnCandidate> {
    let stations: Vec<LatLon> = (0..40)
        .map(|i| {
            let angle = f64::from(i) * 0.157;
            LatLon::new(28.61 + 0.2 * angle.sin(), 77.21 + 0.25 * angle.cos())
        })
        .collect();

    let mut candidates = Vec::new();
    for (i, origin) in stations.iter().enumerate() {
        for (j, destination) in stations.iter().enumerate() {
            if i == j {
                continue;
            }
            let path = ParticlePath::Arc { origin: *origin, destination: *destination, lane_offset: 0.0 };
            let intensity = ((i * 7 + j * 13) % 100) as f64 / 100.0;
            candidates.push(SpawnCandidate::new(Rc::new(path), intensity));
        }
    }
    candidates
}

/// Step until every frame runs at the population cap
fn saturated(candidates: &[SpawnCandidate]) -> ParticleSystem {
    let mut system = ParticleSystem::new(ParticleConfig::default(), 42);
    for _ in 0..600 {
        system.step(candidates, 1.0);
    }
    system
}

fn benchmark_particle_system(c: &mut Criterion) {
    let candidates = network_candidates();
    let style = ArcStyle::default();
    let mut transform = MapTransform::default();
    transform.resize(1920.0, 1080.0);
    let saturated_system = saturated(&candidates);

    c.bench_function("particle_step_at_cap", |b| {
        let mut system = saturated(&candidates);
        b.iter(|| system.step(black_box(&candidates), black_box(1.0)));
    });

    c.bench_function("particle_positions_at_cap", |b| {
        b.iter(|| {
            saturated_system
                .particles()
                .iter()
                .filter_map(|p| p.screen_position(black_box(&transform), &style))
                .count()
        });
    });

    // What the arc layer does for every arc on every frame
    c.bench_function("arc_geometry", |b| {
        let origin = transform.project(LatLon::new(28.55, 77.10));
        let destination = transform.project(LatLon::new(28.70, 77.30));
        b.iter(|| {
            let arc = ArcGeometry::between(black_box(origin), black_box(destination), 0.3, &style);
            (0..=20).map(|k| arc.point_at(f64::from(k) / 20.0)).fold(0.0, |acc, p| acc + p.x)
        });
    });
}

criterion_group!(benches, benchmark_particle_system);
criterion_main!(benches);
