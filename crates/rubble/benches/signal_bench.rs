use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::IVec2;
use rubble::{Emission, Grid, GridConfig, Signal};

fn bench_emission(c: &mut Criterion) {
    let mut grid = Grid::new(GridConfig::with_size(64, 64));

    c.bench_function("emission_64x64", |b| {
        b.iter(|| {
            grid.emit(black_box(&Emission::new(IVec2::new(32, 32), Signal::Sound, 8)));
        })
    });
}

fn bench_decay(c: &mut Criterion) {
    let mut grid = Grid::new(GridConfig::with_size(64, 64));

    // Spread a few loud sources so decay has work to do
    for i in 0..4 {
        grid.emit_many(&Emission::pair(IVec2::new(8 + i * 16, 32), 9, 9));
    }

    c.bench_function("decay_64x64", |b| {
        b.iter(|| {
            grid.decay_signals();
        })
    });
}

fn bench_radius_scan(c: &mut Criterion) {
    let grid = Grid::new(GridConfig::with_size(64, 64));

    c.bench_function("cells_in_radius_r6", |b| {
        b.iter(|| black_box(grid.cells_in_radius(black_box(IVec2::new(20, 20)), 6)))
    });
}

criterion_group!(benches, bench_emission, bench_decay, bench_radius_scan);
criterion_main!(benches);
