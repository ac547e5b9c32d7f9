use camera::FlyCamera;
use cgmath::Point3;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// mouse look is the hot path: every motion event recomputes the basis
fn bench_mouse_look(c: &mut Criterion) {
    c.bench_function("mouse look + basis recompute", |b| {
        let mut camera = FlyCamera::new(Point3::new(0.0, 0.0, 10.0));
        b.iter(|| {
            camera.process_mouse_move(black_box(0.37), black_box(0.19), true);
            black_box(camera.look_dir());
        });
    });
}

fn bench_view_matrix(c: &mut Criterion) {
    c.bench_function("view matrix", |b| {
        let camera = FlyCamera::new(Point3::new(1.0, 2.0, 3.0))
            .with_yaw(42.0)
            .with_pitch(-13.0);
        b.iter(|| black_box(camera.view_matrix()));
    });
}

criterion_group!(benches, bench_mouse_look, bench_view_matrix);
criterion_main!(benches);
