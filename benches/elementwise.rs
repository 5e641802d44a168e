use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

const VECTOR_LENGTHS: &[usize] = &[
    100, // not a multiple of any lane width
    1024,
    65_536,
    1_048_576, // larger than most last-level caches
];

fn generate_data(len: usize) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
    let b = (0..len).map(|_| rng.random_range(0.5..2.0)).collect();
    (a, b)
}

fn bench_elementwise(c: &mut Criterion) {
    for &len in VECTOR_LENGTHS {
        let mut group = c.benchmark_group(format!("Elementwise/{len}"));
        group.throughput(Throughput::Elements(len as u64));

        let (a_vec, b_vec) = generate_data(len);
        let x = vx::AlignedBuf::from_slice(&a_vec).unwrap();
        let y = vx::AlignedBuf::from_slice(&b_vec).unwrap();
        let mut z = vx::allocate(len).unwrap();

        group.bench_function("scalar add", |bencher| {
            let mut out = vec![0.0f32; len];
            bencher.iter(|| {
                for ((o, a), b) in out.iter_mut().zip(&a_vec).zip(&b_vec) {
                    *o = a + b;
                }
                black_box(&out);
            });
        });

        group.bench_function(format!("vx add ({})", vx::backend().name), |bencher| {
            bencher.iter(|| vx::add(black_box(len), &x, &y, &mut z).unwrap());
        });

        group.bench_function("vx mul", |bencher| {
            bencher.iter(|| vx::mul(black_box(len), &x, &y, &mut z).unwrap());
        });

        group.bench_function("vx div", |bencher| {
            bencher.iter(|| vx::div(black_box(len), &x, &y, &mut z).unwrap());
        });

        group.bench_function("vx normalize", |bencher| {
            bencher.iter(|| vx::normalize(black_box(len), &x, &mut z).unwrap());
        });

        let a_arr = Array1::from_vec(a_vec.clone());
        let b_arr = Array1::from_vec(b_vec.clone());
        group.bench_function("ndarray add", |bencher| {
            bencher.iter(|| black_box(&a_arr + &b_arr));
        });

        group.finish();
    }
}

criterion_group!(benches, bench_elementwise);
criterion_main!(benches);
