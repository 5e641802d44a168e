use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

const DIMENSIONS: &[usize] = &[128, 384, 768, 1536, 65_536];

fn random_vec(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dot");
    let mut rng = StdRng::seed_from_u64(7);

    for &dim in DIMENSIONS {
        group.throughput(Throughput::Elements(dim as u64));

        let a = random_vec(&mut rng, dim);
        let b = random_vec(&mut rng, dim);
        let x = vx::AlignedBuf::from_slice(&a).unwrap();
        let y = vx::AlignedBuf::from_slice(&b).unwrap();

        group.bench_with_input(BenchmarkId::new("scalar", dim), &dim, |bencher, _| {
            bencher.iter(|| {
                black_box(&a)
                    .iter()
                    .zip(black_box(&b))
                    .map(|(p, q)| p * q)
                    .sum::<f32>()
            });
        });

        group.bench_with_input(BenchmarkId::new("vx", dim), &dim, |bencher, &dim| {
            bencher.iter(|| vx::dot(black_box(dim), &x, &y).unwrap());
        });

        let a_arr = Array1::from_vec(a.clone());
        let b_arr = Array1::from_vec(b.clone());
        group.bench_with_input(BenchmarkId::new("ndarray", dim), &dim, |bencher, _| {
            bencher.iter(|| black_box(&a_arr).dot(black_box(&b_arr)));
        });
    }

    group.finish();
}

/// Cosine similarity of one query against a block of unit-length rows.
fn bench_cosine_scan(c: &mut Criterion) {
    const ROWS: usize = 1024;
    const DIM: usize = 384;

    let mut rng = StdRng::seed_from_u64(11);
    let mut corpus = vx::allocate_2d(ROWS, DIM).unwrap();
    for mut row in corpus.iter_rows_mut() {
        for v in row.iter_mut() {
            *v = rng.random_range(-1.0..1.0);
        }
        vx::normalize_in_place(DIM, &mut row).unwrap();
    }

    let mut query = vx::AlignedBuf::from_slice(&random_vec(&mut rng, DIM)).unwrap();
    vx::normalize_in_place(DIM, &mut query).unwrap();

    c.bench_function("CosineScan/1024x384", |bencher| {
        bencher.iter(|| {
            corpus
                .iter_rows()
                .map(|row| vx::dot(DIM, &query, &row).unwrap())
                .fold(f32::MIN, f32::max)
        });
    });
}

criterion_group!(benches, bench_dot, bench_cosine_scan);
criterion_main!(benches);
