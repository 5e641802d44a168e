//! Brute-force cosine similarity search over a block of embeddings.
//!
//! Rows are normalized once, after which the cosine of two rows is a plain dot
//! product. Rows are scored in parallel with rayon; each `vx` call itself is
//! single-threaded.
//!
//! Run with `RUST_LOG=vx=trace cargo run --release --example cosine_scan` to
//! see the allocator and lane-width events.

use std::error::Error;
use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::info;
use vx::{AlignedBuf, Row, RowMut};

const ROWS: usize = 20_000;
const DIM: usize = 385;
const TOP_K: usize = 5;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cosine_scan=info".parse()?),
        )
        .init();

    info!(backend = %vx::backend(), "starting cosine scan");

    let mut rng = StdRng::seed_from_u64(1);
    let mut corpus = vx::allocate_2d(ROWS, DIM)?;
    for mut row in corpus.iter_rows_mut() {
        for v in row.iter_mut() {
            *v = rng.random_range(-1.0..1.0);
        }
    }
    info!(rows = ROWS, dim = DIM, stride = corpus.stride(), "corpus allocated");

    let start = Instant::now();
    {
        let mut rows: Vec<RowMut<'_>> = corpus.iter_rows_mut().collect();
        rows.par_iter_mut()
            .try_for_each(|row| vx::normalize_in_place(DIM, row))?;
    }
    info!(elapsed = ?start.elapsed(), "corpus normalized");

    // the query is a noisy copy of row 42, so row 42 should rank first
    let mut query = AlignedBuf::from_slice(&corpus.row(42))?;
    for v in query.logical_mut() {
        *v += rng.random_range(-0.05..0.05);
    }
    vx::normalize_in_place(DIM, &mut query)?;

    let start = Instant::now();
    let scores = {
        let rows: Vec<Row<'_>> = corpus.iter_rows().collect();
        rows.par_iter()
            .map(|row| vx::dot(DIM, &query, row))
            .collect::<vx::Result<Vec<f32>>>()?
    };
    info!(elapsed = ?start.elapsed(), "corpus scored");

    let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
    ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1));

    for (rank, (row, score)) in ranked.iter().take(TOP_K).enumerate() {
        println!("{:>2}. row {row:>6}  cosine {score:.4}", rank + 1);
    }

    vx::free_2d(corpus);
    Ok(())
}
