//! Aligned `f32` buffers and the SIMD kernels that run over them.
//!
//! Buffers come from [`allocate`] / [`allocate_2d`] and are aligned and
//! zero-padded to the vector width of the backend picked by `build.rs`
//! (AVX-512, AVX2, NEON, SVE or the portable fallback). The operations in
//! [`ops`] (`add`, `sub`, `mul`, `div`, `scale`, `dot`, `normalize`) accept
//! only such buffers and dispatch statically, with no per-call feature checks.
//!
//! ```rust
//! let x = vx::AlignedBuf::from_slice(&[3.0, 0.0, 4.0])?;
//! let mut unit = vx::allocate(3)?;
//!
//! vx::normalize(3, &x, &mut unit)?;
//! assert!((vx::dot(3, &unit, &unit)? - 1.0).abs() < 1e-6);
//! # Ok::<(), vx::VxError>(())
//! ```

pub mod buffer;
pub mod error;
pub mod lanes;
pub mod matrix;
pub mod ops;
pub mod simd;

pub use buffer::{allocate, copy, free, AlignedBuf, SimdBuffer, SimdBufferMut};
pub use error::{Result, VxError};
pub use lanes::{alignment, backend, lane_width, padded_len, round_up, BackendInfo, LaneWidthCell};
pub use matrix::{allocate_2d, free_2d, AlignedMatrix, Row, RowMut};
pub use ops::{add, div, dot, mul, normalize, normalize_in_place, scale, sub};
