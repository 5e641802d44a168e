//! SIMD backends.
//!
//! `build.rs` sets exactly one of the `avx512`, `avx2`, `neon`, `sve` or
//! `fallback` cfg flags and [`Active`] names the matching backend type. The
//! portable [`fallback`] backend and the [`scalable`] chunk loop are compiled
//! on every target: the first is the reference the SIMD kernels are tested
//! against, the second is shared by the SVE backend.

#[cfg(avx2)]
pub mod avx2;

#[cfg(avx512)]
pub mod avx512;

#[cfg(any(neon, sve))]
pub mod neon;

#[cfg(sve)]
pub mod sve;

pub mod fallback;

pub mod scalable;

pub mod traits;

pub use traits::Backend;

/// The backend selected for this build.
#[cfg(avx512)]
pub type Active = avx512::Avx512;

/// The backend selected for this build.
#[cfg(avx2)]
pub type Active = avx2::Avx2;

/// The backend selected for this build.
#[cfg(neon)]
pub type Active = neon::Neon;

/// The backend selected for this build.
#[cfg(sve)]
pub type Active = sve::Sve;

/// The backend selected for this build.
#[cfg(fallback)]
pub type Active = fallback::Fallback;
