//! ARM SVE backend, scalable-width vectors.
//!
//! The register width is whatever the core implements (128 to 2048 bits), so
//! the lane count is read from the hardware with `cntw` on first use and
//! cached for the rest of the process. The arithmetic runs through
//! [`Scalable`] over NEON granules: every SVE core also implements NEON, and
//! stable Rust has no SVE intrinsics.

use std::arch::asm;

use crate::lanes::LaneWidthCell;
use crate::simd::neon::Neon;
use crate::simd::scalable::{Scalable, WidthSource};

static SVE_LANES: LaneWidthCell = LaneWidthCell::new();

/// Number of 32-bit lanes in one SVE register.
///
/// # Safety
///
/// The CPU must implement SVE.
#[target_feature(enable = "sve")]
unsafe fn cntw() -> usize {
    let lanes: usize;
    asm!(
        "cntw {lanes}",
        lanes = out(reg) lanes,
        options(pure, nomem, nostack, preserves_flags)
    );
    lanes
}

/// Lane count of the SVE register, probed once per process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SveWidth;

impl WidthSource for SveWidth {
    const NAME: &'static str = "sve";

    #[inline]
    fn lanes() -> usize {
        // build.rs only selects this backend for cores reporting SVE
        SVE_LANES.get_or_probe(|| unsafe { cntw() })
    }
}

/// Scalable-width backend.
pub type Sve = Scalable<Neon, SveWidth>;

/// How many times the hardware width query ran in this process.
pub fn probe_count() -> usize {
    SVE_LANES.probe_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::Backend;

    #[test]
    fn test_width_is_probed_once() {
        let lanes = Sve::lane_width();
        assert!(lanes >= 4);
        assert_eq!(lanes % 4, 0);
        assert_eq!(Sve::lane_width(), lanes);
        assert_eq!(probe_count(), 1);
    }
}
