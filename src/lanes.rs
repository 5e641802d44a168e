//! Vector width of the active backend and the padding arithmetic built on it.
//!
//! Every buffer handed to a kernel is a whole number of hardware vectors long
//! and starts on a vector-aligned address. The numbers behind both rules come
//! from here:
//!
//! * [`lane_width`]: `f32` elements per vector register (4, 8, 16, or the
//!   runtime-probed SVE width),
//! * [`alignment`]: `lane_width() * 4` bytes,
//! * [`padded_len`]: a logical length rounded up to a multiple of the lane width.
//!
//! Fixed-width backends answer with a constant. The scalable backend asks the
//! hardware once, through a [`LaneWidthCell`], and reuses the answer for the
//! rest of the process.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use tracing::{debug, error};

use crate::simd::{Active, Backend};

/// Compute-once storage for a vector width that is only known at run time.
///
/// The first caller of [`get_or_probe`](Self::get_or_probe) runs the probe;
/// concurrent first callers block until it finishes and then all observe the
/// same value. A probe reporting zero lanes is fatal: padding arithmetic has
/// no meaning with a zero modulus, so the initializer logs the fault and
/// panics without caching anything.
///
/// # Example
///
/// ```rust
/// use vx::LaneWidthCell;
///
/// static WIDTH: LaneWidthCell = LaneWidthCell::new();
///
/// assert_eq!(WIDTH.get_or_probe(|| 8), 8);
/// assert_eq!(WIDTH.get_or_probe(|| 16), 8);
/// assert_eq!(WIDTH.probe_count(), 1);
/// ```
pub struct LaneWidthCell {
    width: OnceLock<usize>,
    probes: AtomicUsize,
}

impl LaneWidthCell {
    pub const fn new() -> Self {
        Self {
            width: OnceLock::new(),
            probes: AtomicUsize::new(0),
        }
    }

    /// Returns the cached width, running `probe` if no width is cached yet.
    ///
    /// # Panics
    ///
    /// Panics if `probe` returns zero.
    #[inline]
    pub fn get_or_probe<F>(&self, probe: F) -> usize
    where
        F: FnOnce() -> usize,
    {
        *self.width.get_or_init(|| {
            self.probes.fetch_add(1, Ordering::Relaxed);

            let lanes = probe();
            if lanes == 0 {
                error!("vector width probe reported zero f32 lanes");
                panic!("hardware reported a vector width of zero f32 lanes");
            }

            debug!(lanes, "vector width probed");
            lanes
        })
    }

    /// The cached width, if a probe already ran successfully.
    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.width.get().copied()
    }

    /// How many times a probe has been started on this cell.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }
}

impl Default for LaneWidthCell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LaneWidthCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaneWidthCell")
            .field("width", &self.get())
            .field("probes", &self.probe_count())
            .finish()
    }
}

/// Number of `f32` lanes in one vector register of the active backend.
#[inline]
pub fn lane_width() -> usize {
    Active::lane_width()
}

/// Byte alignment of every buffer the allocator hands out.
#[inline]
pub fn alignment() -> usize {
    Active::alignment()
}

/// Rounds `size` up to a multiple of `lanes`.
///
/// Saturates instead of overflowing; a saturated result is larger than any
/// buffer, so capacity checks downstream reject it.
///
/// # Panics
///
/// Panics if `lanes` is zero.
#[inline]
pub fn round_up(size: usize, lanes: usize) -> usize {
    assert!(lanes > 0, "lane count must be positive");
    size.div_ceil(lanes).saturating_mul(lanes)
}

/// Rounds `size` up to a multiple of [`lane_width`].
#[inline]
pub fn padded_len(size: usize) -> usize {
    round_up(size, lane_width())
}

/// Static description of the backend compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendInfo {
    pub name: &'static str,
    pub lane_width: usize,
    pub alignment: usize,
}

impl fmt::Display for BackendInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} x f32 lanes, {}-byte alignment)",
            self.name, self.lane_width, self.alignment
        )
    }
}

/// Describes the active backend.
pub fn backend() -> BackendInfo {
    BackendInfo {
        name: Active::NAME,
        lane_width: lane_width(),
        alignment: alignment(),
    }
}
