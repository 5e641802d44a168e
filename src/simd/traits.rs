/// One instruction-set implementation of the vx kernels.
///
/// Backends are zero-sized types; callers name them statically
/// (`<Active as Backend>::dot(..)`), nothing goes through a vtable.
///
/// # Safety contract shared by every kernel
///
/// * `n` is a multiple of [`lane_width`](Backend::lane_width). Fixed-width
///   kernels process `n / lane_width()` whole vectors and never look past them.
/// * Every pointer is valid for `n` elements and aligned to
///   [`alignment`](Backend::alignment) bytes.
/// * An output pointer either equals an input pointer (in-place operation) or
///   does not overlap any input.
pub trait Backend {
    /// Short name of the instruction set, as used by the build script.
    const NAME: &'static str;

    /// `f32` elements per vector register.
    fn lane_width() -> usize;

    /// Byte alignment required by the kernels' loads and stores.
    #[inline]
    fn alignment() -> usize {
        Self::lane_width() * std::mem::size_of::<f32>()
    }

    /// `z[i] = x[i] + y[i]`
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn add(n: usize, x: *const f32, y: *const f32, z: *mut f32);

    /// `z[i] = x[i] - y[i]`
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn sub(n: usize, x: *const f32, y: *const f32, z: *mut f32);

    /// `z[i] = x[i] * y[i]`
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn mul(n: usize, x: *const f32, y: *const f32, z: *mut f32);

    /// `z[i] = x[i] / y[i]`, IEEE-754 semantics for zero divisors.
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn div(n: usize, x: *const f32, y: *const f32, z: *mut f32);

    /// `z[i] = x[i] * alpha`
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn scale(n: usize, x: *const f32, alpha: f32, z: *mut f32);

    /// Fused multiply-add accumulation of `x[i] * y[i]`, reduced across lanes.
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn dot(n: usize, x: *const f32, y: *const f32) -> f32;

    /// Writes `x / ‖x‖` into `z`.
    ///
    /// A zero vector (`dot(x, x) == 0`) leaves `z` untouched. Backends do not
    /// override this, so the zero guard is the same everywhere.
    ///
    /// # Safety
    ///
    /// See the trait documentation.
    #[inline]
    unsafe fn normalize(n: usize, x: *const f32, z: *mut f32) {
        let sum_sq = Self::dot(n, x, x);
        if sum_sq == 0.0 {
            return;
        }

        let inv_norm = 1.0 / sum_sq.sqrt();
        Self::scale(n, x, inv_norm, z);
    }
}
