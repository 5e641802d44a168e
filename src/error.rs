//! Error types for vx operations.
//!
//! Allocation and capacity problems are returned to the caller instead of
//! panicking. A scalable backend that cannot report its vector width is not an
//! error here: it is fatal (see [`crate::lanes`]).

use thiserror::Error;

/// Errors that can occur during vx operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VxError {
    /// The allocator could not satisfy the request.
    #[error("memory allocation failed (requested {bytes} bytes with {align} byte alignment)")]
    Allocation {
        /// Size of the request in bytes.
        bytes: usize,
        /// Requested alignment in bytes.
        align: usize,
    },

    /// The element count does not describe a valid memory layout.
    #[error("invalid memory layout: {len} f32 elements with {align} byte alignment")]
    Layout {
        /// Number of `f32` elements requested.
        len: usize,
        /// Requested alignment in bytes.
        align: usize,
    },

    /// An operand is too short for the (lane-rounded) size of an operation.
    #[error("operand `{operand}` holds {available} elements but {required} are required")]
    Capacity {
        /// Name of the offending operand (`x`, `y`, `z`, `dst`, `src`).
        operand: &'static str,
        /// Elements the operation touches.
        required: usize,
        /// Elements the operand actually holds.
        available: usize,
    },
}

/// Result type alias for vx operations.
pub type Result<T> = std::result::Result<T, VxError>;

/// Fails with [`VxError::Capacity`] unless `available >= required`.
#[inline]
pub(crate) fn ensure_capacity(
    operand: &'static str,
    required: usize,
    available: usize,
) -> Result<()> {
    if available < required {
        return Err(VxError::Capacity {
            operand,
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_display() {
        let error = VxError::Allocation {
            bytes: 1024,
            align: 32,
        };
        let display = format!("{error}");
        assert!(display.contains("memory allocation failed"));
        assert!(display.contains("1024 bytes"));
        assert!(display.contains("32 byte alignment"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = VxError::Layout {
            len: usize::MAX,
            align: 64,
        };
        let display = format!("{error}");
        assert!(display.contains("invalid memory layout"));
        assert!(display.contains("64 byte alignment"));
    }

    #[test]
    fn test_capacity_error_display() {
        let error = VxError::Capacity {
            operand: "y",
            required: 16,
            available: 8,
        };
        assert_eq!(
            error.to_string(),
            "operand `y` holds 8 elements but 16 are required"
        );
    }

    #[test]
    fn test_ensure_capacity() {
        assert!(ensure_capacity("x", 8, 8).is_ok());
        assert!(ensure_capacity("x", 0, 0).is_ok());
        assert_eq!(
            ensure_capacity("z", 9, 8),
            Err(VxError::Capacity {
                operand: "z",
                required: 9,
                available: 8
            })
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = VxError::Allocation { bytes: 4, align: 16 };

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
