//! Error types for layout computation, storage allocation and slot access.

use std::error::Error;
use std::fmt;

/// Errors raised by strata containers and their layout calculator.
///
/// Every variant is surfaced to the immediate caller; nothing in the
/// workspace retries or swallows them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SoaError {
    /// A slot index outside `[0, len)`.
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// Number of slots in the container (exclusive upper bound).
        len: usize,
    },
    /// The allocator could not provide the backing buffer.
    AllocationFailed {
        /// Size of the rejected request in bytes.
        bytes: usize,
        /// Alignment of the rejected request in bytes.
        align: usize,
    },
    /// A field name that is not declared by the record type.
    ///
    /// Only reachable through name-based lookup; typed keys are checked
    /// at compile time.
    InvalidFieldReference {
        /// The unrecognised name.
        name: String,
    },
    /// `capacity * row_bytes` (plus column padding) does not fit in the
    /// address space.
    CapacityOverflow {
        /// Requested number of slots.
        capacity: usize,
        /// Sum of all field strides for one slot.
        row_bytes: usize,
    },
    /// A [`StorageConfig`](crate::StorageConfig) value failed validation.
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for SoaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "slot index {index} out of bounds for range [0, {len})")
            }
            Self::AllocationFailed { bytes, align } => {
                write!(
                    f,
                    "failed to allocate {bytes} bytes with alignment {align}"
                )
            }
            Self::InvalidFieldReference { name } => {
                write!(f, "record type has no field named '{name}'")
            }
            Self::CapacityOverflow {
                capacity,
                row_bytes,
            } => {
                write!(
                    f,
                    "capacity {capacity} with {row_bytes} bytes per slot overflows the address space"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid storage config: {reason}"),
        }
    }
}

impl Error for SoaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_names_the_valid_range() {
        let err = SoaError::IndexOutOfBounds { index: 2, len: 2 };
        assert_eq!(
            err.to_string(),
            "slot index 2 out of bounds for range [0, 2)"
        );
    }

    #[test]
    fn invalid_field_reference_quotes_name() {
        let err = SoaError::InvalidFieldReference {
            name: "height".into(),
        };
        assert!(err.to_string().contains("'height'"));
    }

    #[test]
    fn errors_are_comparable() {
        let a = SoaError::AllocationFailed { bytes: 64, align: 8 };
        assert_eq!(a.clone(), a);
        assert_ne!(
            a,
            SoaError::AllocationFailed {
                bytes: 64,
                align: 16
            }
        );
    }
}
