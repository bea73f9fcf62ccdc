//! Type identity handle.
//!
//! `Idx` is the identity of a type as produced by the type checker.
//! Every type lives in the [`Pool`](crate::Pool) and is referenced by its
//! 32-bit index, so two handles denote the same type exactly when their
//! indices are equal.
//!
//! - Basic types have fixed indices (one per [`BasicKind`]) for O(1) lookup
//! - Structural types are interned, so `*T` built twice yields one `Idx`
//! - Named types are never interned: each declaration is its own identity

use std::fmt;

use crate::data::BasicKind;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Basic Types ===
    // Pre-interned at pool creation, index == `BasicKind` discriminant.

    pub const BOOL: Self = Self::basic(BasicKind::Bool);
    pub const INT: Self = Self::basic(BasicKind::Int);
    pub const INT8: Self = Self::basic(BasicKind::Int8);
    pub const INT16: Self = Self::basic(BasicKind::Int16);
    pub const INT32: Self = Self::basic(BasicKind::Int32);
    pub const INT64: Self = Self::basic(BasicKind::Int64);
    pub const UINT: Self = Self::basic(BasicKind::Uint);
    pub const UINT8: Self = Self::basic(BasicKind::Uint8);
    pub const UINT16: Self = Self::basic(BasicKind::Uint16);
    pub const UINT32: Self = Self::basic(BasicKind::Uint32);
    pub const UINT64: Self = Self::basic(BasicKind::Uint64);
    pub const UINTPTR: Self = Self::basic(BasicKind::Uintptr);
    pub const FLOAT32: Self = Self::basic(BasicKind::Float32);
    pub const FLOAT64: Self = Self::basic(BasicKind::Float64);
    pub const COMPLEX64: Self = Self::basic(BasicKind::Complex64);
    pub const COMPLEX128: Self = Self::basic(BasicKind::Complex128);
    pub const STRING: Self = Self::basic(BasicKind::String);
    pub const UNSAFE_POINTER: Self = Self::basic(BasicKind::UnsafePointer);
    pub const UNTYPED_NIL: Self = Self::basic(BasicKind::UntypedNil);

    /// First index for dynamically allocated types.
    pub const FIRST_DYNAMIC: u32 = BasicKind::ALL.len() as u32;

    /// Sentinel for "no type" (e.g. the result of a function without returns).
    pub const NONE: Self = Self(u32::MAX);

    const fn basic(kind: BasicKind) -> Self {
        Self(kind as u32)
    }

    /// Create an index from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a pre-interned basic type.
    #[inline]
    pub const fn is_basic(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "Idx::NONE");
        }
        match BasicKind::from_index(self.0) {
            Some(kind) => write!(f, "Idx::{}", kind.name()),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

// Compile-time size assertion: Idx must be exactly 4 bytes
const _: () = assert!(std::mem::size_of::<Idx>() == 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_indices_follow_kind_order() {
        assert_eq!(Idx::BOOL.raw(), 0);
        assert_eq!(Idx::INT.raw(), 1);
        assert_eq!(Idx::UINTPTR.raw(), BasicKind::Uintptr as u32);
        assert_eq!(Idx::UNTYPED_NIL.raw(), Idx::FIRST_DYNAMIC - 1);
    }

    #[test]
    fn basic_check_works() {
        assert!(Idx::INT.is_basic());
        assert!(Idx::STRING.is_basic());
        assert!(!Idx::from_raw(Idx::FIRST_DYNAMIC).is_basic());
        assert!(!Idx::NONE.is_basic());
    }

    #[test]
    fn none_sentinel_works() {
        assert!(Idx::NONE.is_none());
        assert!(!Idx::INT.is_none());
        assert!(!Idx::from_raw(1000).is_none());
    }

    #[test]
    fn debug_names_basic_types() {
        assert_eq!(format!("{:?}", Idx::UINT8), "Idx::uint8");
        assert_eq!(format!("{:?}", Idx::NONE), "Idx::NONE");
        assert_eq!(format!("{:?}", Idx::from_raw(500)), "Idx(500)");
    }
}
