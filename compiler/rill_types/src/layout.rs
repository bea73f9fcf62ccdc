//! Type layout model.
//!
//! Backends never compute layout themselves: they ask a [`Sizes`]
//! implementation for the byte size, alignment and field offsets of a type
//! on the current target. [`StdSizes`] is the conventional model
//! parameterised by word size and maximum alignment.

use crate::data::{BasicKind, TypeData};
use crate::{Idx, Pool};

/// Per-target layout facts.
pub trait Sizes {
    /// Byte size of a value of type `ty`.
    fn size_of(&self, pool: &Pool, ty: Idx) -> u64;

    /// Byte alignment of a value of type `ty`. Always at least 1.
    fn align_of(&self, pool: &Pool, ty: Idx) -> u64;

    /// Byte offsets of consecutive struct fields of the given types.
    fn offsets_of(&self, pool: &Pool, fields: &[Idx]) -> Vec<u64>;

    /// Byte size of a pointer.
    fn pointer_size(&self) -> u64;
}

/// Word-size based layout.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StdSizes {
    /// Size of a pointer / `int` / `uintptr`, in bytes.
    pub word_size: u64,
    /// Upper bound on any alignment, in bytes.
    pub max_align: u64,
}

impl Default for StdSizes {
    fn default() -> Self {
        Self::LP64
    }
}

impl StdSizes {
    /// 64-bit targets.
    pub const LP64: Self = Self {
        word_size: 8,
        max_align: 8,
    };

    /// 32-bit targets.
    pub const ILP32: Self = Self {
        word_size: 4,
        max_align: 4,
    };

    /// Pick the layout for a target triple.
    #[must_use]
    pub fn for_target(target: &str) -> Self {
        let arch = target.split('-').next().unwrap_or(target);
        match arch {
            "i386" | "i586" | "i686" | "x86" | "wasm32" | "mips" | "mipsel" | "powerpc" => {
                Self::ILP32
            }
            a if a.starts_with("arm") || a.starts_with("thumb") => Self::ILP32,
            _ => Self::LP64,
        }
    }

    fn basic_size(&self, kind: BasicKind) -> u64 {
        match kind {
            BasicKind::Bool | BasicKind::Int8 | BasicKind::Uint8 => 1,
            BasicKind::Int16 | BasicKind::Uint16 => 2,
            BasicKind::Int32 | BasicKind::Uint32 | BasicKind::Float32 => 4,
            BasicKind::Int64 | BasicKind::Uint64 | BasicKind::Float64 | BasicKind::Complex64 => 8,
            BasicKind::Complex128 => 16,
            BasicKind::String => self.word_size * 2,
            BasicKind::Int
            | BasicKind::Uint
            | BasicKind::Uintptr
            | BasicKind::UnsafePointer
            | BasicKind::UntypedNil => self.word_size,
        }
    }
}

fn align_up(offset: u64, align: u64) -> u64 {
    offset.div_ceil(align) * align
}

impl Sizes for StdSizes {
    fn size_of(&self, pool: &Pool, ty: Idx) -> u64 {
        match pool.get(pool.underlying(ty)) {
            Some(TypeData::Basic(kind)) => self.basic_size(*kind),
            Some(TypeData::Array { elem, len }) => {
                if *len == 0 {
                    return 0;
                }
                let stride = align_up(self.size_of(pool, *elem), self.align_of(pool, *elem));
                stride * len
            }
            Some(TypeData::Slice(_)) => self.word_size * 3,
            Some(TypeData::Interface(_)) => self.word_size * 2,
            Some(TypeData::Struct(fields)) => {
                let Some(last) = fields.last() else {
                    return 0;
                };
                let types: Vec<Idx> = fields.iter().map(|f| f.ty).collect();
                let offsets = self.offsets_of(pool, &types);
                let end = offsets[offsets.len() - 1] + self.size_of(pool, last.ty);
                align_up(end, self.align_of(pool, ty))
            }
            Some(TypeData::Tuple(vars)) => {
                let types: Vec<Idx> = vars.iter().map(|v| v.ty).collect();
                match types.last() {
                    Some(&last) => {
                        let offsets = self.offsets_of(pool, &types);
                        offsets[offsets.len() - 1] + self.size_of(pool, last)
                    }
                    None => 0,
                }
            }
            Some(
                TypeData::Pointer(_)
                | TypeData::Map { .. }
                | TypeData::Chan { .. }
                | TypeData::Signature(_),
            ) => self.word_size,
            // Unresolved names and foreign handles have no layout.
            Some(TypeData::Named { .. }) | None => 0,
        }
    }

    fn align_of(&self, pool: &Pool, ty: Idx) -> u64 {
        let align = match pool.get(pool.underlying(ty)) {
            Some(TypeData::Array { elem, .. }) => self.align_of(pool, *elem),
            Some(TypeData::Struct(fields)) => fields
                .iter()
                .map(|f| self.align_of(pool, f.ty))
                .max()
                .unwrap_or(1),
            Some(TypeData::Slice(_) | TypeData::Interface(_)) => self.word_size,
            Some(TypeData::Basic(BasicKind::Complex64)) => 4,
            Some(TypeData::Basic(BasicKind::Complex128)) => 8,
            Some(TypeData::Basic(BasicKind::String)) => self.word_size,
            _ => self.size_of(pool, ty),
        };
        align.clamp(1, self.max_align)
    }

    fn offsets_of(&self, pool: &Pool, fields: &[Idx]) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for &field in fields {
            offset = align_up(offset, self.align_of(pool, field));
            offsets.push(offset);
            offset += self.size_of(pool, field);
        }
        offsets
    }

    fn pointer_size(&self) -> u64 {
        self.word_size
    }
}

#[cfg(test)]
mod tests;
