//! Source type → IR type lowering.

use rill_types::{BasicKind, Idx, Pool, Sizes, TypeData};

use super::IrType;

/// Lower a source type to its in-memory IR representation.
///
/// Reference-like types (pointers, maps, channels, functions) are opaque
/// pointers; strings, slices and interfaces are their runtime headers.
/// Unresolved names lower to `Void`.
pub fn lower_type(pool: &Pool, sizes: &dyn Sizes, ty: Idx) -> IrType {
    let word = word_type(sizes);
    match pool.get(pool.underlying(ty)) {
        Some(TypeData::Basic(kind)) => lower_basic(*kind, word),
        Some(
            TypeData::Pointer(_)
            | TypeData::Map { .. }
            | TypeData::Chan { .. }
            | TypeData::Signature(_),
        ) => IrType::Ptr,
        Some(TypeData::Array { elem, len }) => {
            IrType::Array(Box::new(lower_type(pool, sizes, *elem)), *len)
        }
        Some(TypeData::Slice(_)) => IrType::Struct(vec![IrType::Ptr, word.clone(), word]),
        Some(TypeData::Interface(_)) => IrType::Struct(vec![IrType::Ptr, IrType::Ptr]),
        Some(TypeData::Struct(fields)) => IrType::Struct(
            fields
                .iter()
                .map(|f| lower_type(pool, sizes, f.ty))
                .collect(),
        ),
        Some(TypeData::Tuple(vars)) => IrType::Struct(
            vars.iter()
                .map(|v| lower_type(pool, sizes, v.ty))
                .collect(),
        ),
        Some(TypeData::Named { .. }) | None => IrType::Void,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn word_type(sizes: &dyn Sizes) -> IrType {
    IrType::Int((sizes.pointer_size() * 8) as u32)
}

fn lower_basic(kind: BasicKind, word: IrType) -> IrType {
    match kind {
        BasicKind::Bool => IrType::BOOL,
        BasicKind::Int8 | BasicKind::Uint8 => IrType::Int(8),
        BasicKind::Int16 | BasicKind::Uint16 => IrType::Int(16),
        BasicKind::Int32 | BasicKind::Uint32 => IrType::Int(32),
        BasicKind::Int64 | BasicKind::Uint64 => IrType::Int(64),
        BasicKind::Int | BasicKind::Uint | BasicKind::Uintptr => word,
        BasicKind::Float32 => IrType::Float(32),
        BasicKind::Float64 => IrType::Float(64),
        BasicKind::Complex64 => IrType::Struct(vec![IrType::Float(32), IrType::Float(32)]),
        BasicKind::Complex128 => IrType::Struct(vec![IrType::Float(64), IrType::Float(64)]),
        BasicKind::String => IrType::Struct(vec![IrType::Ptr, word]),
        BasicKind::UnsafePointer | BasicKind::UntypedNil => IrType::Ptr,
    }
}
