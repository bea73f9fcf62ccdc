//! The type pool.
//!
//! Owns every [`TypeData`] of a compilation and hands out [`Idx`] handles.
//! Structural types are hash-consed: constructing the same shape twice
//! returns the same handle. Named types are allocated fresh per declaration
//! and resolved in two steps (`named`, then `set_underlying`) so that a
//! type may refer to itself through its own definition.

mod format;

use rustc_hash::FxHashMap;

use crate::data::{
    BasicKind, ChanDir, Field, Method, NamedDecl, Signature, TypeData, Var,
};
use crate::source::Pos;
use crate::Idx;

/// Storage for all types of one compilation.
#[derive(Debug)]
pub struct Pool {
    items: Vec<TypeData>,
    interned: FxHashMap<TypeData, Idx>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    /// Create a pool with every basic type pre-interned at its fixed index.
    pub fn new() -> Self {
        let mut pool = Self {
            items: Vec::with_capacity(Idx::FIRST_DYNAMIC as usize * 2),
            interned: FxHashMap::default(),
        };
        for kind in BasicKind::ALL {
            let idx = pool.intern(TypeData::Basic(kind));
            debug_assert_eq!(idx.raw(), kind as u32);
        }
        pool
    }

    /// Number of types in the pool (including basics).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Data behind `idx`, or `None` for `Idx::NONE` and foreign handles.
    pub fn get(&self, idx: Idx) -> Option<&TypeData> {
        self.items.get(idx.raw() as usize)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push(&mut self, data: TypeData) -> Idx {
        let idx = Idx::from_raw(self.items.len() as u32);
        self.items.push(data);
        idx
    }

    fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.interned.get(&data) {
            return idx;
        }
        let idx = self.push(data.clone());
        self.interned.insert(data, idx);
        idx
    }

    // === Structural Constructors ===

    /// `*elem`
    pub fn pointer(&mut self, elem: Idx) -> Idx {
        self.intern(TypeData::Pointer(elem))
    }

    /// `[len]elem`
    pub fn array(&mut self, elem: Idx, len: u64) -> Idx {
        self.intern(TypeData::Array { elem, len })
    }

    /// `[]elem`
    pub fn slice(&mut self, elem: Idx) -> Idx {
        self.intern(TypeData::Slice(elem))
    }

    /// `map[key]value`
    pub fn map(&mut self, key: Idx, value: Idx) -> Idx {
        self.intern(TypeData::Map { key, value })
    }

    /// `chan elem`, `chan<- elem` or `<-chan elem`.
    pub fn chan(&mut self, elem: Idx, dir: ChanDir) -> Idx {
        self.intern(TypeData::Chan { elem, dir })
    }

    /// `struct { fields... }`
    pub fn struct_type(&mut self, fields: Vec<Field>) -> Idx {
        self.intern(TypeData::Struct(fields))
    }

    /// `interface { methods... }`
    pub fn interface(&mut self, methods: Vec<Method>) -> Idx {
        self.intern(TypeData::Interface(methods))
    }

    /// A function or method signature.
    pub fn signature(&mut self, sig: Signature) -> Idx {
        self.intern(TypeData::Signature(sig))
    }

    /// A multi-value tuple.
    pub fn tuple(&mut self, vars: Vec<Var>) -> Idx {
        self.intern(TypeData::Tuple(vars))
    }

    // === Named Types ===

    /// Declare a named type. Its underlying type is unresolved until
    /// [`set_underlying`](Self::set_underlying) is called.
    pub fn named(&mut self, package: &str, name: &str, pos: Pos) -> Idx {
        self.push(TypeData::Named {
            decl: NamedDecl {
                package: package.to_string(),
                name: name.to_string(),
                pos,
            },
            underlying: Idx::NONE,
        })
    }

    /// Resolve a named type's definition.
    ///
    /// Returns `false`, leaving the pool unchanged, if `named` is not a
    /// named type.
    pub fn set_underlying(&mut self, named: Idx, underlying: Idx) -> bool {
        let resolved = self.underlying(underlying);
        let Some(TypeData::Named {
            underlying: slot, ..
        }) = self.items.get_mut(named.raw() as usize)
        else {
            return false;
        };
        *slot = resolved;
        true
    }

    // === Queries ===

    /// The underlying type: `idx` itself unless it is a named type.
    pub fn underlying(&self, idx: Idx) -> Idx {
        match self.get(idx) {
            Some(TypeData::Named { underlying, .. }) if !underlying.is_none() => {
                self.underlying(*underlying)
            }
            _ => idx,
        }
    }

    /// Element type and direction of a channel type (through names).
    pub fn chan_of(&self, idx: Idx) -> Option<(Idx, ChanDir)> {
        match self.get(self.underlying(idx)) {
            Some(&TypeData::Chan { elem, dir }) => Some((elem, dir)),
            _ => None,
        }
    }

    /// The signature behind a signature type.
    pub fn signature_of(&self, idx: Idx) -> Option<&Signature> {
        match self.get(self.underlying(idx)) {
            Some(TypeData::Signature(sig)) => Some(sig),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests;
