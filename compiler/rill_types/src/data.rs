//! Type data stored in the pool.
//!
//! Each `Idx` maps to exactly one [`TypeData`]. Structural variants are
//! hashed for interning; `Named` carries a declaration and is unique.

use bitflags::bitflags;

use crate::source::Pos;
use crate::Idx;

/// Kind of a basic (predeclared) type.
///
/// The discriminant doubles as the type's fixed `Idx`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    UnsafePointer,
    /// The type of the untyped `nil` constant. Has no runtime representation.
    UntypedNil,
}

impl BasicKind {
    /// Every kind, in `Idx` order.
    pub const ALL: [Self; 19] = [
        Self::Bool,
        Self::Int,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Uintptr,
        Self::Float32,
        Self::Float64,
        Self::Complex64,
        Self::Complex128,
        Self::String,
        Self::UnsafePointer,
        Self::UntypedNil,
    ];

    /// Look up a kind by its raw index.
    pub fn from_index(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Source spelling of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::String => "string",
            Self::UnsafePointer => "unsafe.Pointer",
            Self::UntypedNil => "untyped nil",
        }
    }

    /// Category flags for this kind.
    pub const fn info(self) -> BasicInfo {
        match self {
            Self::Bool => BasicInfo::IS_BOOLEAN,
            Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                BasicInfo::IS_INTEGER
            }
            Self::Uint
            | Self::Uint8
            | Self::Uint16
            | Self::Uint32
            | Self::Uint64
            | Self::Uintptr => BasicInfo::IS_INTEGER.union(BasicInfo::IS_UNSIGNED),
            Self::Float32 | Self::Float64 => BasicInfo::IS_FLOAT,
            Self::Complex64 | Self::Complex128 => BasicInfo::IS_COMPLEX,
            Self::String => BasicInfo::IS_STRING,
            Self::UnsafePointer => BasicInfo::empty(),
            Self::UntypedNil => BasicInfo::IS_UNTYPED,
        }
    }
}

bitflags! {
    /// Category of a basic type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct BasicInfo: u8 {
        const IS_BOOLEAN = 1 << 0;
        const IS_INTEGER = 1 << 1;
        const IS_UNSIGNED = 1 << 2;
        const IS_FLOAT = 1 << 3;
        const IS_COMPLEX = 1 << 4;
        const IS_STRING = 1 << 5;
        const IS_UNTYPED = 1 << 6;

        const IS_NUMERIC = Self::IS_INTEGER.bits() | Self::IS_FLOAT.bits() | Self::IS_COMPLEX.bits();
    }
}

/// Channel direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    SendOnly,
    /// `<-chan T`
    RecvOnly,
}

impl ChanDir {
    /// Whether values may be sent on a channel of this direction.
    pub fn can_send(self) -> bool {
        !matches!(self, Self::RecvOnly)
    }

    /// Whether values may be received from a channel of this direction.
    pub fn can_recv(self) -> bool {
        !matches!(self, Self::SendOnly)
    }
}

/// A struct field.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: Idx,
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Idx) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }
}

/// A parameter, result or receiver variable.
///
/// An empty name is a blank (unnamed) variable.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Var {
    pub name: String,
    pub ty: Idx,
    pub pos: Pos,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: Idx) -> Self {
        Self {
            name: name.into(),
            ty,
            pos: Pos::NONE,
        }
    }

    /// An unnamed variable of the given type.
    pub fn blank(ty: Idx) -> Self {
        Self::new("", ty)
    }

    #[must_use]
    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = pos;
        self
    }
}

/// A function or method signature.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Signature {
    pub recv: Option<Var>,
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    /// The final parameter is a `...T` parameter (typed as a slice).
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Var>, results: Vec<Var>) -> Self {
        Self {
            recv: None,
            params,
            results,
            variadic: false,
        }
    }

    #[must_use]
    pub fn with_recv(mut self, recv: Var) -> Self {
        self.recv = Some(recv);
        self
    }

    #[must_use]
    pub fn with_variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }
}

/// An interface method.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Method {
    pub name: String,
    pub sig: Idx,
}

/// Declared name of a named type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NamedDecl {
    /// Package-qualified prefix, empty for the universe scope.
    pub package: String,
    pub name: String,
    pub pos: Pos,
}

/// The data behind one `Idx`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeData {
    Basic(BasicKind),
    Pointer(Idx),
    Array { elem: Idx, len: u64 },
    Slice(Idx),
    Map { key: Idx, value: Idx },
    Chan { elem: Idx, dir: ChanDir },
    Struct(Vec<Field>),
    Interface(Vec<Method>),
    Signature(Signature),
    /// Multiple values, as produced by a call with several results.
    /// Never the type of a storable value.
    Tuple(Vec<Var>),
    /// A defined type. `underlying` is `Idx::NONE` until resolved.
    Named { decl: NamedDecl, underlying: Idx },
}
