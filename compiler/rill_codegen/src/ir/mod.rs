//! Arena-based IR.
//!
//! A deliberately small target representation: functions made of blocks
//! made of instructions, every operand an opaque `Copy` ID into the
//! module's arenas. It carries just enough to express staged payloads,
//! runtime calls and debug bindings; arithmetic and control flow beyond
//! return/branch belong to other parts of the backend.
//!
//! # Design
//!
//! Same arena + ID pattern as `Idx` in the type pool: callers never hold
//! references into the module, only `ValueId` / `BlockId` / `FunctionId`
//! / `GlobalId` handles, and a `NONE`-free API (absence is `Option`).

mod backend;
mod builder;
mod display;
mod types;

pub use backend::RUNTIME_TYPE_PREFIX;
pub use builder::IrBuilder;
pub use types::lower_type;

use rustc_hash::FxHashMap;

use crate::debug::{DebugMetadata, MetaId};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

/// Handle to a value in an `IrModule`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(u32);

/// Handle to a basic block within its function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

/// Handle to a function in an `IrModule`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(u32);

/// Handle to a global in an `IrModule`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlobalId(u32);

macro_rules! impl_raw {
    ($($ty:ident),*) => {
        $(impl $ty {
            /// The raw index.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        })*
    };
}

impl_raw!(ValueId, BlockId, FunctionId, GlobalId);

impl BlockId {
    /// The entry block of every defined function.
    pub const ENTRY: Self = Self(0);
}

// ---------------------------------------------------------------------------
// Types and values
// ---------------------------------------------------------------------------

/// IR-level type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    /// Integer of the given bit width (`Int(1)` is a boolean).
    Int(u32),
    /// Float of the given bit width.
    Float(u32),
    /// Opaque pointer.
    Ptr,
    Struct(Vec<IrType>),
    Array(Box<IrType>, u64),
}

impl IrType {
    pub const BOOL: Self = Self::Int(1);
    pub const I32: Self = Self::Int(32);
}

/// What a value is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Integer constant.
    Const(u64),
    /// The n-th parameter of a function.
    Param(FunctionId, u32),
    /// Address of a global.
    Global(GlobalId),
    /// Result of an instruction.
    Inst,
}

#[derive(Clone, Debug)]
pub struct ValueData {
    pub kind: ValueKind,
    pub ty: IrType,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Source location attached to an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugLoc {
    pub line: u32,
    pub column: u32,
    /// Innermost debug scope (subprogram, lexical block or compile unit).
    pub scope: MetaId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstKind {
    /// Function-scope stack slot.
    Alloca { dest: ValueId, ty: IrType },
    Store { value: ValueId, ptr: ValueId },
    Load { dest: ValueId, ptr: ValueId },
    /// Value conversion to `dest`'s type.
    Convert { dest: ValueId, value: ValueId },
    Call {
        dest: Option<ValueId>,
        callee: FunctionId,
        args: Vec<ValueId>,
    },
    /// Binds a variable descriptor to its storage.
    DbgDeclare {
        storage: ValueId,
        variable: MetaId,
        expr: MetaId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub kind: InstKind,
    pub loc: Option<DebugLoc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    Ret(Option<ValueId>),
    Br(BlockId),
}

#[derive(Clone, Debug)]
pub struct Block {
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<IrType>,
    pub ret: IrType,
    /// Empty for declarations.
    pub blocks: Vec<Block>,
    pub subprogram: Option<MetaId>,
    /// Number of allocas at the head of the entry block.
    entry_allocas: usize,
}

impl Function {
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// All instructions of the function, in block order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

#[derive(Clone, Debug)]
pub struct Global {
    pub name: String,
    /// The global's address.
    pub value: ValueId,
}

// ---------------------------------------------------------------------------
// Module
// ---------------------------------------------------------------------------

/// One translated module.
#[derive(Debug, Default)]
pub struct IrModule {
    pub name: String,
    functions: Vec<Function>,
    globals: Vec<Global>,
    values: Vec<ValueData>,
    function_names: FxHashMap<String, FunctionId>,
    global_names: FxHashMap<String, GlobalId>,
    debug: Option<DebugMetadata>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_by_name(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    pub fn global(&self, id: GlobalId) -> &Global {
        &self.globals[id.index()]
    }

    pub fn global_by_name(&self, name: &str) -> Option<GlobalId> {
        self.global_names.get(name).copied()
    }

    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id.index()]
    }

    /// Attach the finalized debug metadata of this module's compile unit.
    pub fn attach_debug_info(&mut self, debug: DebugMetadata) {
        self.debug = Some(debug);
    }

    pub fn debug_info(&self) -> Option<&DebugMetadata> {
        self.debug.as_ref()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_value(&mut self, kind: ValueKind, ty: IrType, name: &str) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(ValueData {
            kind,
            ty,
            name: name.to_string(),
        });
        id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.function_names.insert(function.name.clone(), id);
        self.functions.push(function);
        id
    }

    #[allow(clippy::cast_possible_truncation)]
    fn push_global(&mut self, name: &str) -> GlobalId {
        let id = GlobalId(self.globals.len() as u32);
        let value = self.push_value(ValueKind::Global(id), IrType::Ptr, name);
        self.globals.push(Global {
            name: name.to_string(),
            value,
        });
        self.global_names.insert(name.to_string(), id);
        id
    }

    fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
