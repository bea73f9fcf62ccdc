//! ID-based instruction builder.
//!
//! `IrBuilder` borrows an `IrModule` mutably, tracks the insertion point
//! and the current debug location, and exposes only opaque IDs.
//!
//! # Method Organization
//!
//! | Category | Methods |
//! |----------|---------|
//! | Constants | `const_int`, `const_bool`, `const_i32` |
//! | Memory | `entry_alloca`, `load`, `store` |
//! | Conversions | `convert` |
//! | Calls | `call`, `call_runtime` |
//! | Control flow | `br`, `ret`, `ret_void` |
//! | Blocks | `append_block`, `position_at_end`, `current_block` |
//! | Functions | `define_function`, `declare_function`, `get_or_declare_function`, `param` |
//! | Globals | `get_or_insert_global` |
//! | Debug | `set_current_debug_location`, `set_subprogram`, `insert_declare_at_end` |
//!
//! Emission methods called with no insertion point do not panic: they
//! record a codegen error (see [`IrBuilder::codegen_error_count`]) and
//! return a dangling value, so a malformed lowering is detected by the
//! driver instead of aborting the compilation.

use tracing::warn;

use rill_types::Sizes;

use super::{
    Block, BlockId, DebugLoc, FunctionId, Function, InstKind, Instruction, IrModule, IrType,
    Terminator, ValueId, ValueKind,
};
use crate::debug::MetaId;
use crate::runtime::RuntimeFn;

/// ID-based IR builder over one module.
pub struct IrBuilder<'a> {
    module: &'a mut IrModule,
    sizes: &'a dyn Sizes,
    current_function: Option<FunctionId>,
    current_block: Option<BlockId>,
    /// Attached to every instruction emitted while set.
    current_loc: Option<DebugLoc>,
    codegen_errors: u32,
}

impl<'a> IrBuilder<'a> {
    pub fn new(module: &'a mut IrModule, sizes: &'a dyn Sizes) -> Self {
        Self {
            module,
            sizes,
            current_function: None,
            current_block: None,
            current_loc: None,
            codegen_errors: 0,
        }
    }

    #[inline]
    pub fn module(&self) -> &IrModule {
        self.module
    }

    #[inline]
    pub fn sizes(&self) -> &'a dyn Sizes {
        self.sizes
    }

    /// Number of emission requests that had no insertion point.
    ///
    /// If > 0 the module is malformed and must not be handed to later
    /// stages.
    pub fn codegen_error_count(&self) -> u32 {
        self.codegen_errors
    }

    pub(super) fn record_codegen_error(&mut self, what: &str) {
        warn!(what, "emission without an insertion point");
        self.codegen_errors += 1;
    }

    /// The word-sized integer type of the target.
    #[allow(clippy::cast_possible_truncation)]
    pub fn word_type(&self) -> IrType {
        IrType::Int((self.sizes.pointer_size() * 8) as u32)
    }

    /// The IR type of a value.
    pub fn value_type(&self, value: ValueId) -> &IrType {
        &self.module.value(value).ty
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    /// Integer constant of the given type.
    pub fn const_int(&mut self, ty: IrType, value: u64) -> ValueId {
        self.module.push_value(ValueKind::Const(value), ty, "")
    }

    #[inline]
    pub fn const_i32(&mut self, value: u32) -> ValueId {
        self.const_int(IrType::I32, u64::from(value))
    }

    #[inline]
    pub fn const_bool(&mut self, value: bool) -> ValueId {
        self.const_int(IrType::BOOL, u64::from(value))
    }

    // -----------------------------------------------------------------------
    // Functions and blocks
    // -----------------------------------------------------------------------

    /// Add a function declaration (no body).
    pub fn declare_function(&mut self, name: &str, params: &[IrType], ret: IrType) -> FunctionId {
        self.module.push_function(Function {
            name: name.to_string(),
            params: params.to_vec(),
            ret,
            blocks: Vec::new(),
            subprogram: None,
            entry_allocas: 0,
        })
    }

    /// Look up a function by name, declaring it if absent.
    pub fn get_or_declare_function(
        &mut self,
        name: &str,
        params: &[IrType],
        ret: IrType,
    ) -> FunctionId {
        match self.module.function_by_name(name) {
            Some(id) => id,
            None => self.declare_function(name, params, ret),
        }
    }

    /// Add a function with an empty `entry` block.
    pub fn define_function(&mut self, name: &str, params: &[IrType], ret: IrType) -> FunctionId {
        let id = self.declare_function(name, params, ret);
        self.append_block(id, "entry");
        id
    }

    /// The value of parameter `index` of `func`.
    pub fn param(&mut self, func: FunctionId, index: u32) -> ValueId {
        let f = self.module.function(func);
        let ty = f
            .params
            .get(index as usize)
            .cloned()
            .unwrap_or(IrType::Void);
        let name = format!("{}.arg{index}", f.name);
        self.module
            .push_value(ValueKind::Param(func, index), ty, &name)
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn append_block(&mut self, func: FunctionId, name: &str) -> BlockId {
        let f = self.module.function_mut(func);
        let id = BlockId(f.blocks.len() as u32);
        f.blocks.push(Block {
            name: name.to_string(),
            instructions: Vec::new(),
            terminator: None,
        });
        id
    }

    pub fn position_at_end(&mut self, func: FunctionId, block: BlockId) {
        self.current_function = Some(func);
        self.current_block = Some(block);
    }

    #[inline]
    pub fn current_function(&self) -> Option<FunctionId> {
        self.current_function
    }

    #[inline]
    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    pub fn function_name(&self, func: FunctionId) -> &str {
        &self.module.function(func).name
    }

    // -----------------------------------------------------------------------
    // Instruction emission
    // -----------------------------------------------------------------------

    fn insertion_block(&mut self) -> Option<&mut Block> {
        let (func, block) = (self.current_function?, self.current_block?);
        self.module
            .function_mut(func)
            .blocks
            .get_mut(block.index())
    }

    /// Append to the current block. Returns `false` without a position.
    fn emit(&mut self, kind: InstKind, what: &str) -> bool {
        let loc = self.current_loc;
        match self.insertion_block() {
            Some(block) => {
                block.instructions.push(Instruction { kind, loc });
                true
            }
            None => {
                self.record_codegen_error(what);
                false
            }
        }
    }

    fn inst_value(&mut self, ty: IrType, name: &str) -> ValueId {
        self.module.push_value(ValueKind::Inst, ty, name)
    }

    /// Stack slot in the entry block of the current function.
    ///
    /// Entry-block allocas are grouped at the head of the block in creation
    /// order, ahead of any other instruction, so the slot dominates every
    /// use regardless of where the request comes from.
    pub fn entry_alloca(&mut self, ty: IrType, name: &str) -> ValueId {
        let dest = self.inst_value(IrType::Ptr, name);
        let loc = self.current_loc;
        let Some(func) = self.current_function else {
            self.record_codegen_error("alloca");
            return dest;
        };
        let f = self.module.function_mut(func);
        let at = f.entry_allocas;
        match f.blocks.first_mut() {
            Some(entry) => {
                entry.instructions.insert(
                    at,
                    Instruction {
                        kind: InstKind::Alloca { dest, ty },
                        loc,
                    },
                );
                f.entry_allocas += 1;
            }
            None => self.record_codegen_error("alloca"),
        }
        dest
    }

    pub fn store(&mut self, value: ValueId, ptr: ValueId) {
        self.emit(InstKind::Store { value, ptr }, "store");
    }

    pub fn load(&mut self, ty: IrType, ptr: ValueId, name: &str) -> ValueId {
        let dest = self.inst_value(ty, name);
        self.emit(InstKind::Load { dest, ptr }, "load");
        dest
    }

    /// Convert `value` to `ty`. No-op when the IR types already agree.
    pub fn convert(&mut self, value: ValueId, ty: IrType) -> ValueId {
        if *self.value_type(value) == ty {
            return value;
        }
        let dest = self.inst_value(ty, "conv");
        self.emit(InstKind::Convert { dest, value }, "convert");
        dest
    }

    /// Call `callee`. Returns the result unless the callee returns void.
    pub fn call(&mut self, callee: FunctionId, args: &[ValueId], name: &str) -> Option<ValueId> {
        let ret = self.module.function(callee).ret.clone();
        let dest = (ret != IrType::Void).then(|| self.inst_value(ret, name));
        self.emit(
            InstKind::Call {
                dest,
                callee,
                args: args.to_vec(),
            },
            "call",
        );
        dest
    }

    /// Call a runtime entry point, declaring it on first use.
    pub fn call_runtime(&mut self, func: RuntimeFn, args: &[ValueId]) -> Option<ValueId> {
        let word = self.word_type();
        let callee = self.get_or_declare_function(
            func.symbol(),
            &func.param_types(&word),
            func.return_type(),
        );
        self.call(callee, args, func.result_name())
    }

    fn terminate(&mut self, term: Terminator) {
        match self.insertion_block() {
            Some(block) if block.terminator.is_none() => block.terminator = Some(term),
            Some(_) => self.record_codegen_error("second terminator"),
            None => self.record_codegen_error("terminator"),
        }
    }

    pub fn br(&mut self, dest: BlockId) {
        self.terminate(Terminator::Br(dest));
    }

    pub fn ret(&mut self, value: ValueId) {
        self.terminate(Terminator::Ret(Some(value)));
    }

    pub fn ret_void(&mut self) {
        self.terminate(Terminator::Ret(None));
    }

    // -----------------------------------------------------------------------
    // Globals
    // -----------------------------------------------------------------------

    /// Address of the named global, creating it on first use.
    pub fn get_or_insert_global(&mut self, name: &str) -> ValueId {
        let id = match self.module.global_by_name(name) {
            Some(id) => id,
            None => self.module.push_global(name),
        };
        self.module.global(id).value
    }

    // -----------------------------------------------------------------------
    // Debug info
    // -----------------------------------------------------------------------

    /// Location attached to subsequently emitted instructions.
    pub fn set_current_debug_location(&mut self, loc: Option<DebugLoc>) {
        self.current_loc = loc;
    }

    #[inline]
    pub fn current_debug_location(&self) -> Option<DebugLoc> {
        self.current_loc
    }

    pub fn set_subprogram(&mut self, func: FunctionId, subprogram: MetaId) {
        self.module.function_mut(func).subprogram = Some(subprogram);
    }

    /// Bind a variable descriptor to `storage` at the end of `block`.
    ///
    /// The binding goes after every instruction already in the block but
    /// before its terminator, and carries the current debug location.
    pub fn insert_declare_at_end(
        &mut self,
        block: BlockId,
        storage: ValueId,
        variable: MetaId,
        expr: MetaId,
    ) {
        let loc = self.current_loc;
        let Some(func) = self.current_function else {
            self.record_codegen_error("declare");
            return;
        };
        match self.module.function_mut(func).blocks.get_mut(block.index()) {
            Some(b) => b.instructions.push(Instruction {
                kind: InstKind::DbgDeclare {
                    storage,
                    variable,
                    expr,
                },
                loc,
            }),
            None => self.record_codegen_error("declare"),
        }
    }
}
