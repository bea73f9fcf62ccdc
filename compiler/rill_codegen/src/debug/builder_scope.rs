//! `DebugInfoBuilder` methods for function/scope/location/variable management and finalization.

use tracing::{debug, trace, warn};

use rill_types::{FileId, Idx, Pool, Pos, Var};

use super::builder::DebugInfoBuilder;
use super::config::{DebugFormat, DebugInfoError, DebugLevel};
use super::metadata::{
    DebugMetadata, FlagBehavior, MetaId, MetaNode, ModuleFlag, VariableKind,
};
use crate::ir::{DebugLoc, FunctionId, IrBuilder, ValueId};

/// Version of the descriptor schema, recorded as `"Debug Info Version"`.
pub const DEBUG_INFO_VERSION: u32 = 1;

/// One entry of the debug scope stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    CompileUnit(MetaId),
    Function {
        subprogram: MetaId,
        /// File of the function's declaration, if known.
        file: Option<FileId>,
    },
    /// Same scope, different file: code inlined from or attributed to
    /// another source file.
    LexicalBlock(MetaId),
}

impl Scope {
    pub fn id(self) -> MetaId {
        match self {
            Self::CompileUnit(id) | Self::LexicalBlock(id) => id,
            Self::Function { subprogram, .. } => subprogram,
        }
    }
}

/// Compile unit, at most one function, at most one lexical block override.
#[derive(Debug)]
pub(super) struct ScopeStack {
    compile_unit: MetaId,
    function: Option<(MetaId, Option<FileId>)>,
    block: Option<MetaId>,
}

impl ScopeStack {
    pub(super) fn new(compile_unit: MetaId) -> Self {
        Self {
            compile_unit,
            function: None,
            block: None,
        }
    }

    /// Innermost scope.
    pub(super) fn active(&self) -> Scope {
        if let Some(block) = self.block {
            Scope::LexicalBlock(block)
        } else if let Some((subprogram, file)) = self.function {
            Scope::Function { subprogram, file }
        } else {
            Scope::CompileUnit(self.compile_unit)
        }
    }

    /// Outermost first.
    pub(super) fn entries(&self) -> Vec<Scope> {
        let mut entries = vec![Scope::CompileUnit(self.compile_unit)];
        if let Some((subprogram, file)) = self.function {
            entries.push(Scope::Function { subprogram, file });
        }
        if let Some(block) = self.block {
            entries.push(Scope::LexicalBlock(block));
        }
        entries
    }

    fn function_file(&self) -> Option<FileId> {
        self.function.and_then(|(_, file)| file)
    }
}

impl DebugInfoBuilder<'_> {
    // -- Scopes --

    /// The innermost debug scope.
    #[must_use]
    pub fn active_scope(&self) -> Scope {
        self.scopes.active()
    }

    /// The scope stack, outermost first.
    #[must_use]
    pub fn scope_stack(&self) -> Vec<Scope> {
        self.scopes.entries()
    }

    fn scope(&self) -> MetaId {
        self.scopes.active().id()
    }

    /// Enter `func`: create its subprogram descriptor, attach it to the IR
    /// function, and make it the active scope.
    ///
    /// At [`DebugLevel::LineTablesOnly`] the subprogram gets an empty
    /// subroutine type instead of the described signature.
    ///
    /// # Errors
    ///
    /// Fails if another function is still active, or if the signature has
    /// no descriptor.
    #[tracing::instrument(level = "trace", skip_all, fields(func = %b.function_name(func)))]
    pub fn push_function(
        &mut self,
        b: &mut IrBuilder<'_>,
        pool: &mut Pool,
        func: FunctionId,
        sig: Idx,
        pos: Pos,
    ) -> Result<MetaId, DebugInfoError> {
        let name = b.function_name(func).to_string();
        if let Some((active, _)) = self.scopes.function {
            let active = match self.metadata.get(active) {
                MetaNode::Subprogram { name, .. } => name.clone(),
                _ => String::new(),
            };
            return Err(DebugInfoError::FunctionAlreadyActive {
                active,
                entering: name,
            });
        }

        let position = self.fset.position(pos);
        if position.file.is_none() {
            warn!(%name, "function declared outside any registered file");
        }
        let file = position
            .file
            .map(|f| self.files.file(&mut self.metadata, self.fset, f));

        let ty = match self.config.level {
            DebugLevel::Full => self.di_type(pool, sig)?,
            DebugLevel::LineTablesOnly | DebugLevel::None => {
                let void = self.void_type();
                self.metadata.push(MetaNode::SubroutineType {
                    parameters: vec![void],
                })
            }
        };

        let subprogram = self.metadata.push(MetaNode::Subprogram {
            scope: self.compile_unit,
            name: name.clone(),
            linkage_name: name,
            file,
            line: position.line,
            ty,
            is_local: false,
            is_definition: true,
            scope_line: position.line,
            optimized: self.config.optimized,
            function: func,
        });
        b.set_subprogram(func, subprogram);

        self.scopes.function = Some((subprogram, position.file));
        self.scopes.block = None;
        debug!(%subprogram, line = position.line, "entered function");
        Ok(subprogram)
    }

    /// Leave the active function, dropping any lexical block override.
    ///
    /// Returns the subprogram that was active, if any.
    pub fn pop_function(&mut self) -> Option<MetaId> {
        self.scopes.block = None;
        let popped = self.scopes.function.take().map(|(subprogram, _)| subprogram);
        debug!(?popped, "left function");
        popped
    }

    // -- Variables --

    /// Describe `var` and bind it to `storage`.
    ///
    /// `param_index` is the 0-based parameter position for parameters and
    /// `None` for locals. The binding is placed at the end of the current
    /// block, so the variable is visible from that point on.
    ///
    /// Returns `None` below [`DebugLevel::Full`], where variables are not
    /// described.
    ///
    /// # Errors
    ///
    /// Fails if the variable's type has no descriptor.
    pub fn declare_variable(
        &mut self,
        b: &mut IrBuilder<'_>,
        pool: &mut Pool,
        var: &Var,
        storage: ValueId,
        param_index: Option<u32>,
    ) -> Result<Option<MetaId>, DebugInfoError> {
        if self.config.level != DebugLevel::Full {
            return Ok(None);
        }

        let (kind, arg_no) = match param_index {
            Some(index) => (VariableKind::Arg, index + 1),
            None => (VariableKind::Auto, 0),
        };
        let position = self.fset.position(var.pos);
        let file = position
            .file
            .map(|f| self.files.file(&mut self.metadata, self.fset, f));
        let ty = self.di_type(pool, var.ty)?;
        let scope = self.scope();
        let variable = self.metadata.push(MetaNode::LocalVariable {
            kind,
            scope,
            name: var.name.clone(),
            file,
            line: position.line,
            arg_no,
            ty,
            always_preserve: true,
        });
        let expr = self.metadata.push(MetaNode::Expression(Vec::new()));

        match b.current_block() {
            Some(block) => b.insert_declare_at_end(block, storage, variable, expr),
            None => warn!(name = %var.name, "variable declared with no insertion block"),
        }
        trace!(name = %var.name, %variable, ?param_index, "declared variable");
        Ok(Some(variable))
    }

    // -- Locations --

    /// Set the location attached to subsequently emitted instructions.
    ///
    /// Invalid positions are ignored and the previous location stays in
    /// effect. A position in a file other than the active function's opens
    /// a lexical block for that file, replacing any previous override.
    pub fn set_location(&mut self, b: &mut IrBuilder<'_>, pos: Pos) {
        if !pos.is_valid() {
            return;
        }
        let position = self.fset.position(pos);

        self.scopes.block = None;
        if let Some(file) = position.file {
            if Some(file) != self.scopes.function_file() {
                let file_md = self.files.file(&mut self.metadata, self.fset, file);
                let scope = self.scope();
                let block = self.metadata.push(MetaNode::LexicalBlockFile {
                    scope,
                    file: file_md,
                    discriminator: 0,
                });
                self.scopes.block = Some(block);
            }
        }

        let scope = self.scope();
        trace!(line = position.line, column = position.column, %scope, "location");
        b.set_current_debug_location(Some(DebugLoc {
            line: position.line,
            column: position.column,
            scope,
        }));
    }

    // -- Finalization --

    /// Complete the compile unit and record the module version flags.
    ///
    /// Consumes the builder; attach the result to the module with
    /// [`IrModule::attach_debug_info`](crate::ir::IrModule::attach_debug_info).
    #[must_use]
    pub fn finalize(self) -> DebugMetadata {
        if let Some((subprogram, _)) = self.scopes.function {
            warn!(%subprogram, "finalizing with a function still active");
        }

        let format_flag = match self.config.format {
            DebugFormat::Dwarf => ModuleFlag {
                behavior: FlagBehavior::Warning,
                key: "Dwarf Version",
                value: self.config.dwarf_version,
            },
            DebugFormat::CodeView => ModuleFlag {
                behavior: FlagBehavior::Warning,
                key: "CodeView",
                value: 1,
            },
        };
        let schema_flag = ModuleFlag {
            behavior: FlagBehavior::Error,
            key: "Debug Info Version",
            value: DEBUG_INFO_VERSION,
        };

        debug!(
            nodes = self.metadata.len(),
            types = self.types.len(),
            files = self.files.len(),
            "debug info finalized"
        );
        DebugMetadata {
            nodes: self.metadata,
            compile_unit: self.compile_unit,
            flags: vec![format_flag, schema_flag],
        }
    }
}
