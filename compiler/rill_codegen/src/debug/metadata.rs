//! Debug metadata graph.
//!
//! Descriptors are nodes in an append-only arena and refer to each other
//! by [`MetaId`]. Cycles through named types are closed with temporaries:
//! a [`MetaNode::Temporary`] stands in for a descriptor under
//! construction, and [`MetadataArena::replace_all_uses_with`] later
//! rewrites every operand that names it.

use std::fmt::{self, Display, Formatter};

use crate::ir::FunctionId;

use super::config::DebugLevel;

/// Handle to a metadata node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaId(u32);

impl MetaId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for MetaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.0)
    }
}

/// `DW_ATE_*` base type encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    Boolean = 0x02,
    Float = 0x04,
    Signed = 0x05,
    Unsigned = 0x08,
    /// Used for complex numbers.
    ImaginaryFloat = 0x09,
}

impl Encoding {
    #[inline]
    pub fn dwarf(self) -> u8 {
        self as u8
    }
}

/// Kind of a variable descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Local, `DW_TAG_auto_variable`.
    Auto,
    /// Parameter, `DW_TAG_arg_variable`.
    Arg,
}

impl VariableKind {
    pub fn tag(self) -> u32 {
        match self {
            Self::Auto => 0x100,
            Self::Arg => 0x101,
        }
    }
}

/// `DW_LANG_Go`.
pub const DW_LANG_GO: u32 = 0x16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaNode {
    CompileUnit {
        language: u32,
        file: String,
        directory: String,
        producer: String,
        optimized: bool,
        emission: DebugLevel,
    },
    File {
        filename: String,
        directory: String,
    },
    /// Scalar type; `encoding` is `None` only for `void`.
    BasicType {
        name: String,
        size_bits: u64,
        align_bits: u64,
        encoding: Option<Encoding>,
    },
    PointerType {
        name: String,
        pointee: MetaId,
        size_bits: u64,
        align_bits: u64,
    },
    ArrayType {
        element: MetaId,
        size_bits: u64,
        align_bits: u64,
        /// Element count per dimension.
        subscripts: Vec<u64>,
    },
    Member {
        scope: MetaId,
        name: String,
        ty: MetaId,
        size_bits: u64,
        align_bits: u64,
        offset_bits: u64,
    },
    StructType {
        scope: MetaId,
        name: String,
        size_bits: u64,
        align_bits: u64,
        elements: Vec<MetaId>,
    },
    Typedef {
        name: String,
        ty: MetaId,
        file: Option<MetaId>,
        line: u32,
        scope: MetaId,
    },
    /// `parameters[0]` is the return type.
    SubroutineType {
        parameters: Vec<MetaId>,
    },
    Subprogram {
        scope: MetaId,
        name: String,
        linkage_name: String,
        file: Option<MetaId>,
        line: u32,
        ty: MetaId,
        is_local: bool,
        is_definition: bool,
        scope_line: u32,
        optimized: bool,
        function: FunctionId,
    },
    LexicalBlockFile {
        scope: MetaId,
        file: MetaId,
        discriminator: u32,
    },
    LocalVariable {
        kind: VariableKind,
        scope: MetaId,
        name: String,
        file: Option<MetaId>,
        line: u32,
        /// 1-based for parameters, 0 for locals.
        arg_no: u32,
        ty: MetaId,
        always_preserve: bool,
    },
    /// Location expression (empty: the storage itself).
    Expression(Vec<u64>),
    /// Placeholder for a descriptor still under construction.
    Temporary,
}

impl MetaNode {
    /// Visit every node reference held by this node.
    fn for_each_operand_mut(&mut self, mut f: impl FnMut(&mut MetaId)) {
        match self {
            Self::CompileUnit { .. }
            | Self::File { .. }
            | Self::BasicType { .. }
            | Self::Expression(_)
            | Self::Temporary => {}
            Self::PointerType { pointee, .. } => f(pointee),
            Self::ArrayType { element, .. } => f(element),
            Self::Member { scope, ty, .. } => {
                f(scope);
                f(ty);
            }
            Self::StructType {
                scope, elements, ..
            } => {
                f(scope);
                elements.iter_mut().for_each(f);
            }
            Self::Typedef {
                ty, file, scope, ..
            } => {
                f(ty);
                if let Some(file) = file {
                    f(file);
                }
                f(scope);
            }
            Self::SubroutineType { parameters } => parameters.iter_mut().for_each(f),
            Self::Subprogram {
                scope, file, ty, ..
            } => {
                f(scope);
                if let Some(file) = file {
                    f(file);
                }
                f(ty);
            }
            Self::LexicalBlockFile { scope, file, .. } => {
                f(scope);
                f(file);
            }
            Self::LocalVariable {
                scope, file, ty, ..
            } => {
                f(scope);
                if let Some(file) = file {
                    f(file);
                }
                f(ty);
            }
        }
    }

    /// Every node reference held by this node.
    pub fn operands(&self) -> Vec<MetaId> {
        let mut out = Vec::new();
        self.clone().for_each_operand_mut(|id| out.push(*id));
        out
    }
}

/// Append-only store of metadata nodes.
#[derive(Clone, Debug, Default)]
pub struct MetadataArena {
    nodes: Vec<MetaNode>,
    /// `forward[t]` is the replacement of temporary `t` once resolved.
    forward: Vec<Option<MetaId>>,
}

impl MetadataArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, node: MetaNode) -> MetaId {
        let id = MetaId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.forward.push(None);
        id
    }

    pub fn temporary(&mut self) -> MetaId {
        self.push(MetaNode::Temporary)
    }

    /// Follow temporary replacements to the node that stands for `id`.
    pub fn resolve(&self, mut id: MetaId) -> MetaId {
        while let Some(next) = self.forward[id.0 as usize] {
            id = next;
        }
        id
    }

    /// The node behind `id`, after temporary replacement.
    pub fn get(&self, id: MetaId) -> &MetaNode {
        &self.nodes[self.resolve(id).0 as usize]
    }

    /// Redirect every use of `temp` to `real`.
    ///
    /// Rewrites the operands of all existing nodes and records the
    /// forwarding so that IDs of `temp` held outside the arena still
    /// resolve. Returns the number of rewritten operands.
    pub fn replace_all_uses_with(&mut self, temp: MetaId, real: MetaId) -> usize {
        debug_assert!(
            matches!(self.nodes[temp.0 as usize], MetaNode::Temporary),
            "replace_all_uses_with on non-temporary {temp}"
        );
        let mut rewritten = 0;
        for node in &mut self.nodes {
            node.for_each_operand_mut(|op| {
                if *op == temp {
                    *op = real;
                    rewritten += 1;
                }
            });
        }
        self.forward[temp.0 as usize] = Some(real);
        rewritten
    }

    /// Whether `target` is reachable from `from` through operands.
    pub fn reaches(&self, from: MetaId, target: MetaId) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            let slot = &mut seen[id.0 as usize];
            if *slot {
                continue;
            }
            *slot = true;
            stack.extend(self.nodes[id.0 as usize].operands());
        }
        false
    }

    /// Temporaries not yet replaced.
    pub fn unresolved_temporaries(&self) -> usize {
        self.nodes
            .iter()
            .zip(&self.forward)
            .filter(|(n, fwd)| matches!(n, MetaNode::Temporary) && fwd.is_none())
            .count()
    }

    /// Operands, across all nodes, that still name a temporary.
    pub fn temporary_uses(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(MetaNode::operands)
            .filter(|op| matches!(self.nodes[op.0 as usize], MetaNode::Temporary))
            .count()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetaId, &MetaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (MetaId(i as u32), n))
    }
}

/// How a module flag merges across linked modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum FlagBehavior {
    /// Mismatch is a link error.
    Error = 1,
    /// Mismatch is a warning.
    Warning = 2,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleFlag {
    pub behavior: FlagBehavior,
    pub key: &'static str,
    pub value: u32,
}

/// Finalized debug info of one compile unit.
#[derive(Clone, Debug)]
pub struct DebugMetadata {
    pub nodes: MetadataArena,
    pub compile_unit: MetaId,
    pub flags: Vec<ModuleFlag>,
}

impl DebugMetadata {
    pub fn flag(&self, key: &str) -> Option<&ModuleFlag> {
        self.flags.iter().find(|f| f.key == key)
    }
}

fn opt(id: Option<MetaId>) -> String {
    id.map_or_else(|| "null".to_string(), |id| id.to_string())
}

fn list(ids: &[MetaId]) -> String {
    let items: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(", "))
}

impl Display for MetaNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompileUnit {
                language,
                file,
                directory,
                producer,
                optimized,
                emission,
            } => write!(
                f,
                "DICompileUnit(language: {language:#x}, file: {file:?}, directory: {directory:?}, \
                 producer: {producer:?}, isOptimized: {optimized}, emissionKind: {})",
                emission.emission_kind()
            ),
            Self::File {
                filename,
                directory,
            } => write!(f, "DIFile(filename: {filename:?}, directory: {directory:?})"),
            Self::BasicType {
                name,
                size_bits,
                align_bits,
                encoding,
            } => {
                write!(f, "DIBasicType(name: {name:?}, size: {size_bits}, align: {align_bits}")?;
                if let Some(enc) = encoding {
                    write!(f, ", encoding: {:#04x}", enc.dwarf())?;
                }
                f.write_str(")")
            }
            Self::PointerType {
                name,
                pointee,
                size_bits,
                align_bits,
            } => write!(
                f,
                "DIDerivedType(tag: DW_TAG_pointer_type, name: {name:?}, baseType: {pointee}, \
                 size: {size_bits}, align: {align_bits})"
            ),
            Self::ArrayType {
                element,
                size_bits,
                align_bits,
                subscripts,
            } => write!(
                f,
                "DICompositeType(tag: DW_TAG_array_type, baseType: {element}, size: {size_bits}, \
                 align: {align_bits}, elements: {subscripts:?})"
            ),
            Self::Member {
                scope,
                name,
                ty,
                size_bits,
                align_bits,
                offset_bits,
            } => write!(
                f,
                "DIDerivedType(tag: DW_TAG_member, name: {name:?}, scope: {scope}, baseType: {ty}, \
                 size: {size_bits}, align: {align_bits}, offset: {offset_bits})"
            ),
            Self::StructType {
                scope,
                name,
                size_bits,
                align_bits,
                elements,
            } => write!(
                f,
                "DICompositeType(tag: DW_TAG_structure_type, name: {name:?}, scope: {scope}, \
                 size: {size_bits}, align: {align_bits}, elements: {})",
                list(elements)
            ),
            Self::Typedef {
                name,
                ty,
                file,
                line,
                scope,
            } => write!(
                f,
                "DIDerivedType(tag: DW_TAG_typedef, name: {name:?}, baseType: {ty}, file: {}, \
                 line: {line}, scope: {scope})",
                opt(*file)
            ),
            Self::SubroutineType { parameters } => {
                write!(f, "DISubroutineType(types: {})", list(parameters))
            }
            Self::Subprogram {
                scope,
                name,
                linkage_name,
                file,
                line,
                ty,
                is_local,
                is_definition,
                scope_line,
                optimized,
                function,
            } => write!(
                f,
                "DISubprogram(name: {name:?}, linkageName: {linkage_name:?}, scope: {scope}, \
                 file: {}, line: {line}, type: {ty}, isLocal: {is_local}, \
                 isDefinition: {is_definition}, scopeLine: {scope_line}, \
                 isOptimized: {optimized}, function: {})",
                opt(*file),
                function.raw()
            ),
            Self::LexicalBlockFile {
                scope,
                file,
                discriminator,
            } => write!(
                f,
                "DILexicalBlockFile(scope: {scope}, file: {file}, discriminator: {discriminator})"
            ),
            Self::LocalVariable {
                kind,
                scope,
                name,
                file,
                line,
                arg_no,
                ty,
                always_preserve,
            } => write!(
                f,
                "DILocalVariable(tag: {:#x}, name: {name:?}, arg: {arg_no}, scope: {scope}, \
                 file: {}, line: {line}, type: {ty}, alwaysPreserve: {always_preserve})",
                kind.tag(),
                opt(*file)
            ),
            Self::Expression(ops) => write!(f, "DIExpression({ops:?})"),
            Self::Temporary => f.write_str("<temporary>"),
        }
    }
}

impl Display for DebugMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "!llvm.dbg.cu = !{{{}}}", self.compile_unit)?;
        for flag in &self.flags {
            writeln!(
                f,
                "!llvm.module.flags = !{{i32 {}, !{:?}, i32 {}}}",
                flag.behavior as u32, flag.key, flag.value
            )?;
        }
        for (id, node) in self.nodes.iter() {
            if matches!(node, MetaNode::Temporary) {
                continue;
            }
            writeln!(f, "{id} = {node}")?;
        }
        Ok(())
    }
}
