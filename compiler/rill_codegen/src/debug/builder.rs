//! `DebugInfoBuilder` struct definition, constructor, and type descriptors.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use rill_types::{
    BasicInfo, BasicKind, Field, FileSet, Idx, NamedDecl, Pool, Signature, Sizes, TypeData, Var,
};

use super::builder_scope::ScopeStack;
use super::config::{
    malformed_signature, unhandled_type, DebugInfoConfig, DebugInfoError, DebugLevel,
};
use super::files::FileRegistry;
use super::metadata::{Encoding, MetaId, MetaNode, MetadataArena, DW_LANG_GO};

/// Debug information builder for one compile unit.
///
/// Created per module. Maps source types to descriptors (memoized per type
/// identity), tracks the active debug scope, and is consumed by
/// [`finalize`](Self::finalize).
pub struct DebugInfoBuilder<'a> {
    pub(super) config: DebugInfoConfig,
    pub(super) fset: &'a FileSet,
    pub(super) sizes: &'a dyn Sizes,
    pub(super) metadata: MetadataArena,
    pub(super) files: FileRegistry,
    /// Descriptor per type identity. Holds a temporary while a named type
    /// is under construction.
    pub(super) types: FxHashMap<Idx, MetaId>,
    /// Cache keys inserted while a named type is under construction.
    pub(super) journal: Vec<Idx>,
    /// Named types currently under construction.
    pub(super) open_named: usize,
    pub(super) void_type: Option<MetaId>,
    pub(super) compile_unit: MetaId,
    pub(super) scopes: ScopeStack,
}

impl<'a> DebugInfoBuilder<'a> {
    /// Create a builder for the compilation described by `fset`.
    ///
    /// The compile unit is named after the first registered file, remapped
    /// through the configured prefix maps.
    ///
    /// # Returns
    ///
    /// Returns `None` if debug info is disabled in the config.
    #[must_use]
    pub fn new(config: DebugInfoConfig, fset: &'a FileSet, sizes: &'a dyn Sizes) -> Option<Self> {
        if !config.level.is_enabled() {
            return None;
        }

        let files = FileRegistry::new(config.prefix_maps.clone());
        let file = fset
            .iter()
            .next()
            .map(|f| files.remap_path(fset.name(f)).into_owned())
            .unwrap_or_default();

        let mut metadata = MetadataArena::new();
        let compile_unit = metadata.push(MetaNode::CompileUnit {
            language: DW_LANG_GO,
            file,
            directory: config.compile_dir.clone(),
            producer: config.producer.clone(),
            optimized: config.optimized,
            emission: config.level,
        });
        debug!(level = %config.level, format = %config.format, "debug info enabled");

        Some(Self {
            config,
            fset,
            sizes,
            metadata,
            files,
            types: FxHashMap::default(),
            journal: Vec::new(),
            open_named: 0,
            void_type: None,
            compile_unit,
            scopes: ScopeStack::new(compile_unit),
        })
    }

    #[must_use]
    pub fn compile_unit(&self) -> MetaId {
        self.compile_unit
    }

    #[must_use]
    pub fn level(&self) -> DebugLevel {
        self.config.level
    }

    /// The metadata built so far.
    pub fn metadata(&self) -> &MetadataArena {
        &self.metadata
    }

    /// Path after prefix remapping.
    pub fn remap_path<'p>(&self, path: &'p str) -> std::borrow::Cow<'p, str> {
        self.files.remap_path(path)
    }

    // -- Type Descriptors --

    /// The descriptor of `ty`, created on first request.
    ///
    /// [`Idx::NONE`] denotes the absent type and maps to `void`. Named types
    /// may refer to themselves through their definition; the cycle is closed
    /// with a temporary that is replaced before this returns.
    ///
    /// Takes the pool mutably because strings, slices, interfaces and
    /// multi-value results are described through synthesized record types.
    ///
    /// # Errors
    ///
    /// Fails on types with no descriptor mapping (tuples, untyped nil),
    /// unresolved named types, and malformed variadic signatures.
    pub fn di_type(&mut self, pool: &mut Pool, ty: Idx) -> Result<MetaId, DebugInfoError> {
        if ty.is_none() {
            return Ok(self.void_type());
        }
        let name = pool.type_string(ty);
        self.type_descriptor(pool, ty, &name)
    }

    /// The `void` descriptor, shared by all users.
    pub fn void_type(&mut self) -> MetaId {
        if let Some(id) = self.void_type {
            return id;
        }
        let id = self.metadata.push(MetaNode::BasicType {
            name: "void".to_string(),
            size_bits: 0,
            align_bits: 0,
            encoding: None,
        });
        self.void_type = Some(id);
        id
    }

    fn type_descriptor(
        &mut self,
        pool: &mut Pool,
        ty: Idx,
        name: &str,
    ) -> Result<MetaId, DebugInfoError> {
        if let Some(&id) = self.types.get(&ty) {
            trace!(?ty, %id, "type descriptor cache hit");
            return Ok(id);
        }
        let data = pool.get(ty).cloned().ok_or(DebugInfoError::UnknownType(ty))?;
        let id = match data {
            TypeData::Basic(kind) => self.basic_descriptor(pool, ty, kind, name)?,
            TypeData::Pointer(elem) => {
                let pointee = self.di_type(pool, elem)?;
                let (size_bits, align_bits) = self.layout_bits(pool, ty);
                self.metadata.push(MetaNode::PointerType {
                    name: name.to_string(),
                    pointee,
                    size_bits,
                    align_bits,
                })
            }
            TypeData::Array { elem, len } => {
                let element = self.di_type(pool, elem)?;
                let (size_bits, align_bits) = self.layout_bits(pool, ty);
                self.metadata.push(MetaNode::ArrayType {
                    element,
                    size_bits,
                    align_bits,
                    subscripts: vec![len],
                })
            }
            TypeData::Slice(elem) => {
                let ptr = pool.pointer(elem);
                let header = pool.struct_type(vec![
                    Field::new("ptr", ptr),
                    Field::new("len", Idx::INT),
                    Field::new("cap", Idx::INT),
                ]);
                self.type_descriptor(pool, header, name)?
            }
            // Runtime handles with no structure exposed to the debugger.
            TypeData::Map { .. } | TypeData::Chan { .. } => self.di_type(pool, Idx::UINTPTR)?,
            TypeData::Interface(_) => {
                let bytes = pool.pointer(Idx::UINT8);
                let header = pool.struct_type(vec![
                    Field::new("type", bytes),
                    Field::new("data", bytes),
                ]);
                self.type_descriptor(pool, header, name)?
            }
            TypeData::Struct(fields) => self.struct_descriptor(pool, ty, &fields, name)?,
            // Caches itself, also under the receiver-less form.
            TypeData::Signature(sig) => return self.signature_descriptor(pool, ty, sig, name),
            TypeData::Named { decl, underlying } => {
                self.named_descriptor(pool, ty, &decl, underlying)?
            }
            TypeData::Tuple(_) => return Err(unhandled_type(name.to_string(), "tuple")),
        };
        debug!(?ty, %id, name, "type descriptor");
        self.cache(ty, id);
        Ok(id)
    }

    fn basic_descriptor(
        &mut self,
        pool: &mut Pool,
        ty: Idx,
        kind: BasicKind,
        name: &str,
    ) -> Result<MetaId, DebugInfoError> {
        let (size_bits, align_bits) = self.layout_bits(pool, ty);
        let encoding = match kind {
            BasicKind::String => {
                let bytes = pool.pointer(Idx::UINT8);
                let header = pool.struct_type(vec![
                    Field::new("ptr", bytes),
                    Field::new("len", Idx::INT),
                ]);
                return self.type_descriptor(pool, header, name);
            }
            BasicKind::UnsafePointer => {
                return Ok(self.metadata.push(MetaNode::BasicType {
                    name: name.to_string(),
                    size_bits,
                    align_bits,
                    encoding: Some(Encoding::Unsigned),
                }));
            }
            _ => basic_encoding(kind.info()).ok_or_else(|| DebugInfoError::UnhandledBasicKind {
                name: kind.name().to_string(),
            })?,
        };
        Ok(self.metadata.push(MetaNode::BasicType {
            name: kind.name().to_string(),
            size_bits,
            align_bits,
            encoding: Some(encoding),
        }))
    }

    fn struct_descriptor(
        &mut self,
        pool: &mut Pool,
        ty: Idx,
        fields: &[Field],
        name: &str,
    ) -> Result<MetaId, DebugInfoError> {
        let field_types: Vec<Idx> = fields.iter().map(|f| f.ty).collect();
        let offsets = self.sizes.offsets_of(pool, &field_types);
        let mut elements = Vec::with_capacity(fields.len());
        for (field, offset) in fields.iter().zip(offsets) {
            let member_ty = self.di_type(pool, field.ty)?;
            let (size_bits, align_bits) = self.layout_bits(pool, field.ty);
            let member = self.metadata.push(MetaNode::Member {
                scope: self.compile_unit,
                name: field.name.clone(),
                ty: member_ty,
                size_bits,
                align_bits,
                offset_bits: offset * 8,
            });
            elements.push(member);
        }
        let (size_bits, align_bits) = self.layout_bits(pool, ty);
        Ok(self.metadata.push(MetaNode::StructType {
            scope: self.compile_unit,
            name: name.to_string(),
            size_bits,
            align_bits,
            elements,
        }))
    }

    fn named_descriptor(
        &mut self,
        pool: &mut Pool,
        ty: Idx,
        decl: &NamedDecl,
        underlying: Idx,
    ) -> Result<MetaId, DebugInfoError> {
        if underlying.is_none() {
            return Err(DebugInfoError::UnresolvedNamedType {
                name: pool.type_string(ty),
            });
        }

        // Uses reached while building the definition see the temporary.
        let placeholder = self.metadata.temporary();
        let mark = self.journal.len();
        self.open_named += 1;
        self.cache(ty, placeholder);

        let position = self.fset.position(decl.pos);
        let file = position
            .file
            .map(|f| self.files.file(&mut self.metadata, self.fset, f));
        let built = self.di_type(pool, underlying);
        self.open_named -= 1;
        let target = match built {
            Ok(target) => target,
            Err(e) => {
                self.abandon_placeholder(placeholder, mark);
                return Err(e);
            }
        };
        let typedef = self.metadata.push(MetaNode::Typedef {
            name: decl.name.clone(),
            ty: target,
            file,
            line: position.line,
            scope: self.compile_unit,
        });
        let uses = self.metadata.replace_all_uses_with(placeholder, typedef);
        if self.open_named == 0 {
            self.journal.clear();
        }
        trace!(name = %decl.name, uses, "named type cycle closed");
        Ok(typedef)
    }

    /// Record a descriptor for `ty`.
    fn cache(&mut self, ty: Idx, id: MetaId) {
        self.types.insert(ty, id);
        if self.open_named > 0 {
            self.journal.push(ty);
        }
    }

    /// Undo a failed named-type build.
    ///
    /// Evicts every cache entry added since `mark` whose descriptor reaches
    /// the placeholder, then resolves the placeholder to `void` so no
    /// temporary outlives the failure.
    fn abandon_placeholder(&mut self, placeholder: MetaId, mark: usize) {
        let journaled: Vec<Idx> = self.journal.drain(mark..).collect();
        for key in journaled {
            let stale = self
                .types
                .get(&key)
                .is_some_and(|&id| self.metadata.reaches(id, placeholder));
            if stale {
                self.types.remove(&key);
            } else if self.open_named > 0 {
                self.journal.push(key);
            }
        }
        let void = self.void_type();
        let uses = self.metadata.replace_all_uses_with(placeholder, void);
        trace!(?placeholder, uses, "named type abandoned");
    }

    fn signature_descriptor(
        &mut self,
        pool: &mut Pool,
        ty: Idx,
        sig: Signature,
        name: &str,
    ) -> Result<MetaId, DebugInfoError> {
        // Methods are described as functions taking the receiver first.
        if let Some(recv) = sig.recv {
            let mut params = Vec::with_capacity(sig.params.len() + 1);
            params.push(recv);
            params.extend(sig.params);
            let plain = pool.signature(
                Signature::new(params, sig.results).with_variadic(sig.variadic),
            );
            let id = self.type_descriptor(pool, plain, name)?;
            self.cache(ty, id);
            return Ok(id);
        }

        if sig.variadic {
            let last_is_slice = sig.params.last().is_some_and(|p| {
                matches!(pool.get(pool.underlying(p.ty)), Some(TypeData::Slice(_)))
            });
            if !last_is_slice {
                return Err(malformed_signature(
                    name,
                    "variadic signature must end in a slice parameter",
                ));
            }
        }

        let return_type = match sig.results.as_slice() {
            [] => self.void_type(),
            [single] => self.di_type(pool, single.ty)?,
            results => {
                // Struct field names must be unique, except for "_".
                let fields = results
                    .iter()
                    .map(|r| {
                        let name = if r.name.is_empty() { "_" } else { r.name.as_str() };
                        Field::new(name, r.ty)
                    })
                    .collect();
                let record = pool.struct_type(fields);
                self.type_descriptor(pool, record, "")?
            }
        };

        let mut parameters = Vec::with_capacity(sig.params.len() + 1);
        parameters.push(return_type);
        for Var { ty: param, .. } in &sig.params {
            parameters.push(self.di_type(pool, *param)?);
        }

        let id = self
            .metadata
            .push(MetaNode::SubroutineType { parameters });
        self.cache(ty, id);
        Ok(id)
    }

    /// Size and alignment of `ty`, in bits.
    fn layout_bits(&self, pool: &Pool, ty: Idx) -> (u64, u64) {
        (
            self.sizes.size_of(pool, ty) * 8,
            self.sizes.align_of(pool, ty) * 8,
        )
    }
}

/// DWARF encoding of a scalar basic type, if it has one.
fn basic_encoding(info: BasicInfo) -> Option<Encoding> {
    if info.contains(BasicInfo::IS_BOOLEAN) {
        Some(Encoding::Boolean)
    } else if info.contains(BasicInfo::IS_UNSIGNED) {
        Some(Encoding::Unsigned)
    } else if info.contains(BasicInfo::IS_INTEGER) {
        Some(Encoding::Signed)
    } else if info.contains(BasicInfo::IS_FLOAT) {
        Some(Encoding::Float)
    } else if info.contains(BasicInfo::IS_COMPLEX) {
        Some(Encoding::ImaginaryFloat)
    } else {
        None
    }
}
