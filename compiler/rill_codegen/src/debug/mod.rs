//! Debug Information Generation
//!
//! Builds the DWARF/CodeView descriptor graph of one compile unit: type
//! descriptors, subprograms, lexical blocks, variables and the locations
//! attached to emitted instructions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Pool + FileSet │────▶│ DebugInfoBuilder │────▶│  DebugMetadata  │
//! │  (types, pos)   │     │  (descriptors)   │     │  (on IrModule)  │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//! ```
//!
//! # Debug Levels
//!
//! - `None`: no builder is created
//! - `LineTablesOnly`: subprograms and locations; no variables, empty
//!   subroutine types
//! - `Full`: type descriptors and variables as well
//!
//! # Usage
//!
//! ```ignore
//! let config = DebugInfoConfig::development().with_prefix_map("/home/me", "/src");
//! let mut di = DebugInfoBuilder::new(config, &fset, &sizes).expect("enabled");
//!
//! di.push_function(&mut b, &mut pool, func, sig, decl_pos)?;
//! di.set_location(&mut b, stmt_pos);
//! di.declare_variable(&mut b, &mut pool, &var, slot, None)?;
//! di.pop_function();
//!
//! module.attach_debug_info(di.finalize());
//! ```

mod builder;
mod builder_scope;
mod config;
mod files;
mod metadata;

pub use builder::DebugInfoBuilder;
pub use builder_scope::{Scope, DEBUG_INFO_VERSION};
pub use config::{DebugFormat, DebugInfoConfig, DebugInfoError, DebugLevel};
pub use files::{FileRegistry, PrefixMap};
pub use metadata::{
    DebugMetadata, Encoding, FlagBehavior, MetaId, MetaNode, MetadataArena, ModuleFlag,
    VariableKind, DW_LANG_GO,
};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
