//! Typed program interface for the rill backend.
//!
//! The type checker produces everything in this crate; the backend only
//! reads it:
//!
//! - [`Pool`] / [`Idx`]: every type of the compilation, identified by handle
//! - [`FileSet`] / [`Pos`]: source files and compact positions into them
//! - [`Sizes`]: the per-target layout model (size, alignment, field offsets)

mod data;
mod idx;
mod layout;
mod pool;
mod source;

pub use data::{
    BasicInfo, BasicKind, ChanDir, Field, Method, NamedDecl, Signature, TypeData, Var,
};
pub use idx::Idx;
pub use layout::{Sizes, StdSizes};
pub use pool::Pool;
pub use source::{FileId, FileSet, LineMap, Pos, Position};
