//! Backend traits for channel lowering.
//!
//! Follows the `rustc_codegen_ssa/src/traits/` pattern: lowering is written
//! once against these traits and runs on any backend that implements them.
//!
//! Trait hierarchy:
//! - `BackendTypes`: associated value and type handles
//! - `FrameMethods`: the frame/builder primitives lowering needs
//! - `RuntimeAbi`: the channel runtime entry points

use rill_types::{Idx, Pool};

/// Associated types for a codegen backend.
pub trait BackendTypes {
    /// An SSA value (or anything the backend uses to name one).
    type Value: Copy;
    /// A backend type.
    type Type: Clone;
}

/// Frame primitives.
pub trait FrameMethods: BackendTypes {
    /// The backend type of a source type.
    fn lower_type(&mut self, pool: &Pool, ty: Idx) -> Self::Type;

    /// Function-scope stack slot, placed in the entry block.
    fn entry_alloca(&mut self, ty: Self::Type, name: &str) -> Self::Value;

    fn store(&mut self, value: Self::Value, ptr: Self::Value);

    fn load(&mut self, ty: Self::Type, ptr: Self::Value, name: &str) -> Self::Value;

    /// 32-bit unsigned constant.
    fn const_u32(&mut self, value: u32) -> Self::Value;

    /// `bool` constant.
    fn const_bool(&mut self, value: bool) -> Self::Value;

    /// Convert `value` from source type `from` to source type `to`.
    fn convert(&mut self, pool: &Pool, value: Self::Value, from: Idx, to: Idx) -> Self::Value;

    /// Runtime type handle for a source type.
    fn runtime_type(&mut self, pool: &Pool, ty: Idx) -> Self::Value;
}

/// The injected channel runtime.
///
/// Payload arguments are addresses of staged values; `chan_type` is the
/// runtime type handle of the channel type. Indices are 32-bit.
pub trait RuntimeAbi: BackendTypes {
    fn alloc_channel(&mut self, chan_type: Self::Value, size: Self::Value) -> Self::Value;

    fn chan_send(&mut self, chan_type: Self::Value, chan: Self::Value, payload: Self::Value);

    fn chan_recv(&mut self, chan_type: Self::Value, chan: Self::Value, out: Self::Value);

    /// Receive, reporting whether the value came from a send.
    fn chan_recv_ok(
        &mut self,
        chan_type: Self::Value,
        chan: Self::Value,
        out: Self::Value,
    ) -> Self::Value;

    fn chan_close(&mut self, chan: Self::Value);

    fn select_new(&mut self, case_count: Self::Value) -> Self::Value;

    fn select_default(&mut self, select: Self::Value, index: Self::Value);

    fn select_send(
        &mut self,
        select: Self::Value,
        chan: Self::Value,
        payload: Self::Value,
        index: Self::Value,
    );

    fn select_recv(
        &mut self,
        select: Self::Value,
        chan: Self::Value,
        out: Self::Value,
        ok: Self::Value,
        index: Self::Value,
    );

    /// Block (or not) until one registration fires; returns its index.
    fn select_commit(&mut self, select: Self::Value) -> Self::Value;
}
