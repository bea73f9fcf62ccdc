//! Channel lowering.
//!
//! Translates channel creation, send, receive and close into calls on the
//! injected [`RuntimeAbi`]. Payloads cross the ABI by address: every
//! operation stages its value in an entry-block slot of the current
//! function, so the storage lives as long as the function activation.
//!
//! Lowering never decides readiness, blocking or wake-up order; those are
//! the runtime's. A receive on a closed, empty channel yields the zero
//! value and a false flag because the runtime writes them, not because of
//! anything emitted here.

mod select;

pub use select::{select, RecvSlot, SelectCase, SelectOutcome};

use tracing::trace;

use rill_types::{ChanDir, Idx, Pool};

use crate::traits::{FrameMethods, RuntimeAbi};

/// A backend value together with its source type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedValue<V> {
    pub value: V,
    pub ty: Idx,
}

impl<V> TypedValue<V> {
    pub fn new(value: V, ty: Idx) -> Self {
        Self { value, ty }
    }
}

/// Result of a receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Received<V> {
    pub value: TypedValue<V>,
    /// `bool` completion flag; present only for the comma-ok form.
    pub ok: Option<TypedValue<V>>,
}

/// Error type for channel and select lowering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerError {
    #[error("`{ty}` is not a channel type")]
    NotAChannel { ty: String },
    #[error("cannot {op} on `{ty}`")]
    WrongDirection { ty: String, op: &'static str },
}

#[cold]
#[inline(never)]
fn not_a_channel(pool: &Pool, ty: Idx) -> LowerError {
    LowerError::NotAChannel {
        ty: pool.type_string(ty),
    }
}

#[cold]
#[inline(never)]
fn wrong_direction(pool: &Pool, ty: Idx, op: &'static str) -> LowerError {
    LowerError::WrongDirection {
        ty: pool.type_string(ty),
        op,
    }
}

/// Element type of a channel, checked for the direction `op` needs.
fn chan_elem(
    pool: &Pool,
    ty: Idx,
    op: &'static str,
    allowed: fn(ChanDir) -> bool,
) -> Result<Idx, LowerError> {
    let (elem, dir) = pool.chan_of(ty).ok_or_else(|| not_a_channel(pool, ty))?;
    if !allowed(dir) {
        return Err(wrong_direction(pool, ty, op));
    }
    Ok(elem)
}

pub(crate) fn send_elem(pool: &Pool, ty: Idx) -> Result<Idx, LowerError> {
    chan_elem(pool, ty, "send", ChanDir::can_send)
}

pub(crate) fn recv_elem(pool: &Pool, ty: Idx) -> Result<Idx, LowerError> {
    chan_elem(pool, ty, "receive", ChanDir::can_recv)
}

/// Stage `value` as a payload of type `elem`, returning the slot address.
pub(crate) fn stage_payload<B: FrameMethods>(
    b: &mut B,
    pool: &Pool,
    value: TypedValue<B::Value>,
    elem: Idx,
    name: &str,
) -> B::Value {
    let converted = b.convert(pool, value.value, value.ty, elem);
    let elem_ty = b.lower_type(pool, elem);
    let slot = b.entry_alloca(elem_ty, name);
    b.store(converted, slot);
    slot
}

/// `make(chan elem, capacity)`: a new bidirectional channel.
///
/// The capacity is converted to `uintptr` before the allocation call.
#[tracing::instrument(level = "trace", skip_all, fields(elem = ?elem))]
pub fn create_channel<B: FrameMethods + RuntimeAbi>(
    b: &mut B,
    pool: &mut Pool,
    elem: Idx,
    capacity: TypedValue<B::Value>,
) -> TypedValue<B::Value> {
    let ty = pool.chan(elem, ChanDir::Both);
    let size = b.convert(pool, capacity.value, capacity.ty, Idx::UINTPTR);
    let chan_type = b.runtime_type(pool, ty);
    let chan = b.alloc_channel(chan_type, size);
    TypedValue::new(chan, ty)
}

/// `ch <- value`.
///
/// # Errors
///
/// Fails if `ch` is not a channel or is receive-only.
#[tracing::instrument(level = "trace", skip_all, fields(ch = ?ch.ty))]
pub fn send<B: FrameMethods + RuntimeAbi>(
    b: &mut B,
    pool: &Pool,
    ch: TypedValue<B::Value>,
    value: TypedValue<B::Value>,
) -> Result<(), LowerError> {
    let elem = send_elem(pool, ch.ty)?;
    let payload = stage_payload(b, pool, value, elem, "chan.send.payload");
    let chan_type = b.runtime_type(pool, ch.ty);
    b.chan_send(chan_type, ch.value, payload);
    Ok(())
}

/// `<-ch`, or `v, ok := <-ch` when `comma_ok` is set.
///
/// # Errors
///
/// Fails if `ch` is not a channel or is send-only.
#[tracing::instrument(level = "trace", skip_all, fields(ch = ?ch.ty, comma_ok = comma_ok))]
pub fn receive<B: FrameMethods + RuntimeAbi>(
    b: &mut B,
    pool: &Pool,
    ch: TypedValue<B::Value>,
    comma_ok: bool,
) -> Result<Received<B::Value>, LowerError> {
    let elem = recv_elem(pool, ch.ty)?;
    let elem_ty = b.lower_type(pool, elem);
    let out = b.entry_alloca(elem_ty.clone(), "chan.recv.slot");
    let chan_type = b.runtime_type(pool, ch.ty);

    let ok = if comma_ok {
        let ok = b.chan_recv_ok(chan_type, ch.value, out);
        Some(TypedValue::new(ok, Idx::BOOL))
    } else {
        b.chan_recv(chan_type, ch.value, out);
        None
    };
    let value = b.load(elem_ty, out, "chan.recv");
    trace!(comma_ok, "receive lowered");
    Ok(Received {
        value: TypedValue::new(value, elem),
        ok,
    })
}

/// `close(ch)`.
///
/// # Errors
///
/// Fails if `ch` is not a channel or is receive-only.
#[tracing::instrument(level = "trace", skip_all, fields(ch = ?ch.ty))]
pub fn close<B: RuntimeAbi>(
    b: &mut B,
    pool: &Pool,
    ch: TypedValue<B::Value>,
) -> Result<(), LowerError> {
    chan_elem(pool, ch.ty, "close", ChanDir::can_send)?;
    b.chan_close(ch.value);
    Ok(())
}

#[cfg(test)]
mod sim;
#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
