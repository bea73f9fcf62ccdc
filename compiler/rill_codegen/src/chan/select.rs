//! Select lowering.

use tracing::debug;

use rill_types::{Idx, Pool};

use super::{recv_elem, send_elem, stage_payload, LowerError, TypedValue};
use crate::traits::{FrameMethods, RuntimeAbi};

/// One explicit case of a select.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectCase<V> {
    /// `case ch <- value:`
    Send {
        chan: TypedValue<V>,
        value: TypedValue<V>,
    },
    /// `case v, ok := <-ch:`
    Recv { chan: TypedValue<V> },
}

impl<V: Copy> SelectCase<V> {
    pub fn chan(&self) -> TypedValue<V> {
        match *self {
            Self::Send { chan, .. } | Self::Recv { chan } => chan,
        }
    }
}

/// Output storage of a receive case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecvSlot<V> {
    /// Address the runtime writes the received value to.
    pub ptr: V,
    pub elem: Idx,
}

/// Result of a lowered select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOutcome<V> {
    /// Index of the case that fired, or [`default_index`](Self::default_index).
    pub index: TypedValue<V>,
    /// Completion flag of the receive that fired; `None` without receive cases.
    ///
    /// Meaningless when the winner is a send case or the default.
    pub recv_ok: Option<TypedValue<V>>,
    /// Sentinel index of the default branch; `None` for a blocking select.
    pub default_index: Option<u32>,
    /// Per explicit case, in declaration order; `None` for send cases.
    slots: Vec<Option<RecvSlot<V>>>,
}

impl<V: Copy> SelectOutcome<V> {
    /// The output storage of receive case `case`.
    pub fn recv_slot(&self, case: usize) -> Option<RecvSlot<V>> {
        self.slots.get(case).copied().flatten()
    }

    /// Load the value received by case `case`.
    ///
    /// Only meaningful on the path where `index == case`: slots of cases
    /// that did not fire hold stale data. Returns `None` for send cases.
    pub fn load_received<B>(&self, b: &mut B, pool: &Pool, case: usize) -> Option<TypedValue<V>>
    where
        B: FrameMethods<Value = V>,
    {
        let slot = self.recv_slot(case)?;
        let ty = b.lower_type(pool, slot.elem);
        let value = b.load(ty, slot.ptr, "select.recv");
        Some(TypedValue::new(value, slot.elem))
    }
}

/// A case with its storage in place, ready to register.
enum Staged<V> {
    Send { chan: TypedValue<V>, payload: V },
    Recv { chan: TypedValue<V>, out: V, ok: V },
}

/// The shared `bool` completion slot, initialized to `false`.
fn completion_slot<B: FrameMethods>(b: &mut B, pool: &Pool) -> B::Value {
    let ty = b.lower_type(pool, Idx::BOOL);
    let slot = b.entry_alloca(ty, "select.recv.ok");
    let cleared = b.const_bool(false);
    b.store(cleared, slot);
    slot
}

/// `select { cases... }`, with an implicit `default:` unless `blocking`.
///
/// The runtime descriptor has room for every case plus the default. The
/// default branch is registered first, under the sentinel index
/// `cases.len()`; explicit cases follow in declaration order under their
/// position, since the runtime breaks ties by registration order.
///
/// # Errors
///
/// Fails before emitting anything if a case's channel is not a channel or
/// does not permit the case's direction.
#[allow(clippy::cast_possible_truncation)]
#[tracing::instrument(level = "trace", skip_all, fields(cases = cases.len(), blocking = blocking))]
pub fn select<B: FrameMethods + RuntimeAbi>(
    b: &mut B,
    pool: &Pool,
    cases: &[SelectCase<B::Value>],
    blocking: bool,
) -> Result<SelectOutcome<B::Value>, LowerError> {
    let elems = cases
        .iter()
        .map(|case| match case {
            SelectCase::Send { chan, .. } => send_elem(pool, chan.ty),
            SelectCase::Recv { chan } => recv_elem(pool, chan.ty),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let sentinel = cases.len() as u32;
    let capacity = if blocking { sentinel } else { sentinel + 1 };
    let size = b.const_u32(capacity);
    let sel = b.select_new(size);

    // Payload slots, one per case. Receives share one completion slot,
    // cleared up front so it reads `false` whichever branch wins.
    let mut slots = Vec::with_capacity(cases.len());
    let mut staged = Vec::with_capacity(cases.len());
    let mut ok_slot = None;
    for (case, &elem) in cases.iter().zip(&elems) {
        match *case {
            SelectCase::Send { chan, value } => {
                let payload = stage_payload(b, pool, value, elem, "select.send.payload");
                staged.push(Staged::Send { chan, payload });
                slots.push(None);
            }
            SelectCase::Recv { chan } => {
                let ty = b.lower_type(pool, elem);
                let out = b.entry_alloca(ty, "select.recv.slot");
                let ok = *ok_slot.get_or_insert_with(|| completion_slot(b, pool));
                staged.push(Staged::Recv { chan, out, ok });
                slots.push(Some(RecvSlot { ptr: out, elem }));
            }
        }
    }

    if !blocking {
        let index = b.const_u32(sentinel);
        b.select_default(sel, index);
    }
    for (i, case) in staged.into_iter().enumerate() {
        let index = b.const_u32(i as u32);
        match case {
            Staged::Send { chan, payload } => b.select_send(sel, chan.value, payload, index),
            Staged::Recv { chan, out, ok } => b.select_recv(sel, chan.value, out, ok, index),
        }
    }

    let index = b.select_commit(sel);
    let recv_ok = ok_slot.map(|ok| {
        let ty = b.lower_type(pool, Idx::BOOL);
        TypedValue::new(b.load(ty, ok, "select.ok"), Idx::BOOL)
    });

    debug!(
        cases = cases.len(),
        blocking,
        receives = slots.iter().flatten().count(),
        "select lowered"
    );
    Ok(SelectOutcome {
        index: TypedValue::new(index, Idx::INT32),
        recv_ok,
        default_index: (!blocking).then_some(sentinel),
        slots,
    })
}
