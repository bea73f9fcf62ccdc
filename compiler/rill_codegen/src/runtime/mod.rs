//! Channel runtime ABI.
//!
//! Declares the extern functions of the channel runtime. They are resolved
//! at link time; lowering only ever reaches them through [`RuntimeFn`], so
//! a symbol or signature change happens in exactly one place.
//!
//! Every payload crosses the ABI by address: the caller stages the value in
//! a stack slot and passes a pointer to it, together with the runtime type
//! handle of the channel type.

use crate::ir::{IrBuilder, IrType};

/// One entry point of the channel runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuntimeFn {
    /// `(chan_type, size) -> chan`
    ChanAlloc,
    /// `(chan_type, chan, payload_ptr)`
    ChanSend,
    /// `(chan_type, chan, out_ptr)`
    ChanRecv,
    /// `(chan_type, chan, out_ptr) -> ok`
    ChanRecvOk,
    /// `(chan)`
    ChanClose,
    /// `(case_count) -> select_state`
    SelectNew,
    /// `(select_state, index)`
    SelectDefault,
    /// `(select_state, chan, payload_ptr, index)`
    SelectSend,
    /// `(select_state, chan, out_ptr, ok_ptr, index)`
    SelectRecv,
    /// `(select_state) -> winning_index`
    SelectCommit,
}

impl RuntimeFn {
    pub const ALL: [Self; 10] = [
        Self::ChanAlloc,
        Self::ChanSend,
        Self::ChanRecv,
        Self::ChanRecvOk,
        Self::ChanClose,
        Self::SelectNew,
        Self::SelectDefault,
        Self::SelectSend,
        Self::SelectRecv,
        Self::SelectCommit,
    ];

    /// Link-time symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ChanAlloc => "rill_chan_alloc",
            Self::ChanSend => "rill_chan_send",
            Self::ChanRecv => "rill_chan_recv",
            Self::ChanRecvOk => "rill_chan_recv_ok",
            Self::ChanClose => "rill_chan_close",
            Self::SelectNew => "rill_select_new",
            Self::SelectDefault => "rill_select_default",
            Self::SelectSend => "rill_select_send",
            Self::SelectRecv => "rill_select_recv",
            Self::SelectCommit => "rill_select_commit",
        }
    }

    /// Parameter types; `word` is the target's `uintptr`.
    pub fn param_types(self, word: &IrType) -> Vec<IrType> {
        let ptr = IrType::Ptr;
        match self {
            Self::ChanAlloc => vec![ptr, word.clone()],
            Self::ChanSend | Self::ChanRecv | Self::ChanRecvOk => {
                vec![ptr.clone(), ptr.clone(), ptr]
            }
            Self::ChanClose | Self::SelectCommit => vec![ptr],
            Self::SelectNew => vec![IrType::I32],
            Self::SelectDefault => vec![ptr, IrType::I32],
            Self::SelectSend => vec![ptr.clone(), ptr.clone(), ptr, IrType::I32],
            Self::SelectRecv => vec![ptr.clone(), ptr.clone(), ptr.clone(), ptr, IrType::I32],
        }
    }

    pub fn return_type(self) -> IrType {
        match self {
            Self::ChanAlloc | Self::SelectNew => IrType::Ptr,
            Self::ChanRecvOk => IrType::BOOL,
            Self::SelectCommit => IrType::I32,
            Self::ChanSend
            | Self::ChanRecv
            | Self::ChanClose
            | Self::SelectDefault
            | Self::SelectSend
            | Self::SelectRecv => IrType::Void,
        }
    }

    /// Name given to the call's result value.
    pub(crate) const fn result_name(self) -> &'static str {
        match self {
            Self::ChanAlloc => "chan",
            Self::ChanRecvOk => "recv.ok",
            Self::SelectNew => "select",
            Self::SelectCommit => "select.index",
            _ => "",
        }
    }
}

/// Declare every channel runtime function in the builder's module.
///
/// Call this once per module before lowering. Calls made through
/// [`IrBuilder::call_runtime`] declare on demand, so this is only required
/// when the module must expose the full ABI regardless of use.
pub fn declare_runtime(builder: &mut IrBuilder<'_>) {
    let word = builder.word_type();
    for func in RuntimeFn::ALL {
        builder.get_or_declare_function(func.symbol(), &func.param_types(&word), func.return_type());
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
