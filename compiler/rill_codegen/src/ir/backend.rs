//! `IrBuilder` as a lowering backend.

use rill_types::{Idx, Pool};

use super::{lower_type, IrBuilder, IrType, ValueId};
use crate::runtime::RuntimeFn;
use crate::traits::{BackendTypes, FrameMethods, RuntimeAbi};

/// Prefix of the globals holding runtime type descriptors.
pub const RUNTIME_TYPE_PREFIX: &str = "__type.";

impl IrBuilder<'_> {
    /// Call a runtime function whose result is used.
    fn runtime_value(&mut self, func: RuntimeFn, args: &[ValueId]) -> ValueId {
        match self.call_runtime(func, args) {
            Some(v) => v,
            None => {
                self.record_codegen_error(func.symbol());
                self.const_int(func.return_type(), 0)
            }
        }
    }
}

impl BackendTypes for IrBuilder<'_> {
    type Value = ValueId;
    type Type = IrType;
}

impl FrameMethods for IrBuilder<'_> {
    fn lower_type(&mut self, pool: &Pool, ty: Idx) -> IrType {
        lower_type(pool, self.sizes(), ty)
    }

    fn entry_alloca(&mut self, ty: IrType, name: &str) -> ValueId {
        IrBuilder::entry_alloca(self, ty, name)
    }

    fn store(&mut self, value: ValueId, ptr: ValueId) {
        IrBuilder::store(self, value, ptr);
    }

    fn load(&mut self, ty: IrType, ptr: ValueId, name: &str) -> ValueId {
        IrBuilder::load(self, ty, ptr, name)
    }

    fn const_u32(&mut self, value: u32) -> ValueId {
        self.const_i32(value)
    }

    fn const_bool(&mut self, value: bool) -> ValueId {
        IrBuilder::const_bool(self, value)
    }

    fn convert(&mut self, pool: &Pool, value: ValueId, from: Idx, to: Idx) -> ValueId {
        if from == to {
            return value;
        }
        let ty = lower_type(pool, self.sizes(), to);
        IrBuilder::convert(self, value, ty)
    }

    /// One global per distinct type string, created on first use.
    fn runtime_type(&mut self, pool: &Pool, ty: Idx) -> ValueId {
        let name = format!("{RUNTIME_TYPE_PREFIX}{}", pool.type_string(ty));
        self.get_or_insert_global(&name)
    }
}

impl RuntimeAbi for IrBuilder<'_> {
    fn alloc_channel(&mut self, chan_type: ValueId, size: ValueId) -> ValueId {
        self.runtime_value(RuntimeFn::ChanAlloc, &[chan_type, size])
    }

    fn chan_send(&mut self, chan_type: ValueId, chan: ValueId, payload: ValueId) {
        self.call_runtime(RuntimeFn::ChanSend, &[chan_type, chan, payload]);
    }

    fn chan_recv(&mut self, chan_type: ValueId, chan: ValueId, out: ValueId) {
        self.call_runtime(RuntimeFn::ChanRecv, &[chan_type, chan, out]);
    }

    fn chan_recv_ok(&mut self, chan_type: ValueId, chan: ValueId, out: ValueId) -> ValueId {
        self.runtime_value(RuntimeFn::ChanRecvOk, &[chan_type, chan, out])
    }

    fn chan_close(&mut self, chan: ValueId) {
        self.call_runtime(RuntimeFn::ChanClose, &[chan]);
    }

    fn select_new(&mut self, case_count: ValueId) -> ValueId {
        self.runtime_value(RuntimeFn::SelectNew, &[case_count])
    }

    fn select_default(&mut self, select: ValueId, index: ValueId) {
        self.call_runtime(RuntimeFn::SelectDefault, &[select, index]);
    }

    fn select_send(&mut self, select: ValueId, chan: ValueId, payload: ValueId, index: ValueId) {
        self.call_runtime(RuntimeFn::SelectSend, &[select, chan, payload, index]);
    }

    fn select_recv(
        &mut self,
        select: ValueId,
        chan: ValueId,
        out: ValueId,
        ok: ValueId,
        index: ValueId,
    ) {
        self.call_runtime(RuntimeFn::SelectRecv, &[select, chan, out, ok, index]);
    }

    fn select_commit(&mut self, select: ValueId) -> ValueId {
        self.runtime_value(RuntimeFn::SelectCommit, &[select])
    }
}
