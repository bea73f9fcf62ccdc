//! In-memory runtime that executes lowering eagerly.
//!
//! Every frame primitive and runtime call runs the moment it is emitted:
//! slots are memory cells, channels are bounded queues, and select commits
//! by scanning registrations in order. There are no other goroutines, so
//! an operation that would block panics instead.

use std::collections::VecDeque;

use rill_types::{Idx, Pool};

use crate::traits::{BackendTypes, FrameMethods, RuntimeAbi};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimValue(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Data {
    Int(u64),
    Bool(bool),
    /// Address of a memory cell.
    Ptr(usize),
    Chan(usize),
    /// Runtime type handle; `elem` is set for channel types.
    Type { name: String, elem: Option<Idx> },
    Select(usize),
}

#[derive(Debug)]
struct SimChan {
    buf: VecDeque<Data>,
    cap: usize,
    closed: bool,
    zero: Data,
}

#[derive(Debug)]
enum Registration {
    Default { index: u64 },
    Send { chan: usize, payload: usize, index: u64 },
    Recv { chan: usize, out: usize, ok: usize, index: u64 },
}

#[derive(Debug)]
struct SimSelect {
    capacity: u64,
    registrations: Vec<Registration>,
}

#[derive(Debug, Default)]
pub struct SimRuntime {
    values: Vec<Data>,
    memory: Vec<Option<Data>>,
    chans: Vec<SimChan>,
    selects: Vec<SimSelect>,
    calls: Vec<String>,
}

fn zero_value(elem: Idx) -> Data {
    if elem == Idx::BOOL {
        Data::Bool(false)
    } else {
        Data::Int(0)
    }
}

impl SimRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: Data) -> SimValue {
        self.values.push(data);
        SimValue(self.values.len() - 1)
    }

    pub fn int(&mut self, v: u64) -> SimValue {
        self.push(Data::Int(v))
    }

    pub fn data(&self, v: SimValue) -> &Data {
        &self.values[v.0]
    }

    /// Runtime calls, in execution order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Number of stack slots allocated so far.
    pub fn slot_count(&self) -> usize {
        self.memory.len()
    }

    /// Buffered element count of a channel.
    pub fn buffered(&self, ch: SimValue) -> usize {
        self.chans[self.chan(ch)].buf.len()
    }

    fn cell(&self, v: SimValue) -> usize {
        match self.data(v) {
            Data::Ptr(cell) => *cell,
            other => panic!("expected pointer, got {other:?}"),
        }
    }

    fn chan(&self, v: SimValue) -> usize {
        match self.data(v) {
            Data::Chan(c) => *c,
            other => panic!("expected channel, got {other:?}"),
        }
    }

    fn select_state(&self, v: SimValue) -> usize {
        match self.data(v) {
            Data::Select(s) => *s,
            other => panic!("expected select state, got {other:?}"),
        }
    }

    fn int_of(&self, v: SimValue) -> u64 {
        match self.data(v) {
            Data::Int(n) => *n,
            other => panic!("expected integer, got {other:?}"),
        }
    }

    fn read(&self, cell: usize) -> Data {
        self.memory[cell]
            .clone()
            .unwrap_or_else(|| panic!("read of uninitialized slot {cell}"))
    }

    fn register(&mut self, sel: SimValue, reg: Registration) {
        let s = self.select_state(sel);
        let state = &mut self.selects[s];
        assert!(
            (state.registrations.len() as u64) < state.capacity,
            "select registrations exceed capacity {}",
            state.capacity
        );
        state.registrations.push(reg);
    }

    /// Whether a registration can proceed without blocking.
    fn ready(&self, reg: &Registration) -> bool {
        match *reg {
            Registration::Default { .. } => false,
            Registration::Send { chan, .. } => {
                let c = &self.chans[chan];
                !c.closed && c.buf.len() < c.cap
            }
            Registration::Recv { chan, .. } => {
                let c = &self.chans[chan];
                !c.buf.is_empty() || c.closed
            }
        }
    }

    /// Pop a value, or the zero value if closed and drained.
    fn take(&mut self, chan: usize) -> (Data, bool) {
        let c = &mut self.chans[chan];
        match c.buf.pop_front() {
            Some(v) => (v, true),
            None if c.closed => (c.zero.clone(), false),
            None => panic!("receive on empty channel would block forever"),
        }
    }

    fn put(&mut self, chan: usize, payload: usize) {
        let value = self.read(payload);
        let c = &mut self.chans[chan];
        assert!(!c.closed, "send on closed channel");
        assert!(c.buf.len() < c.cap, "send on full channel would block forever");
        c.buf.push_back(value);
    }
}

impl BackendTypes for SimRuntime {
    type Value = SimValue;
    type Type = Idx;
}

impl FrameMethods for SimRuntime {
    fn lower_type(&mut self, _pool: &Pool, ty: Idx) -> Idx {
        ty
    }

    fn entry_alloca(&mut self, _ty: Idx, _name: &str) -> SimValue {
        self.memory.push(None);
        let cell = self.memory.len() - 1;
        self.push(Data::Ptr(cell))
    }

    fn store(&mut self, value: SimValue, ptr: SimValue) {
        let cell = self.cell(ptr);
        self.memory[cell] = Some(self.data(value).clone());
    }

    fn load(&mut self, _ty: Idx, ptr: SimValue, _name: &str) -> SimValue {
        let data = self.read(self.cell(ptr));
        self.push(data)
    }

    fn const_u32(&mut self, value: u32) -> SimValue {
        self.int(u64::from(value))
    }

    fn const_bool(&mut self, value: bool) -> SimValue {
        self.push(Data::Bool(value))
    }

    fn convert(&mut self, _pool: &Pool, value: SimValue, _from: Idx, _to: Idx) -> SimValue {
        value
    }

    fn runtime_type(&mut self, pool: &Pool, ty: Idx) -> SimValue {
        self.push(Data::Type {
            name: pool.type_string(ty),
            elem: pool.chan_of(ty).map(|(elem, _)| elem),
        })
    }
}

impl RuntimeAbi for SimRuntime {
    fn alloc_channel(&mut self, chan_type: SimValue, size: SimValue) -> SimValue {
        let elem = match self.data(chan_type) {
            Data::Type { elem: Some(elem), .. } => *elem,
            other => panic!("expected channel type handle, got {other:?}"),
        };
        let cap = self.int_of(size) as usize;
        self.calls.push(format!("alloc_channel({cap})"));
        self.chans.push(SimChan {
            buf: VecDeque::new(),
            cap,
            closed: false,
            zero: zero_value(elem),
        });
        self.push(Data::Chan(self.chans.len() - 1))
    }

    fn chan_send(&mut self, _chan_type: SimValue, chan: SimValue, payload: SimValue) {
        self.calls.push("send".to_string());
        let (c, p) = (self.chan(chan), self.cell(payload));
        self.put(c, p);
    }

    fn chan_recv(&mut self, _chan_type: SimValue, chan: SimValue, out: SimValue) {
        self.calls.push("recv".to_string());
        let (c, out) = (self.chan(chan), self.cell(out));
        let (value, _) = self.take(c);
        self.memory[out] = Some(value);
    }

    fn chan_recv_ok(&mut self, _chan_type: SimValue, chan: SimValue, out: SimValue) -> SimValue {
        self.calls.push("recv_ok".to_string());
        let (c, out) = (self.chan(chan), self.cell(out));
        let (value, ok) = self.take(c);
        self.memory[out] = Some(value);
        self.push(Data::Bool(ok))
    }

    fn chan_close(&mut self, chan: SimValue) {
        self.calls.push("close".to_string());
        let c = self.chan(chan);
        assert!(!self.chans[c].closed, "close of closed channel");
        self.chans[c].closed = true;
    }

    fn select_new(&mut self, case_count: SimValue) -> SimValue {
        let capacity = self.int_of(case_count);
        self.calls.push(format!("select_new({capacity})"));
        self.selects.push(SimSelect {
            capacity,
            registrations: Vec::new(),
        });
        self.push(Data::Select(self.selects.len() - 1))
    }

    fn select_default(&mut self, select: SimValue, index: SimValue) {
        let index = self.int_of(index);
        self.calls.push(format!("select_default({index})"));
        self.register(select, Registration::Default { index });
    }

    fn select_send(&mut self, select: SimValue, chan: SimValue, payload: SimValue, index: SimValue) {
        let index = self.int_of(index);
        self.calls.push(format!("select_send({index})"));
        let reg = Registration::Send {
            chan: self.chan(chan),
            payload: self.cell(payload),
            index,
        };
        self.register(select, reg);
    }

    fn select_recv(
        &mut self,
        select: SimValue,
        chan: SimValue,
        out: SimValue,
        ok: SimValue,
        index: SimValue,
    ) {
        let index = self.int_of(index);
        self.calls.push(format!("select_recv({index})"));
        let reg = Registration::Recv {
            chan: self.chan(chan),
            out: self.cell(out),
            ok: self.cell(ok),
            index,
        };
        self.register(select, reg);
    }

    fn select_commit(&mut self, select: SimValue) -> SimValue {
        self.calls.push("select_commit".to_string());
        let s = self.select_state(select);
        let registrations = std::mem::take(&mut self.selects[s].registrations);

        let winner = registrations.iter().find(|r| self.ready(r));
        let index = match winner {
            Some(&Registration::Send { chan, payload, index }) => {
                self.put(chan, payload);
                index
            }
            Some(&Registration::Recv { chan, out, ok, index }) => {
                let (value, received) = self.take(chan);
                self.memory[out] = Some(value);
                self.memory[ok] = Some(Data::Bool(received));
                index
            }
            Some(Registration::Default { .. }) | None => registrations
                .iter()
                .find_map(|r| match *r {
                    Registration::Default { index } => Some(index),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("blocking select with no ready case would block forever")),
        };
        self.push(Data::Int(index))
    }
}
