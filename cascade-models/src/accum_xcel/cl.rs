// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Cycle-level accumulator.
//!
//! Requests from the processor and responses from memory each pass through
//! a one-entry pipe [`Queue`] before reaching the state machine. A go
//! request is acknowledged in the cycle it is accepted.

use std::cell::Cell;
use std::rc::Rc;

use cascade_components::queue::{Queue, QueueKind};
use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::traits::Evaluate;
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{debug, trace};

use crate::accum_xcel::{Accelerator, Command, XcelRegs, XcelState, element_read, is_last};
use crate::msg::{MemReq, MemResp, XcelReq, XcelResp};

/// Entries in each of the input queues.
const INPUT_QUEUE_CAPACITY: usize = 1;

#[derive(EntityDisplay)]
pub struct AccumXcelCl {
    pub entity: Rc<Entity>,
    state: Cell<XcelState>,
    regs: Cell<XcelRegs>,
    xcelreq_q: Rc<Queue<XcelReq>>,
    memresp_q: Rc<Queue<MemResp<u32>>>,
    xcelreq: InPort<XcelReq>,
    memresp: InPort<MemResp<u32>>,
    xcel_tx: OutPort<XcelResp>,
    mem_tx: OutPort<MemReq<u32>>,
}

impl AccumXcelCl {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));

        let xcelreq_q = Queue::new_and_register(
            engine,
            &entity,
            "xcelreq_q",
            QueueKind::Pipe,
            INPUT_QUEUE_CAPACITY,
        )?;
        let memresp_q = Queue::new_and_register(
            engine,
            &entity,
            "memresp_q",
            QueueKind::Pipe,
            INPUT_QUEUE_CAPACITY,
        )?;

        let xcelreq = InPort::new(engine, &entity, "xcelreq");
        let memresp = InPort::new(engine, &entity, "memresp");
        xcelreq_q.connect_port_tx(xcelreq.state())?;
        memresp_q.connect_port_tx(memresp.state())?;

        let xcel_tx = OutPort::new(&entity, "xcel_tx");
        let mem_tx = OutPort::new(&entity, "mem_tx");

        let rc_self = Rc::new(Self {
            entity,
            state: Cell::new(XcelState::Config),
            regs: Cell::new(XcelRegs::default()),
            xcelreq_q,
            memresp_q,
            xcelreq,
            memresp,
            xcel_tx,
            mem_tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    fn set_state(&self, next: XcelState) {
        let state = self.state.get();
        if state != next {
            trace!(self.entity ; "{state} -> {next}");
            self.state.set(next);
        }
    }

    fn configure(&self, command: Command) -> XcelState {
        let mut regs = self.regs.get();
        let next = match command {
            Command::SetBase(base) => {
                regs.base = base;
                XcelState::Config
            }
            Command::SetSize(size) => {
                regs.size = size;
                XcelState::Config
            }
            Command::Go => {
                debug!(self.entity ; "go: {} elements from {:#x}", regs.size, regs.base);
                regs.acc = 0;
                regs.idx = 0;
                if regs.size == 0 {
                    XcelState::Config
                } else {
                    XcelState::MemRead
                }
            }
            Command::ReadResult => XcelState::Config,
        };
        self.regs.set(regs);
        next
    }

    fn accumulate(&self, response: &MemResp<u32>) -> XcelState {
        let mut regs = self.regs.get();
        regs.acc = regs.acc.wrapping_add(response.data);
        let next = if is_last(regs.idx, regs.size) {
            debug!(self.entity ; "done: {}", regs.acc);
            regs.idx = 0;
            XcelState::Config
        } else {
            regs.idx += 1;
            XcelState::MemRead
        };
        self.regs.set(regs);
        next
    }
}

impl Accelerator for AccumXcelCl {
    fn port_xcel_rx(&self) -> PortStateResult<XcelReq> {
        self.xcelreq_q.port_rx()
    }

    fn connect_port_xcel_tx(&self, port_state: PortStateResult<XcelResp>) -> SimResult {
        self.xcel_tx.connect(port_state)
    }

    fn port_mem_rx(&self) -> PortStateResult<MemResp<u32>> {
        self.memresp_q.port_rx()
    }

    fn connect_port_mem_tx(&self, port_state: PortStateResult<MemReq<u32>>) -> SimResult {
        self.mem_tx.connect(port_state)
    }

    fn state(&self) -> XcelState {
        self.state.get()
    }

    fn regs(&self) -> XcelRegs {
        self.regs.get()
    }
}

impl Evaluate for AccumXcelCl {
    fn settle(&self) -> SimResult {
        let regs = self.regs.get();
        let state = self.state.get();

        let response = match (state, self.xcelreq.peek()) {
            (XcelState::Config, Some(request)) => {
                Some(Command::decode(&request)?.response(regs.acc))
            }
            _ => None,
        };
        self.xcel_tx.drive(response)?;
        self.xcelreq
            .set_ready(state == XcelState::Config && self.xcel_tx.ready());

        let mem_request = (state == XcelState::MemRead).then(|| element_read(regs.base, regs.idx));
        self.mem_tx.drive(mem_request)?;
        self.memresp.set_ready(state == XcelState::Compute);
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let next = match self.state.get() {
            XcelState::Config => match self.xcelreq.peek() {
                Some(request) if self.xcelreq.fired() => {
                    self.configure(Command::decode(&request)?)
                }
                _ => XcelState::Config,
            },
            XcelState::MemRead if self.mem_tx.fired() => XcelState::Compute,
            XcelState::MemRead => XcelState::MemRead,
            XcelState::Compute => match self.memresp.peek() {
                Some(response) if self.memresp.fired() => self.accumulate(&response),
                _ => XcelState::Compute,
            },
        };
        self.set_state(next);
        Ok(())
    }

    fn reset(&self) {
        self.state.set(XcelState::Config);
        self.regs.set(XcelRegs::default());
    }

    fn is_idle(&self) -> bool {
        self.state.get() == XcelState::Config
    }
}
