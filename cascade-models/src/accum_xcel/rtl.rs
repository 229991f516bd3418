// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Register-transfer level accumulator.
//!
//! All state is held in [`Reg`]s, including the one-entry pipe queues on the
//! request and memory response inputs. The settle phase evaluates the output
//! logic, the state transition logic and the datapath from the current
//! register values and the handshakes of this cycle. The commit phase only
//! clocks the registers.

use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::register::Reg;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::{EntityDisplay, Registers};
use cascade_track::entity::Entity;
use cascade_track::trace;

use crate::accum_xcel::{Accelerator, Command, XcelRegs, XcelState, element_read, is_last};
use crate::msg::{MemReq, MemResp, XcelReq, XcelResp};

/// One-entry pipe queue held in a register.
///
/// A message is visible at [`PipeReg::head`] the cycle after it arrives. A
/// full queue accepts a new message when the head leaves in the same cycle.
struct PipeReg<T>
where
    T: SimObject + Copy,
{
    rx: InPort<T>,
    entry: Reg<Option<T>>,
}

impl<T> PipeReg<T>
where
    T: SimObject + Copy,
{
    fn new(engine: &Engine, parent: &Rc<Entity>, name: &str) -> Self {
        Self {
            rx: InPort::new(engine, parent, name),
            entry: Reg::new(None),
        }
    }

    fn head(&self) -> Option<T> {
        self.entry.out()
    }

    /// Drive `rx` ready and compute the next entry. `deq` is set when the
    /// head is consumed this cycle.
    fn update(&self, deq: bool) {
        let head = self.entry.out();
        let deq = deq && head.is_some();
        self.rx.set_ready(head.is_none() || deq);

        let next = if self.rx.fired() {
            self.rx.peek()
        } else if deq {
            None
        } else {
            head
        };
        self.entry.set_next(next);
    }

    fn latch(&self) {
        self.entry.latch();
    }

    fn reset(&self) {
        self.entry.reset();
    }
}

#[derive(EntityDisplay, Registers)]
pub struct AccumXcelRtl {
    pub entity: Rc<Entity>,

    #[register]
    state: Reg<XcelState>,
    #[register]
    base: Reg<u32>,
    #[register]
    size: Reg<u32>,
    #[register]
    idx: Reg<u32>,
    #[register]
    acc: Reg<u32>,

    #[register]
    xcelreq_q: PipeReg<XcelReq>,
    #[register]
    memresp_q: PipeReg<MemResp<u32>>,
    xcel_tx: OutPort<XcelResp>,
    mem_tx: OutPort<MemReq<u32>>,
}

impl AccumXcelRtl {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));

        let rc_self = Rc::new(Self {
            xcel_tx: OutPort::new(&entity, "xcel_tx"),
            mem_tx: OutPort::new(&entity, "mem_tx"),
            state: Reg::new(XcelState::Config),
            base: Reg::new(0),
            size: Reg::new(0),
            idx: Reg::new(0),
            acc: Reg::new(0),
            xcelreq_q: PipeReg::new(engine, &entity, "xcel_rx"),
            memresp_q: PipeReg::new(engine, &entity, "mem_rx"),
            entity,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    /// The configuration command consumed this cycle.
    fn accepted_command(&self) -> Result<Option<Command>, SimError> {
        match self.xcelreq_q.head() {
            Some(request) if self.state.out() == XcelState::Config && self.xcel_tx.ready() => {
                Command::decode(&request).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// The memory response consumed this cycle.
    fn accepted_data(&self) -> Option<u32> {
        match self.state.out() {
            XcelState::Compute => self.memresp_q.head().map(|r| r.data),
            XcelState::Config | XcelState::MemRead => None,
        }
    }

    fn output_logic(&self) -> SimResult {
        let state = self.state.out();

        let response = match (state, self.xcelreq_q.head()) {
            (XcelState::Config, Some(request)) => {
                Some(Command::decode(&request)?.response(self.acc.out()))
            }
            _ => None,
        };
        self.xcel_tx.drive(response)?;

        let mem_request = match state {
            XcelState::MemRead => Some(element_read(self.base.out(), self.idx.out())),
            XcelState::Config | XcelState::Compute => None,
        };
        self.mem_tx.drive(mem_request)
    }

    fn transition_logic(&self, command: Option<Command>, data: Option<u32>) {
        let last = is_last(self.idx.out(), self.size.out());
        let next = match self.state.out() {
            XcelState::Config => match command {
                Some(Command::Go) if self.size.out() > 0 => XcelState::MemRead,
                _ => XcelState::Config,
            },
            XcelState::MemRead if self.mem_tx.fired() => XcelState::Compute,
            XcelState::MemRead => XcelState::MemRead,
            XcelState::Compute => match data {
                Some(_) if last => XcelState::Config,
                Some(_) => XcelState::MemRead,
                None => XcelState::Compute,
            },
        };
        self.state.set_next(next);
    }

    fn datapath(&self, command: Option<Command>, data: Option<u32>) {
        let last = is_last(self.idx.out(), self.size.out());

        self.base.set_next(match command {
            Some(Command::SetBase(base)) => base,
            _ => self.base.out(),
        });
        self.size.set_next(match command {
            Some(Command::SetSize(size)) => size,
            _ => self.size.out(),
        });
        self.idx.set_next(match (command, data) {
            (Some(Command::Go), _) => 0,
            (_, Some(_)) if last => 0,
            (_, Some(_)) => self.idx.out() + 1,
            _ => self.idx.out(),
        });
        self.acc.set_next(match (command, data) {
            (Some(Command::Go), _) => 0,
            (_, Some(value)) => self.acc.out().wrapping_add(value),
            _ => self.acc.out(),
        });
    }
}

impl Accelerator for AccumXcelRtl {
    fn port_xcel_rx(&self) -> PortStateResult<XcelReq> {
        self.xcelreq_q.rx.state()
    }

    fn connect_port_xcel_tx(&self, port_state: PortStateResult<XcelResp>) -> SimResult {
        self.xcel_tx.connect(port_state)
    }

    fn port_mem_rx(&self) -> PortStateResult<MemResp<u32>> {
        self.memresp_q.rx.state()
    }

    fn connect_port_mem_tx(&self, port_state: PortStateResult<MemReq<u32>>) -> SimResult {
        self.mem_tx.connect(port_state)
    }

    fn state(&self) -> XcelState {
        self.state.out()
    }

    fn regs(&self) -> XcelRegs {
        XcelRegs {
            base: self.base.out(),
            size: self.size.out(),
            idx: self.idx.out(),
            acc: self.acc.out(),
        }
    }
}

impl Evaluate for AccumXcelRtl {
    fn settle(&self) -> SimResult {
        self.output_logic()?;
        let command = self.accepted_command()?;
        let data = self.accepted_data();
        self.xcelreq_q.update(command.is_some());
        self.memresp_q.update(data.is_some());
        self.transition_logic(command, data);
        self.datapath(command, data);
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let (state, next) = (self.state.out(), self.state.next());
        if state != next {
            trace!(self.entity ; "{state} -> {next}");
        }
        self.latch_registers();
        Ok(())
    }

    fn reset(&self) {
        self.reset_registers();
    }

    fn is_idle(&self) -> bool {
        self.state.out() == XcelState::Config
            && self.xcelreq_q.head().is_none()
            && self.memresp_q.head().is_none()
    }
}
