// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Functional accumulator.
//!
//! Configuration requests are answered in the cycle they arrive. A go
//! request is accepted and then blocks the processor until the whole array
//! has been summed: its acknowledgement is only sent once the last element
//! has been added.
//!
//! The memory loop issues the read for the next element in the same cycle
//! as the previous response arrives, so one read is outstanding at a time
//! with no idle cycles between them.

use std::cell::Cell;
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::traits::Evaluate;
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{debug, trace};

use crate::accum_xcel::{Accelerator, Command, XcelRegs, XcelState, element_read, is_last};
use crate::msg::{MemReq, MemResp, XcelReq, XcelResp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Config,
    /// Offering the read of the current element.
    Issue,
    /// Waiting for the current element.
    Wait,
    /// Sending the deferred go acknowledgement.
    Ack,
}

#[derive(EntityDisplay)]
pub struct AccumXcelFl {
    pub entity: Rc<Entity>,
    phase: Cell<Phase>,
    regs: Cell<XcelRegs>,
    xcel_rx: InPort<XcelReq>,
    xcel_tx: OutPort<XcelResp>,
    mem_rx: InPort<MemResp<u32>>,
    mem_tx: OutPort<MemReq<u32>>,
}

impl AccumXcelFl {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rc_self = Rc::new(Self {
            xcel_rx: InPort::new(engine, &entity, "xcel_rx"),
            xcel_tx: OutPort::new(&entity, "xcel_tx"),
            mem_rx: InPort::new(engine, &entity, "mem_rx"),
            mem_tx: OutPort::new(&entity, "mem_tx"),
            entity,
            phase: Cell::new(Phase::Config),
            regs: Cell::new(XcelRegs::default()),
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    fn drive_xcel(&self, regs: &XcelRegs) -> SimResult {
        match self.phase.get() {
            Phase::Config => {
                let command = self
                    .xcel_rx
                    .peek()
                    .map(|r| Command::decode(&r))
                    .transpose()?;
                match command {
                    Some(Command::Go) if regs.size > 0 => {
                        self.xcel_tx.drive(None)?;
                        self.xcel_rx.set_ready(true);
                    }
                    command => {
                        self.xcel_tx
                            .drive(command.map(|c| c.response(regs.acc)))?;
                        self.xcel_rx.set_ready(self.xcel_tx.ready());
                    }
                }
            }
            Phase::Ack => {
                self.xcel_tx.drive(Some(XcelResp::write()))?;
                self.xcel_rx.set_ready(false);
            }
            Phase::Issue | Phase::Wait => {
                self.xcel_tx.drive(None)?;
                self.xcel_rx.set_ready(false);
            }
        }
        Ok(())
    }

    fn drive_mem(&self, regs: &XcelRegs) -> SimResult {
        let request = match self.phase.get() {
            Phase::Issue => Some(element_read(regs.base, regs.idx)),
            Phase::Wait if self.mem_rx.valid() && !is_last(regs.idx, regs.size) => {
                Some(element_read(regs.base, regs.idx + 1))
            }
            Phase::Config | Phase::Wait | Phase::Ack => None,
        };
        self.mem_tx.drive(request)?;
        self.mem_rx.set_ready(self.phase.get() == Phase::Wait);
        Ok(())
    }

    fn configure(&self, command: Command, regs: &mut XcelRegs) -> Phase {
        match command {
            Command::SetBase(base) => regs.base = base,
            Command::SetSize(size) => regs.size = size,
            Command::Go => {
                debug!(self.entity ; "go: {} elements from {:#x}", regs.size, regs.base);
                regs.acc = 0;
                regs.idx = 0;
                if regs.size > 0 {
                    return Phase::Issue;
                }
            }
            Command::ReadResult => {}
        }
        Phase::Config
    }

    fn accumulate(&self, data: u32, regs: &mut XcelRegs) -> Phase {
        regs.acc = regs.acc.wrapping_add(data);
        if is_last(regs.idx, regs.size) {
            debug!(self.entity ; "done: {}", regs.acc);
            regs.idx = 0;
            Phase::Ack
        } else {
            regs.idx += 1;
            if self.mem_tx.fired() {
                Phase::Wait
            } else {
                Phase::Issue
            }
        }
    }
}

impl Accelerator for AccumXcelFl {
    fn port_xcel_rx(&self) -> PortStateResult<XcelReq> {
        self.xcel_rx.state()
    }

    fn connect_port_xcel_tx(&self, port_state: PortStateResult<XcelResp>) -> SimResult {
        self.xcel_tx.connect(port_state)
    }

    fn port_mem_rx(&self) -> PortStateResult<MemResp<u32>> {
        self.mem_rx.state()
    }

    fn connect_port_mem_tx(&self, port_state: PortStateResult<MemReq<u32>>) -> SimResult {
        self.mem_tx.connect(port_state)
    }

    fn state(&self) -> XcelState {
        match self.phase.get() {
            Phase::Config | Phase::Ack => XcelState::Config,
            Phase::Issue => XcelState::MemRead,
            Phase::Wait => XcelState::Compute,
        }
    }

    fn regs(&self) -> XcelRegs {
        self.regs.get()
    }
}

impl Evaluate for AccumXcelFl {
    fn settle(&self) -> SimResult {
        let regs = self.regs.get();
        self.drive_xcel(&regs)?;
        self.drive_mem(&regs)
    }

    fn commit(&self) -> SimResult {
        let mut regs = self.regs.get();
        let phase = self.phase.get();
        let next = match phase {
            Phase::Config => match self.xcel_rx.peek() {
                Some(request) if self.xcel_rx.fired() => {
                    self.configure(Command::decode(&request)?, &mut regs)
                }
                _ => Phase::Config,
            },
            Phase::Issue if self.mem_tx.fired() => Phase::Wait,
            Phase::Issue => Phase::Issue,
            Phase::Wait => match self.mem_rx.peek() {
                Some(response) if self.mem_rx.fired() => {
                    self.accumulate(response.data, &mut regs)
                }
                _ => Phase::Wait,
            },
            Phase::Ack if self.xcel_tx.fired() => Phase::Config,
            Phase::Ack => Phase::Ack,
        };
        if phase != next {
            trace!(self.entity ; "{phase:?} -> {next:?}");
        }
        self.regs.set(regs);
        self.phase.set(next);
        Ok(())
    }

    fn reset(&self) {
        self.phase.set(Phase::Config);
        self.regs.set(XcelRegs::default());
    }

    fn is_idle(&self) -> bool {
        self.phase.get() == Phase::Config
    }
}
