// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! An N-stage pipeline.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](cascade_engine::port::InPort): `rx`
//!  - One [output port](cascade_engine::port::OutPort): `tx`
//!
//! # Function
//!
//! Each request accepted in cycle `t` produces a response that is valid from
//! cycle `t + depth`. Up to `depth` requests can be in flight and responses
//! leave in the order the requests arrived. A full pipeline still accepts a
//! request in a cycle where its oldest response leaves.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::time::clock::Clock;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, exit, value};

use crate::traits::Minion;
use crate::types::Transform;

#[derive(EntityDisplay)]
pub struct Pipeline<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    pub entity: Rc<Entity>,
    clock: Clock,
    depth: usize,
    transform: Transform<Req, Resp>,
    stages: RefCell<VecDeque<(Resp, u64)>>,
    rx: InPort<Req>,
    tx: OutPort<Resp>,
}

impl<Req, Resp> Pipeline<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        depth: usize,
        transform: Transform<Req, Resp>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        if depth == 0 {
            return sim_error!(format!("{entity}: pipeline depth must be at least 1"));
        }
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            clock: engine.default_clock(),
            depth,
            transform,
            stages: RefCell::new(VecDeque::with_capacity(depth)),
            rx,
            tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx(&self) -> PortStateResult<Req> {
        self.rx.state()
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<Resp>) -> SimResult {
        self.tx.connect(port_state)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn num_in_flight(&self) -> usize {
        self.stages.borrow().len()
    }
}

impl<Req, Resp> Minion<Req, Resp> for Pipeline<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    fn port_rx(&self) -> PortStateResult<Req> {
        Pipeline::port_rx(self)
    }

    fn connect_port_tx(&self, port_state: PortStateResult<Resp>) -> SimResult {
        Pipeline::connect_port_tx(self, port_state)
    }
}

impl<Req, Resp> Evaluate for Pipeline<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let stages = self.stages.borrow();

        let head = stages
            .front()
            .filter(|(_, ready_at)| *ready_at <= now)
            .map(|(response, _)| response.clone());
        let head_valid = head.is_some();
        self.tx.drive(head)?;

        let ready = stages.len() < self.depth || (head_valid && self.tx.ready());
        self.rx.set_ready(ready);
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let mut stages = self.stages.borrow_mut();

        if self.tx.fired() {
            if let Some((response, _)) = stages.pop_front() {
                exit!(self.entity ; response.id());
            }
        }
        if self.rx.fired() {
            if let Some(request) = self.rx.peek() {
                enter!(self.entity ; request.id());
                stages.push_back(((self.transform)(&request), now + self.depth as u64));
            }
        }
        value!(self.entity ; stages.len());
        Ok(())
    }

    fn reset(&self) {
        self.stages.borrow_mut().clear();
    }

    fn is_idle(&self) -> bool {
        self.stages.borrow().is_empty()
    }
}
