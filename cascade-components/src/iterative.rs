// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! A unit that works on one request at a time.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](cascade_engine::port::InPort): `rx`
//!  - One [output port](cascade_engine::port::OutPort): `tx`
//!
//! # Function
//!
//! A request accepted in cycle `t` produces a response that is valid from
//! cycle `t + max(latency, 1)` where the latency is given by the
//! [`Latency`] policy. The unit is only ready when it holds nothing, so a new
//! request is not accepted in the cycle the previous response leaves.

use std::cell::RefCell;
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::time::clock::Clock;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, exit, trace};

use crate::latency::Latency;
use crate::traits::Minion;
use crate::types::Transform;

struct InFlight<Resp> {
    response: Resp,
    ready_at: u64,
}

#[derive(EntityDisplay)]
pub struct IterativeUnit<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    pub entity: Rc<Entity>,
    clock: Clock,
    latency: Box<dyn Latency<Req>>,
    transform: Transform<Req, Resp>,
    in_flight: RefCell<Option<InFlight<Resp>>>,
    rx: InPort<Req>,
    tx: OutPort<Resp>,
}

impl<Req, Resp> IterativeUnit<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        latency: Box<dyn Latency<Req>>,
        transform: Transform<Req, Resp>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            clock: engine.default_clock(),
            latency,
            transform,
            in_flight: RefCell::new(None),
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

    /// Cycle at which the current response becomes valid.
    #[must_use]
    pub fn ready_at(&self) -> Option<u64> {
        self.in_flight.borrow().as_ref().map(|f| f.ready_at)
    }
}

impl<Req, Resp> Minion<Req, Resp> for IterativeUnit<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    fn port_rx(&self) -> PortStateResult<Req> {
        IterativeUnit::port_rx(self)
    }

    fn connect_port_tx(&self, port_state: PortStateResult<Resp>) -> SimResult {
        IterativeUnit::connect_port_tx(self, port_state)
    }
}

impl<Req, Resp> Evaluate for IterativeUnit<Req, Resp>
where
    Req: SimObject,
    Resp: SimObject,
{
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let in_flight = self.in_flight.borrow();
        self.rx.set_ready(in_flight.is_none());

        let response = in_flight
            .as_ref()
            .filter(|f| f.ready_at <= now)
            .map(|f| f.response.clone());
        self.tx.drive(response)
    }

    fn commit(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let mut in_flight = self.in_flight.borrow_mut();

        if self.tx.fired() {
            if let Some(done) = in_flight.take() {
                exit!(self.entity ; done.response.id());
            }
        }

        if self.rx.fired() {
            if let Some(request) = self.rx.peek() {
                let latency = self.latency.latency(&request).max(1);
                enter!(self.entity ; request.id());
                trace!(self.entity ; "{request} takes {latency} cycles");
                *in_flight = Some(InFlight {
                    response: (self.transform)(&request),
                    ready_at: now + latency,
                });
            }
        }
        Ok(())
    }

    fn reset(&self) {
        *self.in_flight.borrow_mut() = None;
    }

    fn is_idle(&self) -> bool {
        self.in_flight.borrow().is_none()
    }
}
