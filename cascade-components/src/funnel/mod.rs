// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Merge a number of request streams onto one output.
//!
//! # Ports
//!
//! This component has `N`-input ports and one output:
//!  - N [input ports](cascade_engine::port::InPort): `rx_i` for `i in [0, N-1]`
//!  - One [output port](cascade_engine::port::OutPort): `tx`
//!
//! # Function
//!
//! Each cycle the [`Arbitrate`] policy picks one of the valid inputs. Only
//! that input sees `ready`, and only when the output is ready, so at most one
//! message passes per cycle. The index of the input is recorded in the
//! message using [`Routable::set_port`] so that a
//! [`Router`](crate::router::Router) can return the response to the same
//! index.
//!
//! The funnel holds no messages. The only state that survives a cycle is the
//! arbitration policy's.

pub mod policy;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::traits::{Evaluate, Routable, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, exit, trace};
pub use policy::{Arbitrate, FixedPriority, RoundRobin};

#[derive(EntityDisplay)]
pub struct Funnel<T>
where
    T: SimObject + Routable,
{
    pub entity: Rc<Entity>,
    policy: RefCell<Box<dyn Arbitrate>>,
    grant: Cell<Option<usize>>,
    rx: Vec<InPort<T>>,
    tx: OutPort<T>,
}

impl<T> Funnel<T>
where
    T: SimObject + Routable,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        num_inputs: usize,
        policy: Option<Box<dyn Arbitrate>>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        if num_inputs == 0 {
            return sim_error!(format!("{entity}: a funnel needs at least one input"));
        }
        let rx = (0..num_inputs)
            .map(|i| InPort::new(engine, &entity, &format!("rx_{i}")))
            .collect();
        let tx = OutPort::new(&entity, "tx");
        let policy = policy.unwrap_or_else(|| Box::new(FixedPriority {}));
        let rc_self = Rc::new(Self {
            entity,
            policy: RefCell::new(policy),
            grant: Cell::new(None),
            rx,
            tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx_i(&self, i: usize) -> PortStateResult<T> {
        match self.rx.get(i) {
            Some(rx) => rx.state(),
            None => sim_error!(format!("{self}: no rx port {i}")),
        }
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<T>) -> SimResult {
        self.tx.connect(port_state)
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.rx.len()
    }

    /// The input chosen in the most recent settle phase.
    #[must_use]
    pub fn grant(&self) -> Option<usize> {
        self.grant.get()
    }
}

impl<T> Evaluate for Funnel<T>
where
    T: SimObject + Routable,
{
    fn settle(&self) -> SimResult {
        let valid: Vec<bool> = self.rx.iter().map(InPort::valid).collect();
        let grant = self.policy.borrow().arbitrate(&self.entity, &valid);
        self.grant.set(grant);

        let out_ready = self.tx.ready();
        for (i, rx) in self.rx.iter().enumerate() {
            rx.set_ready(out_ready && grant == Some(i));
        }

        let msg = grant.and_then(|i| {
            self.rx[i].peek().map(|mut msg| {
                msg.set_port(i);
                msg
            })
        });
        self.tx.drive(msg)
    }

    fn commit(&self) -> SimResult {
        if !self.tx.fired() {
            return Ok(());
        }
        if let Some(i) = self.grant.get() {
            if let Some(msg) = self.rx[i].peek() {
                enter!(self.entity ; msg.id());
                trace!(self.entity ; "granted {i}: {msg}");
                exit!(self.entity ; msg.id());
            }
            self.policy.borrow_mut().granted(i);
        }
        Ok(())
    }

    fn reset(&self) {
        self.policy.borrow_mut().reset();
        self.grant.set(None);
    }
}
