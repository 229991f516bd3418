// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Perform routing between an input interface and a number number of outputs.
//!
//! The [Router] is passed an algorithm that makes the decision about which
//! egress port to send each routed object to.
//!
//! # Ports
//!
//! This component has the following ports:
//!  - One [input port](cascade_engine::port::InPort): `rx`
//!  - N [output ports](cascade_engine::port::OutPort): `tx_i` for `i in [0, N-1]`
//!
//! # Function
//!
//! The message on `rx` is offered to exactly one output and `rx` is ready
//! when that output is ready. Messages are never broadcast or reordered.

use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::traits::{Evaluate, Routable, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, exit, trace};

/// Trait required for routing algorithms to implement.
pub trait Route<T>
where
    T: Routable,
{
    /// Given an object, return the index of the egress port to map the object
    /// to.
    fn route(&self, object: &T) -> Result<usize, SimError>;
}

pub struct DefaultRouter {}

impl<T> Route<T> for DefaultRouter
where
    T: Routable,
{
    /// Determine route by taking the port recorded in the object as the index.
    fn route(&self, obj_to_route: &T) -> Result<usize, SimError> {
        Ok(obj_to_route.port())
    }
}

/// Route using a table from recorded port index to egress port, fixed at
/// construction.
pub struct PortMapRouter {
    map: Vec<usize>,
}

impl PortMapRouter {
    #[must_use]
    pub fn new(map: Vec<usize>) -> Self {
        Self { map }
    }
}

impl<T> Route<T> for PortMapRouter
where
    T: Routable,
{
    fn route(&self, obj_to_route: &T) -> Result<usize, SimError> {
        let port = obj_to_route.port();
        match self.map.get(port) {
            Some(egress) => Ok(*egress),
            None => sim_error!(format!("No route for port {port}")),
        }
    }
}

#[derive(EntityDisplay)]
pub struct Router<T>
where
    T: SimObject + Routable,
{
    pub entity: Rc<Entity>,
    rx: InPort<T>,
    tx: Vec<OutPort<T>>,
    algorithm: Box<dyn Route<T>>,
}

impl<T> Router<T>
where
    T: SimObject + Routable,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        num_egress: usize,
        algorithm: Box<dyn Route<T>>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(engine, &entity, "rx");
        let tx = (0..num_egress)
            .map(|i| OutPort::new(&entity, &format!("tx_{i}")))
            .collect();
        let rc_self = Rc::new(Self {
            entity,
            rx,
            tx,
            algorithm,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx(&self) -> PortStateResult<T> {
        self.rx.state()
    }

    pub fn connect_port_tx_i(&self, i: usize, port_state: PortStateResult<T>) -> SimResult {
        match self.tx.get(i) {
            None => {
                sim_error!(format!("{self}: no tx port {i}"))
            }
            Some(tx) => tx.connect(port_state),
        }
    }

    #[must_use]
    pub fn num_egress(&self) -> usize {
        self.tx.len()
    }

    fn destination(&self, msg: &T) -> Result<usize, SimError> {
        let tx_index = self.algorithm.route(msg)?;
        if tx_index >= self.tx.len() {
            return sim_error!(format!(
                "{self}: {msg} routed to tx port {tx_index} of {}",
                self.tx.len()
            ));
        }
        Ok(tx_index)
    }
}

impl<T> Evaluate for Router<T>
where
    T: SimObject + Routable,
{
    fn settle(&self) -> SimResult {
        let msg = self.rx.peek();
        let tx_index = match &msg {
            Some(msg) => Some(self.destination(msg)?),
            None => None,
        };

        for (i, tx) in self.tx.iter().enumerate() {
            if Some(i) == tx_index {
                tx.drive(msg.clone())?;
                self.rx.set_ready(tx.ready());
            } else {
                tx.drive(None)?;
            }
        }
        if tx_index.is_none() {
            self.rx.set_ready(false);
        }
        Ok(())
    }

    fn commit(&self) -> SimResult {
        if !self.rx.fired() {
            return Ok(());
        }
        if let Some(msg) = self.rx.peek() {
            enter!(self.entity ; msg.id());
            trace!(self.entity ; "routed {msg}");
            exit!(self.entity ; msg.id());
        }
        Ok(())
    }
}
