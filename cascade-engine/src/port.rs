// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Ports
//!
//! An [`OutPort`] is connected to exactly one [`InPort`]. The pair share a
//! [`PortState`] which holds the two handshake signals:
//!  - `valid`: the sender is offering a message (modelled as `Some(msg)`).
//!  - `ready`: the receiver can accept a message this cycle.
//!
//! A message transfers ("fires") in a cycle where both are asserted.
//!
//! All port states are registered with the engine's [`Netlist`] which clears
//! them at the start of each cycle and counts signal changes so the engine
//! can tell when the settle phase has reached a fixed point.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use cascade_track::entity::Entity;
use cascade_track::{connect, debug, enter, trace};

use crate::engine::Engine;
use crate::sim_error;
use crate::traits::SimObject;
use crate::types::{SimError, SimResult};

pub type PortStateResult<T> = Result<Rc<PortState<T>>, SimError>;

/// Operations the [`Netlist`] performs on every connection.
pub trait Net {
    /// Deassert both handshake signals.
    fn clear(&self);

    /// Emit a trace event if a message fired on this net.
    fn trace_fired(&self);
}

/// All nets in a simulation.
pub struct Netlist {
    pub entity: Rc<Entity>,
    changes: Cell<u64>,
    nets: RefCell<Vec<Weak<dyn Net>>>,
}

impl Netlist {
    #[must_use]
    pub fn new(parent: &Rc<Entity>) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "netlist")),
            changes: Cell::new(0),
            nets: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, net: Weak<dyn Net>) {
        self.nets.borrow_mut().push(net);
    }

    /// Number of signal changes seen since the simulation started.
    #[must_use]
    pub fn changes(&self) -> u64 {
        self.changes.get()
    }

    fn changed(&self) {
        self.changes.set(self.changes.get() + 1);
    }

    /// Deassert all signals. Nets whose ports have been dropped are removed.
    pub fn clear_all(&self) {
        self.nets.borrow_mut().retain(|net| match net.upgrade() {
            Some(net) => {
                net.clear();
                true
            }
            None => false,
        });
    }

    pub fn trace_fired(&self) {
        for net in self.nets.borrow().iter() {
            if let Some(net) = net.upgrade() {
                net.trace_fired();
            }
        }
    }

    #[must_use]
    pub fn num_nets(&self) -> usize {
        self.nets.borrow().len()
    }
}

/// The signals shared by one connected [`OutPort`]/[`InPort`] pair.
pub struct PortState<T>
where
    T: SimObject,
{
    msg: RefCell<Option<T>>,
    ready: Cell<bool>,
    pub in_port_entity: Rc<Entity>,
    netlist: Rc<Netlist>,
}

impl<T> PortState<T>
where
    T: SimObject,
{
    fn new(in_port_entity: Rc<Entity>, netlist: Rc<Netlist>) -> Self {
        Self {
            msg: RefCell::new(None),
            ready: Cell::new(false),
            in_port_entity,
            netlist,
        }
    }

    fn drive(&self, msg: Option<T>) {
        let changed = *self.msg.borrow() != msg;
        if changed {
            *self.msg.borrow_mut() = msg;
            self.netlist.changed();
        }
    }

    fn set_ready(&self, ready: bool) {
        if self.ready.get() != ready {
            self.ready.set(ready);
            self.netlist.changed();
        }
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.msg.borrow().is_some()
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready.get()
    }

    #[must_use]
    pub fn fired(&self) -> bool {
        self.valid() && self.ready()
    }

    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.msg.borrow().clone()
    }
}

impl<T> Net for PortState<T>
where
    T: SimObject,
{
    fn clear(&self) {
        *self.msg.borrow_mut() = None;
        self.ready.set(false);
    }

    fn trace_fired(&self) {
        if !self.ready() {
            return;
        }
        if let Some(msg) = self.msg.borrow().as_ref() {
            enter!(self.in_port_entity ; msg.id());
            trace!(self.in_port_entity ; "fired {msg}");
        }
    }
}

pub struct InPort<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    state: Rc<PortState<T>>,
    connected: Cell<bool>,
}

impl<T> fmt::Display for InPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

impl<T> InPort<T>
where
    T: SimObject,
{
    #[must_use]
    pub fn new(engine: &Engine, parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        let state = Rc::new(PortState::new(entity.clone(), engine.netlist().clone()));
        let net: Weak<dyn Net> = Rc::downgrade(&state) as Weak<dyn Net>;
        engine.netlist().add(net);
        Self {
            entity,
            state,
            connected: Cell::new(false),
        }
    }

    /// Hand out the shared state so that an [`OutPort`] can connect to it.
    pub fn state(&self) -> PortStateResult<T> {
        if self.connected.get() {
            return sim_error!(format!("{self} already connected"));
        }

        self.connected.set(true);
        Ok(self.state.clone())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// The message currently being offered, if any.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.state.peek()
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.state.valid()
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.set_ready(ready);
    }

    #[must_use]
    pub fn ready(&self) -> bool {
        self.state.ready()
    }

    #[must_use]
    pub fn fired(&self) -> bool {
        self.state.fired()
    }
}

pub struct OutPort<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    state: RefCell<Option<Rc<PortState<T>>>>,
}

impl<T> fmt::Display for OutPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity.fmt(f)
    }
}

impl<T> OutPort<T>
where
    T: SimObject,
{
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let entity = Rc::new(Entity::new(parent, name));
        Self {
            entity,
            state: RefCell::new(None),
        }
    }

    pub fn connect(&self, port_state: PortStateResult<T>) -> SimResult {
        let port_state = port_state?;

        if self.state.borrow().is_some() {
            return sim_error!(format!("{self} already connected"));
        }

        debug!(self.entity ; "Connect {} => {}", self, port_state.in_port_entity);
        connect!(self.entity ; port_state.in_port_entity);
        *self.state.borrow_mut() = Some(port_state);
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Offer a message (`Some`) or deassert `valid` (`None`).
    pub fn drive(&self, msg: Option<T>) -> SimResult {
        match self.state.borrow().as_ref() {
            Some(state) => {
                state.drive(msg);
                Ok(())
            }
            None => sim_error!(format!("{self} not connected")),
        }
    }

    /// The receiver's `ready`. An unconnected port is never ready.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.state.borrow().as_ref().is_some_and(|s| s.ready())
    }

    #[must_use]
    pub fn fired(&self) -> bool {
        self.state.borrow().as_ref().is_some_and(|s| s.fired())
    }
}
