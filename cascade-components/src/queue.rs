// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A bounded FIFO queue.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](cascade_engine::port::InPort): `rx`
//!  - One [output port](cascade_engine::port::OutPort): `tx`
//!
//! # Function
//!
//! Messages leave in the order they arrived. The [`QueueKind`] determines
//! how the two handshakes interact within one cycle:
//!
//! | kind     | `rx` ready                             | `tx` valid                              |
//! |----------|----------------------------------------|-----------------------------------------|
//! | `Normal` | occupancy < capacity                   | occupancy > 0                           |
//! | `Pipe`   | as `Normal`, or full and `tx` is ready | occupancy > 0                           |
//! | `Bypass` | occupancy < capacity                   | as `Normal`, or empty and `rx` is valid |

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, exit, value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueKind {
    #[default]
    Normal,
    /// Can accept a new message while full if the head leaves this cycle.
    Pipe,
    /// A message arriving at an empty queue can leave in the same cycle.
    Bypass,
}

#[derive(EntityDisplay)]
pub struct Queue<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    kind: QueueKind,
    capacity: usize,
    items: RefCell<VecDeque<T>>,
    rx: InPort<T>,
    tx: OutPort<T>,
}

impl<T> Queue<T>
where
    T: SimObject,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        kind: QueueKind,
        capacity: usize,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        if capacity == 0 {
            return sim_error!(format!("{entity}: capacity must be at least 1"));
        }
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            kind,
            capacity,
            items: RefCell::new(VecDeque::with_capacity(capacity)),
            rx,
            tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx(&self) -> PortStateResult<T> {
        self.rx.state()
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<T>) -> SimResult {
        self.tx.connect(port_state)
    }

    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn kind(&self) -> QueueKind {
        self.kind
    }
}

impl<T> Evaluate for Queue<T>
where
    T: SimObject,
{
    fn settle(&self) -> SimResult {
        let items = self.items.borrow();
        let head = match items.front() {
            Some(head) => Some(head.clone()),
            None if self.kind == QueueKind::Bypass => self.rx.peek(),
            None => None,
        };
        self.tx.drive(head)?;

        let ready =
            items.len() < self.capacity || (self.kind == QueueKind::Pipe && self.tx.ready());
        self.rx.set_ready(ready);
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let mut items = self.items.borrow_mut();

        // Only a bypass queue can send while empty
        let bypassed = items.is_empty() && self.tx.fired();

        if bypassed {
            if let Some(value) = self.rx.peek() {
                enter!(self.entity ; value.id());
                exit!(self.entity ; value.id());
            }
            return Ok(());
        }

        if self.tx.fired() {
            if let Some(value) = items.pop_front() {
                exit!(self.entity ; value.id());
            }
        }
        if self.rx.fired() {
            if let Some(value) = self.rx.peek() {
                enter!(self.entity ; value.id());
                items.push_back(value);
            }
        }
        value!(self.entity ; items.len());
        Ok(())
    }

    fn reset(&self) {
        self.items.borrow_mut().clear();
    }

    fn is_idle(&self) -> bool {
        self.items.borrow().is_empty()
    }
}
