// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A data source.
//!
//! The data source produces data as defined by the [DataGenerator] that is
//! provided.
//!
//! # Ports
//!
//! This component has:
//!  - One [output port](cascade_engine::port::OutPort): `tx`
//!
//! # Function
//!
//! The first message is offered `initial_delay` cycles after the start and
//! each following message `interval_delay` cycles after the previous one
//! was accepted. A message stays valid until it is accepted.
//!
//! A reset does not rewind the generator.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{OutPort, PortStateResult};
use cascade_engine::time::clock::Clock;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::exit;

use crate::types::DataGenerator;

#[macro_export]
macro_rules! option_box_repeat {
    ($value:expr ; $repeat:expr) => {
        Some(Box::new(std::iter::repeat($value).take($repeat)))
    };
}

#[macro_export]
macro_rules! option_box_chain {
    ($value1:expr , $value2:expr) => {
        Some(Box::new((*($value1.unwrap())).chain(*($value2.unwrap()))))
    };
}

#[derive(EntityDisplay)]
pub struct Source<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    clock: Clock,
    data_generator: RefCell<Option<DataGenerator<T>>>,
    pending: RefCell<Option<T>>,
    initial_delay: Cell<u64>,
    interval_delay: Cell<u64>,
    next_tick: Cell<u64>,
    tx: OutPort<T>,
}

impl<T> Source<T>
where
    T: SimObject,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        data_generator: Option<DataGenerator<T>>,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let tx = OutPort::new(&entity, "tx");
        let clock = engine.default_clock();
        let next_tick = clock.tick_now().tick();
        let rc_self = Rc::new(Self {
            entity,
            clock,
            data_generator: RefCell::new(None),
            pending: RefCell::new(None),
            initial_delay: Cell::new(0),
            interval_delay: Cell::new(0),
            next_tick: Cell::new(next_tick),
            tx,
        });
        rc_self.set_generator(data_generator);
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    /// Replace the generator. The first new message is offered after the
    /// initial delay.
    pub fn set_generator(&self, data_generator: Option<DataGenerator<T>>) {
        let mut data_generator = data_generator;
        let first = data_generator.as_mut().and_then(|g| g.next());
        *self.pending.borrow_mut() = first;
        *self.data_generator.borrow_mut() = data_generator;
        self.next_tick
            .set(self.clock.tick_now().tick() + self.initial_delay.get());
    }

    /// Set the number of cycles before the first message and between
    /// messages.
    pub fn set_delays(&self, initial_delay: u64, interval_delay: u64) {
        self.initial_delay.set(initial_delay);
        self.interval_delay.set(interval_delay);
        self.next_tick
            .set(self.clock.tick_now().tick() + initial_delay);
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<T>) -> SimResult {
        self.tx.connect(port_state)
    }
}

impl<T> Evaluate for Source<T>
where
    T: SimObject,
{
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let value = if now >= self.next_tick.get() {
            self.pending.borrow().clone()
        } else {
            None
        };
        self.tx.drive(value)
    }

    fn commit(&self) -> SimResult {
        if !self.tx.fired() {
            return Ok(());
        }
        if let Some(value) = self.pending.borrow().as_ref() {
            exit!(self.entity ; value.id());
        }

        let next = self
            .data_generator
            .borrow_mut()
            .as_mut()
            .and_then(|g| g.next());
        *self.pending.borrow_mut() = next;

        let now = self.clock.tick_now().tick();
        self.next_tick.set(now + 1 + self.interval_delay.get());
        Ok(())
    }

    fn is_idle(&self) -> bool {
        self.pending.borrow().is_none()
    }
}
