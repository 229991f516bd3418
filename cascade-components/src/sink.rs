// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A data sink.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](cascade_engine::port::InPort): `rx`
//!
//! # Function
//!
//! The sink asserts `ready` `initial_delay` cycles after the start and
//! `interval_delay` cycles after each message it accepts. All messages
//! received are kept.
//!
//! When given the messages it should expect, each arriving message is
//! checked in order and any difference stops the simulation. The sink is
//! then only idle once all expected messages have arrived.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::time::clock::Clock;
use cascade_engine::traits::{Evaluate, SimObject};
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::{enter, trace};

#[derive(EntityDisplay)]
pub struct Sink<T>
where
    T: SimObject,
{
    pub entity: Rc<Entity>,
    clock: Clock,
    received: RefCell<Vec<T>>,
    expected: RefCell<Option<Vec<T>>>,
    interval_delay: Cell<u64>,
    next_tick: Cell<u64>,
    rx: InPort<T>,
}

impl<T> Sink<T>
where
    T: SimObject,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(engine, &entity, "rx");
        let clock = engine.default_clock();
        let next_tick = clock.tick_now().tick();
        let rc_self = Rc::new(Self {
            entity,
            clock,
            received: RefCell::new(Vec::new()),
            expected: RefCell::new(None),
            interval_delay: Cell::new(0),
            next_tick: Cell::new(next_tick),
            rx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    /// Create a sink that checks every message it receives.
    pub fn new_and_register_with_expected(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        expected: Vec<T>,
    ) -> Result<Rc<Self>, SimError> {
        let rc_self = Self::new_and_register(engine, parent, name)?;
        rc_self.set_expected(expected);
        Ok(rc_self)
    }

    pub fn set_expected(&self, expected: Vec<T>) {
        *self.expected.borrow_mut() = Some(expected);
    }

    /// Set the number of cycles before the sink is first ready and between
    /// accepted messages.
    pub fn set_delays(&self, initial_delay: u64, interval_delay: u64) {
        self.interval_delay.set(interval_delay);
        self.next_tick
            .set(self.clock.tick_now().tick() + initial_delay);
    }

    pub fn port_rx(&self) -> PortStateResult<T> {
        self.rx.state()
    }

    #[must_use]
    pub fn num_sunk(&self) -> usize {
        self.received.borrow().len()
    }

    /// Copies of all messages received so far.
    #[must_use]
    pub fn received(&self) -> Vec<T> {
        self.received.borrow().clone()
    }

    fn check(&self, index: usize, value: &T) -> SimResult {
        let expected = self.expected.borrow();
        let Some(expected) = expected.as_ref() else {
            return Ok(());
        };
        match expected.get(index) {
            Some(e) if e == value => Ok(()),
            Some(e) => sim_error!(format!(
                "{self}: message {index} expected {e} but received {value}"
            )),
            None => sim_error!(format!("{self}: unexpected message {index}: {value}")),
        }
    }
}

impl<T> Evaluate for Sink<T>
where
    T: SimObject,
{
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        self.rx.set_ready(now >= self.next_tick.get());
        Ok(())
    }

    fn commit(&self) -> SimResult {
        if !self.rx.fired() {
            return Ok(());
        }
        let Some(value) = self.rx.peek() else {
            return Ok(());
        };
        enter!(self.entity ; value.id());
        trace!(self.entity ; "received {value}");

        let index = self.received.borrow().len();
        self.check(index, &value)?;
        self.received.borrow_mut().push(value);

        let now = self.clock.tick_now().tick();
        self.next_tick.set(now + 1 + self.interval_delay.get());
        Ok(())
    }

    fn is_idle(&self) -> bool {
        match self.expected.borrow().as_ref() {
            Some(expected) => self.received.borrow().len() >= expected.len(),
            None => true,
        }
    }
}
