// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A byte-addressed test memory.
//!
//! # Ports
//!
//! This component has:
//!  - One [input port](cascade_engine::port::InPort): `rx` for [`MemReq`]s
//!  - One [output port](cascade_engine::port::OutPort): `tx` for [`MemResp`]s
//!
//! # Function
//!
//! Each request is performed in the cycle it is accepted, so a read sees
//! every write accepted before it. The response is valid `latency` cycles
//! later. Up to `max_outstanding` responses can be waiting and they leave in
//! request order.
//!
//! When `stall_period` is non-zero the memory deasserts `ready` for the last
//! `stall_cycles` cycles of every `stall_period` cycles.
//!
//! Bytes that have never been written read as zero. [`Memory::write_mem`]
//! and [`Memory::read_mem`] give back-door access that bypasses the ports.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use cascade_components::traits::Minion;
use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::sim_error;
use cascade_engine::time::clock::Clock;
use cascade_engine::traits::Evaluate;
use cascade_engine::types::{MsgType, SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::id::Unique;
use cascade_track::{debug, enter, exit, value};
use serde::{Deserialize, Serialize};

use crate::msg::{MemData, MemReq, MemResp};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Cycles from accepting a request to its response being valid.
    pub latency: u64,

    /// Number of responses that can be waiting to leave.
    pub max_outstanding: usize,

    /// Length of the stall pattern in cycles. Zero disables stalls.
    pub stall_period: u64,

    /// Cycles at the end of each period in which requests are refused.
    pub stall_cycles: u64,
}

impl MemoryConfig {
    #[must_use]
    pub fn new(latency: u64) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_stalls(mut self, stall_period: u64, stall_cycles: u64) -> Self {
        self.stall_period = stall_period;
        self.stall_cycles = stall_cycles;
        self
    }

    fn validate(&self, entity: &Rc<Entity>) -> SimResult {
        if self.latency == 0 {
            return sim_error!(format!("{entity}: latency must be at least 1"));
        }
        if self.max_outstanding == 0 {
            return sim_error!(format!("{entity}: max_outstanding must be at least 1"));
        }
        if self.stall_period > 0 && self.stall_cycles >= self.stall_period {
            return sim_error!(format!(
                "{entity}: stalling {} of every {} cycles never accepts a request",
                self.stall_cycles, self.stall_period
            ));
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            latency: 1,
            max_outstanding: 4,
            stall_period: 0,
            stall_cycles: 0,
        }
    }
}

/// Accesses made through the ports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryMetrics {
    pub num_reads: usize,
    pub num_writes: usize,
    pub bytes_read: usize,
    pub bytes_written: usize,
}

#[derive(EntityDisplay)]
pub struct Memory<D>
where
    D: MemData,
{
    pub entity: Rc<Entity>,
    clock: Clock,
    config: MemoryConfig,
    metrics: RefCell<MemoryMetrics>,
    store: RefCell<HashMap<u32, u8>>,
    responses: RefCell<VecDeque<(MemResp<D>, u64)>>,
    rx: InPort<MemReq<D>>,
    tx: OutPort<MemResp<D>>,
}

impl<D> Memory<D>
where
    D: MemData,
{
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        config: MemoryConfig,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        config.validate(&entity)?;
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            clock: engine.default_clock(),
            responses: RefCell::new(VecDeque::with_capacity(config.max_outstanding)),
            config,
            metrics: RefCell::new(MemoryMetrics::default()),
            store: RefCell::new(HashMap::new()),
            rx,
            tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    pub fn port_rx(&self) -> PortStateResult<MemReq<D>> {
        self.rx.state()
    }

    pub fn connect_port_tx(&self, port_state: PortStateResult<MemResp<D>>) -> SimResult {
        self.tx.connect(port_state)
    }

    /// Write bytes starting at `addr` without using the ports.
    pub fn write_mem(&self, addr: u32, bytes: &[u8]) {
        let mut store = self.store.borrow_mut();
        for (offset, byte) in (0u32..).zip(bytes) {
            store.insert(addr.wrapping_add(offset), *byte);
        }
    }

    /// Read `len` bytes starting at `addr` without using the ports.
    #[must_use]
    pub fn read_mem(&self, addr: u32, len: usize) -> Vec<u8> {
        let store = self.store.borrow();
        (0u32..)
            .take(len)
            .map(|offset| {
                store
                    .get(&addr.wrapping_add(offset))
                    .copied()
                    .unwrap_or_default()
            })
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> MemoryMetrics {
        self.metrics.borrow().clone()
    }

    #[must_use]
    pub fn num_outstanding(&self) -> usize {
        self.responses.borrow().len()
    }

    fn stalled(&self, now: u64) -> bool {
        let period = self.config.stall_period;
        period > 0 && now % period >= period - self.config.stall_cycles
    }

    fn access(&self, request: &MemReq<D>) -> Result<MemResp<D>, SimError> {
        let num_bytes = request.num_bytes();
        if num_bytes > D::NUM_BYTES {
            return sim_error!(format!(
                "{self}: {request} accesses {num_bytes} bytes of a {} byte word",
                D::NUM_BYTES
            ));
        }

        let mut metrics = self.metrics.borrow_mut();
        let response = match request.msg_type {
            MsgType::Read => {
                metrics.num_reads += 1;
                metrics.bytes_read += num_bytes;
                let bytes = self.read_mem(request.addr, num_bytes);
                MemResp::read(request.tag, request.len, D::from_le_slice(&bytes))
            }
            MsgType::Write => {
                metrics.num_writes += 1;
                metrics.bytes_written += num_bytes;
                let bytes = request.data.to_le_vec();
                self.write_mem(request.addr, &bytes[..num_bytes]);
                MemResp::write(request.tag, request.len)
            }
        };
        debug!(self.entity ; "{request} => {response}");
        Ok(response.with_port(request.port))
    }
}

impl<D> Minion<MemReq<D>, MemResp<D>> for Memory<D>
where
    D: MemData,
{
    fn port_rx(&self) -> PortStateResult<MemReq<D>> {
        Memory::port_rx(self)
    }

    fn connect_port_tx(&self, port_state: PortStateResult<MemResp<D>>) -> SimResult {
        Memory::connect_port_tx(self, port_state)
    }
}

impl<D> Evaluate for Memory<D>
where
    D: MemData,
{
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now().tick();
        let responses = self.responses.borrow();

        let head = responses
            .front()
            .filter(|(_, ready_at)| *ready_at <= now)
            .map(|(response, _)| *response);
        let head_valid = head.is_some();
        self.tx.drive(head)?;

        let has_space = responses.len() < self.config.max_outstanding
            || (head_valid && self.tx.ready());
        self.rx.set_ready(has_space && !self.stalled(now));
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let now = self.clock.tick_now().tick();

        if self.tx.fired() {
            if let Some((response, _)) = self.responses.borrow_mut().pop_front() {
                exit!(self.entity ; response.id());
            }
        }
        if self.rx.fired() {
            if let Some(request) = self.rx.peek() {
                enter!(self.entity ; request.id());
                let response = self.access(&request)?;
                self.responses
                    .borrow_mut()
                    .push_back((response, now + self.config.latency));
            }
        }
        value!(self.entity ; self.responses.borrow().len());
        Ok(())
    }

    /// Drops waiting responses. The contents are kept.
    fn reset(&self) {
        self.responses.borrow_mut().clear();
    }

    fn is_idle(&self) -> bool {
        self.responses.borrow().is_empty()
    }
}
