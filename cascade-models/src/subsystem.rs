// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Processor, memory and accelerator sharing one memory port.
//!
//! ```text
//!                        +--------+     +--------+     +--------+
//!  proc_mem_rx --------> | funnel | --> | memory | --> | router | --> proc_mem_tx
//!  xcel mem_tx --------> |        |     +--------+     |        | --> xcel mem_rx
//!                        +--------+                    +--------+
//! ```
//!
//! The funnel records which input each request arrived on and the router
//! uses that to return the response to the same master. The processor side
//! is port [`PROC_PORT`] and the accelerator is port [`XCEL_PORT`].

use std::rc::Rc;

use cascade_components::connect_port;
use cascade_components::funnel::Funnel;
use cascade_components::router::{DefaultRouter, Router};
use cascade_engine::engine::Engine;
use cascade_engine::port::PortStateResult;
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;

use crate::accum_xcel::{Accelerator, Level, new_accum_xcel};
use crate::memory::{Memory, MemoryConfig};
use crate::msg::{MemReq, MemResp, XcelReq, XcelResp};

pub const PROC_PORT: usize = 0;
pub const XCEL_PORT: usize = 1;
const NUM_PORTS: usize = 2;

#[derive(EntityDisplay)]
pub struct ProcMemXcel {
    pub entity: Rc<Entity>,
    funnel: Rc<Funnel<MemReq<u32>>>,
    router: Rc<Router<MemResp<u32>>>,
    memory: Rc<Memory<u32>>,
    xcel: Rc<dyn Accelerator>,
}

impl ProcMemXcel {
    pub fn new(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        level: Level,
        mem_config: MemoryConfig,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));

        let funnel = Funnel::new_and_register(engine, &entity, "funnel", NUM_PORTS, None)?;
        let memory = Memory::new_and_register(engine, &entity, "memory", mem_config)?;
        let router = Router::new_and_register(
            engine,
            &entity,
            "router",
            NUM_PORTS,
            Box::new(DefaultRouter {}),
        )?;
        let xcel = new_accum_xcel(engine, &entity, "xcel", level)?;

        connect_port!(funnel, tx => memory, rx)?;
        connect_port!(memory, tx => router, rx)?;
        connect_port!(xcel, mem_tx => funnel, rx, XCEL_PORT)?;
        connect_port!(router, tx, XCEL_PORT => xcel, mem_rx)?;

        Ok(Rc::new(Self {
            entity,
            funnel,
            router,
            memory,
            xcel,
        }))
    }

    /// The processor's memory request input.
    pub fn port_proc_mem_rx(&self) -> PortStateResult<MemReq<u32>> {
        self.funnel.port_rx_i(PROC_PORT)
    }

    /// Where responses to processor memory requests are sent.
    pub fn connect_port_proc_mem_tx(&self, port_state: PortStateResult<MemResp<u32>>) -> SimResult {
        self.router.connect_port_tx_i(PROC_PORT, port_state)
    }

    pub fn port_xcel_rx(&self) -> PortStateResult<XcelReq> {
        self.xcel.port_xcel_rx()
    }

    pub fn connect_port_xcel_tx(&self, port_state: PortStateResult<XcelResp>) -> SimResult {
        self.xcel.connect_port_xcel_tx(port_state)
    }

    #[must_use]
    pub fn memory(&self) -> &Rc<Memory<u32>> {
        &self.memory
    }

    #[must_use]
    pub fn xcel(&self) -> &Rc<dyn Accelerator> {
        &self.xcel
    }
}
