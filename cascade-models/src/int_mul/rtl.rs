// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Register-transfer level pipelined shift-add multiplier.
//!
//! Each of the `nstages` stages performs `32 / nstages` shift-add steps on
//! the partial product held in its input register. A stage register holds
//! `None` when it contains no valid work.
//!
//! The whole pipeline stalls when the last stage holds a result that the
//! consumer is not ready for.

use std::rc::Rc;

use cascade_components::traits::Minion;
use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::register::Reg;
use cascade_engine::sim_error;
use cascade_engine::traits::Evaluate;
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::trace;

use crate::msg::{MulReq, MulResp};

const WIDTH: u32 = u32::BITS;

/// Partial product carried between stages.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Stage {
    a: u32,
    b: u32,
    result: u32,
}

impl Stage {
    fn new(request: &MulReq) -> Self {
        Self {
            a: request.a,
            b: request.b,
            result: 0,
        }
    }

    /// Combinational logic of one stage.
    fn step(mut self, num_steps: u32) -> Self {
        for _ in 0..num_steps {
            if self.b & 1 == 1 {
                self.result = self.result.wrapping_add(self.a);
            }
            self.a <<= 1;
            self.b >>= 1;
        }
        self
    }
}

#[derive(EntityDisplay)]
pub struct IntMulNstageRtl {
    pub entity: Rc<Entity>,
    steps_per_stage: u32,
    stages: Vec<Reg<Option<Stage>>>,
    rx: InPort<MulReq>,
    tx: OutPort<MulResp>,
}

impl IntMulNstageRtl {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
        nstages: usize,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let steps_per_stage = match u32::try_from(nstages) {
            Ok(n) if n > 0 && WIDTH % n == 0 => WIDTH / n,
            _ => {
                return sim_error!(format!(
                    "{entity}: {nstages} stages do not divide {WIDTH} bits"
                ));
            }
        };
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self {
            entity,
            steps_per_stage,
            stages: (0..nstages).map(|_| Reg::new(None)).collect(),
            rx,
            tx,
        });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }

    #[must_use]
    pub fn nstages(&self) -> usize {
        self.stages.len()
    }

    /// Number of stage registers holding valid work.
    #[must_use]
    pub fn num_in_flight(&self) -> usize {
        self.stages.iter().filter(|s| s.out().is_some()).count()
    }

    fn last_stage(&self) -> Option<Stage> {
        self.stages.last().and_then(Reg::out)
    }
}

impl Minion<MulReq, MulResp> for IntMulNstageRtl {
    fn port_rx(&self) -> PortStateResult<MulReq> {
        self.rx.state()
    }

    fn connect_port_tx(&self, port_state: PortStateResult<MulResp>) -> SimResult {
        self.tx.connect(port_state)
    }
}

impl Evaluate for IntMulNstageRtl {
    fn settle(&self) -> SimResult {
        let last = self.last_stage();
        self.tx.drive(last.map(|s| MulResp(s.result)))?;

        let advance = last.is_none() || self.tx.ready();
        self.rx.set_ready(advance);

        if !advance {
            for stage in &self.stages {
                stage.set_next(stage.out());
            }
            return Ok(());
        }

        let mut input = self.rx.peek().map(|request| Stage::new(&request));
        for stage in &self.stages {
            stage.set_next(input.map(|s| s.step(self.steps_per_stage)));
            input = stage.out();
        }
        Ok(())
    }

    fn commit(&self) -> SimResult {
        if self.rx.fired() {
            if let Some(request) = self.rx.peek() {
                trace!(self.entity ; "accept {request}");
            }
        }
        for stage in &self.stages {
            stage.latch();
        }
        Ok(())
    }

    fn reset(&self) {
        for stage in &self.stages {
            stage.reset();
        }
    }

    fn is_idle(&self) -> bool {
        self.stages.iter().all(|s| s.out().is_none())
    }
}
