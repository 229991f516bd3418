// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use cascade_components::traits::Minion;
use cascade_engine::engine::Engine;
use cascade_engine::port::{InPort, OutPort, PortStateResult};
use cascade_engine::traits::Evaluate;
use cascade_engine::types::{SimError, SimResult};
use cascade_model_builder::EntityDisplay;
use cascade_track::entity::Entity;
use cascade_track::trace;

use crate::msg::{MulReq, MulResp};

/// Functional multiplier.
///
/// The product is offered in the same cycle as the request and the request
/// is only accepted when the response is.
#[derive(EntityDisplay)]
pub struct IntMulFl {
    pub entity: Rc<Entity>,
    rx: InPort<MulReq>,
    tx: OutPort<MulResp>,
}

impl IntMulFl {
    pub fn new_and_register(
        engine: &Engine,
        parent: &Rc<Entity>,
        name: &str,
    ) -> Result<Rc<Self>, SimError> {
        let entity = Rc::new(Entity::new(parent, name));
        let rx = InPort::new(engine, &entity, "rx");
        let tx = OutPort::new(&entity, "tx");
        let rc_self = Rc::new(Self { entity, rx, tx });
        engine.register(rc_self.clone());
        Ok(rc_self)
    }
}

impl Minion<MulReq, MulResp> for IntMulFl {
    fn port_rx(&self) -> PortStateResult<MulReq> {
        self.rx.state()
    }

    fn connect_port_tx(&self, port_state: PortStateResult<MulResp>) -> SimResult {
        self.tx.connect(port_state)
    }
}

impl Evaluate for IntMulFl {
    fn settle(&self) -> SimResult {
        self.tx.drive(self.rx.peek().map(|request| request.product()))?;
        self.rx.set_ready(self.tx.ready());
        Ok(())
    }

    fn commit(&self) -> SimResult {
        if self.rx.fired() {
            if let Some(request) = self.rx.peek() {
                trace!(self.entity ; "{request} = {}", request.product());
            }
        }
        Ok(())
    }
}
