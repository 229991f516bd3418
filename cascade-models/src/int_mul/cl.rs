// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Cycle-level multipliers built from the generic latency components.

use std::rc::Rc;

use cascade_components::iterative::IterativeUnit;
use cascade_components::latency::{FixedLatency, VariableLatency, popcount};
use cascade_components::pipeline::Pipeline;
use cascade_engine::engine::Engine;
use cascade_engine::types::SimError;
use cascade_track::entity::Entity;

use crate::msg::{MulReq, MulResp};

/// Cycles taken by the fixed-latency multiplier.
pub const FIXED_LATENCY: u64 = 32;

/// One multiply at a time, each taking [`FIXED_LATENCY`] cycles.
pub fn new_fixed_lat(
    engine: &Engine,
    parent: &Rc<Entity>,
    name: &str,
) -> Result<Rc<IterativeUnit<MulReq, MulResp>>, SimError> {
    IterativeUnit::new_and_register(
        engine,
        parent,
        name,
        Box::new(FixedLatency::new(FIXED_LATENCY)?),
        Box::new(MulReq::product),
    )
}

/// One multiply at a time, taking one cycle per bit set in `b` as a
/// shift-add multiplier that skips zero bits would.
pub fn new_var_lat(
    engine: &Engine,
    parent: &Rc<Entity>,
    name: &str,
) -> Result<Rc<IterativeUnit<MulReq, MulResp>>, SimError> {
    IterativeUnit::new_and_register(
        engine,
        parent,
        name,
        Box::new(VariableLatency::new(|request: &MulReq| popcount(request.b))),
        Box::new(MulReq::product),
    )
}

/// Fully pipelined with `nstages` cycles of latency.
pub fn new_nstage(
    engine: &Engine,
    parent: &Rc<Entity>,
    name: &str,
    nstages: usize,
) -> Result<Rc<Pipeline<MulReq, MulResp>>, SimError> {
    Pipeline::new_and_register(engine, parent, name, nstages, Box::new(MulReq::product))
}
