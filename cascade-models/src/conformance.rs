// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Harnesses that drive the same stimulus through any level of a model.
//!
//! The responses returned by a harness must be identical for every level.
//! Only the number of cycles taken is allowed to differ.
//!
//! # Example
//!
//! ```rust
//! use cascade_engine::engine::Engine;
//! use cascade_models::accum_xcel::Level;
//! use cascade_models::conformance::{AccumTest, run_accumulate};
//!
//! let test = AccumTest::new(vec![vec![1, 2, 3, 4]]);
//! for level in Level::ALL {
//!     let mut engine = Engine::default();
//!     let outcome = run_accumulate(&mut engine, level, &test).unwrap();
//!     assert_eq!(outcome.responses, test.expected_responses());
//! }
//! ```

use std::rc::Rc;

use cascade_components::connect_port;
use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_engine::engine::{DEFAULT_MAX_CYCLES, Engine};
use cascade_engine::types::SimError;
use cascade_track::info;

use crate::accum_xcel::{Level, XR_BASE, XR_GO, XR_SIZE, new_accum_xcel};
use crate::int_mul::{IntMulModel, new_int_mul};
use crate::memory::{Memory, MemoryConfig, MemoryMetrics};
use crate::msg::{MemData, MulReq, MulResp, XcelReq, XcelResp};

/// Address of the first data set.
pub const DATA_BASE: u32 = 0x1000;

/// Distance between consecutive data sets.
pub const DATA_STRIDE: u32 = 0x3000;

/// Address at which data set `i` is placed when the first is at `base`.
#[must_use]
pub fn data_set_base(base: u32, i: usize) -> u32 {
    let i = u32::try_from(i).unwrap_or(u32::MAX);
    base.wrapping_add(DATA_STRIDE.wrapping_mul(i))
}

/// Sum as the accelerator computes it.
#[must_use]
pub fn accumulate(data: &[u32]) -> u32 {
    data.iter().fold(0, |acc, v| acc.wrapping_add(*v))
}

/// The requests to sum `size` words at `base` and the responses expected.
#[must_use]
pub fn accumulate_msgs(base: u32, size: u32, result: u32) -> Vec<(XcelReq, XcelResp)> {
    vec![
        (XcelReq::write(XR_BASE, base), XcelResp::write()),
        (XcelReq::write(XR_SIZE, size), XcelResp::write()),
        (XcelReq::write(XR_GO, 0), XcelResp::write()),
        (XcelReq::read(XR_GO), XcelResp::read(result)),
    ]
}

/// One accumulator test case.
#[derive(Clone, Debug)]
pub struct AccumTest {
    /// Data sets summed one after the other.
    pub data: Vec<Vec<u32>>,

    /// Address of the first data set.
    pub base: u32,

    /// Cycles before the first request and between requests.
    pub src_delay: u64,

    /// Cycles before the first response and between responses.
    pub sink_delay: u64,

    pub memory: MemoryConfig,

    pub max_cycles: u64,
}

impl AccumTest {
    #[must_use]
    pub fn new(data: Vec<Vec<u32>>) -> Self {
        Self {
            data,
            base: DATA_BASE,
            src_delay: 0,
            sink_delay: 0,
            memory: MemoryConfig::default(),
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    #[must_use]
    pub fn with_delays(mut self, src_delay: u64, sink_delay: u64) -> Self {
        self.src_delay = src_delay;
        self.sink_delay = sink_delay;
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    #[must_use]
    pub fn with_memory(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    fn msgs(&self) -> Vec<(XcelReq, XcelResp)> {
        self.data
            .iter()
            .enumerate()
            .flat_map(|(i, data)| {
                let size = u32::try_from(data.len()).unwrap_or(u32::MAX);
                accumulate_msgs(data_set_base(self.base, i), size, accumulate(data))
            })
            .collect()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<XcelReq> {
        self.msgs().into_iter().map(|(req, _)| req).collect()
    }

    #[must_use]
    pub fn expected_responses(&self) -> Vec<XcelResp> {
        self.msgs().into_iter().map(|(_, resp)| resp).collect()
    }

    /// Place every data set in memory.
    pub fn load<D: MemData>(&self, memory: &Memory<D>) {
        for (i, data) in self.data.iter().enumerate() {
            let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
            memory.write_mem(data_set_base(self.base, i), &bytes);
        }
    }
}

/// What a harness observed.
#[derive(Clone, Debug)]
pub struct AccumOutcome {
    pub responses: Vec<XcelResp>,
    pub cycles: u64,
    pub memory: MemoryMetrics,
}

/// Run `test` through an accumulator of the given level connected directly
/// to a memory.
///
/// Responses are checked as they arrive so a wrong response stops the
/// simulation with an error.
pub fn run_accumulate(
    engine: &mut Engine,
    level: Level,
    test: &AccumTest,
) -> Result<AccumOutcome, SimError> {
    let top = engine.top().clone();

    let source = Source::new_and_register(
        engine,
        &top,
        "source",
        Some(Box::new(test.requests().into_iter())),
    )?;
    source.set_delays(test.src_delay, test.src_delay);
    let sink =
        Sink::new_and_register_with_expected(engine, &top, "sink", test.expected_responses())?;
    sink.set_delays(test.sink_delay, test.sink_delay);

    let xcel = new_accum_xcel(engine, &top, "xcel", level)?;
    let memory = Memory::<u32>::new_and_register(engine, &top, "memory", test.memory.clone())?;
    test.load(&memory);

    connect_port!(source, tx => xcel, xcel_rx)?;
    connect_port!(xcel, xcel_tx => sink, rx)?;
    connect_port!(xcel, mem_tx => memory, rx)?;
    connect_port!(memory, tx => xcel, mem_rx)?;

    engine.set_max_cycles(test.max_cycles);
    engine.run()?;

    info!(top ; "{level}: {} responses in {} cycles", sink.num_sunk(), engine.cycle());
    Ok(AccumOutcome {
        responses: sink.received(),
        cycles: engine.cycle(),
        memory: memory.metrics(),
    })
}

/// Run `requests` through the chosen multiplier and return the responses
/// and the number of cycles taken.
pub fn run_int_mul(
    engine: &mut Engine,
    model: IntMulModel,
    requests: &[MulReq],
    src_delay: u64,
    sink_delay: u64,
) -> Result<(Vec<MulResp>, u64), SimError> {
    let top = engine.top().clone();

    let source = Source::new_and_register(
        engine,
        &top,
        "source",
        Some(Box::new(requests.to_vec().into_iter())),
    )?;
    source.set_delays(src_delay, src_delay);
    let expected: Vec<MulResp> = requests.iter().map(MulReq::product).collect();
    let sink: Rc<Sink<MulResp>> =
        Sink::new_and_register_with_expected(engine, &top, "sink", expected)?;
    sink.set_delays(sink_delay, sink_delay);

    let multiplier = new_int_mul(engine, &top, "mul", model)?;
    connect_port!(source, tx => multiplier, rx)?;
    connect_port!(multiplier, tx => sink, rx)?;

    engine.run()?;
    Ok((sink.received(), engine.cycle()))
}
