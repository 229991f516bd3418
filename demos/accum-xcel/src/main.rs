// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Sum an array with the accumulator accelerator.
//!
//! The accelerator is connected to a test memory holding the array. A
//! source writes the base address and size registers, starts the
//! accumulation and reads the result back.
//!
//! ```text
//! cargo run --bin accum-xcel -- --level rtl --data 1,2,3,4 --mem-latency 3
//! ```
//!
//! With `--model` set to a multiplier (e.g. `var-lat-cl`) consecutive pairs
//! of data words are multiplied instead.

mod config;

use std::rc::Rc;

use cascade_engine::engine::Engine;
use cascade_engine::sim_error;
use cascade_engine::types::SimError;
use cascade_models::conformance::{AccumTest, accumulate, run_accumulate, run_int_mul};
use cascade_models::int_mul::IntMulModel;
use cascade_models::msg::MulReq;
use cascade_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use cascade_track::entity::Entity;
use cascade_track::{Tracker, error, info, warn};
use clap::Parser;

use crate::config::{ACCUM_MODEL, Cli, SimConfig};

fn build_tracker(config: &SimConfig) -> Result<Tracker, SimError> {
    let trackers = TrackersConfig {
        stdout: TrackerConfig {
            enable: true,
            level: config.log_level,
            filter_regex: &config.log_filter,
            file: None,
        },
        file: TrackerConfig {
            enable: config.trace_file.is_some(),
            level: log::Level::Trace,
            filter_regex: &config.log_filter,
            file: config.trace_file.as_deref(),
        },
    };
    setup_trackers(&trackers).map_err(|e| SimError(e.to_string()))
}

fn run_accum_xcel(
    engine: &mut Engine,
    top: &Rc<Entity>,
    config: &SimConfig,
) -> Result<(), SimError> {
    let mut test = AccumTest::new(vec![config.data.clone()])
        .with_base(config.base_address)
        .with_memory(config.memory_config());
    test.max_cycles = config.max_cycles;

    info!(top ;
        "Summing {} words at {:#x} with the {} accelerator",
        config.data.len(),
        config.base_address,
        config.level,
    );
    let outcome = run_accumulate(engine, config.level, &test)?;

    let expected = accumulate(&config.data);
    let result = outcome.responses.last().map(|resp| resp.data);
    if result != Some(expected) {
        error!(top ; "Expected {expected:#x}, got {result:x?}");
        return sim_error!("Wrong result");
    }

    let mem = outcome.memory;
    info!(top ; "Pass: result {expected} ({expected:#x}) in {} cycles", outcome.cycles);
    info!(top ;
        "Memory: {} reads ({} bytes), {} writes",
        mem.num_reads,
        mem.bytes_read,
        mem.num_writes,
    );
    Ok(())
}

fn run_multiplier(
    engine: &mut Engine,
    top: &Rc<Entity>,
    config: &SimConfig,
) -> Result<(), SimError> {
    let model: IntMulModel = match config.model.parse() {
        Ok(model) => model,
        Err(e) => return sim_error!(e),
    };
    if config.data.len() % 2 != 0 {
        warn!(top ; "Ignoring the last of {} data words", config.data.len());
    }
    let requests: Vec<MulReq> = config
        .data
        .chunks_exact(2)
        .map(|pair| MulReq::new(pair[0], pair[1]))
        .collect();

    engine.set_max_cycles(config.max_cycles);
    let (responses, cycles) = run_int_mul(engine, model, &requests, 0, 0)?;
    for (request, response) in requests.iter().zip(&responses) {
        info!(top ; "{request} = {response}");
    }
    info!(top ;
        "Pass: {} products from the {model} multiplier in {cycles} cycles",
        responses.len(),
    );
    Ok(())
}

fn main() -> Result<(), SimError> {
    let cli = Cli::parse();
    let config = SimConfig::load(&cli).map_err(|e| SimError(e.to_string()))?;
    let tracker = build_tracker(&config)?;

    let mut engine = Engine::new(&tracker);
    let top = engine.top().clone();

    let result = if config.model == ACCUM_MODEL {
        run_accum_xcel(&mut engine, &top, &config)
    } else {
        run_multiplier(&mut engine, &top, &config)
    };
    if let Err(e) = &result {
        error!(top ; "{e}");
    }

    tracker.shutdown();
    result
}
