// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

use cascade_components::connect_port;
use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_engine::run_simulation;
use cascade_engine::test_helpers::start_test;
use cascade_models::accum_xcel::{Level, XcelState};
use cascade_models::conformance::AccumTest;
use cascade_models::memory::MemoryConfig;
use cascade_models::msg::{MemReq, MemResp};
use cascade_models::subsystem::ProcMemXcel;

const PROC_BASE: u32 = 0x8000;
const NUM_PROC_WORDS: u8 = 8;

/// Processor traffic: write every word then read them all back.
fn proc_traffic() -> (Vec<MemReq<u32>>, Vec<MemResp<u32>>) {
    let value = |i: u8| 0x100 * u32::from(i) + 7;
    let addr = |i: u8| PROC_BASE + 4 * u32::from(i);

    let mut requests = Vec::new();
    let mut responses = Vec::new();
    for i in 0..NUM_PROC_WORDS {
        requests.push(MemReq::write(i, addr(i), 0, value(i)));
        responses.push(MemResp::write(i, 0));
    }
    for i in 0..NUM_PROC_WORDS {
        let tag = NUM_PROC_WORDS + i;
        requests.push(MemReq::read(tag, addr(i), 0));
        responses.push(MemResp::read(tag, 0, value(i)));
    }
    (requests, responses)
}

fn xcel_test() -> AccumTest {
    AccumTest::new(vec![vec![1, 2, 3, 4], (10..20).collect()])
}

#[test]
fn shared_memory_routes_responses() {
    for level in Level::ALL {
        for (proc_delay, mem_config) in [
            (0, MemoryConfig::default()),
            (2, MemoryConfig::new(3).with_stalls(5, 2)),
        ] {
            let mut engine = start_test(file!());
            let top = engine.top().clone();

            let (proc_requests, proc_responses) = proc_traffic();
            let test = xcel_test();

            let subsystem =
                ProcMemXcel::new(&engine, &top, "sys", level, mem_config).unwrap();
            test.load(subsystem.memory());

            let proc_source = Source::new_and_register(
                &engine,
                &top,
                "proc_source",
                Some(Box::new(proc_requests.into_iter())),
            )
            .unwrap();
            proc_source.set_delays(proc_delay, proc_delay);
            let proc_sink =
                Sink::new_and_register_with_expected(&engine, &top, "proc_sink", proc_responses)
                    .unwrap();
            let xcel_source = Source::new_and_register(
                &engine,
                &top,
                "xcel_source",
                Some(Box::new(test.requests().into_iter())),
            )
            .unwrap();
            let xcel_sink = Sink::new_and_register_with_expected(
                &engine,
                &top,
                "xcel_sink",
                test.expected_responses(),
            )
            .unwrap();

            connect_port!(proc_source, tx => subsystem, proc_mem_rx).unwrap();
            connect_port!(subsystem, proc_mem_tx => proc_sink, rx).unwrap();
            connect_port!(xcel_source, tx => subsystem, xcel_rx).unwrap();
            connect_port!(subsystem, xcel_tx => xcel_sink, rx).unwrap();

            run_simulation!(engine);
            assert_eq!(proc_sink.num_sunk(), 2 * usize::from(NUM_PROC_WORDS));
            assert_eq!(xcel_sink.received(), test.expected_responses(), "{level}");
            assert_eq!(subsystem.xcel().state(), XcelState::Config);

            let num_elements: usize = test.data.iter().map(Vec::len).sum();
            let metrics = subsystem.memory().metrics();
            assert_eq!(metrics.num_writes, usize::from(NUM_PROC_WORDS));
            assert_eq!(metrics.num_reads, usize::from(NUM_PROC_WORDS) + num_elements);
        }
    }
}

#[test]
fn processor_sees_accelerator_data() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();
    let test = xcel_test();

    let subsystem =
        ProcMemXcel::new(&engine, &top, "sys", Level::Rtl, MemoryConfig::default()).unwrap();
    test.load(subsystem.memory());

    let expected = vec![MemResp::read(0, 0, 3), MemResp::read(1, 2, 0x0d)];
    let proc_source = Source::new_and_register(
        &engine,
        &top,
        "proc_source",
        Some(Box::new(
            vec![MemReq::read(0, 0x1008, 0), MemReq::read(1, 0x4000 + 12, 2)].into_iter(),
        )),
    )
    .unwrap();
    let proc_sink =
        Sink::new_and_register_with_expected(&engine, &top, "proc_sink", expected).unwrap();
    connect_port!(proc_source, tx => subsystem, proc_mem_rx).unwrap();
    connect_port!(subsystem, proc_mem_tx => proc_sink, rx).unwrap();

    // The accelerator is never started
    let xcel_sink = Sink::new_and_register(&engine, &top, "xcel_sink").unwrap();
    connect_port!(subsystem, xcel_tx => xcel_sink, rx).unwrap();

    run_simulation!(engine);
    assert_eq!(proc_sink.num_sunk(), 2);
    assert_eq!(xcel_sink.num_sunk(), 0);
    assert_eq!(subsystem.memory().metrics().num_reads, 2);
}
