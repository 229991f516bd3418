// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use cascade_components::connect_port;
use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_engine::run_simulation;
use cascade_engine::test_helpers::start_test;
use cascade_models::accum_xcel::{Level, XcelRegs, XcelState, new_accum_xcel};
use cascade_models::conformance::{AccumTest, run_accumulate};
use cascade_models::memory::{Memory, MemoryConfig};
use cascade_models::msg::{XcelReq, XcelResp};

fn mini() -> AccumTest {
    AccumTest::new(vec![vec![1, 2, 3, 4]])
}

fn multi() -> AccumTest {
    AccumTest::new(vec![
        vec![1, 2, 3, 4],
        (0..32).collect(),
        vec![0xffff_ffff, 2, 0x8000_0000, 0x8000_0000],
        vec![42],
    ])
}

/// Run a test at every level and check they all see the same responses.
fn check_all_levels(test: &AccumTest) -> Vec<u64> {
    Level::ALL
        .iter()
        .map(|level| {
            let mut engine = start_test(file!());
            let outcome = run_accumulate(&mut engine, *level, test).unwrap();
            assert_eq!(outcome.responses, test.expected_responses(), "{level}");
            outcome.cycles
        })
        .collect()
}

#[test]
fn mini_result() {
    let test = mini();
    assert_eq!(test.expected_responses()[3], XcelResp::read(10));
    check_all_levels(&test);
}

#[test]
fn mini_cycles() {
    // The functional model streams its reads, the others take three cycles
    // per element and queue every input.
    assert_eq!(check_all_levels(&mini()), vec![10, 17, 17]);
}

#[test]
fn mini_with_delays() {
    let memory = MemoryConfig::new(3).with_stalls(4, 2);
    let test = mini().with_delays(3, 14).with_memory(memory);
    let cycles = check_all_levels(&test);
    assert!(cycles.iter().all(|c| *c > 17));
}

#[test]
fn multiple_data_sets() {
    check_all_levels(&multi());
}

#[test]
fn multiple_data_sets_with_delays() {
    let memory = MemoryConfig::new(2).with_stalls(3, 1);
    check_all_levels(&multi().with_delays(2, 5).with_memory(memory));
}

#[test]
fn sum_wraps() {
    let test = AccumTest::new(vec![vec![0xffff_ffff, 1, 5]]);
    assert_eq!(test.expected_responses()[3], XcelResp::read(5));
    check_all_levels(&test);
}

#[test]
fn one_read_per_element() {
    let test = multi();
    let num_elements: usize = test.data.iter().map(Vec::len).sum();
    for level in Level::ALL {
        let mut engine = start_test(file!());
        let outcome = run_accumulate(&mut engine, level, &test).unwrap();
        assert_eq!(outcome.memory.num_reads, num_elements);
        assert_eq!(outcome.memory.bytes_read, num_elements * 4);
        assert_eq!(outcome.memory.num_writes, 0);
    }
}

#[test]
fn zero_size_stays_in_config() {
    let requests = vec![
        XcelReq::write(1, 0x1000),
        XcelReq::write(2, 0),
        XcelReq::write(0, 0),
        XcelReq::read(0),
    ];
    let expected = vec![
        XcelResp::write(),
        XcelResp::write(),
        XcelResp::write(),
        XcelResp::read(0),
    ];

    for level in Level::ALL {
        let mut engine = start_test(file!());
        let top = engine.top().clone();

        let source = Source::new_and_register(
            &engine,
            &top,
            "source",
            Some(Box::new(requests.clone().into_iter())),
        )
        .unwrap();
        let sink =
            Sink::new_and_register_with_expected(&engine, &top, "sink", expected.clone()).unwrap();
        let xcel = new_accum_xcel(&engine, &top, "xcel", level).unwrap();
        let memory = Memory::<u32>::new_and_register(
            &engine,
            &top,
            "memory",
            MemoryConfig::default(),
        )
        .unwrap();
        connect_port!(source, tx => xcel, xcel_rx).unwrap();
        connect_port!(xcel, xcel_tx => sink, rx).unwrap();
        connect_port!(xcel, mem_tx => memory, rx).unwrap();
        connect_port!(memory, tx => xcel, mem_rx).unwrap();

        run_simulation!(engine);
        assert_eq!(xcel.state(), XcelState::Config);
        assert_eq!(memory.metrics().num_reads, 0);
    }
}

#[test]
fn reset_mid_compute() {
    let test = mini();

    for level in Level::ALL {
        let mut engine = start_test(file!());
        let top = engine.top().clone();

        let source = Source::new_and_register(
            &engine,
            &top,
            "source",
            Some(Box::new(test.requests().into_iter())),
        )
        .unwrap();
        let sink = Sink::new_and_register(&engine, &top, "sink").unwrap();
        let xcel = new_accum_xcel(&engine, &top, "xcel", level).unwrap();
        let memory =
            Memory::<u32>::new_and_register(&engine, &top, "memory", MemoryConfig::new(2)).unwrap();
        test.load(&memory);
        connect_port!(source, tx => xcel, xcel_rx).unwrap();
        connect_port!(xcel, xcel_tx => sink, rx).unwrap();
        connect_port!(xcel, mem_tx => memory, rx).unwrap();
        connect_port!(memory, tx => xcel, mem_rx).unwrap();

        engine.run_for(6).unwrap();
        assert_ne!(xcel.state(), XcelState::Config, "{level}");

        engine.reset();
        assert_eq!(xcel.state(), XcelState::Config);
        assert_eq!(xcel.regs(), XcelRegs::default());
        assert_eq!(memory.num_outstanding(), 0);

        // The memory keeps its contents so the same sum can be repeated
        let before = sink.num_sunk();
        source.set_generator(Some(Box::new(test.requests().into_iter())));
        run_simulation!(engine);
        assert_eq!(sink.received()[before..], test.expected_responses()[..], "{level}");
    }
}

#[test]
fn registers_hold_configuration() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();
    let source = Source::new_and_register(
        &engine,
        &top,
        "source",
        Some(Box::new(vec![XcelReq::write(1, 0x4000), XcelReq::write(2, 3)].into_iter())),
    )
    .unwrap();
    let sink = Sink::new_and_register(&engine, &top, "sink").unwrap();
    let xcel = new_accum_xcel(&engine, &top, "xcel", Level::Rtl).unwrap();
    let memory =
        Memory::<u32>::new_and_register(&engine, &top, "memory", MemoryConfig::default()).unwrap();
    connect_port!(source, tx => xcel, xcel_rx).unwrap();
    connect_port!(xcel, xcel_tx => sink, rx).unwrap();
    connect_port!(xcel, mem_tx => memory, rx).unwrap();
    connect_port!(memory, tx => xcel, mem_rx).unwrap();

    run_simulation!(engine);
    let regs = xcel.regs();
    assert_eq!((regs.base, regs.size), (0x4000, 3));
    assert_eq!(sink.num_sunk(), 2);
}

#[test]
fn rtl_input_register_waits_for_response_ready() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();
    let source = Source::new_and_register(
        &engine,
        &top,
        "source",
        Some(Box::new(vec![XcelReq::write(1, 0x4000), XcelReq::write(2, 3)].into_iter())),
    )
    .unwrap();
    let sink = Sink::new_and_register(&engine, &top, "sink").unwrap();
    sink.set_delays(6, 0);
    let xcel = new_accum_xcel(&engine, &top, "xcel", Level::Rtl).unwrap();
    let memory =
        Memory::<u32>::new_and_register(&engine, &top, "memory", MemoryConfig::default()).unwrap();
    connect_port!(source, tx => xcel, xcel_rx).unwrap();
    connect_port!(xcel, xcel_tx => sink, rx).unwrap();
    connect_port!(xcel, mem_tx => memory, rx).unwrap();
    connect_port!(memory, tx => xcel, mem_rx).unwrap();

    // The first write is held until its response can be sent
    engine.run_for(4).unwrap();
    assert_eq!(sink.num_sunk(), 0);
    assert_eq!(xcel.regs().base, 0);

    run_simulation!(engine);
    let regs = xcel.regs();
    assert_eq!((regs.base, regs.size), (0x4000, 3));
    assert_eq!(sink.received(), vec![XcelResp::write(), XcelResp::write()]);
}

fn build_violation(level: Level, request: XcelReq) -> cascade_engine::engine::Engine {
    let engine = start_test(file!());
    let top = engine.top().clone();
    let source: Rc<Source<XcelReq>> = Source::new_and_register(
        &engine,
        &top,
        "source",
        Some(Box::new(std::iter::once(request))),
    )
    .unwrap();
    let sink: Rc<Sink<XcelResp>> = Sink::new_and_register(&engine, &top, "sink").unwrap();
    let xcel = new_accum_xcel(&engine, &top, "xcel", level).unwrap();
    let memory =
        Memory::<u32>::new_and_register(&engine, &top, "memory", MemoryConfig::default()).unwrap();
    connect_port!(source, tx => xcel, xcel_rx).unwrap();
    connect_port!(xcel, xcel_tx => sink, rx).unwrap();
    connect_port!(xcel, mem_tx => memory, rx).unwrap();
    connect_port!(memory, tx => xcel, mem_rx).unwrap();
    engine
}

#[test]
fn write_to_unmapped_register() {
    for level in Level::ALL {
        let mut engine = build_violation(level, XcelReq::write(5, 1));
        run_simulation!(engine, "Error: Protocol violation: wr of unmapped register xr5");
    }
}

#[test]
fn read_of_config_register() {
    for level in Level::ALL {
        let mut engine = build_violation(level, XcelReq::read(2));
        run_simulation!(engine, "Error: Protocol violation: rd of unmapped register xr2");
    }
}
