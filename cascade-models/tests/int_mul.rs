// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

use cascade_components::connect_port;
use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_components::traits::Minion;
use cascade_engine::run_simulation;
use cascade_engine::test_helpers::start_test;
use cascade_models::conformance::run_int_mul;
use cascade_models::int_mul::cl::FIXED_LATENCY;
use cascade_models::int_mul::{IntMulModel, IntMulNstageRtl, new_int_mul};
use cascade_models::msg::{MulReq, MulResp};

const ALL_MODELS: [IntMulModel; 9] = [
    IntMulModel::Fl,
    IntMulModel::FixedLatCl,
    IntMulModel::VarLatCl,
    IntMulModel::NstageCl(1),
    IntMulModel::NstageCl(4),
    IntMulModel::NstageRtl(1),
    IntMulModel::NstageRtl(4),
    IntMulModel::NstageRtl(8),
    IntMulModel::NstageRtl(32),
];

fn requests() -> Vec<MulReq> {
    vec![
        MulReq::new(0, 0),
        MulReq::new(1, 1),
        MulReq::new(2, 3),
        MulReq::new(0xffff_ffff, 0xffff_ffff),
        MulReq::new(0x8000_0000, 2),
        MulReq::new(0x1234_5678, 0x9abc_def0),
        MulReq::new(7, 0),
        MulReq::new(0xdead_beef, 0x0000_f0f0),
    ]
}

#[test]
fn all_models_agree() {
    let expected: Vec<MulResp> = requests().iter().map(MulReq::product).collect();
    for model in ALL_MODELS {
        let mut engine = start_test(file!());
        let (responses, _) = run_int_mul(&mut engine, model, &requests(), 0, 0).unwrap();
        assert_eq!(responses, expected, "{model}");
    }
}

#[test]
fn all_models_agree_with_delays() {
    let expected: Vec<MulResp> = requests().iter().map(MulReq::product).collect();
    for model in ALL_MODELS {
        let mut engine = start_test(file!());
        let (responses, _) = run_int_mul(&mut engine, model, &requests(), 3, 5).unwrap();
        assert_eq!(responses, expected, "{model}");
    }
}

#[test]
fn fixed_latency() {
    let mut engine = start_test(file!());
    let (_, cycles) =
        run_int_mul(&mut engine, IntMulModel::FixedLatCl, &[MulReq::new(3, 4)], 0, 0).unwrap();
    // Accepted in cycle 0, response leaves in cycle 32
    assert_eq!(cycles, FIXED_LATENCY + 1);
}

#[test]
fn variable_latency_is_popcount() {
    let mut engine = start_test(file!());
    let (_, cycles) =
        run_int_mul(&mut engine, IntMulModel::VarLatCl, &[MulReq::new(3, 0xf0f0)], 0, 0).unwrap();
    assert_eq!(cycles, 9);

    // Multiplying by zero still takes a cycle
    let mut engine = start_test(file!());
    let (_, cycles) =
        run_int_mul(&mut engine, IntMulModel::VarLatCl, &[MulReq::new(3, 0)], 0, 0).unwrap();
    assert_eq!(cycles, 2);
}

#[test]
fn pipelines_match_rtl_timing() {
    let requests = requests();
    for nstages in [1, 2, 4, 8] {
        let mut engine = start_test(file!());
        let (_, cl_cycles) =
            run_int_mul(&mut engine, IntMulModel::NstageCl(nstages), &requests, 0, 0).unwrap();
        let mut engine = start_test(file!());
        let (_, rtl_cycles) =
            run_int_mul(&mut engine, IntMulModel::NstageRtl(nstages), &requests, 0, 0).unwrap();

        // One request per cycle, the last leaves nstages cycles after it arrived
        assert_eq!(rtl_cycles, requests.len() as u64 + nstages as u64);
        assert_eq!(cl_cycles, rtl_cycles);
    }
}

#[test]
fn functional_is_combinational() {
    let mut engine = start_test(file!());
    let (_, cycles) = run_int_mul(&mut engine, IntMulModel::Fl, &requests(), 0, 0).unwrap();
    assert_eq!(cycles, requests().len() as u64);
}

#[test]
fn rtl_stalls_on_backpressure() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();

    let source = Source::new_and_register(
        &engine,
        &top,
        "source",
        Some(Box::new(requests().into_iter())),
    )
    .unwrap();
    let mul = IntMulNstageRtl::new_and_register(&engine, &top, "mul", 4).unwrap();
    let expected = requests().iter().map(MulReq::product).collect();
    let sink = Sink::new_and_register_with_expected(&engine, &top, "sink", expected).unwrap();
    sink.set_delays(10, 2);
    connect_port!(source, tx => mul, rx).unwrap();
    connect_port!(mul, tx => sink, rx).unwrap();

    engine.run_for(10).unwrap();
    assert_eq!(mul.num_in_flight(), mul.nstages());
    assert_eq!(sink.num_sunk(), 0);

    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), requests().len());
}

#[test]
fn rtl_stage_count_must_divide_width() {
    let engine = start_test(file!());
    let top = engine.top().clone();
    let result = new_int_mul(&engine, &top, "mul", IntMulModel::NstageRtl(3));
    match result {
        Ok(_) => panic!("Expected an error!"),
        Err(e) => assert_eq!(
            format!("{e}"),
            "Error: top::mul: 3 stages do not divide 32 bits"
        ),
    }
}
