// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_components::types::DataGenerator;
use cascade_components::{connect_port, option_box_chain, option_box_repeat};
use cascade_engine::run_simulation;
use cascade_engine::test_helpers::start_test;

#[test]
fn source_delays() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 3)).unwrap();
    source.set_delays(3, 2);
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    // Messages leave in cycles 3, 6 and 9
    engine.run_for(4).unwrap();
    assert_eq!(sink.num_sunk(), 1);
    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), 3);
    assert_eq!(engine.cycle(), 10);
}

#[test]
fn sink_delays() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 3)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    sink.set_delays(1, 1);
    connect_port!(source, tx => sink, rx).unwrap();

    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), 3);
    assert_eq!(engine.cycle(), 6);
}

#[test]
fn chained_generators() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let data: Option<DataGenerator<i32>> =
        option_box_chain!(option_box_repeat!(1 ; 2), option_box_repeat!(2 ; 2));
    let source = Source::new_and_register(&engine, top, "source", data).unwrap();
    let sink =
        Sink::new_and_register_with_expected(&engine, top, "sink", vec![1, 1, 2, 2]).unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), 4);
}

#[test]
fn new_generator_after_exhausted() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 2)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    run_simulation!(engine);
    source.set_generator(option_box_repeat!(3 ; 1));
    run_simulation!(engine);
    assert_eq!(sink.received(), vec![1, 1, 3]);
}

#[test]
fn expected_mismatch() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let source = Source::new_and_register(
        &engine,
        top,
        "source",
        Some(Box::new(vec![1, 3].into_iter())),
    )
    .unwrap();
    let sink = Sink::new_and_register_with_expected(&engine, top, "sink", vec![1, 2]).unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    run_simulation!(engine, "Error: top::sink: message 1 expected 2 but received 3");
}

#[test]
fn waits_for_expected() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 2)).unwrap();
    let sink = Sink::new_and_register_with_expected(&engine, top, "sink", vec![1, 1, 1]).unwrap();
    connect_port!(source, tx => sink, rx).unwrap();
    engine.set_max_cycles(20);

    run_simulation!(engine, "Error: top: not idle after 20 cycles");
}
