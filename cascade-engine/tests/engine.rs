// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_components::{connect_port, option_box_repeat};
use cascade_engine::run_simulation;
use cascade_engine::test_helpers::start_test;

#[test]
fn all_registered() {
    let mut engine = start_test(file!());

    let top = engine.top();
    let source: Rc<Source<i32>> = Source::new_and_register(&engine, top, "source", None).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();

    source.connect_port_tx(sink.port_rx()).unwrap();
    assert_eq!(engine.registry().num_components(), 2);
    run_simulation!(engine);

    // Nothing to do still takes one cycle
    assert_eq!(engine.cycle(), 1);
    assert_eq!(sink.num_sunk(), 0);
}

#[test]
fn one_message_per_cycle() {
    let mut engine = start_test(file!());

    let top = engine.top();
    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(7 ; 5)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), 5);
    assert_eq!(engine.cycle(), 5);
}

#[test]
fn run_for_exact_cycles() {
    let mut engine = start_test(file!());

    let top = engine.top();
    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 10)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    engine.run_for(3).unwrap();
    assert_eq!(sink.num_sunk(), 3);
    assert!(!engine.is_idle());

    run_simulation!(engine);
    assert_eq!(sink.num_sunk(), 10);
}

#[test]
fn run_until_condition() {
    let mut engine = start_test(file!());

    let top = engine.top();
    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 10)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    {
        let sink = sink.clone();
        engine.run_until(move || sink.num_sunk() == 4, 100).unwrap();
    }
    assert_eq!(sink.num_sunk(), 4);
    assert_eq!(engine.cycle(), 4);
}

#[test]
fn run_until_gives_up() {
    let mut engine = start_test(file!());

    let top = engine.top();
    let source =
        Source::new_and_register(&engine, top, "source", option_box_repeat!(1 ; 2)).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source, tx => sink, rx).unwrap();

    let result = {
        let sink = sink.clone();
        engine.run_until(move || sink.num_sunk() == 3, 10)
    };
    assert_eq!(
        format!("{}", result.unwrap_err()),
        "Error: top: condition not met within 10 cycles"
    );
}
