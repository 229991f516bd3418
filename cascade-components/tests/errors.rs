// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::rc::Rc;

use cascade_components::connect_port;
use cascade_components::sink::Sink;
use cascade_components::source::Source;
use cascade_engine::test_helpers::start_test;

#[test]
#[should_panic(expected = "top::source::tx already connected")]
fn outport_connected_twice() {
    let engine = start_test(file!());
    let top = engine.top();

    let source: Rc<Source<i32>> = Source::new_and_register(&engine, top, "source", None).unwrap();
    let sink_a = Sink::new_and_register(&engine, top, "sink_a").unwrap();
    let sink_b = Sink::new_and_register(&engine, top, "sink_b").unwrap();
    connect_port!(source, tx => sink_a, rx).unwrap();
    connect_port!(source, tx => sink_b, rx).unwrap();
}

#[test]
#[should_panic(expected = "top::sink::rx already connected")]
fn inport_connected_twice() {
    let engine = start_test(file!());
    let top = engine.top();

    let source_a: Rc<Source<i32>> =
        Source::new_and_register(&engine, top, "source_a", None).unwrap();
    let source_b: Rc<Source<i32>> =
        Source::new_and_register(&engine, top, "source_b", None).unwrap();
    let sink = Sink::new_and_register(&engine, top, "sink").unwrap();
    connect_port!(source_a, tx => sink, rx).unwrap();
    connect_port!(source_b, tx => sink, rx).unwrap();
}

#[test]
#[should_panic(expected = "top::source::tx not connected")]
fn unconnected_source() {
    let mut engine = start_test(file!());
    let top = engine.top();

    let _source =
        Source::new_and_register(&engine, top, "source", Some(Box::new(0..2i32))).unwrap();
    engine.run().unwrap();
}
