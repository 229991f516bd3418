// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Ensure that each of the track macros emits the expected events

use std::rc::Rc;

use cascade_track::entity::{Entity, toplevel};
use cascade_track::id::Unique;
use cascade_track::test_helpers::check_and_clear;
use cascade_track::{Id, connect, debug, enter, exit, info, set_cycle, test_init, trace, value};

#[test]
fn entity_creation() {
    let (test_tracker, tracker) = test_init!(10);
    let top = toplevel(&tracker, "top");
    let _child = Entity::new(&top, "child");
    check_and_clear(
        &test_tracker,
        &[
            "0: created 10, top",
            "10: created 11, top::child",
        ],
    );
}

#[test]
fn entity_destroyed_on_drop() {
    let (test_tracker, tracker) = test_init!(20);
    let top = toplevel(&tracker, "top");
    {
        let _child = Entity::new(&top, "child");
    }
    check_and_clear(
        &test_tracker,
        &[
            "0: created 20, top",
            "20: created 21, top::child",
            "20: destroyed 21",
        ],
    );
}

#[test]
fn enter_exit_value() {
    let (test_tracker, tracker) = test_init!(30);
    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["created 30"]);

    let msg: u32 = 7;
    enter!(top ; msg.id());
    exit!(top ; Id(8));
    value!(top ; 3usize);
    check_and_clear(
        &test_tracker,
        &["30: enter 7", "30: exit 8", "30: value 3"],
    );
}

#[test]
fn log_levels() {
    let (test_tracker, tracker) = test_init!(40);
    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["created 40"]);

    trace!(top ; "t {}", 1);
    debug!(top ; "d {}", 2);
    info!(top ; "i {}", 3);
    cascade_track::warn!(top ; "w");
    cascade_track::error!(top ; "e");
    check_and_clear(
        &test_tracker,
        &[
            "40:TRACE: t 1",
            "40:DEBUG: d 2",
            "40:INFO: i 3",
            "40:WARN: w",
            "40:ERROR: e",
        ],
    );
}

#[test]
fn connect_entities() {
    let (test_tracker, tracker) = test_init!(50);
    let top = toplevel(&tracker, "top");
    let a = Rc::new(Entity::new(&top, "a"));
    let b = Rc::new(Entity::new(&top, "b"));
    check_and_clear(&test_tracker, &["created 50", "created 51", "created 52"]);

    connect!(a ; b);
    check_and_clear(&test_tracker, &["51: connect to 52"]);
}

#[test]
fn cycle_events() {
    let (test_tracker, tracker) = test_init!(60);
    let top = toplevel(&tracker, "top");
    check_and_clear(&test_tracker, &["created 60"]);

    set_cycle!(top ; 1);
    set_cycle!(top ; 2);
    check_and_clear(&test_tracker, &["60: cycle 1", "60: cycle 2"]);
}
