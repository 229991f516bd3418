// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use cascade_engine::test_helpers::start_test;
use cascade_engine::time::clock::{COMMIT_PHASE, Clock, SETTLE_PHASE};
use cascade_engine::traits::Evaluate;
use cascade_engine::types::SimResult;

/// Records the clock as seen in each phase.
struct Recorder {
    clock: Clock,
    seen: RefCell<Vec<(u64, u32)>>,
}

impl Evaluate for Recorder {
    fn settle(&self) -> SimResult {
        let now = self.clock.tick_now();
        let mut seen = self.seen.borrow_mut();
        if seen.last() != Some(&(now.tick(), now.phase())) {
            seen.push((now.tick(), now.phase()));
        }
        Ok(())
    }

    fn commit(&self) -> SimResult {
        let now = self.clock.tick_now();
        self.seen.borrow_mut().push((now.tick(), now.phase()));
        Ok(())
    }
}

#[test]
fn phases_per_cycle() {
    let mut engine = start_test(file!());

    let recorder = Rc::new(Recorder {
        clock: engine.default_clock(),
        seen: RefCell::new(Vec::new()),
    });
    engine.register(recorder.clone());
    engine.run_for(2).unwrap();

    assert_eq!(
        *recorder.seen.borrow(),
        vec![
            (0, SETTLE_PHASE),
            (0, COMMIT_PHASE),
            (1, SETTLE_PHASE),
            (1, COMMIT_PHASE)
        ]
    );
}

#[test]
fn default_clock_is_1ghz() {
    let mut engine = start_test(file!());

    let clock = engine.default_clock();
    assert_eq!(clock.freq_mhz(), 1000.0);

    engine.run_for(5).unwrap();
    assert_eq!(clock.tick_now().tick(), 5);
    assert_eq!(engine.time_now_ns(), 5.0);
}

#[test]
fn reset_keeps_time() {
    let mut engine = start_test(file!());

    engine.run_for(3).unwrap();
    engine.reset();
    assert_eq!(engine.cycle(), 3);
}
