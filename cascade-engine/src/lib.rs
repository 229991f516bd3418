// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `CASCADE` - Cycle-Accurate Stepped Component And Dataflow Engine
//!
//! This library provides the core of the [CASCADE Engine](crate::engine)
//! which evaluates cycle-stepped simulation
//! [components](../cascade_components/index.html).
//!
//! Every cycle is split into two phases:
//!  - **settle**: all components drive their output ports and the `ready`
//!    of their input ports from their current state. This is repeated until
//!    no port signal changes.
//!  - **commit**: all components observe which ports *fired* (`valid` and
//!    `ready` both asserted) and update their state.
//!
//! No component can see another component's committed state during the
//! settle phase of the same cycle.
//!
//! # Simple Application
//!
//! A very simple application would look like:
//!
//! ```rust
//! use cascade_components::sink::Sink;
//! use cascade_components::source::Source;
//! use cascade_components::{connect_port, option_box_repeat};
//! use cascade_engine::engine::Engine;
//! use cascade_engine::run_simulation;
//!
//! let mut engine = Engine::default();
//! let top = engine.top().clone();
//! let source = Source::new_and_register(&engine, &top, "source", option_box_repeat!(0x123 ; 10))
//!     .expect("should be able to create and register `Source`");
//! let sink = Sink::new_and_register(&engine, &top, "sink")
//!     .expect("should be able to create and register `Sink`");
//! connect_port!(source, tx => sink, rx)
//!     .expect("should be able to connect `Source` to `Sink`");
//! run_simulation!(engine);
//! assert_eq!(sink.num_sunk(), 10);
//! ```

pub mod engine;
pub mod port;
pub mod register;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;

#[macro_export]
/// Run the simulation until all registered components are idle.
macro_rules! run_simulation {
    ($engine:ident) => {
        $engine.run().unwrap();
    };
    ($engine:ident, $expect:expr) => {
        match $engine.run() {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}
