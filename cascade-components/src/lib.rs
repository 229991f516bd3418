// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Simulation components.
//!
//! Every component is created with a `new_and_register()` function which
//! registers it with the [`Engine`](cascade_engine::engine::Engine) so that
//! it is evaluated every cycle.
//!
//! Input ports are exposed as `port_<name>()` and output ports are connected
//! with `connect_port_<name>()`, which is what the
//! [`connect_port!`](crate::connect_port) macro expects.

pub mod connect;
pub mod funnel;
pub mod iterative;
pub mod latency;
pub mod pipeline;
pub mod queue;
pub mod router;
pub mod sink;
pub mod source;
pub mod traits;
pub mod types;
