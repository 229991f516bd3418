// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Models built from the [CASCADE components](../cascade_components/index.html).
//!
//! Every model that is offered at more than one level of detail exposes the
//! same ports and message types at each level so that the levels can be
//! swapped without changing the surrounding design:
//!  - **FL** (functional level): computes results with no notion of timing
//!    beyond the handshake.
//!  - **CL** (cycle level): reproduces the cycle timing of the hardware
//!    using behavioural state.
//!  - **RTL** (register-transfer level): explicit
//!    [registers](cascade_engine::register::Reg) updated on the clock edge.
//!
//! The models are:
//!  - [`int_mul`]: a 32-bit integer multiplier.
//!  - [`memory`]: a byte-addressed test memory.
//!  - [`accum_xcel`]: an accelerator that sums an array held in memory.
//!  - [`subsystem`]: a processor-side port, memory and accelerator sharing
//!    one memory through a funnel and a router.
//!
//! [`conformance`] contains the harness used to check that all levels of a
//! model produce the same results.

pub mod accum_xcel;
pub mod conformance;
pub mod int_mul;
pub mod memory;
pub mod msg;
pub mod subsystem;
