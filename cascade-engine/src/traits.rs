// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A set of common traits used across CASCADE Engine.

use std::fmt::{Debug, Display};

use cascade_track::id::Unique;

use crate::types::SimResult;

/// The `Routable` trait allows an object to carry the index of the port it
/// arrived on through a fabric so that a response can be returned to it.
pub trait Routable {
    /// The port index associated with this object.
    fn port(&self) -> usize;

    /// Record the port index associated with this object.
    fn set_port(&mut self, port: usize);
}

/// A super-trait that objects that are passed around the simulation have to
/// implement
///
///  - Clone:       Ports hand out copies of the message being offered so
///    that a receiver can look at it before it fires.
///  - Debug/Display: In order to log messages.
///  - PartialEq:   The engine detects that a port has settled by comparing
///    the message driven onto it.
///  - Unique:      Allows for simple tracing.
///  - 'static:     Components are stored as trait objects.
pub trait SimObject: Clone + Debug + Display + PartialEq + Unique + 'static {}

// Implementations for basic types that can be sent around the simulation for
// testing
impl SimObject for i32 {}
impl SimObject for u32 {}
impl SimObject for usize {}

impl Routable for usize {
    fn port(&self) -> usize {
        *self
    }

    fn set_port(&mut self, port: usize) {
        *self = port;
    }
}

/// The interface every component registered with the
/// [`Engine`](crate::engine::Engine) implements.
pub trait Evaluate {
    /// Combinational phase.
    ///
    /// Drive output ports and the `ready` of input ports from the current
    /// state and the current input signals. This may be called several times
    /// per cycle and must not change the component's state.
    fn settle(&self) -> SimResult;

    /// Sequential phase.
    ///
    /// Update state from the ports that fired this cycle.
    fn commit(&self) -> SimResult;

    /// Return to the state the component was constructed in.
    fn reset(&self) {}

    /// True when the component has no work in progress.
    fn is_idle(&self) -> bool {
        true
    }
}
