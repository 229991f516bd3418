// Copyright (c) 2024 Graphcore Ltd. All rights reserved.

//! Latency policies.
//!
//! A [`Latency`] decides how many cycles a unit spends on a request. The
//! count starts in the cycle the request fires into the unit, not when it is
//! first offered.

use cascade_engine::sim_error;
use cascade_engine::types::SimError;
use num_traits::PrimInt;

pub trait Latency<T> {
    /// Number of cycles to spend on `value`.
    fn latency(&self, value: &T) -> u64;
}

/// The same latency for every request.
#[derive(Clone, Copy, Debug)]
pub struct FixedLatency {
    cycles: u64,
}

impl FixedLatency {
    pub fn new(cycles: u64) -> Result<Self, SimError> {
        if cycles == 0 {
            return sim_error!("A fixed latency must be at least 1 cycle");
        }
        Ok(Self { cycles })
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl<T> Latency<T> for FixedLatency {
    fn latency(&self, _value: &T) -> u64 {
        self.cycles
    }
}

/// A latency computed from the contents of each request.
pub struct VariableLatency<T> {
    latency_fn: Box<dyn Fn(&T) -> u64>,
}

impl<T> VariableLatency<T> {
    pub fn new(latency_fn: impl Fn(&T) -> u64 + 'static) -> Self {
        Self {
            latency_fn: Box::new(latency_fn),
        }
    }
}

impl<T> Latency<T> for VariableLatency<T> {
    fn latency(&self, value: &T) -> u64 {
        (self.latency_fn)(value)
    }
}

/// Number of set bits, the latency of a shift-add iterative unit.
pub fn popcount<N>(value: N) -> u64
where
    N: PrimInt,
{
    u64::from(value.count_ones())
}
