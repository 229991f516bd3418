// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Arbitration policies for the [`Funnel`](super::Funnel).

use std::rc::Rc;

use cascade_track::entity::Entity;
use cascade_track::trace;

/// Choose which input is granted access to the output.
///
/// [`arbitrate`](Arbitrate::arbitrate) is called during the settle phase,
/// possibly several times per cycle, and must not change the policy state.
/// [`granted`](Arbitrate::granted) is called once in the commit phase when
/// the chosen input's message has been sent.
pub trait Arbitrate {
    fn arbitrate(&self, entity: &Rc<Entity>, valid: &[bool]) -> Option<usize>;

    fn granted(&mut self, _index: usize) {}

    fn reset(&mut self) {}
}

/// The lowest-indexed valid input always wins.
///
/// A higher-indexed input can be starved by a lower-indexed input that is
/// continuously valid.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedPriority {}

impl Arbitrate for FixedPriority {
    fn arbitrate(&self, _entity: &Rc<Entity>, valid: &[bool]) -> Option<usize> {
        valid.iter().position(|v| *v)
    }
}

/// The search for a valid input starts after the last input granted.
///
/// Every continuously valid input is granted within `N` grants.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin {
    candidate: usize,
}

impl RoundRobin {
    #[must_use]
    pub fn new() -> Self {
        Self { candidate: 0 }
    }
}

impl Arbitrate for RoundRobin {
    fn arbitrate(&self, entity: &Rc<Entity>, valid: &[bool]) -> Option<usize> {
        let num_inputs = valid.len();
        let selected = (0..num_inputs)
            .map(|i| (i + self.candidate) % num_inputs)
            .find(|index| valid[*index]);
        trace!(entity ; "rr: candidate {} selected {:?}", self.candidate, selected);
        selected
    }

    fn granted(&mut self, index: usize) {
        self.candidate = index + 1;
    }

    fn reset(&mut self) {
        self.candidate = 0;
    }
}
