// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! This module represents the time during a simulation.
//!
//! Time is made up of a cycle count and a phase. The phase is
//! [`SETTLE_PHASE`] while the combinational logic is being evaluated and
//! [`COMMIT_PHASE`] while state is being updated.

use core::cmp::Ordering;
use std::cell::Cell;
use std::rc::Rc;

pub const SETTLE_PHASE: u32 = 0;
pub const COMMIT_PHASE: u32 = 1;

/// ClockTick structure for representing a number of Clock ticks and a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTick {
    /// Clock ticks.
    tick: u64,

    /// Clock phase.
    phase: u32,
}

impl ClockTick {
    #[must_use]
    pub fn new() -> Self {
        Self { tick: 0, phase: 0 }
    }

    /// Get the current clock tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Get the current clock phase.
    #[must_use]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Change the default constructor value of `tick`.
    pub fn set_tick(&mut self, tick: u64) -> ClockTick {
        self.tick = tick;
        *self
    }

    /// Change the default constructor value of `phase`.
    pub fn set_phase(&mut self, phase: u32) -> ClockTick {
        self.phase = phase;
        *self
    }
}

impl Default for ClockTick {
    fn default() -> Self {
        Self::new()
    }
}

/// Define the comparison operation for ClockTick.
impl Ord for ClockTick {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.tick.cmp(&other.tick) {
            Ordering::Equal => self.phase.cmp(&other.phase),
            ordering => ordering,
        }
    }
}

impl PartialOrd for ClockTick {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for ClockTick {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:?}", self.tick, self.phase)
    }
}

/// State representing a clock.
///
/// Clones share the same underlying time so every component holding a copy
/// sees the engine advance it.
#[derive(Clone)]
pub struct Clock {
    /// Frequency of the clock in MHz.
    freq_mhz: f64,

    now: Rc<Cell<ClockTick>>,
}

impl Clock {
    /// Create a new [Clock] at the specified frequency.
    #[must_use]
    pub fn new(freq_mhz: f64) -> Self {
        Self {
            freq_mhz,
            now: Rc::new(Cell::new(ClockTick::new())),
        }
    }

    /// Returns the clocks frequency in MHz.
    #[must_use]
    pub fn freq_mhz(&self) -> f64 {
        self.freq_mhz
    }

    /// Returns the current [ClockTick].
    #[must_use]
    pub fn tick_now(&self) -> ClockTick {
        self.now.get()
    }

    /// Returns the current time in `ns`.
    #[must_use]
    pub fn time_now_ns(&self) -> f64 {
        self.to_ns(&self.now.get())
    }

    /// Convert a [ClockTick] to a time in `ns` for this clock.
    #[must_use]
    pub fn to_ns(&self, tick: &ClockTick) -> f64 {
        tick.tick as f64 * 1000.0 / self.freq_mhz
    }

    pub(crate) fn set_phase(&self, phase: u32) {
        let mut now = self.now.get();
        self.now.set(now.set_phase(phase));
    }

    pub(crate) fn advance(&self) {
        let now = self.now.get();
        self.now.set(ClockTick {
            tick: now.tick + 1,
            phase: SETTLE_PHASE,
        });
    }
}
