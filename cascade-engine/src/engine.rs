// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The simulation engine.
//!
//! Components are registered with the [`Engine`] which then evaluates them
//! once per clock cycle:
//!
//!  1. Every port signal is deasserted.
//!  2. Every component's [`settle`](crate::traits::Evaluate::settle) is called, repeatedly,
//!     until no port signal changes.
//!  3. Every component's [`commit`](crate::traits::Evaluate::commit) is called.
//!  4. The clock advances.

use std::cell::RefCell;
use std::rc::Rc;

use cascade_track::entity::{Entity, toplevel};
use cascade_track::tracker::stdout_tracker;
use cascade_track::{Tracker, debug, info, set_cycle, trace};

use crate::port::Netlist;
use crate::sim_error;
use crate::time::clock::{COMMIT_PHASE, Clock, SETTLE_PHASE};
use crate::types::{Component, SimResult};

/// Use a default clock frequency of 1GHz.
const DEFAULT_CLOCK_MHZ: f64 = 1000.0;

/// Number of settle passes allowed before the logic is considered to be
/// oscillating.
pub const MAX_SETTLE_PASSES: usize = 64;

/// Default limit on the number of cycles [`Engine::run`] will execute.
pub const DEFAULT_MAX_CYCLES: u64 = 10_000;

pub struct Registry {
    pub entity: Rc<Entity>,
    components: RefCell<Vec<Component>>,
}

impl Registry {
    fn new(parent: &Rc<Entity>) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "registry")),
            components: RefCell::new(Vec::new()),
        }
    }

    pub fn register(&self, component: Component) {
        let mut guard = self.components.borrow_mut();
        guard.push(component);
        trace!(self.entity ; "{} components registered", guard.len());
    }

    fn settle(&self) -> SimResult {
        for component in self.components.borrow().iter() {
            component.settle()?;
        }
        Ok(())
    }

    fn commit(&self) -> SimResult {
        for component in self.components.borrow().iter() {
            component.commit()?;
        }
        Ok(())
    }

    fn reset(&self) {
        for component in self.components.borrow().iter() {
            component.reset();
        }
    }

    fn all_idle(&self) -> bool {
        self.components.borrow().iter().all(|c| c.is_idle())
    }

    #[must_use]
    pub fn num_components(&self) -> usize {
        self.components.borrow().len()
    }
}

pub struct Engine {
    toplevel: Rc<Entity>,
    tracker: Tracker,
    registry: Registry,
    netlist: Rc<Netlist>,
    clock: Clock,
    max_cycles: u64,
}

impl Engine {
    /// Create a standalone engine.
    pub fn new(tracker: &Tracker) -> Self {
        let toplevel = toplevel(tracker, "top");
        let registry = Registry::new(&toplevel);
        let netlist = Rc::new(Netlist::new(&toplevel));
        Self {
            toplevel,
            tracker: tracker.clone(),
            registry,
            netlist,
            clock: Clock::new(DEFAULT_CLOCK_MHZ),
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    /// Register a component that will be evaluated every cycle.
    ///
    /// Components are settled and committed in registration order, but the
    /// result of a cycle does not depend on that order.
    pub fn register(&self, component: Component) {
        self.registry.register(component);
    }

    /// Limit the number of cycles [`run`](Self::run) will execute.
    pub fn set_max_cycles(&mut self, max_cycles: u64) {
        self.max_cycles = max_cycles;
    }

    #[must_use]
    pub fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    /// Execute a single clock cycle.
    pub fn step(&mut self) -> SimResult {
        let tick = self.clock.tick_now().tick();
        self.clock.set_phase(SETTLE_PHASE);
        self.netlist.clear_all();

        let mut passes = 0;
        loop {
            let changes = self.netlist.changes();
            self.registry.settle()?;
            passes += 1;
            if self.netlist.changes() == changes {
                break;
            }
            if passes == MAX_SETTLE_PASSES {
                return sim_error!(format!(
                    "{}: signals did not settle within {MAX_SETTLE_PASSES} passes in cycle {tick}",
                    self.toplevel
                ));
            }
        }
        trace!(self.toplevel ; "cycle {tick} settled in {passes} passes");

        self.netlist.trace_fired();
        self.clock.set_phase(COMMIT_PHASE);
        self.registry.commit()?;

        self.clock.advance();
        set_cycle!(self.toplevel ; self.cycle());
        Ok(())
    }

    /// Run until every registered component is idle.
    ///
    /// At least one cycle is always executed. Returns an error if the
    /// components are still busy after the cycle limit.
    pub fn run(&mut self) -> SimResult {
        let start = self.clock.tick_now().tick();
        loop {
            self.step()?;
            if self.registry.all_idle() {
                break;
            }
            let cycles = self.clock.tick_now().tick() - start;
            if cycles >= self.max_cycles {
                return sim_error!(format!(
                    "{}: not idle after {cycles} cycles",
                    self.toplevel
                ));
            }
        }
        info!(self.toplevel ; "Idle at cycle {}", self.clock.tick_now().tick());
        Ok(())
    }

    /// Run for exactly `cycles` cycles.
    pub fn run_for(&mut self, cycles: u64) -> SimResult {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Step until `done` returns true. `done` is checked before every cycle.
    pub fn run_until<F>(&mut self, mut done: F, max_cycles: u64) -> SimResult
    where
        F: FnMut() -> bool,
    {
        for _ in 0..max_cycles {
            if done() {
                return Ok(());
            }
            self.step()?;
        }
        if done() {
            return Ok(());
        }
        sim_error!(format!(
            "{}: condition not met within {max_cycles} cycles",
            self.toplevel
        ))
    }

    /// Return all components to their initial state.
    ///
    /// The clock is not reset.
    pub fn reset(&mut self) {
        debug!(self.toplevel ; "Reset at cycle {}", self.clock.tick_now().tick());
        self.registry.reset();
        self.netlist.clear_all();
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.registry.all_idle()
    }

    #[must_use]
    pub fn default_clock(&self) -> Clock {
        self.clock.clone()
    }

    #[must_use]
    pub fn time_now_ns(&self) -> f64 {
        self.clock.time_now_ns()
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.clock.tick_now().tick()
    }

    #[must_use]
    pub fn netlist(&self) -> &Rc<Netlist> {
        &self.netlist
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.toplevel
    }

    #[must_use]
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }
}

/// Create a default engine that sends [`Track`](cascade_track::Track) events
/// to stdout.
///
/// This is provided to keep documentation examples simple with fewer
/// concepts to have to consider at once.
impl Default for Engine {
    fn default() -> Self {
        let tracker = stdout_tracker(log::Level::Warn);
        Self::new(&tracker)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // The tracker can be using a buffered writer and so it needs to be shut down
        // cleanly to ensure that it is flushed properly.
        self.tracker.shutdown();
    }
}
