// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! The [`Track`] trait, the [`Event`]s it receives and the [`Tracker`]s that
//! implement it.
//!
//! Every tracker decides per entity whether an event is wanted. That decision
//! is made by an [`EntityManager`], which holds a default level and a list of
//! regular expressions that override it for matching entity names.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the multi-tracker.
pub mod multi_tracker;
/// Include the text-based tracker.
pub mod text;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::rc::Rc;

pub use dev_null::DevNullTracker;
pub use multi_tracker::MultiTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{Id, ROOT};

/// Error used to return configuration errors
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Track config error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// Something that happened to, or was done by, a simulation entity.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    /// An entity `obj` called `name` was created.
    Create {
        /// New entity.
        obj: Id,
        /// Full hierarchical name.
        name: &'a str,
    },
    /// The entity `obj` was dropped.
    Destroy {
        /// Dropped entity.
        obj: Id,
    },
    /// An output port was connected to the input port entity `to`.
    Connect {
        /// Receiving entity.
        to: Id,
    },
    /// The message `obj` was accepted.
    Enter {
        /// Message ID.
        obj: Id,
    },
    /// The message `obj` was sent on.
    Exit {
        /// Message ID.
        obj: Id,
    },
    /// A tracked quantity, such as a fill level, changed.
    Value(f64),
    /// The clock reached a new cycle.
    Cycle(u64),
    /// A text message.
    Log {
        /// Level of the message.
        level: log::Level,
        /// Formatted message.
        msg: fmt::Arguments<'a>,
    },
}

impl Event<'_> {
    /// Level at which the event is emitted. Everything except text messages
    /// is trace output.
    #[must_use]
    pub fn level(&self) -> log::Level {
        match self {
            Event::Log { level, .. } => *level,
            _ => log::Level::Trace,
        }
    }

    /// The entity whose filter decides whether the event is wanted.
    ///
    /// Creation and destruction are reported by the parent but filtered by
    /// the entity itself.
    #[must_use]
    pub fn subject(&self, by: Id) -> Id {
        match self {
            Event::Create { obj, .. } | Event::Destroy { obj } => *obj,
            _ => by,
        }
    }
}

/// An [`Event`] together with the ID of the entity that reported it.
///
/// Displays as one line of text output.
pub struct Record<'a> {
    /// Reporting entity.
    pub by: Id,
    /// What happened.
    pub event: Event<'a>,
}

impl fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by = self.by;
        match self.event {
            Event::Create { obj, name } => write!(f, "{by}: created {obj}, {name}"),
            Event::Destroy { obj } => write!(f, "{by}: destroyed {obj}"),
            Event::Connect { to } => write!(f, "{by}: connect to {to}"),
            Event::Enter { obj } => write!(f, "{by}: enter {obj}"),
            Event::Exit { obj } => write!(f, "{by}: exit {obj}"),
            Event::Value(value) => write!(f, "{by}: value {value}"),
            Event::Cycle(cycle) => write!(f, "{by}: cycle {cycle}"),
            Event::Log { level, msg } => write!(f, "{by}:{level}: {msg}"),
        }
    }
}

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new global ID
    fn unique_id(&self) -> Id;

    /// Whether events at `level` are wanted for the entity `id`.
    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Register the full name of a new entity so that filters can be applied.
    fn add_entity(&self, id: Id, entity_name: &str);

    /// Emit an event reported by the entity `by`.
    fn track(&self, by: Id, event: Event);

    /// Flush any buffered output.
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Rc<dyn Track>;

/// Create a [`Tracker`] that prints events at or above `level` to `stdout`.
#[must_use]
pub fn stdout_tracker(level: log::Level) -> Tracker {
    let writer = Box::new(io::BufWriter::new(io::stdout()));
    Rc::new(TextTracker::new(EntityManager::new(level), writer))
}

/// Create a [`Tracker`] that suppresses all track events.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    Rc::new(DevNullTracker)
}

/// Decides which entities emit events at which level, and allocates [`Id`]s.
pub struct EntityManager {
    default_level: log::Level,

    /// Checked in order; the first match sets the level of an entity.
    filters: Vec<(Regex, log::Level)>,

    next_id: Cell<u64>,

    /// Entities whose level differs from the default.
    levels: RefCell<HashMap<Id, log::Level>>,
}

impl EntityManager {
    /// Create a manager where every entity uses `default_level`.
    #[must_use]
    pub fn new(default_level: log::Level) -> Self {
        Self {
            default_level,
            filters: Vec::new(),
            next_id: Cell::new(ROOT.0 + 1),
            levels: RefCell::new(HashMap::new()),
        }
    }

    fn unique_id(&self) -> Id {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Id(id)
    }

    fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        let entity_level = self
            .levels
            .borrow()
            .get(&id)
            .copied()
            .unwrap_or(self.default_level);
        level <= entity_level
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        let level = self.level_for(entity_name);
        if level != self.default_level {
            self.levels.borrow_mut().insert(id, level);
        }
    }

    fn level_for(&self, entity_name: &str) -> log::Level {
        self.filters
            .iter()
            .find(|(regex, _)| regex.is_match(entity_name))
            .map_or(self.default_level, |(_, level)| *level)
    }

    /// Set entities whose full name matches `regex_str` to `level`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cascade_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_entity_level_filter(".*funnel.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_entity_level_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), TrackConfigError> {
        let regex = Regex::new(regex_str).map_err(|e| {
            TrackConfigError(format!("Failed to parse regex {regex_str}:\n{e}\n"))
        })?;
        self.filters.push((regex, level));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    fn entity_paths() -> Vec<&'static str> {
        vec![
            "top",
            "top::sys",
            "top::sys::funnel",
            "top::sys::router",
        ]
    }

    fn levels(manager: &EntityManager) -> Vec<Level> {
        entity_paths()
            .into_iter()
            .map(|p| manager.level_for(p))
            .collect()
    }

    #[test]
    fn no_filters() {
        let manager = EntityManager::new(Level::Error);
        assert_eq!(levels(&manager), vec![Level::Error; 4]);
    }

    #[test]
    fn filter_subsystem_trace() {
        let mut manager = EntityManager::new(Level::Error);
        manager
            .add_entity_level_filter(r".*sys.*", Level::Trace)
            .unwrap();
        assert_eq!(
            levels(&manager),
            vec![Level::Error, Level::Trace, Level::Trace, Level::Trace]
        );
    }

    #[test]
    fn first_filter_wins() {
        let mut manager = EntityManager::new(Level::Error);
        manager
            .add_entity_level_filter(r".*funnel", Level::Warn)
            .unwrap();
        manager
            .add_entity_level_filter(r".*sys.*", Level::Info)
            .unwrap();
        assert_eq!(
            levels(&manager),
            vec![Level::Error, Level::Info, Level::Warn, Level::Info]
        );
    }

    #[test]
    fn bad_regex() {
        let mut manager = EntityManager::new(Level::Error);
        assert!(
            manager
                .add_entity_level_filter(r"(unclosed", Level::Warn)
                .is_err()
        );
    }

    #[test]
    fn enabled_levels_follow_filters() {
        let mut manager = EntityManager::new(Level::Warn);
        manager
            .add_entity_level_filter(r".*router", Level::Trace)
            .unwrap();
        let router = manager.unique_id();
        manager.add_entity(router, "top::sys::router");
        let funnel = manager.unique_id();
        manager.add_entity(funnel, "top::sys::funnel");

        assert!(manager.is_enabled(router, Level::Trace));
        assert!(!manager.is_enabled(funnel, Level::Info));
        assert!(manager.is_enabled(funnel, Level::Warn));
    }

    #[test]
    fn ids_follow_root() {
        let manager = EntityManager::new(Level::Error);
        let ids: Vec<Id> = (0..3).map(|_| manager.unique_id()).collect();
        assert_eq!(ids, vec![Id(ROOT.0 + 1), Id(ROOT.0 + 2), Id(ROOT.0 + 3)]);
    }

    #[test]
    fn records_format_as_lines() {
        fn line(event: Event) -> String {
            Record { by: Id(4), event }.to_string()
        }
        assert_eq!(line(Event::Enter { obj: Id(9) }), "4: enter 9");
        assert_eq!(line(Event::Cycle(12)), "4: cycle 12");
        assert_eq!(
            line(Event::Create {
                obj: Id(5),
                name: "top::mem"
            }),
            "4: created 5, top::mem"
        );
        assert_eq!(
            line(Event::Log {
                level: Level::Warn,
                msg: format_args!("stall {}", 3)
            }),
            "4:WARN: stall 3"
        );
    }

    #[test]
    fn filtering_subject() {
        let create = Event::Create {
            obj: Id(7),
            name: "top::a",
        };
        assert_eq!(create.subject(Id(2)), Id(7));
        assert_eq!(Event::Value(1.0).subject(Id(2)), Id(2));
        assert_eq!(Event::Value(1.0).level(), Level::Trace);
    }
}
