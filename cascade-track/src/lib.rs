// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

//! This module provides combined _track_ capabilities for the CASCADE project.
//!
//! _Track_ means the combination of _log_ and _trace_ where:
//!
//!   - _log_ are text-based human-readable messages emitted at various levels
//!     of verbosity (from `Trace` through to `Error`).
//!   - _trace_ provides a standard set of modelling events that can be emitted.
//!     For example, entity creation or messages entering/exiting simulation
//!     [`Entities`](crate::entity::Entity).
//!
//! All events are routed through a [`Tracker`] which decides, per entity,
//! whether an event is emitted and where it goes.

// Enable warnings for missing documentation
#![warn(missing_docs)]

pub use log;

pub mod builder;
pub mod entity;
pub mod id;
pub mod test_helpers;

/// Include the trackers.
pub mod tracker;
pub use id::Id;
pub use tracker::{Track, Tracker};

/// A type alias for objects that receive _log_ / _trace_ events.
pub type Writer = Box<dyn std::io::Write>;

/// ID value which indicates where there is no valid ID
pub const NO_ID: Id = Id(0);

/// The root ID from which all other IDs are derived
pub const ROOT: Id = Id(1);

/// Emit a [`tracker::Event`] from an entity if it is enabled at `$lvl`.
///
/// All other macros are built on this one. The event expression is only
/// evaluated when it will be emitted.
#[macro_export]
macro_rules! track_base {
    ($entity:expr ; $lvl:expr, $by:expr, $event:expr) => {
        if $entity.tracker.is_entity_enabled($entity.id, $lvl) {
            $entity.tracker.track($by, $event);
        }
    };
}

/// Track an object entering an entity.
#[macro_export]
macro_rules! enter {
    ($entity:expr ; $enter_id:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace, $entity.id,
            $crate::tracker::Event::Enter { obj: $enter_id })
    };
}

/// Track an object leaving an entity.
#[macro_export]
macro_rules! exit {
    ($entity:expr ; $exit_id:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace, $entity.id,
            $crate::tracker::Event::Exit { obj: $exit_id })
    };
}

/// Track a numeric value held by an entity (e.g. a fill level).
#[macro_export]
macro_rules! value {
    ($entity:expr ; $value:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace, $entity.id,
            $crate::tracker::Event::Value($value as f64))
    };
}

/// Report the creation of an entity. The event comes from its parent.
#[macro_export]
macro_rules! create {
    ($entity:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace,
            $entity.parent.as_ref().map_or($crate::NO_ID, |parent| parent.id),
            $crate::tracker::Event::Create {
                obj: $entity.id,
                name: $entity.full_name().as_str(),
            })
    };
}

/// Report an entity being dropped. The event comes from its parent.
#[macro_export]
macro_rules! destroy {
    ($entity:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace,
            $entity.parent.as_ref().map_or($crate::NO_ID, |parent| parent.id),
            $crate::tracker::Event::Destroy { obj: $entity.id })
    };
}

/// Connect two entities
#[macro_export]
macro_rules! connect {
    ($from_entity:expr ; $to_entity:expr) => {
        $crate::track_base!($from_entity ; $crate::log::Level::Trace, $from_entity.id,
            $crate::tracker::Event::Connect { to: $to_entity.id })
    };
}

/// Report that the clock has reached `$cycle`.
#[macro_export]
macro_rules! set_cycle {
    ($entity:expr ; $cycle:expr) => {
        $crate::track_base!($entity ; $crate::log::Level::Trace, $entity.id,
            $crate::tracker::Event::Cycle($cycle))
    };
}

/// Base macro for log messages of all level.
///
/// The message is only formatted if the entity is enabled at `$lvl`.
#[macro_export]
macro_rules! log_base {
    ($entity:expr ; $lvl:expr, $($arg:tt)+) => {
        $crate::track_base!($entity ; $lvl, $entity.id,
            $crate::tracker::Event::Log { level: $lvl, msg: format_args!($($arg)+) })
    };
}

/// The `trace` macro logs at level `log::Level::Trace`
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Trace, $($arg)+);
    );
}

/// The `debug` macro logs at level `log::Level::Debug`
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Debug, $($arg)+);
    );
}

/// The `info` macro logs at level `log::Level::Info`
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Info, $($arg)+);
    );
}

/// The `warn` macro logs at level `log::Level::Warn`
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Warn, $($arg)+);
    );
}

/// The `error` macro logs at level `log::Level::Error`
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => (
        $crate::log_base!($entity ; $crate::log::Level::Error, $($arg)+);
    );
}
