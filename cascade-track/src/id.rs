// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Id

/// IDs that should be unique across the simulation
///
/// Each _log_/_trace_ event within the application is given an ID to identify
/// its originator. There are two reserved values: [NO_ID](crate::NO_ID) and
/// [ROOT](crate::ROOT).
#[derive(Copy, Clone, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Id(pub u64);

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `Unique` trait provides the ID used when tracking an object as it moves
/// through the simulation.
pub trait Unique {
    /// Return the ID for an object. This is used in logging.
    fn id(&self) -> Id;
}

impl Unique for Id {
    fn id(&self) -> Id {
        *self
    }
}

// Provide Unique for primitive types
impl Unique for i32 {
    fn id(&self) -> Id {
        Id(*self as u64)
    }
}

impl Unique for u32 {
    fn id(&self) -> Id {
        Id(u64::from(*self))
    }
}

impl Unique for usize {
    fn id(&self) -> Id {
        Id(*self as u64)
    }
}
