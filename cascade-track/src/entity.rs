// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! A simulation entity.
//!
//! Every component, port and model owns an entity. Entities form a tree
//! rooted at [`toplevel`] and display as their path from the root, for example
//! `top::sys::mem`. Creation and destruction are reported to the [`Tracker`].

use std::fmt;
use std::rc::Rc;

use crate::{Id, Tracker, create, destroy};

/// A node in the simulation hierarchy.
pub struct Entity {
    /// Name within the parent.
    pub name: String,

    /// Only the top-level entity has no parent.
    pub parent: Option<Rc<Entity>>,

    /// Identifies the entity in track output.
    pub id: Id,

    /// [`Tracker`] used to handle trace/log events.
    pub tracker: Tracker,
}

const SEPARATOR: &str = "::";

impl Entity {
    /// Create an entity called `name` below `parent`.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        Self::register(Some(parent.clone()), name, parent.tracker.clone())
    }

    fn register(parent: Option<Rc<Entity>>, name: &str, tracker: Tracker) -> Self {
        let entity = Self {
            name: name.to_string(),
            parent,
            id: tracker.unique_id(),
            tracker,
        };
        entity.tracker.add_entity(entity.id, &entity.full_name());
        create!(entity);
        entity
    }

    /// The path from the top-level entity, e.g. `top::sys::mem`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        destroy!(self);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("path", &self.full_name())
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent}{SEPARATOR}")?;
        }
        f.write_str(&self.name)
    }
}

/// Create the root of the hierarchy. Every other entity descends from it.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    Rc::new(Entity::register(None, name, tracker.clone()))
}
