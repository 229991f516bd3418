// Copyright (c) 2020 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::io::Write;

use crate::tracker::{EntityManager, Event, Record, Track};
use crate::{Id, Writer};

/// Writes one line of text per event.
///
/// Write failures are ignored so that a broken pipe on the log output can
/// never stop a simulation.
pub struct TextTracker {
    entity_manager: EntityManager,
    writer: RefCell<Writer>,
}

impl TextTracker {
    /// Create a new [`TextTracker`] filtered by `entity_manager`.
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: RefCell::new(writer),
        }
    }
}

impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        self.entity_manager.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.entity_manager.is_enabled(id, level)
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        self.entity_manager.add_entity(id, entity_name);
    }

    fn track(&self, by: Id, event: Event) {
        let _ = writeln!(self.writer.borrow_mut(), "{}", Record { by, event });
    }

    fn shutdown(&self) {
        let _ = self.writer.borrow_mut().flush();
    }
}
