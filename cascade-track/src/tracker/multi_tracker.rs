// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

use crate::Id;
use crate::tracker::{EntityManager, Event, Track, Tracker};

/// Sends events to several [`Tracker`]s, each applying its own filters.
///
/// IDs are allocated here so that every contained tracker sees the same
/// value for an entity.
pub struct MultiTracker {
    ids: EntityManager,
    trackers: Vec<Tracker>,
}

impl MultiTracker {
    /// Create a tracker forwarding to `trackers`.
    #[must_use]
    pub fn new(trackers: Vec<Tracker>) -> Self {
        Self {
            ids: EntityManager::new(log::Level::Error),
            trackers,
        }
    }
}

impl Track for MultiTracker {
    fn unique_id(&self) -> Id {
        self.ids.unique_id()
    }

    fn is_entity_enabled(&self, id: Id, level: log::Level) -> bool {
        self.trackers
            .iter()
            .any(|tracker| tracker.is_entity_enabled(id, level))
    }

    fn add_entity(&self, id: Id, entity_name: &str) {
        for tracker in &self.trackers {
            tracker.add_entity(id, entity_name);
        }
    }

    fn track(&self, by: Id, event: Event) {
        let subject = event.subject(by);
        let level = event.level();
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(subject, level) {
                tracker.track(by, event);
            }
        }
    }

    fn shutdown(&self) {
        for tracker in &self.trackers {
            tracker.shutdown();
        }
    }
}
