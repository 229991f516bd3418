// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fs;

use cascade_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use cascade_track::entity::{Entity, toplevel};
use cascade_track::info;

#[test]
fn file_tracker_applies_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.log");
    let path_str = path.to_str().unwrap();

    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
        file: TrackerConfig {
            enable: true,
            level: log::Level::Info,
            filter_regex: ".*memory.*",
            file: Some(path_str),
        },
    };

    let tracker = setup_trackers(&config).unwrap();
    {
        let top = toplevel(&tracker, "top");
        let memory = Entity::new(&top, "memory");
        let funnel = Entity::new(&top, "funnel");
        info!(memory ; "visible");
        info!(funnel ; "hidden");
        tracker.shutdown();
    }

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("INFO: visible"));
    assert!(!contents.contains("hidden"));
}

#[test]
fn file_tracker_needs_file() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: false,
            ..TrackerConfig::default()
        },
        file: TrackerConfig {
            enable: true,
            ..TrackerConfig::default()
        },
    };
    assert!(setup_trackers(&config).is_err());
}

#[test]
fn invalid_filter_rejected() {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            filter_regex: "[",
            ..TrackerConfig::default()
        },
        ..TrackersConfig::default()
    };
    assert!(setup_trackers(&config).is_err());
}
