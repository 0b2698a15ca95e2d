//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use mandala::App;
use mandala_config::Settings;
use mandala_store::{JsonFileStore, MemoryStore};
use mandala_types::{
    ActivityTracking, Document, MeansAddress, ProgressionSettings, SubTask, UserId,
};

/// Parse an RFC 3339 timestamp into UTC.
pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid test timestamp")
        .with_timezone(&Utc)
}

pub fn user() -> UserId {
    UserId::new("tester").expect("valid test user")
}

/// Settings rooted in `dir`, with days and hours counted in UTC.
pub fn utc_settings(dir: &Path) -> Settings {
    Settings::default()
        .with_data_dir(dir.join("data"))
        .with_progression(
            ProgressionSettings::from_minutes(ActivityTracking::Full, 0)
                .expect("zero offset is valid"),
        )
}

/// Load settings from a config file written into `dir`.
pub fn settings_from_toml(dir: &Path, toml: &str) -> Settings {
    let path = dir.join("config.toml");
    fs::write(&path, toml).expect("write test config");
    Settings::load_from(&path).expect("valid test config")
}

pub fn file_app(dir: &TempDir) -> App<JsonFileStore> {
    let settings = utc_settings(dir.path());
    let store = JsonFileStore::new(settings.data_dir());
    App::new(store, user(), settings)
}

pub fn memory_app(dir: &TempDir) -> App<MemoryStore> {
    App::new(MemoryStore::default(), user(), utc_settings(dir.path()))
}

/// A document with named areas and a few sub-tasks:
///
/// - area 0 "Health", means 0 "Sleep" with "In bed by 23:00"
/// - area 1 "Learning", means 0 "Read" with "Read 10 pages"
pub fn seeded_document(now: DateTime<Utc>) -> Document {
    let mut document = Document::new_default();
    let tree = &mut document.goal_tree;
    tree.center_section.center_cell.title = "Live a full life".into();
    tree.surrounding_sections[0].center_cell.title = "Health".into();
    tree.surrounding_sections[1].center_cell.title = "Learning".into();
    tree.sync_mirrors();

    let sleep = MeansAddress { area: 0, cell: 0 };
    tree.means_mut(sleep).title = "Sleep".into();
    tree.means_mut(sleep)
        .sub_tasks_mut()
        .push(SubTask::new("In bed by 23:00", now));

    let read = MeansAddress { area: 1, cell: 0 };
    tree.means_mut(read).title = "Read".into();
    tree.means_mut(read)
        .sub_tasks_mut()
        .push(SubTask::new("Read 10 pages", now));
    document
}
