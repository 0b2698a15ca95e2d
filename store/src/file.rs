//! One pretty-printed JSON file per user under a data directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use mandala_types::{Document, Revision, UserId};
use mandala_utils::{AtomicWriteOptions, atomic_write_with_options, recover_bak_file};

use crate::{DocumentStore, StoreError, merge_for_save};

/// Documents stored as `<dir>/<user>.json`.
///
/// The revision check and the rename are not atomic across processes; two
/// CLI invocations racing on one user can still both pass the check.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, user: &UserId) -> PathBuf {
        self.dir.join(format!("{user}.json"))
    }

    fn read_raw(&self, user: &UserId) -> Result<Option<Map<String, Value>>, StoreError> {
        let path = self.path_for(user);
        recover_bak_file(&path);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                warn!("Failed to read document at {:?}: {}", path, source);
                return Err(StoreError::Io { path, source });
            }
        };

        match serde_json::from_str(&content) {
            Ok(raw) => Ok(Some(raw)),
            Err(source) => {
                warn!("Failed to parse document at {:?}: {}", path, source);
                Err(StoreError::Parse { path, source })
            }
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, user: &UserId) -> Result<Option<Document>, StoreError> {
        let Some(raw) = self.read_raw(user)? else {
            debug!(user = %user, "No stored document");
            return Ok(None);
        };
        Document::hydrate(Value::Object(raw))
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path_for(user),
                source,
            })
    }

    fn save(&self, user: &UserId, document: &Document) -> Result<Revision, StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let stored = self.read_raw(user)?;
        let (merged, revision) = merge_for_save(user, stored, document)?;
        let json = serde_json::to_string_pretty(&merged).map_err(|source| StoreError::Encode {
            user: user.clone(),
            source,
        })?;

        let path = self.path_for(user);
        atomic_write_with_options(&path, json.as_bytes(), AtomicWriteOptions::document())
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(user = %user, revision = %revision, path = %path.display(), "Saved document");
        Ok(revision)
    }
}
