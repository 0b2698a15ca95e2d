//! Per-user document persistence.
//!
//! A store loads and saves whole documents. Saves are merges at the top
//! level: keys already stored but absent from the written document are
//! kept. Every save is conditional on the revision the document was loaded
//! at, so two writers racing on the same user cannot silently discard each
//! other's changes; the second one gets [`StoreError::Conflict`].

mod file;
mod memory;

use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use mandala_types::{Document, Revision, UserId};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

const REVISION_KEY: &str = "revision";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored document at {} is malformed", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document for {user}")]
    Encode {
        user: UserId,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "document for {user} changed since it was loaded (loaded at revision {expected}, stored revision is {found})"
    )]
    Conflict {
        user: UserId,
        expected: Revision,
        found: Revision,
    },
}

pub trait DocumentStore {
    /// The stored document, hydrated with defaults, or `None` if the user
    /// has never saved one.
    fn load(&self, user: &UserId) -> Result<Option<Document>, StoreError>;

    /// Merge `document` into the stored one and return the new revision.
    ///
    /// Fails with [`StoreError::Conflict`] when the stored revision is not
    /// `document.revision`.
    fn save(&self, user: &UserId, document: &Document) -> Result<Revision, StoreError>;
}

/// Load a user's document, starting from the placeholder tree on first use.
pub fn load_or_default<S: DocumentStore + ?Sized>(
    store: &S,
    user: &UserId,
) -> Result<Document, StoreError> {
    Ok(store.load(user)?.unwrap_or_default())
}

/// One read-modify-write cycle.
///
/// `mutate` works on a copy of the loaded document. The copy is saved only
/// if it differs from what was loaded; the returned document carries the
/// revision it was saved at.
pub fn update<S, T>(
    store: &S,
    user: &UserId,
    mutate: impl FnOnce(&mut Document) -> T,
) -> Result<(Document, T), StoreError>
where
    S: DocumentStore + ?Sized,
{
    let loaded = load_or_default(store, user)?;
    let mut next = loaded.clone();
    let value = mutate(&mut next);

    if next == loaded {
        debug!(user = %user, "Document unchanged; skipping save");
        return Ok((next, value));
    }

    next.revision = store.save(user, &next)?;
    Ok((next, value))
}

fn stored_revision(stored: Option<&Map<String, Value>>) -> Revision {
    stored
        .and_then(|object| object.get(REVISION_KEY))
        .and_then(Value::as_u64)
        .map_or_else(Revision::default, Revision::new)
}

/// Check the revision and produce the object to write.
fn merge_for_save(
    user: &UserId,
    stored: Option<Map<String, Value>>,
    document: &Document,
) -> Result<(Map<String, Value>, Revision), StoreError> {
    let found = stored_revision(stored.as_ref());
    if found != document.revision {
        return Err(StoreError::Conflict {
            user: user.clone(),
            expected: document.revision,
            found,
        });
    }

    let fields: Map<String, Value> = serde_json::to_value(document)
        .and_then(serde_json::from_value)
        .map_err(|source| StoreError::Encode {
            user: user.clone(),
            source,
        })?;

    let mut merged = stored.unwrap_or_default();
    merged.extend(fields);

    let revision = found.next();
    merged.insert(REVISION_KEY.to_string(), Value::from(revision.value()));
    Ok((merged, revision))
}
