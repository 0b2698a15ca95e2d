//! Shared infrastructure utilities for Mandala.
//!
//! This crate provides cross-cutting utilities that the store and the
//! Markdown exporter both need but that don't belong in the domain-pure
//! `mandala-types` crate:
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, PersistMode,
    atomic_write_with_options, recover_bak_file,
};
