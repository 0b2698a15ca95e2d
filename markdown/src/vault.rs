//! The export directory shared with an external note-taking tool.
//!
//! Files are named `<prefix><YYYY-MM-DD>.md`, so the lexicographically
//! greatest matching name is the most recent export.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use tracing::info;

use mandala_types::{Document, GoalTree};
use mandala_utils::{AtomicWriteOptions, atomic_write_with_options};

use crate::error::CodecError;
use crate::mandala::{MandalaImport, parse_mandala, render_mandala};
use crate::tasks::{ImportReport, apply_tasks, parse_tasks, render_tasks};

pub const MANDALA_PREFIX: &str = "mandala-";
pub const TASKS_PREFIX: &str = "tasks-";
pub const EXTENSION: &str = ".md";

/// An import result together with the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported<T> {
    pub path: PathBuf,
    pub outcome: T,
}

#[derive(Debug, Clone)]
pub struct Vault {
    dir: PathBuf,
}

impl Vault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Most recent file named `<prefix>*.md`; `None` when there is none or
    /// the directory does not exist yet.
    pub fn latest_file(&self, prefix: &str) -> Result<Option<PathBuf>, CodecError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CodecError::io("list", &self.dir, err)),
        };

        let mut latest: Option<String> = None;
        for entry in entries {
            let entry = entry.map_err(|err| CodecError::io("list", &self.dir, err))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(prefix)
                && name.ends_with(EXTENSION)
                && latest.as_ref().is_none_or(|best| name > *best)
            {
                latest = Some(name);
            }
        }
        Ok(latest.map(|name| self.dir.join(name)))
    }

    pub fn export_mandala(
        &self,
        document: &Document,
        now: DateTime<FixedOffset>,
    ) -> Result<PathBuf, CodecError> {
        let content = render_mandala(&document.goal_tree, &document.progression, now);
        self.write(MANDALA_PREFIX, now, &content)
    }

    pub fn export_tasks(
        &self,
        document: &Document,
        now: DateTime<FixedOffset>,
    ) -> Result<PathBuf, CodecError> {
        let content = render_tasks(&document.goal_tree, &document.progression, now);
        self.write(TASKS_PREFIX, now, &content)
    }

    /// Apply the newest Mandala document's titles to `tree`.
    pub fn import_mandala(
        &self,
        tree: &mut GoalTree,
    ) -> Result<Option<Imported<MandalaImport>>, CodecError> {
        let Some((path, content)) = self.read_latest(MANDALA_PREFIX)? else {
            return Ok(None);
        };
        let outcome = parse_mandala(&content).apply(tree);
        info!(path = %path.display(), ?outcome, "Imported mandala document");
        Ok(Some(Imported { path, outcome }))
    }

    /// Merge the newest task-list document into `tree`.
    pub fn import_tasks(
        &self,
        tree: &mut GoalTree,
        now: DateTime<Utc>,
    ) -> Result<Option<Imported<ImportReport>>, CodecError> {
        let Some((path, content)) = self.read_latest(TASKS_PREFIX)? else {
            return Ok(None);
        };
        let outcome = apply_tasks(tree, &parse_tasks(&content), now);
        info!(
            path = %path.display(),
            imported = outcome.imported,
            skipped = outcome.skipped,
            "Imported task list"
        );
        Ok(Some(Imported { path, outcome }))
    }

    fn read_latest(&self, prefix: &str) -> Result<Option<(PathBuf, String)>, CodecError> {
        let Some(path) = self.latest_file(prefix)? else {
            info!(dir = %self.dir.display(), prefix, "No export file to import");
            return Ok(None);
        };
        let content =
            fs::read_to_string(&path).map_err(|err| CodecError::io("read", &path, err))?;
        Ok(Some((path, content)))
    }

    fn write(
        &self,
        prefix: &str,
        now: DateTime<FixedOffset>,
        content: &str,
    ) -> Result<PathBuf, CodecError> {
        fs::create_dir_all(&self.dir)
            .map_err(|err| CodecError::io("create directory", &self.dir, err))?;

        let path = self
            .dir
            .join(format!("{prefix}{}{EXTENSION}", now.date_naive().format("%Y-%m-%d")));
        atomic_write_with_options(&path, content.as_bytes(), AtomicWriteOptions::export())
            .map_err(|err| CodecError::io("write", &path, err))?;

        info!(path = %path.display(), "Exported document");
        Ok(path)
    }
}
