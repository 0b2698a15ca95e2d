//! Structural edits on a user's goal tree.
//!
//! Each edit first resolves its address and only then mutates, so a failed
//! strict edit leaves the document exactly as it was. Toggles and deletes of
//! completed sub-tasks drive the progression engine.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use mandala_types::{Document, NonEmptyString, SubTask, TreeError};

use crate::progression::{CompletionReport, ProgressionEngine};

/// A UI-level change to the goal tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    AddSubTask {
        section_id: String,
        cell_id: String,
        title: NonEmptyString,
    },
    ToggleSubTask {
        section_id: String,
        cell_id: String,
        sub_task_id: String,
    },
    EditSubTask {
        section_id: String,
        cell_id: String,
        sub_task_id: String,
        title: NonEmptyString,
    },
    DeleteSubTask {
        section_id: String,
        cell_id: String,
        sub_task_id: String,
    },
    /// Rename any cell. Theme and mirror cells are renamed as a pair.
    RetitleCell {
        section_id: String,
        cell_id: String,
        title: NonEmptyString,
    },
}

/// What a successful edit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Added {
        sub_task_id: String,
    },
    Completed(CompletionReport),
    Reopened {
        refunded_xp: u64,
    },
    Edited,
    Deleted {
        refunded_xp: u64,
    },
    Retitled,
}

/// Result of a lenient edit: unresolved addresses are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied(Applied),
    Unresolved(TreeError),
}

impl EditOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeEditor {
    engine: ProgressionEngine,
}

impl TreeEditor {
    #[must_use]
    pub const fn new(engine: ProgressionEngine) -> Self {
        Self { engine }
    }

    #[must_use]
    pub const fn engine(&self) -> &ProgressionEngine {
        &self.engine
    }

    /// Apply `edit` to a copy of `document`, leaving the original untouched.
    pub fn applied(
        &self,
        document: &Document,
        edit: &Edit,
        now: DateTime<Utc>,
    ) -> Result<(Document, Applied), TreeError> {
        let mut next = document.clone();
        let applied = self.apply(&mut next, edit, now)?;
        Ok((next, applied))
    }

    /// UI path: an address that does not resolve is logged and ignored.
    pub fn apply_lenient(
        &self,
        document: &mut Document,
        edit: &Edit,
        now: DateTime<Utc>,
    ) -> EditOutcome {
        match self.apply(document, edit, now) {
            Ok(applied) => EditOutcome::Applied(applied),
            Err(err) => {
                debug!(error = %err, "Ignoring edit with unresolved address");
                EditOutcome::Unresolved(err)
            }
        }
    }

    /// Strict path: an unresolved address is returned as an error.
    pub fn apply(
        &self,
        document: &mut Document,
        edit: &Edit,
        now: DateTime<Utc>,
    ) -> Result<Applied, TreeError> {
        let tree = &mut document.goal_tree;
        match edit {
            Edit::AddSubTask {
                section_id,
                cell_id,
                title,
            } => {
                let address = tree.resolve_means(section_id, cell_id)?;
                let sub_task = SubTask::new(title.as_str(), now);
                let sub_task_id = sub_task.id.clone();
                tree.means_mut(address).sub_tasks_mut().push(sub_task);
                debug!(section_id = %section_id, cell_id = %cell_id, sub_task_id = %sub_task_id, "Added sub-task");
                Ok(Applied::Added { sub_task_id })
            }
            Edit::ToggleSubTask {
                section_id,
                cell_id,
                sub_task_id,
            } => {
                let address = tree.resolve_sub_task(section_id, cell_id, sub_task_id)?;
                let sub_task = tree.sub_task_mut(address);
                sub_task.completed = !sub_task.completed;
                let completed = sub_task.completed;
                let category = tree.theme_of(address.means).to_string();

                let progression = &mut document.progression;
                if completed {
                    let report = self.engine.record_completion(
                        progression,
                        &category,
                        now,
                        self.engine.toggle_tracking(),
                    );
                    info!(sub_task_id = %sub_task_id, xp = progression.xp, "Sub-task completed");
                    Ok(Applied::Completed(report))
                } else {
                    let refunded_xp = self.engine.record_uncompletion(progression, now);
                    info!(sub_task_id = %sub_task_id, xp = progression.xp, "Sub-task reopened");
                    Ok(Applied::Reopened { refunded_xp })
                }
            }
            Edit::EditSubTask {
                section_id,
                cell_id,
                sub_task_id,
                title,
            } => {
                let address = tree.resolve_sub_task(section_id, cell_id, sub_task_id)?;
                title
                    .as_str()
                    .clone_into(&mut tree.sub_task_mut(address).title);
                Ok(Applied::Edited)
            }
            Edit::DeleteSubTask {
                section_id,
                cell_id,
                sub_task_id,
            } => {
                let address = tree.resolve_sub_task(section_id, cell_id, sub_task_id)?;
                let removed = tree
                    .means_mut(address.means)
                    .sub_tasks_mut()
                    .remove(address.index);
                let refunded_xp = if removed.completed {
                    self.engine
                        .record_uncompletion(&mut document.progression, now)
                } else {
                    0
                };
                debug!(sub_task_id = %sub_task_id, refunded_xp, "Deleted sub-task");
                Ok(Applied::Deleted { refunded_xp })
            }
            Edit::RetitleCell {
                section_id,
                cell_id,
                title,
            } => {
                let slot = tree.resolve_cell(section_id, cell_id)?;
                tree.retitle(slot, title.as_str());
                Ok(Applied::Retitled)
            }
        }
    }
}
