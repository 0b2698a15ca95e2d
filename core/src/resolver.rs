//! Free-text lookup of sub-tasks, used by chat-style "done" commands.

use chrono::{DateTime, Utc};
use tracing::info;

use mandala_types::{
    Difficulty, Document, GoalTree, MeansAddress, NonEmptyString, SubTask, SubTaskEntry,
};

use crate::progression::{CompletionReport, ProgressionEngine};

/// Where an unmatched title is filed: first area, first means-cell.
const FALLBACK_CELL: MeansAddress = MeansAddress { area: 0, cell: 0 };

/// Outcome of [`complete_by_title`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An open sub-task matched and is now done.
    Completed {
        title: String,
        report: CompletionReport,
    },
    /// The first match was already done; nothing changed.
    AlreadyCompleted { title: String },
    /// Nothing matched; a completed sub-task was filed under the fallback cell.
    Created {
        title: String,
        report: CompletionReport,
    },
}

impl Resolution {
    /// True when the document was modified and needs saving.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyCompleted { .. })
    }
}

/// First sub-task whose title equals `title` ignoring case, in traversal order.
#[must_use]
pub fn find_by_title<'a>(tree: &'a GoalTree, title: &str) -> Option<SubTaskEntry<'a>> {
    let query = title.to_lowercase();
    tree.sub_task_entries()
        .find(|entry| entry.sub_task.title.to_lowercase() == query)
}

/// Mark the sub-task titled `title` done, creating it when nothing matches.
///
/// Always succeeds: an unmatched title becomes a new completed sub-task in
/// the first area's first means-cell, categorised under that area's theme.
pub fn complete_by_title(
    document: &mut Document,
    title: &NonEmptyString,
    now: DateTime<Utc>,
    engine: &ProgressionEngine,
) -> Resolution {
    let tree = &mut document.goal_tree;

    if let Some(entry) = find_by_title(tree, title) {
        let address = entry.address;
        let matched_title = entry.sub_task.title.clone();
        if entry.sub_task.completed {
            info!(title = %matched_title, "Sub-task already completed");
            return Resolution::AlreadyCompleted {
                title: matched_title,
            };
        }
        let category = entry.section.theme().to_string();

        tree.sub_task_mut(address).completed = true;
        let report = engine.complete(&mut document.progression, &category, now);
        info!(title = %matched_title, xp = document.progression.xp, "Completed sub-task by title");
        return Resolution::Completed {
            title: matched_title,
            report,
        };
    }

    let category = tree.theme_of(FALLBACK_CELL).to_string();
    tree.means_mut(FALLBACK_CELL)
        .sub_tasks_mut()
        .push(SubTask::with_state(title.as_str(), true, Difficulty::B, now));
    let report = engine.complete(&mut document.progression, &category, now);
    info!(title = %title.as_str(), xp = document.progression.xp, "Filed unmatched completion");
    Resolution::Created {
        title: title.as_str().to_string(),
        report,
    }
}
