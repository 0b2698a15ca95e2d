//! The task-list document: every sub-task, split into "To Do" and "Done".

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use tracing::debug;

use mandala_types::{Difficulty, GoalTree, MeansAddress, ProgressionState, SubTask, SubTaskEntry};

use crate::frontmatter::{FrontMatter, body};

const TAGS: &[&str] = &["tasks", "todo"];

struct Patterns {
    task: Regex,
    difficulty: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        task: Regex::new(r"^- \[\[(.+?)\]\]:\s+(.+)$").expect("valid task line regex"),
        difficulty: Regex::new(r"\s+\[([SABC])\]$").expect("valid difficulty badge regex"),
    })
}

fn task_line(entry: &SubTaskEntry<'_>) -> String {
    let badge = entry
        .sub_task
        .difficulty
        .map(|d| format!(" [{d}]"))
        .unwrap_or_default();
    format!("- [[{}]]: {}{badge}\n", entry.cell.title, entry.sub_task.title)
}

#[must_use]
pub fn render_tasks(
    tree: &GoalTree,
    progression: &ProgressionState,
    now: DateTime<FixedOffset>,
) -> String {
    let (done, todo): (Vec<_>, Vec<_>) = tree
        .sub_task_entries()
        .partition(|entry| entry.sub_task.completed);

    let mut md = FrontMatter {
        title: "Task List",
        date: now,
        fields: &[],
        tags: TAGS,
    }
    .render();

    md.push_str("\n# Task List\n\n");
    md.push_str(&format!(
        "**Level:** {} | **Total Tasks:** {}\n\n",
        progression.level,
        todo.len() + done.len()
    ));

    md.push_str(&format!("## 📋 To Do ({})\n\n", todo.len()));
    md.extend(todo.iter().map(task_line));
    md.push_str(&format!("\n## ✅ Done ({})\n\n", done.len()));
    md.extend(done.iter().map(task_line));
    md
}

/// One `- [[Cell]]: Title [D]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
    pub cell_title: String,
    pub title: String,
    pub completed: bool,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse task lines. A heading mentioning "done" switches following lines
/// to completed, one mentioning "to do" switches back.
#[must_use]
pub fn parse_tasks(content: &str) -> Vec<TaskLine> {
    let patterns = patterns();
    let mut completed = false;
    let mut tasks = Vec::new();

    for line in body(content).lines() {
        if line.starts_with("## ") {
            let heading = line.to_lowercase();
            if heading.contains("done") {
                completed = true;
            } else if heading.contains("to do") {
                completed = false;
            }
            continue;
        }

        let Some(caps) = patterns.task.captures(line) else {
            continue;
        };
        let mut title = caps[2].trim();
        let mut difficulty = None;
        if let Some(badge) = patterns.difficulty.captures(title) {
            difficulty = Difficulty::parse(&badge[1]);
            let start = badge.get(0).map_or(title.len(), |m| m.start());
            title = title[..start].trim();
        }

        tasks.push(TaskLine {
            cell_title: caps[1].trim().to_string(),
            title: title.to_string(),
            completed,
            difficulty,
        });
    }

    tasks
}

/// Means-cell title to position; the first cell with a given title wins.
fn cell_index(tree: &GoalTree) -> HashMap<String, MeansAddress> {
    let mut index = HashMap::new();
    for (area, section) in tree.surrounding_sections.iter().enumerate() {
        for (cell, means) in section.surrounding_cells.iter().enumerate() {
            if let Entry::Vacant(slot) = index.entry(means.title.clone()) {
                slot.insert(MeansAddress { area, cell });
            }
        }
    }
    index
}

/// Merge parsed lines into `tree`.
///
/// A line whose cell title matches no means-cell is skipped. Otherwise the
/// sub-task with exactly that title takes the line's completion (and its
/// difficulty, when given), or a new sub-task is appended.
pub fn apply_tasks(tree: &mut GoalTree, lines: &[TaskLine], now: DateTime<Utc>) -> ImportReport {
    let index = cell_index(tree);
    let mut report = ImportReport::default();

    for line in lines {
        let Some(&address) = index.get(&line.cell_title) else {
            debug!(cell = %line.cell_title, title = %line.title, "Skipping task for unknown cell");
            report.skipped += 1;
            continue;
        };

        let sub_tasks = tree.means_mut(address).sub_tasks_mut();
        match sub_tasks.iter_mut().find(|task| task.title == line.title) {
            Some(existing) => {
                existing.completed = line.completed;
                if line.difficulty.is_some() {
                    existing.difficulty = line.difficulty;
                }
            }
            None => sub_tasks.push(SubTask::with_state(
                line.title.as_str(),
                line.completed,
                line.difficulty.unwrap_or_default(),
                now,
            )),
        }
        report.imported += 1;
    }

    report
}
