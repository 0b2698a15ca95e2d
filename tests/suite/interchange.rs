//! Markdown export and import through an export directory

use std::fs;

use chrono::{DateTime, FixedOffset, Utc};

use mandala_markdown::{ImportReport, MandalaImport, Vault};
use mandala_types::{Difficulty, GoalTree, MeansAddress, SubTask};

use crate::common::{at, seeded_document};

fn local(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap())
}

#[test]
fn mandala_round_trip_restores_all_titles_and_keeps_sub_tasks() {
    let now = at("2026-04-01T10:00:00Z");
    let dir = tempfile::tempdir().unwrap();
    let vault = Vault::new(dir.path());

    let mut document = seeded_document(now);
    for (area, section) in document.goal_tree.surrounding_sections.iter_mut().enumerate() {
        for (cell, means) in section.surrounding_cells.iter_mut().enumerate() {
            means.title = format!("Means {area}/{cell} (#{})", area * 8 + cell);
        }
    }
    document.goal_tree.surrounding_sections[5].center_cell.title = "Money: 2026 plan".into();
    document.goal_tree.sync_mirrors();
    vault.export_mandala(&document, local(now)).unwrap();

    let mut tree = GoalTree::placeholder();
    tree.means_mut(MeansAddress { area: 4, cell: 4 })
        .sub_tasks_mut()
        .push(SubTask::new("Untouched", now));
    let sub_tasks_before = serde_json::to_string(
        &tree
            .sub_task_entries()
            .map(|entry| entry.sub_task.clone())
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let imported = vault.import_mandala(&mut tree).unwrap().unwrap();

    assert_eq!(
        imported.outcome,
        MandalaImport::Applied {
            vision: true,
            themes: 8,
            means: 64
        }
    );
    assert_eq!(tree.vision(), document.goal_tree.vision());
    for (got, want) in tree
        .surrounding_sections
        .iter()
        .zip(&document.goal_tree.surrounding_sections)
    {
        assert_eq!(got.theme(), want.theme());
        let got_titles: Vec<_> = got.surrounding_cells.iter().map(|c| &c.title).collect();
        let want_titles: Vec<_> = want.surrounding_cells.iter().map(|c| &c.title).collect();
        assert_eq!(got_titles, want_titles);
    }
    for (i, mirror) in tree.center_section.surrounding_cells.iter().enumerate() {
        assert_eq!(mirror.title, tree.surrounding_sections[i].center_cell.title);
    }
    let sub_tasks_after = serde_json::to_string(
        &tree
            .sub_task_entries()
            .map(|entry| entry.sub_task.clone())
            .collect::<Vec<_>>(),
    )
    .unwrap();
    assert_eq!(sub_tasks_after, sub_tasks_before);
}

#[test]
fn newest_export_wins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mandala-2026-03-01.md"), "# Old vision\n").unwrap();
    fs::write(dir.path().join("mandala-2026-04-01.md"), "# New vision\n").unwrap();
    let vault = Vault::new(dir.path());

    let mut tree = GoalTree::placeholder();
    let imported = vault.import_mandala(&mut tree).unwrap().unwrap();

    assert_eq!(imported.path, dir.path().join("mandala-2026-04-01.md"));
    assert_eq!(tree.vision(), "New vision");
}

#[test]
fn done_line_completes_existing_sub_task() {
    let now = at("2026-04-01T10:00:00Z");
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tasks-2026-04-01.md"),
        "# Task List\n\n## ✅ Done (1)\n\n- [[Read]]: Read 10 pages [B]\n",
    )
    .unwrap();
    let mut document = seeded_document(now);

    let imported = Vault::new(dir.path())
        .import_tasks(&mut document.goal_tree, now)
        .unwrap()
        .unwrap();

    assert_eq!(
        imported.outcome,
        ImportReport {
            imported: 1,
            skipped: 0
        }
    );
    let read = document.goal_tree.means(MeansAddress { area: 1, cell: 0 });
    assert_eq!(read.sub_tasks().len(), 1);
    assert!(read.sub_tasks()[0].completed);
    assert_eq!(read.sub_tasks()[0].difficulty, Some(Difficulty::B));
    assert_eq!(document.progression.xp, 0);
}

#[test]
fn unknown_cell_is_skipped_and_tree_unchanged() {
    let now = at("2026-04-01T10:00:00Z");
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tasks-2026-04-01.md"),
        "## 📋 To Do (1)\n- [[Swim]]: 1 km\n",
    )
    .unwrap();
    let mut document = seeded_document(now);
    let before = document.goal_tree.clone();

    let imported = Vault::new(dir.path())
        .import_tasks(&mut document.goal_tree, now)
        .unwrap()
        .unwrap();

    assert_eq!(
        imported.outcome,
        ImportReport {
            imported: 0,
            skipped: 1
        }
    );
    assert_eq!(document.goal_tree, before);
}

#[test]
fn task_export_lists_todo_before_done() {
    let now = at("2026-04-01T10:00:00Z");
    let dir = tempfile::tempdir().unwrap();
    let mut document = seeded_document(now);
    document
        .goal_tree
        .means_mut(MeansAddress { area: 0, cell: 0 })
        .sub_tasks_mut()[0]
        .completed = true;

    let path = Vault::new(dir.path())
        .export_tasks(&document, local(now))
        .unwrap();
    let content = fs::read_to_string(&path).unwrap();

    assert_eq!(path, dir.path().join("tasks-2026-04-01.md"));
    let todo = content.find("## 📋 To Do (1)").unwrap();
    let done = content.find("## ✅ Done (1)").unwrap();
    let read = content.find("- [[Read]]: Read 10 pages [B]").unwrap();
    let sleep = content.find("- [[Sleep]]: In bed by 23:00 [B]").unwrap();
    assert!(todo < read && read < done && done < sleep);
}
