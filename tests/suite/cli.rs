//! End-to-end command runs through `App`

use std::fs;

use mandala::{Command, DEFAULT_USER};
use mandala_core::reminder::REMINDER_TITLE;
use mandala_store::DocumentStore;
use mandala_types::{InterchangeSettings, MeansAddress, UserId};

use crate::common::{at, file_app, memory_app, seeded_document, settings_from_toml, user};

fn args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

#[test]
fn default_user_id_is_valid() {
    assert!(UserId::new(DEFAULT_USER).is_ok());
}

#[test]
fn add_toggle_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);
    let now = at("2026-04-01T08:00:00Z");

    let raw = args("add section-2 sec-2-cell-5 Morning run");
    let added = app.run(&Command::parse(&raw), now).unwrap();
    let sub_task_id = added.strip_prefix("Added sub-task ").unwrap().to_string();

    let raw = args(&format!("toggle section-2 sec-2-cell-5 {sub_task_id}"));
    let toggled = app.run(&Command::parse(&raw), now).unwrap();
    assert_eq!(toggled, "Completed (+10 XP, streak 1 day(s))");

    let shown = app.run(&Command::parse(&args("show")), now).unwrap();
    assert!(shown.contains("Level 1 | XP 10 | Streak 1 day(s)"));
    assert!(shown.contains("Most active 08:00 | Top area Area 3"));
    assert!(shown.contains(&format!("    [x] Morning run [B]  ({sub_task_id})")));

    let stored = app.store().load(&user()).unwrap().unwrap();
    assert_eq!(stored.progression.xp, 10);
    assert_eq!(
        stored.goal_tree.means(MeansAddress { area: 2, cell: 5 }).sub_tasks()[0].title,
        "Morning run"
    );
}

#[test]
fn deleting_completed_sub_task_refunds_xp() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);
    let now = at("2026-04-01T08:00:00Z");

    let raw = args("add section-0 sec-0-cell-0 Stretch");
    let added = app.run(&Command::parse(&raw), now).unwrap();
    let sub_task_id = added.strip_prefix("Added sub-task ").unwrap().to_string();
    let raw = args(&format!("toggle section-0 sec-0-cell-0 {sub_task_id}"));
    app.run(&Command::parse(&raw), now).unwrap();

    let raw = args(&format!("rm section-0 sec-0-cell-0 {sub_task_id}"));
    let removed = app.run(&Command::parse(&raw), now).unwrap();

    assert_eq!(removed, "Deleted sub-task (-10 XP)");
    let stored = app.store().load(&user()).unwrap().unwrap();
    assert_eq!(stored.progression.xp, 0);
    assert_eq!(stored.progression.streak_days, 1);
}

#[test]
fn unresolved_address_is_an_error_and_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);

    let raw = args("add section-9 sec-9-cell-0 Nothing");
    let err = app
        .run(&Command::parse(&raw), at("2026-04-01T08:00:00Z"))
        .unwrap_err();

    assert!(err.to_string().contains("section-9"), "{err}");
    assert!(app.store().load(&user()).unwrap().is_none());
}

#[test]
fn renaming_a_theme_renames_its_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);

    let raw = args("rename section-3 sec-center-3 Family & friends");
    let out = app
        .run(&Command::parse(&raw), at("2026-04-01T08:00:00Z"))
        .unwrap();

    assert_eq!(out, "Renamed cell");
    let tree = app.store().load(&user()).unwrap().unwrap().goal_tree;
    assert_eq!(tree.surrounding_sections[3].theme(), "Family & friends");
    assert_eq!(tree.center_section.surrounding_cells[3].title, "Family & friends");
}

#[test]
fn export_then_import_reports_paths_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let app = file_app(&dir);
    let now = at("2026-04-01T08:00:00Z");
    app.store()
        .save(&user(), &seeded_document(now))
        .unwrap();

    let exported = app.run(&Command::parse(&args("export")), now).unwrap();
    let export_dir = dir.path().join("data").join("export");
    assert_eq!(
        exported,
        format!(
            "Exported {}\nExported {}",
            export_dir.join("mandala-2026-04-01.md").display(),
            export_dir.join("tasks-2026-04-01.md").display()
        )
    );

    let imported = app
        .run(&Command::parse(&args("import tasks")), now)
        .unwrap();
    assert_eq!(
        imported,
        format!(
            "Imported 2 task(s), skipped 0 from {}",
            export_dir.join("tasks-2026-04-01.md").display()
        )
    );

    let imported = app
        .run(&Command::parse(&args("import mandala")), now)
        .unwrap();
    assert!(
        imported.starts_with("Imported the vision, 8 theme(s) and 64 means cell(s) from "),
        "{imported}"
    );
}

#[test]
fn import_without_files_names_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);

    let out = app
        .run(
            &Command::parse(&args("import mandala")),
            at("2026-04-01T08:00:00Z"),
        )
        .unwrap();

    assert_eq!(
        out,
        format!(
            "No mandala-*.md file in {}",
            dir.path().join("data").join("export").display()
        )
    );
}

#[test]
fn auto_sync_exports_after_done() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);
    let now = at("2026-04-01T08:00:00Z");
    let vault = dir.path().join("vault");
    let mut document = seeded_document(now);
    document.interchange = Some(InterchangeSettings {
        export_path: vault.display().to_string(),
        auto_sync: true,
    });
    app.store().save(&user(), &document).unwrap();

    let out = app
        .run(&Command::parse(&args("done Read 10 pages")), now)
        .unwrap();

    assert!(out.starts_with("Completed: Read 10 pages\nSynced "), "{out}");
    let tasks = fs::read_to_string(vault.join("tasks-2026-04-01.md")).unwrap();
    assert!(tasks.contains("## ✅ Done (1)\n\n- [[Read]]: Read 10 pages [B]"));
    assert!(vault.join("mandala-2026-04-01.md").exists());
}

#[test]
fn due_reminder_fires_once_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_from_toml(
        dir.path(),
        &format!(
            r#"
[progression]
utc_offset_minutes = 0

[store]
data_dir = "{}"

[reminders]
enabled = true
time = "09:00"
frequency = "daily"
"#,
            dir.path().join("data").display()
        ),
    );
    let app = mandala::App::new(
        mandala_store::MemoryStore::default(),
        user(),
        settings,
    );
    let due_args = args("due");
    let due = Command::parse(&due_args);

    let early = app.run(&due, at("2026-04-01T08:59:00Z")).unwrap();
    assert_eq!(early, "No reminder due.");

    let first = app.run(&due, at("2026-04-01T09:00:10Z")).unwrap();
    assert!(first.starts_with(REMINDER_TITLE));

    let again = app.run(&due, at("2026-04-01T09:00:50Z")).unwrap();
    assert_eq!(again, "No reminder due.");

    let stored = app.store().load(&user()).unwrap().unwrap();
    assert_eq!(
        stored.reminders.last_sent_at,
        Some(at("2026-04-01T09:00:10Z"))
    );
}

#[test]
fn reminders_disabled_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);
    let out = app
        .run(&Command::parse(&args("due")), at("2026-04-01T09:00:00Z"))
        .unwrap();
    assert_eq!(out, "Reminders are disabled.");
}

#[test]
fn usage_and_unknown_commands_fail() {
    let dir = tempfile::tempdir().unwrap();
    let app = memory_app(&dir);
    let now = at("2026-04-01T09:00:00Z");

    let raw = args("edit section-0");
    let err = app.run(&Command::parse(&raw), now).unwrap_err();
    assert_eq!(
        err.to_string(),
        "usage: mandala edit <section> <cell> <sub-task> <title...>"
    );

    let raw = args("launch");
    let err = app.run(&Command::parse(&raw), now).unwrap_err();
    assert!(err.to_string().contains("unknown command \"launch\""));
}
