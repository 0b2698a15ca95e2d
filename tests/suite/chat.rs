//! `done <title>` messages resolved against a stored document

use mandala_core::{ProgressionEngine, respond};
use mandala_core::command::{ALREADY_COMPLETED_REPLY, HELP_REPLY, USAGE_REPLY};
use mandala_store::{MemoryStore, update};
use mandala_types::{ActivityTracking, MeansAddress, ProgressionSettings, SubTask};

use crate::common::{at, seeded_document, user};

fn engine() -> ProgressionEngine {
    ProgressionEngine::new(ProgressionSettings::from_minutes(ActivityTracking::Full, 0).unwrap())
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::default();
    update(&store, &user(), |document| {
        *document = seeded_document(at("2026-04-01T07:00:00Z"));
    })
    .unwrap();
    store
}

#[test]
fn done_matches_case_insensitively_and_saves() {
    let store = seeded_store();
    let now = at("2026-04-01T08:00:00Z");

    let (document, reply) = update(&store, &user(), |document| {
        respond(document, "DONE read 10 PAGES", now, &engine())
    })
    .unwrap();

    assert_eq!(reply.text, "Completed: Read 10 pages");
    assert!(reply.changed);
    assert_eq!(document.progression.xp, 10);
    assert_eq!(document.progression.streak_days, 1);
    assert_eq!(
        document.progression.behavior_stats.top_category(),
        Some("Learning")
    );
    assert!(
        document
            .goal_tree
            .means(MeansAddress { area: 1, cell: 0 })
            .sub_tasks()[0]
            .completed
    );
}

#[test]
fn unmatched_title_is_filed_under_first_means_cell() {
    let store = seeded_store();
    let now = at("2026-04-01T08:00:00Z");

    let (document, reply) = update(&store, &user(), |document| {
        respond(document, "/done Call grandma", now, &engine())
    })
    .unwrap();

    assert_eq!(reply.text, "Added and completed: Call grandma");
    let first = document.goal_tree.means(MeansAddress { area: 0, cell: 0 });
    let titles: Vec<_> = first.sub_tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["In bed by 23:00", "Call grandma"]);
    assert!(first.sub_tasks()[1].completed);
    assert_eq!(document.progression.xp, 10);
}

#[test]
fn repeated_done_is_reported_and_not_saved_again() {
    let store = seeded_store();
    let now = at("2026-04-01T08:00:00Z");
    let (first, _) = update(&store, &user(), |document| {
        respond(document, "done Read 10 pages", now, &engine())
    })
    .unwrap();

    let (second, reply) = update(&store, &user(), |document| {
        respond(document, "done Read 10 pages", now, &engine())
    })
    .unwrap();

    assert_eq!(reply.text, ALREADY_COMPLETED_REPLY);
    assert!(!reply.changed);
    assert_eq!(second.revision, first.revision);
    assert_eq!(second.progression.xp, 10);
}

#[test]
fn usage_and_help_replies_change_nothing() {
    let store = seeded_store();
    let now = at("2026-04-01T08:00:00Z");

    for (message, expected) in [("done", USAGE_REPLY), ("done   ", USAGE_REPLY), ("hi", HELP_REPLY)] {
        let (document, reply) =
            update(&store, &user(), |document| respond(document, message, now, &engine())).unwrap();
        assert_eq!(reply.text, expected, "message {message:?}");
        assert_eq!(document.progression.xp, 0);
    }
}

#[test]
fn first_match_in_traversal_order_wins() {
    let store = seeded_store();
    let now = at("2026-04-01T08:00:00Z");
    update(&store, &user(), |document| {
        document
            .goal_tree
            .means_mut(MeansAddress { area: 0, cell: 3 })
            .sub_tasks_mut()
            .push(SubTask::new("Stretch", now));
        document
            .goal_tree
            .means_mut(MeansAddress { area: 1, cell: 3 })
            .sub_tasks_mut()
            .push(SubTask::new("stretch", now));
    })
    .unwrap();

    let (document, _) = update(&store, &user(), |document| {
        respond(document, "done STRETCH", now, &engine())
    })
    .unwrap();

    let tree = &document.goal_tree;
    assert!(tree.means(MeansAddress { area: 0, cell: 3 }).sub_tasks()[0].completed);
    assert!(!tree.means(MeansAddress { area: 1, cell: 3 }).sub_tasks()[0].completed);
}
