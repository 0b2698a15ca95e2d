//! Plain-text rendering for `mandala show`.

use mandala_types::{Document, MandalaCell};

fn cell_line(out: &mut String, indent: &str, section_id: &str, cell: &MandalaCell) {
    out.push_str(&format!("{indent}{}  ({section_id} {})\n", cell.title, cell.id));
}

#[must_use]
pub fn render_overview(document: &Document) -> String {
    let tree = &document.goal_tree;
    let progression = &document.progression;
    let mut out = String::new();

    cell_line(
        &mut out,
        "",
        &tree.center_section.id,
        &tree.center_section.center_cell,
    );
    out.push_str(&format!(
        "Level {} | XP {} | Streak {} day(s)\n",
        progression.level, progression.xp, progression.streak_days
    ));
    let stats = &progression.behavior_stats;
    if let (Some(hour), Some(area)) = (stats.peak_hour(), stats.top_category()) {
        out.push_str(&format!("Most active {hour:02}:00 | Top area {area}\n"));
    }

    for section in &tree.surrounding_sections {
        out.push('\n');
        cell_line(&mut out, "", &section.id, &section.center_cell);
        for cell in &section.surrounding_cells {
            cell_line(&mut out, "  ", &section.id, cell);
            for sub_task in cell.sub_tasks() {
                let mark = if sub_task.completed { "[x]" } else { "[ ]" };
                let badge = sub_task
                    .difficulty
                    .map(|d| format!(" [{d}]"))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "    {mark} {}{badge}  ({})\n",
                    sub_task.title, sub_task.id
                ));
            }
        }
    }

    out
}
