//! The Mandala document: a full snapshot of the goal tree.
//!
//! Import is titles-only. The vision, the eight themes and the 64 means
//! titles are rewritten by position; sub-tasks are never touched, so the
//! sub-task lines in an export are informational on the way back in.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use tracing::debug;

use mandala_types::{AREA_COUNT, GoalTree, MEANS_PER_AREA, ProgressionState};

use crate::frontmatter::{FrontMatter, body};

const CORE_VISION_HEADING: &str = "🎯 Core Vision";
const TAGS: &[&str] = &["mandala", "goals"];

struct Patterns {
    vision: Regex,
    heading: Regex,
    cell: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        vision: Regex::new(r"^#\s+(.*)$").expect("valid vision heading regex"),
        heading: Regex::new(r"^##\s+(.*)$").expect("valid section heading regex"),
        cell: Regex::new(r"^- \[[ xX]\]\s+(.+)$").expect("valid checkbox line regex"),
    })
}

fn checkbox(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

#[must_use]
pub fn render_mandala(
    tree: &GoalTree,
    progression: &ProgressionState,
    now: DateTime<FixedOffset>,
) -> String {
    let vision = tree.vision();
    let mut md = FrontMatter {
        title: "Mandala Chart",
        date: now,
        fields: &[("level", progression.level.to_string())],
        tags: TAGS,
    }
    .render();

    md.push_str(&format!("\n# {vision}\n\n"));
    md.push_str(&format!(
        "**Level:** {} | **XP:** {}\n\n",
        progression.level, progression.xp
    ));
    md.push_str(&format!("## {CORE_VISION_HEADING}\n\n{vision}\n\n"));

    for section in &tree.surrounding_sections {
        md.push_str(&format!("## {}\n\n", section.theme()));
        for cell in &section.surrounding_cells {
            md.push_str(&format!("- {} {}\n", checkbox(cell.is_achieved()), cell.title));
            for sub_task in cell.sub_tasks() {
                let badge = sub_task
                    .difficulty
                    .map(|d| format!(" [{d}]"))
                    .unwrap_or_default();
                md.push_str(&format!(
                    "  - {} {}{badge}\n",
                    checkbox(sub_task.completed),
                    sub_task.title
                ));
            }
        }
        md.push('\n');
    }

    md
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaOutline {
    pub theme: String,
    pub means: Vec<String>,
}

/// Titles recovered from a Mandala document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MandalaOutline {
    pub vision: Option<String>,
    pub areas: Vec<AreaOutline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandalaImport {
    /// No vision heading and no area headings were found.
    Empty,
    Applied {
        vision: bool,
        themes: usize,
        means: usize,
    },
}

#[must_use]
pub fn parse_mandala(content: &str) -> MandalaOutline {
    let patterns = patterns();
    let mut outline = MandalaOutline::default();
    let mut in_area = false;

    for line in body(content).lines() {
        if let Some(caps) = patterns.heading.captures(line) {
            let title = caps[1].trim();
            if title.to_lowercase().contains("core vision") {
                in_area = false;
                continue;
            }
            outline.areas.push(AreaOutline {
                theme: title.to_string(),
                means: Vec::new(),
            });
            in_area = true;
            continue;
        }

        if outline.vision.is_none()
            && let Some(caps) = patterns.vision.captures(line)
        {
            outline.vision = Some(caps[1].trim().to_string());
            continue;
        }

        if !in_area {
            continue;
        }
        if let (Some(caps), Some(area)) = (patterns.cell.captures(line), outline.areas.last_mut()) {
            area.means.push(caps[1].trim().to_string());
        }
    }

    outline
}

impl MandalaOutline {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vision.is_none() && self.areas.is_empty()
    }

    /// Rewrite titles by position. Areas past the eighth and means past the
    /// eighth of an area are ignored. Mirrors are re-synchronised.
    pub fn apply(&self, tree: &mut GoalTree) -> MandalaImport {
        if self.is_empty() {
            return MandalaImport::Empty;
        }

        if let Some(vision) = &self.vision {
            vision.clone_into(&mut tree.center_section.center_cell.title);
        }

        let mut themes = 0;
        let mut means = 0;
        for (section, area) in tree
            .surrounding_sections
            .iter_mut()
            .zip(self.areas.iter().take(AREA_COUNT))
        {
            area.theme.clone_into(&mut section.center_cell.title);
            themes += 1;
            for (cell, title) in section
                .surrounding_cells
                .iter_mut()
                .zip(area.means.iter().take(MEANS_PER_AREA))
            {
                title.clone_into(&mut cell.title);
                means += 1;
            }
        }
        tree.sync_mirrors();

        if self.areas.len() > AREA_COUNT {
            debug!(
                ignored = self.areas.len() - AREA_COUNT,
                "Ignoring areas past the eighth"
            );
        }

        MandalaImport::Applied {
            vision: self.vision.is_some(),
            themes,
            means,
        }
    }
}
