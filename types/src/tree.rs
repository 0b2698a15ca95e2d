//! Goal tree: one vision section surrounded by eight area sections.
//!
//! The 1 + 8 x (1 + 8) shape is carried by fixed-size arrays, so a tree with a
//! missing area or a ninth means-cell can be neither constructed nor
//! deserialized. Sub-task lists are the only unbounded part and stay absent
//! until the first sub-task is added.

use std::array;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const AREA_COUNT: usize = 8;
pub const MEANS_PER_AREA: usize = 8;

pub const CENTER_SECTION_ID: &str = "section-center";
pub const VISION_CELL_ID: &str = "center-goal";

// ── Difficulty ───────────────────────────────────────────────

/// Self-assessed effort of a sub-task, rendered as a `[S]`..`[C]` badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    S,
    A,
    #[default]
    B,
    C,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::S => "S",
            Difficulty::A => "A",
            Difficulty::B => "B",
            Difficulty::C => "C",
        }
    }

    /// Parse a badge letter. Only the exact upper-case letters are accepted.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "S" => Some(Difficulty::S),
            "A" => Some(Difficulty::A),
            "B" => Some(Difficulty::B),
            "C" => Some(Difficulty::C),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Cells ────────────────────────────────────────────────────

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// A leaf unit of work attached to a means-cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Absent only on records written before difficulty existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default = "unix_epoch")]
    pub created_at: DateTime<Utc>,
}

impl SubTask {
    /// A fresh, open sub-task with the default difficulty.
    #[must_use]
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_state(title, false, Difficulty::default(), now)
    }

    #[must_use]
    pub fn with_state(
        title: impl Into<String>,
        completed: bool,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("sub-{}", Uuid::new_v4().simple()),
            title: title.into(),
            completed,
            difficulty: Some(difficulty),
            created_at: now,
        }
    }
}

/// A goal node. Means-cells additionally own a lazily created sub-task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandalaCell {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_tasks: Option<Vec<SubTask>>,
}

impl MandalaCell {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            sub_tasks: None,
        }
    }

    /// Sub-tasks in insertion order; empty when the list was never created.
    #[must_use]
    pub fn sub_tasks(&self) -> &[SubTask] {
        self.sub_tasks.as_deref().unwrap_or_default()
    }

    pub fn sub_tasks_mut(&mut self) -> &mut Vec<SubTask> {
        self.sub_tasks.get_or_insert_with(Vec::new)
    }

    /// True iff the cell has at least one sub-task and every one is done.
    #[must_use]
    pub fn is_achieved(&self) -> bool {
        let tasks = self.sub_tasks();
        !tasks.is_empty() && tasks.iter().all(|task| task.completed)
    }

    #[must_use]
    pub fn sub_task_position(&self, sub_task_id: &str) -> Option<usize> {
        self.sub_tasks().iter().position(|task| task.id == sub_task_id)
    }
}

/// A theme cell plus its eight surrounding cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandalaSection {
    pub id: String,
    pub center_cell: MandalaCell,
    pub surrounding_cells: [MandalaCell; MEANS_PER_AREA],
}

impl MandalaSection {
    #[must_use]
    pub fn theme(&self) -> &str {
        &self.center_cell.title
    }

    #[must_use]
    pub fn cell_position(&self, cell_id: &str) -> Option<usize> {
        self.surrounding_cells.iter().position(|cell| cell.id == cell_id)
    }
}

// ── Addresses ────────────────────────────────────────────────

/// Where a resolved `(section id, cell id)` pair lives in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSlot {
    /// The root goal at the center of the center section.
    Vision,
    /// A center-section cell mirroring area `i`'s theme.
    Mirror(usize),
    /// The theme cell of area `i`.
    Theme(usize),
    Means(MeansAddress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeansAddress {
    pub area: usize,
    pub cell: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubTaskAddress {
    pub means: MeansAddress,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("section not found: {section_id}")]
    SectionNotFound { section_id: String },
    #[error("cell {cell_id} not found in section {section_id}")]
    CellNotFound { section_id: String, cell_id: String },
    #[error("cell {cell_id} in section {section_id} cannot hold sub-tasks")]
    NotMeansCell { section_id: String, cell_id: String },
    #[error("sub-task {sub_task_id} not found in cell {cell_id}")]
    SubTaskNotFound {
        cell_id: String,
        sub_task_id: String,
    },
}

/// One sub-task together with the section and cell that own it.
#[derive(Debug, Clone, Copy)]
pub struct SubTaskEntry<'a> {
    pub address: SubTaskAddress,
    pub section: &'a MandalaSection,
    pub cell: &'a MandalaCell,
    pub sub_task: &'a SubTask,
}

// ── Tree ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTree {
    pub center_section: MandalaSection,
    pub surrounding_sections: [MandalaSection; AREA_COUNT],
}

impl Default for GoalTree {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl GoalTree {
    /// The tree a new user starts with: placeholder titles, no sub-tasks.
    #[must_use]
    pub fn placeholder() -> Self {
        let center_section = MandalaSection {
            id: CENTER_SECTION_ID.to_string(),
            center_cell: MandalaCell::new(VISION_CELL_ID, "Life Vision"),
            surrounding_cells: array::from_fn(|i| {
                MandalaCell::new(format!("center-sub-{i}"), format!("Area {}", i + 1))
            }),
        };
        let surrounding_sections = array::from_fn(|i| MandalaSection {
            id: format!("section-{i}"),
            center_cell: MandalaCell::new(format!("sec-center-{i}"), format!("Area {}", i + 1)),
            surrounding_cells: array::from_fn(|j| {
                MandalaCell::new(format!("sec-{i}-cell-{j}"), format!("Task {}", j + 1))
            }),
        });
        Self {
            center_section,
            surrounding_sections,
        }
    }

    #[must_use]
    pub fn vision(&self) -> &str {
        &self.center_section.center_cell.title
    }

    #[must_use]
    pub fn area_position(&self, section_id: &str) -> Option<usize> {
        self.surrounding_sections
            .iter()
            .position(|section| section.id == section_id)
    }

    /// Resolve any addressable cell, including the vision and theme cells.
    pub fn resolve_cell(&self, section_id: &str, cell_id: &str) -> Result<CellSlot, TreeError> {
        let cell_not_found = || TreeError::CellNotFound {
            section_id: section_id.to_string(),
            cell_id: cell_id.to_string(),
        };

        if section_id == self.center_section.id {
            if cell_id == self.center_section.center_cell.id {
                return Ok(CellSlot::Vision);
            }
            return self
                .center_section
                .cell_position(cell_id)
                .map(CellSlot::Mirror)
                .ok_or_else(cell_not_found);
        }

        let area = self
            .area_position(section_id)
            .ok_or_else(|| TreeError::SectionNotFound {
                section_id: section_id.to_string(),
            })?;
        let section = &self.surrounding_sections[area];
        if cell_id == section.center_cell.id {
            return Ok(CellSlot::Theme(area));
        }
        section
            .cell_position(cell_id)
            .map(|cell| CellSlot::Means(MeansAddress { area, cell }))
            .ok_or_else(cell_not_found)
    }

    /// Resolve a cell that may own sub-tasks.
    pub fn resolve_means(&self, section_id: &str, cell_id: &str) -> Result<MeansAddress, TreeError> {
        match self.resolve_cell(section_id, cell_id)? {
            CellSlot::Means(address) => Ok(address),
            CellSlot::Vision | CellSlot::Mirror(_) | CellSlot::Theme(_) => {
                Err(TreeError::NotMeansCell {
                    section_id: section_id.to_string(),
                    cell_id: cell_id.to_string(),
                })
            }
        }
    }

    pub fn resolve_sub_task(
        &self,
        section_id: &str,
        cell_id: &str,
        sub_task_id: &str,
    ) -> Result<SubTaskAddress, TreeError> {
        let means = self.resolve_means(section_id, cell_id)?;
        let index = self
            .means(means)
            .sub_task_position(sub_task_id)
            .ok_or_else(|| TreeError::SubTaskNotFound {
                cell_id: cell_id.to_string(),
                sub_task_id: sub_task_id.to_string(),
            })?;
        Ok(SubTaskAddress { means, index })
    }

    #[must_use]
    pub fn cell(&self, slot: CellSlot) -> &MandalaCell {
        match slot {
            CellSlot::Vision => &self.center_section.center_cell,
            CellSlot::Mirror(i) => &self.center_section.surrounding_cells[i],
            CellSlot::Theme(i) => &self.surrounding_sections[i].center_cell,
            CellSlot::Means(address) => self.means(address),
        }
    }

    #[must_use]
    pub fn means(&self, address: MeansAddress) -> &MandalaCell {
        &self.surrounding_sections[address.area].surrounding_cells[address.cell]
    }

    pub fn means_mut(&mut self, address: MeansAddress) -> &mut MandalaCell {
        &mut self.surrounding_sections[address.area].surrounding_cells[address.cell]
    }

    #[must_use]
    pub fn sub_task(&self, address: SubTaskAddress) -> &SubTask {
        &self.means(address.means).sub_tasks()[address.index]
    }

    pub fn sub_task_mut(&mut self, address: SubTaskAddress) -> &mut SubTask {
        &mut self.means_mut(address.means).sub_tasks_mut()[address.index]
    }

    /// Theme title of the area owning `address`, used as the completion category.
    #[must_use]
    pub fn theme_of(&self, address: MeansAddress) -> &str {
        self.surrounding_sections[address.area].theme()
    }

    /// Rename a cell. Renaming either side of a theme/mirror pair renames both.
    pub fn retitle(&mut self, slot: CellSlot, title: &str) {
        match slot {
            CellSlot::Vision => title.clone_into(&mut self.center_section.center_cell.title),
            CellSlot::Mirror(i) | CellSlot::Theme(i) => {
                title.clone_into(&mut self.center_section.surrounding_cells[i].title);
                title.clone_into(&mut self.surrounding_sections[i].center_cell.title);
            }
            CellSlot::Means(address) => title.clone_into(&mut self.means_mut(address).title),
        }
    }

    /// Copy every area theme onto its mirror cell in the center section.
    pub fn sync_mirrors(&mut self) {
        for (mirror, section) in self
            .center_section
            .surrounding_cells
            .iter_mut()
            .zip(&self.surrounding_sections)
        {
            section.center_cell.title.clone_into(&mut mirror.title);
        }
    }

    #[must_use]
    pub fn mirrors_in_sync(&self) -> bool {
        self.center_section
            .surrounding_cells
            .iter()
            .zip(&self.surrounding_sections)
            .all(|(mirror, section)| mirror.title == section.center_cell.title)
    }

    /// Every sub-task in traversal order: areas, then means-cells, then sub-tasks.
    pub fn sub_task_entries(&self) -> impl Iterator<Item = SubTaskEntry<'_>> {
        self.surrounding_sections
            .iter()
            .enumerate()
            .flat_map(|(area, section)| {
                section
                    .surrounding_cells
                    .iter()
                    .enumerate()
                    .flat_map(move |(cell_index, cell)| {
                        cell.sub_tasks()
                            .iter()
                            .enumerate()
                            .map(move |(index, sub_task)| SubTaskEntry {
                                address: SubTaskAddress {
                                    means: MeansAddress {
                                        area,
                                        cell: cell_index,
                                    },
                                    index,
                                },
                                section,
                                cell,
                                sub_task,
                            })
                    })
            })
    }
}
