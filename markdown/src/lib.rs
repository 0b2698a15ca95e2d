//! Markdown interchange for Mandala.
//!
//! Two document kinds round-trip through a user-chosen directory:
//!
//! - **Mandala document** (`mandala-<date>.md`): the whole tree as headings
//!   and checkboxes. Importing it rewrites titles only.
//! - **Task list** (`tasks-<date>.md`): every sub-task under "To Do" or
//!   "Done". Importing it updates or adds sub-tasks.
//!
//! Renderers are deterministic given their inputs. Parsers are best-effort:
//! lines they do not recognise are ignored.

mod error;
mod frontmatter;
pub mod mandala;
pub mod tasks;
mod vault;

pub use error::CodecError;
pub use mandala::{AreaOutline, MandalaImport, MandalaOutline, parse_mandala, render_mandala};
pub use tasks::{ImportReport, TaskLine, apply_tasks, parse_tasks, render_tasks};
pub use vault::{EXTENSION, Imported, MANDALA_PREFIX, TASKS_PREFIX, Vault};
