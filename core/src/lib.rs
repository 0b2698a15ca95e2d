//! Core domain logic for Mandala.
//!
//! Everything here is a pure function of a [`mandala_types::Document`] and
//! an event: tree edits, the progression state machine, title lookup for
//! chat commands and the reminder schedule. Loading and saving documents
//! belongs to `mandala-store`.

pub mod command;
mod edit;
pub mod progression;
pub mod reminder;
pub mod resolver;

pub use command::{ChatCommand, ChatReply, reply_text, respond};
pub use edit::{Applied, Edit, EditOutcome, TreeEditor};
pub use progression::{CompletionReport, ProgressionEngine};
pub use resolver::{Resolution, complete_by_title, find_by_title};
