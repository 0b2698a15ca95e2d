//! Chat-style commands (`done <title>`, `/done <title>`).

use chrono::{DateTime, Utc};

use mandala_types::{Document, NonEmptyString};

use crate::progression::ProgressionEngine;
use crate::resolver::{Resolution, complete_by_title};

pub const USAGE_REPLY: &str = "Usage: done <task title>";
pub const HELP_REPLY: &str = "Send 'done <task>' to mark a task complete.";
pub const ALREADY_COMPLETED_REPLY: &str = "Task already completed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Done(NonEmptyString),
    /// The keyword was given without a title.
    Usage,
    Unrecognized,
}

impl ChatCommand {
    /// Parse one inbound message. The keyword is matched case-insensitively;
    /// the title keeps its original case.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (keyword, rest) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));

        if !(keyword.eq_ignore_ascii_case("done") || keyword.eq_ignore_ascii_case("/done")) {
            return ChatCommand::Unrecognized;
        }
        match NonEmptyString::new(rest.trim()) {
            Ok(title) => ChatCommand::Done(title),
            Err(_) => ChatCommand::Usage,
        }
    }
}

#[must_use]
pub fn reply_text(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Completed { title, .. } => format!("Completed: {title}"),
        Resolution::Created { title, .. } => format!("Added and completed: {title}"),
        Resolution::AlreadyCompleted { .. } => ALREADY_COMPLETED_REPLY.to_string(),
    }
}

/// Reply to send back, and whether the document must be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub changed: bool,
}

/// Handle one inbound chat message against `document`.
pub fn respond(
    document: &mut Document,
    text: &str,
    now: DateTime<Utc>,
    engine: &ProgressionEngine,
) -> ChatReply {
    match ChatCommand::parse(text) {
        ChatCommand::Done(title) => {
            let resolution = complete_by_title(document, &title, now, engine);
            ChatReply {
                text: reply_text(&resolution),
                changed: resolution.changed(),
            }
        }
        ChatCommand::Usage => ChatReply {
            text: USAGE_REPLY.to_string(),
            changed: false,
        },
        ChatCommand::Unrecognized => ChatReply {
            text: HELP_REPLY.to_string(),
            changed: false,
        },
    }
}
