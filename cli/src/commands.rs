//! Command-line verbs.
//!
//! Arguments are already split by the shell. Titles are the remaining
//! arguments joined with single spaces.

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "show",
        description: "Print the goal tree with its ids",
    },
    CommandSpec {
        usage: "add <section> <cell> <title...>",
        description: "Add a sub-task to a means cell",
    },
    CommandSpec {
        usage: "toggle <section> <cell> <sub-task>",
        description: "Complete or reopen a sub-task",
    },
    CommandSpec {
        usage: "edit <section> <cell> <sub-task> <title...>",
        description: "Rename a sub-task",
    },
    CommandSpec {
        usage: "rm <section> <cell> <sub-task>",
        description: "Delete a sub-task",
    },
    CommandSpec {
        usage: "rename <section> <cell> <title...>",
        description: "Rename the vision, a theme or a means cell",
    },
    CommandSpec {
        usage: "done <title...>",
        description: "Complete a sub-task by title, adding it if missing",
    },
    CommandSpec {
        usage: "export [mandala|tasks|all]",
        description: "Write Markdown files to the export directory",
    },
    CommandSpec {
        usage: "import mandala|tasks",
        description: "Read the newest Markdown file back in",
    },
    CommandSpec {
        usage: "due",
        description: "Print the check-in reminder if it is due now",
    },
    CommandSpec {
        usage: "help",
        description: "Show available commands",
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn help_text() -> String {
    let width = COMMAND_SPECS
        .iter()
        .map(|spec| spec.usage.len())
        .max()
        .unwrap_or(0);
    let mut text = String::from("Usage: mandala <command> [args]\n\nCommands:\n");
    for spec in COMMAND_SPECS {
        text.push_str(&format!("  {:width$}  {}\n", spec.usage, spec.description));
    }
    text.push_str("\nThe user is chosen by MANDALA_USER (default \"local\").\n");
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Mandala,
    Tasks,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Mandala,
    Tasks,
}

/// Parsed command with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Show,
    Add {
        section_id: &'a str,
        cell_id: &'a str,
        title: String,
    },
    Toggle {
        section_id: &'a str,
        cell_id: &'a str,
        sub_task_id: &'a str,
    },
    Edit {
        section_id: &'a str,
        cell_id: &'a str,
        sub_task_id: &'a str,
        title: String,
    },
    Remove {
        section_id: &'a str,
        cell_id: &'a str,
        sub_task_id: &'a str,
    },
    Rename {
        section_id: &'a str,
        cell_id: &'a str,
        title: String,
    },
    /// The whole line, keyword included, as a chat message.
    Done(String),
    Export(ExportTarget),
    Import(ImportTarget),
    Due,
    Help,
    /// Known verb with missing or bad arguments; carries its usage line.
    Usage(&'static str),
    Unknown(&'a str),
}

fn usage_of(verb: &str) -> &'static str {
    COMMAND_SPECS
        .iter()
        .find(|spec| spec.usage.split_whitespace().next() == Some(verb))
        .map_or("help", |spec| spec.usage)
}

fn joined(words: &[String]) -> Option<String> {
    let title = words.join(" ").trim().to_string();
    (!title.is_empty()).then_some(title)
}

impl<'a> Command<'a> {
    /// Parse `args` (without the program name).
    #[must_use]
    pub fn parse(args: &'a [String]) -> Self {
        let Some((verb, rest)) = args.split_first() else {
            return Command::Help;
        };
        let arg = |i: usize| rest.get(i).map(String::as_str);

        let parsed = match verb.as_str() {
            "show" => Some(Command::Show),
            "add" => match (arg(0), arg(1), joined(rest.get(2..).unwrap_or_default())) {
                (Some(section_id), Some(cell_id), Some(title)) => Some(Command::Add {
                    section_id,
                    cell_id,
                    title,
                }),
                _ => None,
            },
            "toggle" => match (arg(0), arg(1), arg(2)) {
                (Some(section_id), Some(cell_id), Some(sub_task_id)) => Some(Command::Toggle {
                    section_id,
                    cell_id,
                    sub_task_id,
                }),
                _ => None,
            },
            "edit" => match (
                arg(0),
                arg(1),
                arg(2),
                joined(rest.get(3..).unwrap_or_default()),
            ) {
                (Some(section_id), Some(cell_id), Some(sub_task_id), Some(title)) => {
                    Some(Command::Edit {
                        section_id,
                        cell_id,
                        sub_task_id,
                        title,
                    })
                }
                _ => None,
            },
            "rm" => match (arg(0), arg(1), arg(2)) {
                (Some(section_id), Some(cell_id), Some(sub_task_id)) => Some(Command::Remove {
                    section_id,
                    cell_id,
                    sub_task_id,
                }),
                _ => None,
            },
            "rename" => match (arg(0), arg(1), joined(rest.get(2..).unwrap_or_default())) {
                (Some(section_id), Some(cell_id), Some(title)) => Some(Command::Rename {
                    section_id,
                    cell_id,
                    title,
                }),
                _ => None,
            },
            "done" | "/done" => Some(Command::Done(args.join(" "))),
            "export" => match arg(0) {
                None | Some("all") => Some(Command::Export(ExportTarget::All)),
                Some("mandala") => Some(Command::Export(ExportTarget::Mandala)),
                Some("tasks") => Some(Command::Export(ExportTarget::Tasks)),
                Some(_) => None,
            },
            "import" => match arg(0) {
                Some("mandala") => Some(Command::Import(ImportTarget::Mandala)),
                Some("tasks") => Some(Command::Import(ImportTarget::Tasks)),
                _ => None,
            },
            "due" => Some(Command::Due),
            "help" | "-h" | "--help" => Some(Command::Help),
            other => return Command::Unknown(other),
        };

        parsed.unwrap_or_else(|| Command::Usage(usage_of(verb)))
    }
}
